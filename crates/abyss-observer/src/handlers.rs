//! REST API endpoint handlers for the Observer server.
//!
//! Reads are served from the last [`PublishedState`] so the observer never
//! blocks the frame loop. Commands are forwarded to the driver and answered
//! once the driver has applied them.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/world` | Current world snapshot |
//! | `GET` | `/api/agents` | List agents (`?status=alive\|dead\|all`) |
//! | `GET` | `/api/agents/{id}` | Full state of one agent |
//! | `GET` | `/api/nutrients` | Nutrients on the field |
//! | `GET` | `/api/events` | Recent social, chat, feed and death events |
//! | `GET` | `/api/oracle` | Oracle diagnostics |
//! | `POST` | `/api/commands` | Apply a command |
//!
//! [`PublishedState`]: crate::state::PublishedState

use std::sync::Arc;

use abyss_core::Command;
use abyss_types::{AgentId, AgentSnapshot};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::ObserverError;
use crate::state::{AppState, CommandEnvelope};

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/agents` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct AgentsQuery {
    /// Filter by alive/dead/all status. Accepted values: `alive`, `dead`, `all`.
    pub status: Option<String>,
}

/// Query parameters for the `GET /api/events` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Maximum number of events per category (default 100).
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing simulation status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let published = state.published.read().await;
    let frame = published.frame;
    let backend = published.oracle.backend.clone();
    let (alive, dead, nutrients, deaths, status) =
        published.world.as_deref().map_or((0, 0, 0, 0, "WAITING"), |world| {
            (
                world.alive.len(),
                world.dead.len(),
                world.nutrients.len(),
                world.stats.total_deaths,
                if world.paused { "PAUSED" } else { "RUNNING" },
            )
        });

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Abyss Observer</title>
    <style>
        body {{
            background: #05070d;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #00ffaa; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #0d1117;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #00ffaa; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Abyss Observer</h1>
    <p class="subtitle">BioBit arena monitoring server</p>

    <p>Status: <span class="status">{status}</span> -- oracle: {backend}</p>

    <div>
        <div class="metric"><div class="label">Frame</div><div class="value">{frame}</div></div>
        <div class="metric"><div class="label">Alive</div><div class="value">{alive}</div></div>
        <div class="metric"><div class="label">Corpses</div><div class="value">{dead}</div></div>
        <div class="metric"><div class="label">Nutrients</div><div class="value">{nutrients}</div></div>
        <div class="metric"><div class="label">Deaths</div><div class="value">{deaths}</div></div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/world">/api/world</a> -- Current world snapshot</li>
        <li>GET <a href="/api/agents">/api/agents</a> -- List agents (?status=alive|dead|all)</li>
        <li>GET /api/agents/{{id}} -- Single agent detail</li>
        <li>GET <a href="/api/nutrients">/api/nutrients</a> -- Nutrients on the field</li>
        <li>GET <a href="/api/events">/api/events</a> -- Recent events (?limit=N)</li>
        <li>GET <a href="/api/oracle">/api/oracle</a> -- Oracle diagnostics</li>
        <li>POST /api/commands -- Apply a command, e.g. {{"command":"toggle_pause"}}</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/frames</code> -- Live snapshot stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/world -- current world snapshot
// ---------------------------------------------------------------------------

/// Return the latest world snapshot, or a placeholder before the first
/// frame has been published.
pub async fn get_world(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let published = state.published.read().await;

    if let Some(world) = &published.world {
        let mut body = serde_json::to_value(world.as_ref())?;
        if let Some(object) = body.as_object_mut() {
            object.insert("frame".to_owned(), published.frame.into());
        }
        Ok(Json(body))
    } else {
        Ok(Json(serde_json::json!({
            "frame": published.frame,
            "ready": false,
        })))
    }
}

// ---------------------------------------------------------------------------
// GET /api/agents -- list agents
// ---------------------------------------------------------------------------

/// List agents, optionally filtered by alive/dead status.
///
/// # Query Parameters
///
/// - `status`: `alive` | `dead` | `all` (default: `all`)
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgentsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let filter = params.status.as_deref().unwrap_or("all");
    let (want_alive, want_dead) = match filter {
        "alive" => (true, false),
        "dead" => (false, true),
        "all" => (true, true),
        other => {
            return Err(ObserverError::InvalidQuery(format!(
                "status must be alive, dead or all, got {other}"
            )));
        }
    };

    let published = state.published.read().await;
    let agents: Vec<serde_json::Value> = published
        .world
        .as_deref()
        .map(|world| {
            let alive = world.alive.iter().filter(|_| want_alive);
            let dead = world.dead.iter().filter(|_| want_dead);
            alive.chain(dead).map(agent_summary).collect()
        })
        .unwrap_or_default();

    Ok(Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
    })))
}

fn agent_summary(agent: &AgentSnapshot) -> serde_json::Value {
    serde_json::json!({
        "id": agent.id,
        "name": agent.name,
        "personality": agent.personality,
        "energy": agent.energy,
        "intention": agent.intention,
        "position": agent.position,
        "alive": agent.is_alive,
        "died_at": agent.died_at,
    })
}

// ---------------------------------------------------------------------------
// GET /api/agents/{id} -- single agent detail
// ---------------------------------------------------------------------------

/// Return the full exported state of one agent, living or dead.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_agent_id(&id_str)?;
    let published = state.published.read().await;

    let agent = published
        .world
        .as_deref()
        .and_then(|world| world.alive.iter().chain(&world.dead).find(|a| a.id == id))
        .ok_or_else(|| ObserverError::NotFound(format!("agent {id}")))?;

    Ok(Json(serde_json::to_value(agent)?))
}

// ---------------------------------------------------------------------------
// GET /api/nutrients
// ---------------------------------------------------------------------------

/// List nutrients currently on the field.
pub async fn list_nutrients(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let published = state.published.read().await;
    let nutrients = published
        .world
        .as_deref()
        .map_or(&[][..], |world| world.nutrients.as_slice());

    Ok(Json(serde_json::json!({
        "count": nutrients.len(),
        "nutrients": nutrients,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/events
// ---------------------------------------------------------------------------

/// Recent events by category, newest last, each capped at `limit`
/// (default 100, max 1000).
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = params.limit.unwrap_or(100).min(1000);
    let published = state.published.read().await;
    let Some(world) = published.world.as_deref() else {
        return Ok(Json(serde_json::json!({
            "social": [],
            "chat": [],
            "feeds": [],
            "deaths": [],
            "log": [],
        })));
    };

    Ok(Json(serde_json::json!({
        "social": tail(&world.social_events, limit),
        "chat": tail(&world.chat_messages, limit),
        "feeds": tail(&world.feed_events, limit),
        "deaths": tail(&world.death_events, limit),
        "log": world.recent_social_log,
    })))
}

fn tail<T>(items: &[T], limit: usize) -> &[T] {
    items
        .get(items.len().saturating_sub(limit)..)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// GET /api/oracle
// ---------------------------------------------------------------------------

/// Oracle readiness and counters.
pub async fn get_oracle(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let published = state.published.read().await;
    Json(published.oracle.clone())
}

// ---------------------------------------------------------------------------
// POST /api/commands
// ---------------------------------------------------------------------------

/// Queue a command for the next frame and wait for its outcome.
pub async fn post_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<Command>,
) -> Result<impl IntoResponse, ObserverError> {
    let sender = state
        .commands
        .as_ref()
        .ok_or_else(|| ObserverError::Unavailable("command channel not attached".to_owned()))?;

    debug!(?command, "command received");
    let (reply, outcome) = oneshot::channel();
    sender
        .send(CommandEnvelope {
            command,
            reply: Some(reply),
        })
        .await
        .map_err(|_closed| ObserverError::Unavailable("driver stopped".to_owned()))?;

    let outcome = outcome
        .await
        .map_err(|_dropped| ObserverError::Unavailable("driver dropped the command".to_owned()))?
        .map_err(ObserverError::Rejected)?;

    Ok((StatusCode::OK, Json(outcome)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an agent id from a path segment.
fn parse_agent_id(s: &str) -> Result<AgentId, ObserverError> {
    s.parse::<u64>()
        .map(AgentId)
        .map_err(|e| ObserverError::InvalidQuery(format!("invalid agent id {s}: {e}")))
}

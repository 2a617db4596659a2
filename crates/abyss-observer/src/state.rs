//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the latest published snapshot, the broadcast channel
//! for live frames, and the command channel into the driver loop. The
//! engine is the only writer; handlers read.

use std::sync::Arc;

use abyss_core::{Command, CommandOutcome};
use abyss_types::{OracleStats, WorldSnapshot};
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};

/// Capacity of the broadcast channel for frames.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// A command sent to the driver loop, with an optional reply slot.
#[derive(Debug)]
pub struct CommandEnvelope {
    /// The command to apply on the next frame.
    pub command: Command,
    /// Receives the outcome, or the rejection reason.
    pub reply: Option<oneshot::Sender<Result<CommandOutcome, String>>>,
}

/// What the engine last published.
#[derive(Debug, Clone, Default)]
pub struct PublishedState {
    /// The latest world snapshot, absent until the first frame.
    pub world: Option<Arc<WorldSnapshot>>,
    /// Oracle diagnostics at the time of publishing.
    pub oracle: OracleStats,
    /// Frames run by the driver so far.
    pub frame: u64,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for live frames.
    pub tx: broadcast::Sender<Arc<WorldSnapshot>>,
    /// The latest published state.
    pub published: Arc<RwLock<PublishedState>>,
    /// Command channel into the driver (absent in read-only deployments).
    pub commands: Option<mpsc::Sender<CommandEnvelope>>,
}

impl AppState {
    /// Create a read-only application state with nothing published yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            published: Arc::new(RwLock::new(PublishedState::default())),
            commands: None,
        }
    }

    /// Create an application state that forwards commands to `commands`.
    pub fn with_commands(commands: mpsc::Sender<CommandEnvelope>) -> Self {
        Self {
            commands: Some(commands),
            ..Self::new()
        }
    }

    /// Subscribe to the frame broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<WorldSnapshot>> {
        self.tx.subscribe()
    }

    /// Store a new snapshot and push it to all connected clients.
    ///
    /// Returns the number of receivers that got the frame. Zero is normal
    /// when no `WebSocket` clients are connected.
    pub async fn publish(&self, world: WorldSnapshot, oracle: OracleStats, frame: u64) -> usize {
        let world = Arc::new(world);
        {
            let mut published = self.published.write().await;
            published.world = Some(Arc::clone(&world));
            published.oracle = oracle;
            published.frame = frame;
        }
        self.tx.send(world).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

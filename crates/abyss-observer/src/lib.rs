//! Observer API server for the Abyss simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming world snapshots via
//!   [`tokio::sync::broadcast`]
//! - **REST endpoints** for the world, agents, nutrients, events, and
//!   oracle diagnostics
//! - **Command endpoint** (`POST /api/commands`) forwarding the
//!   simulation's command surface to the driver loop
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The engine publishes a [`WorldSnapshot`](abyss_types::WorldSnapshot)
//! every few frames into [`AppState`]. REST reads are served from that
//! copy, so the observer never touches the simulation itself. Commands
//! travel over an `mpsc` channel and are applied by the driver between
//! ticks, keeping the simulation single-writer.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, CommandEnvelope, PublishedState};

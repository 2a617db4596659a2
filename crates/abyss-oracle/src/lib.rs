//! Decision oracle adapter for the Abyss simulation.
//!
//! Given a free-text situational prompt, the adapter asks a language model
//! for a decision and coerces whatever comes back into a valid
//! [`abyss_types::Decision`]. Failures never propagate: a broken payload is
//! repaired or replaced, and a failed call produces a random fallback.
//!
//! # Architecture
//!
//! ```text
//! prompt --> LlmBackend (OpenAI | Anthropic | Scripted) --> parse --> Decision
//! ```
//!
//! # Modules
//!
//! - [`adapter`] -- [`OracleAdapter`]: readiness, counters, system prompt.
//! - [`config`] -- [`OracleConfig`] and [`BackendType`].
//! - [`error`] -- [`OracleError`].
//! - [`llm`] -- HTTP and scripted backends.
//! - [`parse`] -- Response recovery and sanitization.

pub mod adapter;
pub mod config;
pub mod error;
pub mod llm;
pub mod parse;

pub use adapter::{OracleAdapter, SYSTEM_PROMPT};
pub use config::{BackendType, OracleConfig};
pub use error::OracleError;
pub use llm::{LlmBackend, ScriptedBackend, create_backend};
pub use parse::{ParseOutcome, fallback_decision, parse_response};

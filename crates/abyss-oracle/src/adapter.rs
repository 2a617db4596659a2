//! The decision oracle adapter.
//!
//! Wraps one [`LlmBackend`] behind the contract the simulation relies on:
//! a prompt goes in, and either `None` (oracle not ready) or a sanitized
//! [`Decision`] comes out. Transport and payload failures never escape.

use std::sync::atomic::{AtomicU64, Ordering};

use abyss_types::{Decision, OracleStats};
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::llm::{LlmBackend, OraclePrompt, create_backend};
use crate::parse::{fallback_decision, parse_response};

/// Standing instructions sent with every prompt.
pub const SYSTEM_PROMPT: &str = r#"You are a BioBit organism. Read the situation carefully and decide your action.

RULES:
1. If energy < 20%, you MUST choose "hunt" to survive
2. Your personality affects your choices
3. Output ONLY JSON, nothing else

JSON FORMAT:
{"intention":"hunt","internal_monologue":"I need food","public_message":"...","move_direction":{"x":0,"y":0}}

INTENTIONS:
- "hunt" = find food (PRIORITY when energy is low!)
- "attack" = steal energy from others
- "socialize" = be friendly, share energy
- "flee" = escape danger

PERSONALITY GUIDE:
- altruist: prefer socialize, help others
- manipulator: say nice things but attack (lie!)
- paranoid: flee from strangers, attack if threatened
- neutral: balanced decisions

Examples:
Low energy: {"intention":"hunt","internal_monologue":"I must find food or die","public_message":"...","move_direction":{"x":1,"y":0}}
Manipulator: {"intention":"attack","internal_monologue":"I will steal from them","public_message":"Hello friend!","move_direction":{"x":0,"y":1}}

Output ONLY valid JSON:"#;

/// Appended to every situational prompt.
const RESPONSE_SUFFIX: &str = "\n\nRespond with JSON only:";

/// Decision oracle with diagnostics counters.
///
/// Shared across tasks behind an `Arc`; the counters are atomics so
/// concurrent calls need no lock.
pub struct OracleAdapter {
    backend: Option<LlmBackend>,
    generations: AtomicU64,
    parse_failures: AtomicU64,
    fallbacks: AtomicU64,
}

impl OracleAdapter {
    /// Build an adapter from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] if the configuration is invalid.
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        config.validate()?;
        Ok(Self::from_backend(create_backend(config)))
    }

    /// Wrap an already-built backend. `None` gives an adapter that is
    /// never ready.
    pub const fn from_backend(backend: Option<LlmBackend>) -> Self {
        Self {
            backend,
            generations: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// An adapter with no backend.
    pub const fn disabled() -> Self {
        Self::from_backend(None)
    }

    /// Whether decisions can be requested.
    pub const fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    /// Backend name for logs and diagnostics.
    pub const fn backend_name(&self) -> &'static str {
        match &self.backend {
            Some(backend) => backend.name(),
            None => "disabled",
        }
    }

    /// Current diagnostics counters.
    pub fn stats(&self) -> OracleStats {
        OracleStats {
            ready: self.is_ready(),
            backend: self.backend_name().to_owned(),
            generations: self.generations.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }

    /// Ask the oracle for a decision.
    ///
    /// Returns `None` only when no backend is configured. A transport or
    /// inference failure yields a random fallback decision; a malformed
    /// payload is recovered by [`parse_response`].
    pub async fn generate_decision(&self, prompt: &str) -> Option<Decision> {
        let backend = self.backend.as_ref()?;
        let user = format!("{prompt}{RESPONSE_SUFFIX}");
        let request = OraclePrompt {
            system: SYSTEM_PROMPT,
            user: &user,
        };

        match backend.complete(request).await {
            Ok(raw) => {
                self.generations.fetch_add(1, Ordering::Relaxed);
                Some(self.interpret(&raw))
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "oracle call failed, using fallback decision");
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                Some(fallback_decision(&mut rand::rng()))
            }
        }
    }

    fn interpret(&self, raw: &str) -> Decision {
        let outcome = parse_response(raw, &mut rand::rng());
        if outcome.is_failure() {
            self.parse_failures.fetch_add(1, Ordering::Relaxed);
        }
        let decision = outcome.into_decision();
        debug!(intention = decision.intention.as_str(), "oracle decision");
        decision
    }
}

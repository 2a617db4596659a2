//! Configuration types for the decision oracle.
//!
//! The engine builds an [`OracleConfig`] from the `oracle` section of
//! `abyss-config.yaml` (with environment overrides already applied) and
//! hands it to [`crate::OracleAdapter::new`].

use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Supported oracle backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions API (works with `OpenAI`,
    /// `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API (different request format).
    Anthropic,
    /// Canned responses, no network. Used for offline runs and tests.
    Scripted,
    /// No oracle at all. The adapter never reports ready.
    Disabled,
}

impl BackendType {
    /// Parse a backend name, accepting the common vendor aliases.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] for an unknown name.
    pub fn from_name(name: &str) -> Result<Self, OracleError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "scripted" | "offline" => Ok(Self::Scripted),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(OracleError::Config(format!("unknown backend type: {other}"))),
        }
    }
}

/// Connection and sampling parameters for one oracle backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Which backend to talk to.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum completion tokens.
    pub max_tokens: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend_type: BackendType::Scripted,
            api_url: "https://api.openai.com/v1".to_owned(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_owned(),
            temperature: 0.7,
            max_tokens: 120,
            top_p: 0.9,
        }
    }
}

impl OracleConfig {
    /// Check that an HTTP backend has what it needs to make a request.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] when an HTTP backend has no URL or
    /// model, or when a sampling parameter is out of range.
    pub fn validate(&self) -> Result<(), OracleError> {
        if matches!(self.backend_type, BackendType::OpenAi | BackendType::Anthropic) {
            if self.api_url.trim().is_empty() {
                return Err(OracleError::Config("api_url must not be empty".to_owned()));
            }
            if self.model.trim().is_empty() {
                return Err(OracleError::Config("model must not be empty".to_owned()));
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(OracleError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(OracleError::Config(format!(
                "top_p must be within [0, 1], got {}",
                self.top_p
            )));
        }
        if self.max_tokens == 0 {
            return Err(OracleError::Config("max_tokens must be positive".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_and_aliases() {
        assert_eq!(BackendType::from_name("OpenAI").ok(), Some(BackendType::OpenAi));
        assert_eq!(BackendType::from_name("ollama").ok(), Some(BackendType::OpenAi));
        assert_eq!(BackendType::from_name("claude").ok(), Some(BackendType::Anthropic));
        assert_eq!(BackendType::from_name(" scripted ").ok(), Some(BackendType::Scripted));
        assert_eq!(BackendType::from_name("off").ok(), Some(BackendType::Disabled));
        assert!(BackendType::from_name("webgpu").is_err());
    }

    #[test]
    fn defaults_match_reference_sampling() {
        let config = OracleConfig::default();
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, 120);
        assert!((config.top_p - 0.9).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn http_backend_requires_model() {
        let config = OracleConfig {
            backend_type: BackendType::Anthropic,
            model: String::new(),
            ..OracleConfig::default()
        };
        assert!(config.validate().is_err());

        let scripted = OracleConfig {
            model: String::new(),
            ..OracleConfig::default()
        };
        assert!(scripted.validate().is_ok());
    }

    #[test]
    fn out_of_range_sampling_rejected() {
        let config = OracleConfig {
            top_p: 1.5,
            ..OracleConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Configuration loading and typed config structures for the Abyss simulation.
//!
//! The canonical configuration lives in `abyss-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file. Every
//! field has a default, so an empty or missing file yields a working arena.

use std::path::Path;

use abyss_world::SpawnWeights;
use serde::Deserialize;

use crate::simulation::{MAX_MULTIPLIER, MIN_MULTIPLIER};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `abyss-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Arena extent and initial population.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Baseline energy drain.
    #[serde(default)]
    pub metabolism: MetabolismConfig,

    /// Nutrient spawning.
    #[serde(default)]
    pub nutrients: NutrientConfig,

    /// Oracle scheduling and perception limits.
    #[serde(default)]
    pub cognition: CognitionConfig,

    /// Retention windows for corpses and event records.
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Global powers and click handling.
    #[serde(default)]
    pub powers: PowersConfig,

    /// Decision oracle backend.
    #[serde(default)]
    pub oracle: OracleSection,

    /// Observer server and frame loop.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ORACLE_BACKEND` overrides `oracle.backend`
    /// - `ORACLE_API_URL` overrides `oracle.api_url`
    /// - `ORACLE_MODEL` overrides `oracle.model`
    /// - `ORACLE_API_KEY` sets `oracle.api_key`
    /// - `OBSERVER_PORT` overrides `infrastructure.observer_port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`SimulationConfig::from_file`], but a missing file yields the
    /// defaults (with environment overrides applied).
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`] for files that exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides to every section that supports them.
    pub fn apply_env_overrides(&mut self) {
        self.oracle.apply_env_overrides();
        self.infrastructure.apply_env_overrides();
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena.width.is_finite()
            && self.arena.height.is_finite()
            && self.arena.width > 0.0
            && self.arena.height > 0.0)
        {
            return Err(ConfigError::Invalid {
                reason: "arena width and height must be positive".to_owned(),
            });
        }
        self.nutrients
            .spawn_weights
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;

        let metabolism = &self.metabolism;
        check_range("metabolism.base_decay", metabolism.base_decay, 0.0, f64::MAX)?;
        if !(metabolism.reference_frame_ms.is_finite() && metabolism.reference_frame_ms > 0.0) {
            return Err(ConfigError::Invalid {
                reason: "metabolism.reference_frame_ms must be positive".to_owned(),
            });
        }
        check_range("metabolism.entropy", metabolism.entropy, MIN_MULTIPLIER, MAX_MULTIPLIER)?;
        check_range("nutrients.spawn_chance", self.nutrients.spawn_chance, 0.0, 1.0)?;
        check_range("nutrients.abundance", self.nutrients.abundance, MIN_MULTIPLIER, MAX_MULTIPLIER)?;
        check_range("cognition.nearby_radius", self.cognition.nearby_radius, 0.0, f64::MAX)?;

        let powers = &self.powers;
        check_range("powers.freeze_entropy", powers.freeze_entropy, MIN_MULTIPLIER, MAX_MULTIPLIER)?;
        check_range("powers.lightning_damage", powers.lightning_damage, 0.0, f64::MAX)?;
        check_range("powers.lightning_radius", powers.lightning_radius, 0.0, f64::MAX)?;
        check_range("powers.select_radius", powers.select_radius, 0.0, f64::MAX)?;

        if self.infrastructure.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "infrastructure.frame_interval_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// `value` must be finite and within `[min, max]`.
fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be a finite number in [{min}, {max}], got {value}"),
        })
    }
}

/// Arena extent and initial population.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArenaConfig {
    /// Arena width.
    #[serde(default = "default_width")]
    pub width: f64,

    /// Arena height.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Biobits spawned at startup.
    #[serde(default = "default_initial_biobits")]
    pub initial_biobits: u32,

    /// Nutrients spawned at startup.
    #[serde(default = "default_initial_nutrients")]
    pub initial_nutrients: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            initial_biobits: default_initial_biobits(),
            initial_nutrients: default_initial_nutrients(),
        }
    }
}

/// Baseline energy drain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetabolismConfig {
    /// Energy lost per reference frame at entropy 1.
    #[serde(default = "default_base_decay")]
    pub base_decay: f64,

    /// Length of the reference frame in milliseconds.
    #[serde(default = "default_reference_frame_ms")]
    pub reference_frame_ms: f64,

    /// Starting entropy multiplier.
    #[serde(default = "default_multiplier")]
    pub entropy: f64,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            base_decay: default_base_decay(),
            reference_frame_ms: default_reference_frame_ms(),
            entropy: default_multiplier(),
        }
    }
}

/// Nutrient spawning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NutrientConfig {
    /// Per-tick spawn probability at abundance 1.
    #[serde(default = "default_spawn_chance")]
    pub spawn_chance: f64,

    /// Starting abundance multiplier.
    #[serde(default = "default_multiplier")]
    pub abundance: f64,

    /// Relative weights of the random type draw.
    #[serde(default)]
    pub spawn_weights: SpawnWeights,
}

impl Default for NutrientConfig {
    fn default() -> Self {
        Self {
            spawn_chance: default_spawn_chance(),
            abundance: default_multiplier(),
            spawn_weights: SpawnWeights::default(),
        }
    }
}

/// Oracle scheduling and perception limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CognitionConfig {
    /// Minimum milliseconds between decision windows.
    #[serde(default = "default_think_interval_ms")]
    pub think_interval_ms: u64,

    /// Radius within which other agents count as nearby.
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius: f64,

    /// Nearby agents included in a prompt.
    #[serde(default = "default_max_nearby")]
    pub max_nearby: usize,

    /// Memories included in a prompt.
    #[serde(default = "default_max_prompt_memories")]
    pub max_prompt_memories: usize,

    /// Directory of prompt templates overriding the built-in set.
    #[serde(default)]
    pub templates_dir: Option<String>,
}

impl Default for CognitionConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: default_think_interval_ms(),
            nearby_radius: default_nearby_radius(),
            max_nearby: default_max_nearby(),
            max_prompt_memories: default_max_prompt_memories(),
            templates_dir: None,
        }
    }
}

/// Retention windows in milliseconds. Records older than their window are
/// pruned; a corpse is removed once its time since death reaches `corpse_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetentionConfig {
    /// Corpse display window.
    #[serde(default = "default_corpse_ms")]
    pub corpse_ms: u64,

    /// Social event window.
    #[serde(default = "default_social_ms")]
    pub social_ms: u64,

    /// Feed event window.
    #[serde(default = "default_short_window_ms")]
    pub feed_ms: u64,

    /// Death event window.
    #[serde(default = "default_short_window_ms")]
    pub death_ms: u64,

    /// Chat message window.
    #[serde(default = "default_chat_ms")]
    pub chat_ms: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            corpse_ms: default_corpse_ms(),
            social_ms: default_social_ms(),
            feed_ms: default_short_window_ms(),
            death_ms: default_short_window_ms(),
            chat_ms: default_chat_ms(),
        }
    }
}

/// Global powers and click handling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowersConfig {
    /// How long freeze and frenzy last.
    #[serde(default = "default_power_duration_ms")]
    pub duration_ms: u64,

    /// Entropy while frozen.
    #[serde(default = "default_freeze_entropy")]
    pub freeze_entropy: f64,

    /// Energy removed by one lightning strike.
    #[serde(default = "default_lightning_damage")]
    pub lightning_damage: f64,

    /// Strike radius around the click point.
    #[serde(default = "default_lightning_radius")]
    pub lightning_radius: f64,

    /// Selection radius around the click point.
    #[serde(default = "default_select_radius")]
    pub select_radius: f64,
}

impl Default for PowersConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_power_duration_ms(),
            freeze_entropy: default_freeze_entropy(),
            lightning_damage: default_lightning_damage(),
            lightning_radius: default_lightning_radius(),
            select_radius: default_select_radius(),
        }
    }
}

/// Decision oracle backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OracleSection {
    /// Backend name: `openai`, `anthropic`, `scripted`, or `disabled`.
    #[serde(default = "default_oracle_backend")]
    pub backend: String,

    /// Base API URL.
    #[serde(default = "default_oracle_api_url")]
    pub api_url: String,

    /// Model identifier.
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// API key. Normally supplied through `ORACLE_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum completion tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl OracleSection {
    /// Override oracle settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ORACLE_BACKEND") {
            self.backend = val;
        }
        if let Ok(val) = std::env::var("ORACLE_API_URL") {
            self.api_url = val;
        }
        if let Ok(val) = std::env::var("ORACLE_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("ORACLE_API_KEY") {
            self.api_key = val;
        }
    }
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            backend: default_oracle_backend(),
            api_url: default_oracle_api_url(),
            model: default_oracle_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

/// Observer server and frame loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Observer bind host.
    #[serde(default = "default_observer_host")]
    pub observer_host: String,

    /// Observer port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,

    /// Milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Publish a snapshot every N frames.
    #[serde(default = "default_broadcast_every_frames")]
    pub broadcast_every_frames: u64,
}

impl InfrastructureConfig {
    /// Override the observer port with `OBSERVER_PORT` when set and valid.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.observer_port = port;
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            observer_host: default_observer_host(),
            observer_port: default_observer_port(),
            frame_interval_ms: default_frame_interval_ms(),
            broadcast_every_frames: default_broadcast_every_frames(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_width() -> f64 {
    800.0
}

const fn default_height() -> f64 {
    600.0
}

const fn default_initial_biobits() -> u32 {
    8
}

const fn default_initial_nutrients() -> u32 {
    20
}

const fn default_base_decay() -> f64 {
    0.008
}

const fn default_reference_frame_ms() -> f64 {
    16.0
}

const fn default_multiplier() -> f64 {
    1.0
}

const fn default_spawn_chance() -> f64 {
    0.02
}

const fn default_think_interval_ms() -> u64 {
    8000
}

const fn default_nearby_radius() -> f64 {
    150.0
}

const fn default_max_nearby() -> usize {
    3
}

const fn default_max_prompt_memories() -> usize {
    3
}

const fn default_corpse_ms() -> u64 {
    15_000
}

const fn default_social_ms() -> u64 {
    15_000
}

const fn default_short_window_ms() -> u64 {
    5000
}

const fn default_chat_ms() -> u64 {
    6000
}

const fn default_power_duration_ms() -> u64 {
    5000
}

const fn default_freeze_entropy() -> f64 {
    0.2
}

const fn default_lightning_damage() -> f64 {
    50.0
}

const fn default_lightning_radius() -> f64 {
    50.0
}

const fn default_select_radius() -> f64 {
    30.0
}

fn default_oracle_backend() -> String {
    "scripted".to_owned()
}

fn default_oracle_api_url() -> String {
    "https://api.openai.com/v1".to_owned()
}

fn default_oracle_model() -> String {
    "gpt-4o-mini".to_owned()
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_max_tokens() -> u32 {
    120
}

const fn default_top_p() -> f64 {
    0.9
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_broadcast_every_frames() -> u64 {
    4
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_values() {
        let config = SimulationConfig::default();
        assert!((config.arena.width - 800.0).abs() < f64::EPSILON);
        assert_eq!(config.arena.initial_biobits, 8);
        assert!((config.metabolism.base_decay - 0.008).abs() < f64::EPSILON);
        assert!((config.nutrients.spawn_chance - 0.02).abs() < f64::EPSILON);
        assert_eq!(config.cognition.think_interval_ms, 8000);
        assert_eq!(config.retention.corpse_ms, 15_000);
        assert_eq!(config.retention.chat_ms, 6000);
        assert_eq!(config.oracle.max_tokens, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
arena:
  width: 1024
  initial_biobits: 3
cognition:
  think_interval_ms: 2000
nutrients:
  spawn_weights:
    toxic: 0
";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert!((config.arena.width - 1024.0).abs() < f64::EPSILON);
        assert!((config.arena.height - 600.0).abs() < f64::EPSILON);
        assert_eq!(config.arena.initial_biobits, 3);
        assert_eq!(config.cognition.think_interval_ms, 2000);
        assert!(config.nutrients.spawn_weights.toxic.abs() < f64::EPSILON);
        assert!((config.nutrients.spawn_weights.common - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let yaml = "arena:\n  width: 0\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
        let yaml = "nutrients:\n  spawn_weights:\n    common: 0\n    rich: 0\n    toxic: 0\n    golden: 0\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn non_finite_and_out_of_range_values_are_rejected() {
        for yaml in [
            "metabolism:\n  base_decay: .nan\n",
            "metabolism:\n  base_decay: -0.5\n",
            "metabolism:\n  entropy: 7.0\n",
            "nutrients:\n  spawn_chance: 1.5\n",
            "nutrients:\n  abundance: .inf\n",
            "powers:\n  freeze_entropy: 50.0\n",
            "powers:\n  lightning_damage: -40.0\n",
            "powers:\n  lightning_radius: .nan\n",
            "powers:\n  select_radius: -1\n",
            "arena:\n  width: .inf\n",
        ] {
            assert!(
                matches!(SimulationConfig::parse(yaml), Err(ConfigError::Invalid { .. })),
                "accepted {yaml:?}"
            );
        }
    }

    #[test]
    fn boundary_values_are_accepted() {
        let yaml = "metabolism:\n  base_decay: 0\n  entropy: 0.1\nnutrients:\n  spawn_chance: 1\npowers:\n  freeze_entropy: 3\n  lightning_damage: 0\n";
        assert!(SimulationConfig::parse(yaml).is_ok());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            SimulationConfig::parse("arena: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = SimulationConfig::load_or_default(Path::new("/nonexistent/abyss-config.yaml"));
        assert!(config.is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("abyss-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

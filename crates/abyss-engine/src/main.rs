//! Engine binary for the Abyss simulation.
//!
//! Wires the simulation core, the decision oracle, and the observer server
//! together, then runs the frame-driven driver loop until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `abyss-config.yaml` (or `ABYSS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Configure the decision oracle
//! 4. Create and populate the simulation
//! 5. Start the Observer API server
//! 6. Run the driver loop
//! 7. Shut down the observer and log the result

mod driver;
mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use abyss_core::{OracleSection, Simulation, SimulationConfig, SystemClock};
use abyss_observer::{AppState, ServerConfig};
use abyss_oracle::{BackendType, OracleAdapter, OracleConfig};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::driver::{Driver, DriverConfig};
use crate::error::EngineError;

/// Capacity of the observer-to-driver command queue.
const COMMAND_QUEUE: usize = 64;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration (the log level lives in it).
    let config_path = config_path();
    let config = SimulationConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        width = config.arena.width,
        height = config.arena.height,
        initial_biobits = config.arena.initial_biobits,
        think_interval_ms = config.cognition.think_interval_ms,
        "abyss-engine starting"
    );

    // 3. Configure the decision oracle.
    let oracle = Arc::new(OracleAdapter::new(&oracle_config(&config.oracle)?)?);
    info!(backend = oracle.backend_name(), ready = oracle.is_ready(), "Decision oracle configured");

    // 4. Create and populate the simulation.
    let infrastructure = config.infrastructure.clone();
    let mut sim = Simulation::new(config, Box::new(SystemClock))?;
    sim.populate();

    // 5. Start the Observer API server.
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let app_state = Arc::new(AppState::with_commands(command_tx));
    let (stop_tx, stop_rx) = watch::channel(false);

    let server_config = ServerConfig {
        host: infrastructure.observer_host.clone(),
        port: infrastructure.observer_port,
    };
    let server_state = Arc::clone(&app_state);
    let shutdown = wait_for_stop(stop_rx.clone());
    let mut observer = tokio::spawn(async move {
        abyss_observer::start_server(&server_config, server_state, shutdown).await
    });

    // 6. Run the driver loop until Ctrl-C.
    let driver = Driver::new(
        sim,
        oracle,
        app_state,
        command_rx,
        DriverConfig {
            frame_interval: Duration::from_millis(infrastructure.frame_interval_ms),
            broadcast_every: infrastructure.broadcast_every_frames,
        },
    );
    let driver_task = tokio::spawn(driver.run(stop_rx));

    let early_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "failed to listen for Ctrl-C, shutting down");
            }
            info!("Shutdown requested");
            None
        }
        result = &mut observer => {
            error!("Observer server exited early");
            Some(result)
        }
    };

    // 7. Stop everything.
    request_stop(&stop_tx);
    if let Err(e) = driver_task.await {
        error!(error = %e, "driver task failed");
    }
    let observer_result = match early_exit {
        Some(result) => result,
        None => observer.await,
    };
    observer_result.map_err(|e| EngineError::ObserverTask {
        message: e.to_string(),
    })??;

    info!("abyss-engine shutdown complete");
    Ok(())
}

/// Flip the stop flag. Returns `false` if nothing was listening anymore.
fn request_stop(stop_tx: &watch::Sender<bool>) -> bool {
    let listening = stop_tx.send(true).is_ok();
    if !listening {
        debug!("driver and observer already stopped");
    }
    listening
}

/// Resolves once the stop flag is set or its sender is gone.
async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        debug!("stop channel closed, shutting the observer down");
    }
}

/// The configuration file: `ABYSS_CONFIG` if set, else `abyss-config.yaml`
/// in the working directory.
fn config_path() -> PathBuf {
    std::env::var_os("ABYSS_CONFIG").map_or_else(|| PathBuf::from("abyss-config.yaml"), PathBuf::from)
}

/// Translate the `oracle` config section into the adapter's configuration.
fn oracle_config(section: &OracleSection) -> Result<OracleConfig, EngineError> {
    Ok(OracleConfig {
        backend_type: BackendType::from_name(&section.backend)?,
        api_url: section.api_url.clone(),
        api_key: section.api_key.clone(),
        model: section.model.clone(),
        temperature: section.temperature,
        max_tokens: section.max_tokens,
        top_p: section.top_p,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn oracle_section_maps_onto_oracle_config() {
        let section = OracleSection {
            backend: "claude".to_owned(),
            ..OracleSection::default()
        };
        let config = oracle_config(&section).unwrap();
        assert_eq!(config.backend_type, BackendType::Anthropic);
        assert_eq!(config.max_tokens, section.max_tokens);
        assert!((config.top_p - section.top_p).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let section = OracleSection {
            backend: "telepathy".to_owned(),
            ..OracleSection::default()
        };
        assert!(matches!(oracle_config(&section), Err(EngineError::Oracle { .. })));
    }

    #[tokio::test]
    async fn stop_request_reaches_listeners() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let waiter = tokio::spawn(wait_for_stop(stop_rx));
        assert!(request_stop(&stop_tx));
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn stop_without_listeners_is_reported() {
        let (stop_tx, stop_rx) = watch::channel(false);
        drop(stop_rx);
        assert!(!request_stop(&stop_tx));
    }

    #[tokio::test]
    async fn dropped_stop_sender_still_releases_the_observer() {
        let (stop_tx, stop_rx) = watch::channel(false);
        drop(stop_tx);
        tokio::time::timeout(Duration::from_secs(5), wait_for_stop(stop_rx))
            .await
            .unwrap();
    }
}

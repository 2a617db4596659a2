//! Error types for the decision oracle.
//!
//! None of these reach the simulation: [`crate::OracleAdapter`] turns every
//! failure into a fallback decision. They exist so backends can report what
//! went wrong before the adapter logs and recovers.

/// Errors that can occur while configuring or calling an oracle backend.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("oracle request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("oracle returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response JSON did not contain the expected completion text.
    #[error("oracle response missing {0}")]
    MissingContent(&'static str),

    /// Configuration is invalid.
    #[error("oracle config error: {0}")]
    Config(String),
}

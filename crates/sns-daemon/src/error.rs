//! Error types for the server binary.

/// Top-level error for `snsd`.
///
/// Every variant is fatal: `main` logs it and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: sns_core::ConfigError,
    },

    /// The data directory could not be prepared.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying store error.
        #[from]
        source: sns_store::StoreError,
    },

    /// The gateway failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: sns_gateway::ServerError,
    },
}

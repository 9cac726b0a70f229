//! Error types for plugin process management on the host side.

use std::sync::Arc;

use thiserror::Error;

use odm_plugin::PluginError;

/// Errors raised while launching or driving a plugin process.
#[derive(Debug, Error)]
pub enum HostError {
    /// The plugin executable was not found.
    #[error("plugin executable not found: {command}")]
    BinaryNotFound {
        /// The command that was not found.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The plugin process could not be spawned.
    #[error("failed to spawn plugin process: {message}")]
    SpawnFailed {
        /// Description of the spawn failure.
        message: String,
        /// Optional underlying I/O error.
        #[source]
        source: Option<Arc<std::io::Error>>,
    },

    /// Contract-level failure: handshake, framing, or a remote error.
    #[error(transparent)]
    Rpc(#[from] PluginError),

    /// An I/O error occurred while managing the child process.
    #[error("I/O error managing plugin process: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

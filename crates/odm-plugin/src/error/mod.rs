//! Domain errors raised by the plugin contract.
//!
//! All errors use `thiserror`-derived enums with structured context so
//! callers can inspect the failure programmatically. I/O errors are wrapped
//! in `Arc` to satisfy the `result_large_err` Clippy lint.

use std::sync::Arc;

use thiserror::Error;

/// Errors arising while establishing or driving a plugin connection.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The magic cookie environment variable was absent.
    #[error("magic cookie variable '{key}' is not set; the plugin must be launched by a host")]
    CookieMissing {
        /// Environment variable name that was looked up.
        key: String,
    },

    /// The magic cookie environment variable held the wrong value.
    #[error("magic cookie variable '{key}' does not match the handshake descriptor")]
    CookieMismatch {
        /// Environment variable name that was compared.
        key: String,
    },

    /// The greeting advertised a protocol version the host does not speak.
    #[error("protocol version mismatch: host speaks {expected}, plugin greeted with {actual}")]
    ProtocolVersion {
        /// Version the host's handshake descriptor carries.
        expected: u32,
        /// Version the plugin advertised.
        actual: u32,
    },

    /// The connection could not be established.
    #[error("handshake failed: {message}")]
    Handshake {
        /// Human-readable failure description.
        message: String,
    },

    /// A frame could not be serialised to JSON.
    #[error("failed to serialise protocol frame: {0}")]
    SerializeFrame(#[source] serde_json::Error),

    /// A line on the wire was not a valid protocol frame.
    ///
    /// Frame-level decode failure is terminal for the connection, unlike
    /// call-level errors which only fail the call that raised them.
    #[error("malformed protocol frame: {message}")]
    MalformedFrame {
        /// Description of the decode failure.
        message: String,
        /// Optional underlying JSON error.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The peer closed the connection while a frame was expected.
    #[error("plugin connection closed unexpectedly")]
    Disconnected,

    /// The client gave up matching response frames to a request.
    #[error("no matching response for request {id}")]
    ResponseMismatch {
        /// Frame id the client was waiting for.
        id: u64,
    },

    /// The remote side returned an error outcome for a call.
    #[error("{message}")]
    Remote {
        /// Error message produced by the remote implementation, verbatim.
        message: String,
    },

    /// A plugin name is already present in the registry.
    #[error("plugin '{name}' is already registered")]
    DuplicatePlugin {
        /// Name that was registered twice.
        name: String,
    },

    /// An I/O error occurred on the connection.
    #[error("I/O error on plugin connection: {source}")]
    Io {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl PluginError {
    /// Wraps an I/O error in the connection error variant.
    #[must_use]
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            source: Arc::new(source),
        }
    }
}

//! Server-side shim: the plugin's serve loop.
//!
//! [`serve_stdio`] is the entrypoint a plugin binary calls from `main`. It
//! validates the magic cookie in the environment, then runs [`serve`] over
//! locked stdin and stdout: one greeting line out, then one response frame
//! per request frame until the host closes the pipe.
//!
//! Call-level failures (unknown plugin name, malformed body, implementation
//! errors) travel back as error outcomes and the loop continues; a line
//! that fails to decode as a frame is a protocol violation and terminates
//! the connection.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::executer::CallContext;
use crate::handshake::{Greeting, HandshakeConfig};
use crate::protocol::{RequestFrame, ResponseFrame};
use crate::registry::PluginRegistry;

/// Tracing target for serve loop operations.
const SERVER_TARGET: &str = "odm_plugin::server";

/// Everything a plugin process needs to serve: the handshake descriptor it
/// was built against and the registry of its capabilities.
#[derive(Debug)]
pub struct ServeConfig {
    handshake: HandshakeConfig,
    registry: PluginRegistry,
}

impl ServeConfig {
    /// Creates a serve configuration.
    #[must_use]
    pub const fn new(handshake: HandshakeConfig, registry: PluginRegistry) -> Self {
        Self {
            handshake,
            registry,
        }
    }

    /// Returns the handshake descriptor.
    #[must_use]
    pub const fn handshake(&self) -> &HandshakeConfig {
        &self.handshake
    }

    /// Returns the capability registry.
    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

/// Serves plugin requests over arbitrary reader/writer halves.
///
/// Writes the version greeting, then answers request frames until EOF.
/// Exposed separately from [`serve_stdio`] so tests can drive the loop
/// over in-memory buffers.
///
/// # Errors
///
/// Returns [`PluginError::Io`] when the connection breaks,
/// [`PluginError::MalformedFrame`] when a line is not a valid request
/// frame, or [`PluginError::SerializeFrame`] when a response cannot be
/// encoded.
pub fn serve(
    config: &ServeConfig,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<(), PluginError> {
    write_frame(writer, &Greeting::for_config(config.handshake()))?;
    debug!(
        target: SERVER_TARGET,
        protocol_version = config.handshake().protocol_version(),
        "greeting written, serving requests"
    );

    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).map_err(PluginError::io)?;
        if bytes_read == 0 {
            debug!(target: SERVER_TARGET, "host closed the connection, exiting serve loop");
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let request: RequestFrame =
            serde_json::from_str(line.trim()).map_err(|source| PluginError::MalformedFrame {
                message: format!("invalid request frame: {source}"),
                source: Some(source),
            })?;

        let response = dispatch(config.registry(), &request);
        write_frame(writer, &response)?;
    }
}

/// Validates the cookie environment variable, then serves over stdio.
///
/// Blocks until the host closes the plugin's stdin. Stdout carries protocol
/// frames only; implementations must log to stderr.
///
/// # Errors
///
/// Returns a cookie error before any frame is written when the environment
/// does not match the descriptor, or any error raised by [`serve`].
pub fn serve_stdio(config: &ServeConfig) -> Result<(), PluginError> {
    config.handshake().check_cookie_env()?;

    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    serve(config, &mut reader, &mut writer)
}

/// Resolves one request frame to a response frame.
fn dispatch(registry: &PluginRegistry, request: &RequestFrame) -> ResponseFrame {
    let Some(plugin) = registry.get(request.plugin()) else {
        warn!(
            target: SERVER_TARGET,
            plugin = request.plugin(),
            id = request.id(),
            "request for unregistered plugin"
        );
        return ResponseFrame::error(
            request.id(),
            format!("plugin '{}' is not registered", request.plugin()),
        );
    };

    let ctx = CallContext::from_timeout_ms(request.timeout_ms());
    debug!(
        target: SERVER_TARGET,
        plugin = request.plugin(),
        id = request.id(),
        body_bytes = request.body().len(),
        deadline_ms = ?request.timeout_ms(),
        "dispatching execute call"
    );

    match plugin.execute(&ctx, request.body()) {
        Ok(result) => ResponseFrame::ok(request.id(), result),
        Err(error) => {
            debug!(
                target: SERVER_TARGET,
                plugin = request.plugin(),
                id = request.id(),
                error = %error,
                "execute call failed"
            );
            ResponseFrame::error(request.id(), error.to_string())
        }
    }
}

/// Writes one frame as a JSON line and flushes.
fn write_frame(writer: &mut impl Write, frame: &impl serde::Serialize) -> Result<(), PluginError> {
    let json = serde_json::to_string(frame).map_err(PluginError::SerializeFrame)?;
    writer.write_all(json.as_bytes()).map_err(PluginError::io)?;
    writer.write_all(b"\n").map_err(PluginError::io)?;
    writer.flush().map_err(PluginError::io)
}

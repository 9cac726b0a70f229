//! Client-side shim: the host's RPC stub.
//!
//! An [`RpcClient`] owns the two halves of a connected transport (in
//! practice the child's stdout and stdin). [`RpcClient::connect`] consumes
//! the plugin's greeting and validates it against the host's handshake
//! descriptor; after that, [`RpcClient::execute`] marshals one call at a
//! time and blocks until the matching response frame arrives. There are no
//! retries and no timeout of the stub's own.

use std::io::{BufRead, Write};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PluginError;
use crate::handshake::{Greeting, HandshakeConfig};
use crate::protocol::{RequestFrame, ResponseFrame};
use crate::registry::EXECUTER_PLUGIN;

/// Tracing target for client stub operations.
const CLIENT_TARGET: &str = "odm_plugin::client";

/// Maximum stale frames skipped while waiting for a matching response.
const MAX_RESPONSE_ITERATIONS: usize = 100;

/// Synchronous RPC stub for the `Execute` method.
///
/// Generic over the transport halves so tests can drive it with in-memory
/// buffers; the host crate instantiates it over the child's pipes.
#[derive(Debug)]
pub struct RpcClient<R, W> {
    reader: R,
    writer: W,
    next_id: u64,
}

impl<R: BufRead, W: Write> RpcClient<R, W> {
    /// Consumes the plugin's greeting and returns a connected stub.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Handshake`] when the plugin closes the
    /// connection before greeting, [`PluginError::MalformedFrame`] when the
    /// greeting line does not parse, or [`PluginError::ProtocolVersion`]
    /// when the advertised version differs from the descriptor's.
    pub fn connect(reader: R, writer: W, handshake: &HandshakeConfig) -> Result<Self, PluginError> {
        let mut client = Self {
            reader,
            writer,
            next_id: 0,
        };

        let line = client.read_line()?.ok_or_else(|| PluginError::Handshake {
            message: String::from("plugin closed the connection before greeting"),
        })?;
        let greeting: Greeting =
            serde_json::from_str(line.trim()).map_err(|source| PluginError::MalformedFrame {
                message: format!("invalid greeting frame: {source}"),
                source: Some(source),
            })?;
        greeting.validate(handshake)?;

        debug!(
            target: CLIENT_TARGET,
            protocol_version = greeting.protocol_version(),
            "handshake complete"
        );
        Ok(client)
    }

    /// Invokes the remote `Execute` method and blocks for its result.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Remote`] carrying the remote error verbatim,
    /// or a transport error when the connection breaks.
    pub fn execute(&mut self, body: &str) -> Result<String, PluginError> {
        self.call(RequestFrame::new(self.next_id, EXECUTER_PLUGIN, body))
    }

    /// Invokes the remote `Execute` method with a deadline the plugin can
    /// observe through its call context.
    ///
    /// # Errors
    ///
    /// Same as [`RpcClient::execute`]. The deadline is advisory: the stub
    /// itself still blocks until the plugin answers.
    pub fn execute_with_timeout(
        &mut self,
        body: &str,
        timeout: Duration,
    ) -> Result<String, PluginError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let frame =
            RequestFrame::new(self.next_id, EXECUTER_PLUGIN, body).with_timeout_ms(timeout_ms);
        self.call(frame)
    }

    /// Writes one request frame and reads until the matching response.
    fn call(&mut self, frame: RequestFrame) -> Result<String, PluginError> {
        let request_id = frame.id();
        self.next_id = self.next_id.wrapping_add(1);

        let json = serde_json::to_string(&frame).map_err(PluginError::SerializeFrame)?;
        debug!(
            target: CLIENT_TARGET,
            id = request_id,
            request_bytes = json.len(),
            "sending execute request"
        );
        self.writer
            .write_all(json.as_bytes())
            .map_err(PluginError::io)?;
        self.writer.write_all(b"\n").map_err(PluginError::io)?;
        self.writer.flush().map_err(PluginError::io)?;

        self.receive_response(request_id)?.into_result()
    }

    /// Reads response frames until one matches the request id.
    ///
    /// Stale ids are skipped with a warning; a bounded iteration count
    /// prevents blocking forever on a misbehaving peer.
    fn receive_response(&mut self, request_id: u64) -> Result<ResponseFrame, PluginError> {
        for _ in 0..MAX_RESPONSE_ITERATIONS {
            let line = self.read_line()?.ok_or(PluginError::Disconnected)?;
            let response: ResponseFrame =
                serde_json::from_str(line.trim()).map_err(|source| PluginError::MalformedFrame {
                    message: format!("invalid response frame: {source}"),
                    source: Some(source),
                })?;

            if response.id() == request_id {
                return Ok(response);
            }
            warn!(
                target: CLIENT_TARGET,
                expected = request_id,
                received = response.id(),
                "skipping response with non-matching id"
            );
        }

        warn!(
            target: CLIENT_TARGET,
            request_id,
            max_iterations = MAX_RESPONSE_ITERATIONS,
            "giving up on response after reaching maximum iterations"
        );
        Err(PluginError::ResponseMismatch { id: request_id })
    }

    /// Reads one line, returning `None` at EOF.
    fn read_line(&mut self) -> Result<Option<String>, PluginError> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).map_err(PluginError::io)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

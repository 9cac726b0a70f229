//! Wire protocol types for host-plugin communication.
//!
//! Every frame is a single JSON line. After the greeting (see
//! [`crate::handshake`]) the host writes one [`RequestFrame`] per call and
//! the plugin answers with one [`ResponseFrame`] carrying an id-matched
//! [`CallOutcome`]. The call payload itself is the [`ExecutionRequestBody`]
//! envelope, serialised to a JSON string by the caller and passed through
//! the frames opaquely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Payload a caller serialises before invoking `Execute`.
///
/// The envelope crosses the boundary as an opaque string inside the request
/// frame; the receiving implementation deserialises it again. No schema
/// validation happens beyond what deserialisation enforces.
///
/// # Example
///
/// ```
/// use odm_plugin::ExecutionRequestBody;
///
/// let body = ExecutionRequestBody::new("hi")
///     .with_arg("a", "1");
/// let json = body.to_json().expect("serialise envelope");
/// let parsed = ExecutionRequestBody::from_json(&json).expect("parse envelope");
/// assert_eq!(parsed.input(), "hi");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionRequestBody {
    args: HashMap<String, String>,
    options: HashMap<String, serde_json::Value>,
    input: String,
}

impl ExecutionRequestBody {
    /// Creates an envelope with the given input and no arguments or options.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            args: HashMap::new(),
            options: HashMap::new(),
            input: input.into(),
        }
    }

    /// Adds a named string argument.
    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Adds a named option value.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Returns the named string arguments.
    #[must_use]
    pub const fn args(&self) -> &HashMap<String, String> {
        &self.args
    }

    /// Returns the named option values.
    #[must_use]
    pub const fn options(&self) -> &HashMap<String, serde_json::Value> {
        &self.options
    }

    /// Returns the single string input.
    #[must_use]
    pub const fn input(&self) -> &str {
        self.input.as_str()
    }

    /// Serialises the envelope to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when serialisation fails,
    /// which cannot happen for well-formed envelopes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an envelope from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when `body` is not a valid
    /// JSON encoding of the envelope.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// One `Execute` call travelling host to plugin.
///
/// The `plugin` field routes the call to a registry entry by name; the
/// optional `timeout_ms` carries the caller's deadline across the boundary
/// so implementations can honour cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestFrame {
    id: u64,
    plugin: String,
    body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl RequestFrame {
    /// Creates a request frame without a deadline.
    #[must_use]
    pub fn new(id: u64, plugin: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            plugin: plugin.into(),
            body: body.into(),
            timeout_ms: None,
        }
    }

    /// Attaches a deadline in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns the frame id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the target plugin name.
    #[must_use]
    pub const fn plugin(&self) -> &str {
        self.plugin.as_str()
    }

    /// Returns the serialised call body.
    #[must_use]
    pub const fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the caller's deadline in milliseconds, when one was set.
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }
}

/// One `Execute` result travelling plugin to host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseFrame {
    id: u64,
    outcome: CallOutcome,
}

impl ResponseFrame {
    /// Creates a successful response for the given request id.
    #[must_use]
    pub fn ok(id: u64, result: impl Into<String>) -> Self {
        Self {
            id,
            outcome: CallOutcome::Ok {
                result: result.into(),
            },
        }
    }

    /// Creates an error response for the given request id.
    #[must_use]
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: CallOutcome::Error {
                message: message.into(),
            },
        }
    }

    /// Returns the id of the request this frame answers.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the call outcome.
    #[must_use]
    pub const fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    /// Resolves the frame to the caller-facing result.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Remote`] carrying the remote error message
    /// verbatim when the outcome is an error.
    pub fn into_result(self) -> Result<String, PluginError> {
        match self.outcome {
            CallOutcome::Ok { result } => Ok(result),
            CallOutcome::Error { message } => Err(PluginError::Remote { message }),
        }
    }
}

/// Result discriminator inside a [`ResponseFrame`].
///
/// The `status` tag distinguishes success from failure on the wire; a call
/// never produces a partial result alongside an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The implementation returned a result string.
    Ok {
        /// Implementation-defined result, verbatim.
        result: String,
    },
    /// The implementation or the dispatch layer raised an error.
    Error {
        /// Error message, verbatim.
        message: String,
    },
}

//! The `Executer` capability and its call context.
//!
//! [`Executer`] is the single-method interface plugin authors implement.
//! The dispatch layer hands every invocation a [`CallContext`] derived from
//! the request frame's deadline, so cancellation intent from the host side
//! reaches the implementation instead of being dropped at the boundary.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Per-call context handed to an [`Executer`] implementation.
///
/// Carries the caller's deadline, when one crossed the wire. A context
/// without a deadline never expires.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use odm_plugin::CallContext;
///
/// let ctx = CallContext::with_timeout(Duration::from_secs(5));
/// assert!(!ctx.is_expired());
/// assert!(CallContext::background().remaining().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates an unbounded context with no deadline.
    #[must_use]
    pub const fn background() -> Self {
        Self { deadline: None }
    }

    /// Creates a context that expires after the given duration.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Builds a context from an optional wire deadline in milliseconds.
    #[must_use]
    pub fn from_timeout_ms(timeout_ms: Option<u64>) -> Self {
        timeout_ms.map_or_else(Self::background, |ms| {
            Self::with_timeout(Duration::from_millis(ms))
        })
    }

    /// Returns the remaining budget, or `None` when the context is
    /// unbounded.
    ///
    /// An expired context reports a zero budget.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|budget| budget.is_zero())
    }
}

/// Errors an [`Executer`] implementation can raise.
///
/// Both variants propagate to the caller verbatim as error outcomes; a
/// failing call never produces a partial result.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The call body was not a valid JSON envelope.
    #[error("malformed request body: {source}")]
    MalformedBody {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The implementation rejected or failed the call.
    #[error("{message}")]
    Failed {
        /// Implementation-defined failure description.
        message: String,
    },
}

impl ExecuteError {
    /// Creates an implementation failure with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Capability a plugin exposes: run with this input.
///
/// `body` is expected to be a JSON-encoded
/// [`ExecutionRequestBody`](crate::ExecutionRequestBody); implementations
/// typically parse it with
/// [`ExecutionRequestBody::from_json`](crate::ExecutionRequestBody::from_json)
/// and let the `?` operator surface malformed input.
///
/// # Example
///
/// ```
/// use odm_plugin::{CallContext, ExecuteError, Executer, ExecutionRequestBody};
///
/// struct Upcase;
///
/// impl Executer for Upcase {
///     fn execute(&self, _ctx: &CallContext, body: &str) -> Result<String, ExecuteError> {
///         let envelope = ExecutionRequestBody::from_json(body)?;
///         Ok(envelope.input().to_uppercase())
///     }
/// }
/// ```
pub trait Executer {
    /// Runs the capability against a serialised envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::MalformedBody`] when the body fails to
    /// deserialise, or [`ExecuteError::Failed`] for implementation-defined
    /// failures. Either way the caller receives the message verbatim.
    fn execute(&self, ctx: &CallContext, body: &str) -> Result<String, ExecuteError>;
}

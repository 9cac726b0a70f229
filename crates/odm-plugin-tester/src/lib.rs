//! Reference executer plugin.
//!
//! The tester plugin implements the `odm-plugin` contract end to end: it
//! registers a [`TesterExecuter`] under the `"executer"` capability name,
//! deserialises each call's [`ExecutionRequestBody`], logs it, and answers
//! `"Success"`. Hosts use it to verify their integration; this workspace
//! uses it as the real binary behind the end-to-end tests.

pub mod telemetry;

#[cfg(test)]
mod tests;

use odm_plugin::{CallContext, ExecuteError, Executer, ExecutionRequestBody};

/// Tracing target for tester plugin execution.
const TESTER_TARGET: &str = "odm_plugin_tester";

/// Reference [`Executer`] implementation.
///
/// Accepts any well-formed envelope and returns `"Success"`. A malformed
/// body or an already-expired call deadline fails the call; nothing is
/// retained across calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct TesterExecuter;

impl Executer for TesterExecuter {
    fn execute(&self, ctx: &CallContext, body: &str) -> Result<String, ExecuteError> {
        if ctx.is_expired() {
            return Err(ExecuteError::failed(
                "call deadline expired before execution",
            ));
        }

        let envelope = ExecutionRequestBody::from_json(body)?;
        tracing::info!(
            target: TESTER_TARGET,
            args = ?envelope.args(),
            options = ?envelope.options(),
            input = %envelope.input(),
            "execute called"
        );
        Ok(String::from("Success"))
    }
}

//! Cross-process plugin contract for ODM executer plugins.
//!
//! The `odm-plugin` crate defines the contract a host process and a
//! separately compiled plugin binary use to talk to each other: a
//! magic-cookie [`HandshakeConfig`], a JSON [`ExecutionRequestBody`]
//! envelope, the single-method [`Executer`] capability, and the RPC shim
//! pair that carries `Execute` calls across the process boundary.
//!
//! The transport is deliberately thin: newline-delimited JSON frames over
//! the plugin's stdin and stdout. The host passes the magic cookie through
//! the child's environment, the plugin answers with a one-line version
//! greeting, and every call after that is one request frame down and one
//! response frame back. Each call is independent; no state crosses calls.
//!
//! # Architecture
//!
//! A plugin binary builds a [`PluginRegistry`] mapping the capability name
//! `"executer"` to its [`Executer`] implementation and hands it to
//! [`serve_stdio`]. The host spawns the binary and drives an
//! [`RpcClient`] over the child's pipes (see the `odm-plugin-host` crate).
//!
//! # Example
//!
//! ```rust,no_run
//! use odm_plugin::{
//!     CallContext, ExecuteError, Executer, HandshakeConfig, PluginRegistry,
//!     ServeConfig, EXECUTER_PLUGIN,
//! };
//!
//! struct EchoExecuter;
//!
//! impl Executer for EchoExecuter {
//!     fn execute(&self, _ctx: &CallContext, body: &str) -> Result<String, ExecuteError> {
//!         Ok(body.to_owned())
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(EXECUTER_PLUGIN, EchoExecuter).expect("registration succeeds");
//! let config = ServeConfig::new(HandshakeConfig::default(), registry);
//! // odm_plugin::serve_stdio(&config) would block serving the host.
//! ```

pub mod client;
pub mod error;
pub mod executer;
pub mod handshake;
pub mod protocol;
pub mod registry;
pub mod server;

#[cfg(test)]
mod tests;

pub use self::client::RpcClient;
pub use self::error::PluginError;
pub use self::executer::{CallContext, ExecuteError, Executer};
pub use self::handshake::{Greeting, HandshakeConfig, PROTOCOL_VERSION};
pub use self::protocol::{CallOutcome, ExecutionRequestBody, RequestFrame, ResponseFrame};
pub use self::registry::{EXECUTER_PLUGIN, PluginRegistry};
pub use self::server::{ServeConfig, serve, serve_stdio};

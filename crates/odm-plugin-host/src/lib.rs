//! Host side of the ODM executer plugin contract.
//!
//! The `odm-plugin-host` crate launches a plugin executable as a child
//! process and drives the `odm-plugin` contract over its pipes: the magic
//! cookie goes into the child's environment, the version greeting is
//! validated, and every `Execute` call is one request frame down the
//! child's stdin and one response frame back up its stdout. Plugin stderr
//! is drained to structured logging on a background thread.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use odm_plugin_host::PluginHost;
//!
//! # fn main() -> Result<(), odm_plugin_host::HostError> {
//! let host = PluginHost::new(PathBuf::from("/usr/local/bin/tester-plugin"));
//! let mut handle = host.launch()?;
//! let result = handle.execute(r#"{"args":{},"options":{},"input":"hi"}"#)?;
//! handle.shutdown()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod host;

#[cfg(test)]
mod tests;

pub use self::error::HostError;
pub use self::host::{PluginHandle, PluginHost};

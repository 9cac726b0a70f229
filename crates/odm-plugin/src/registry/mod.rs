//! Plugin registry mapping capability names to implementations.
//!
//! The [`PluginRegistry`] is built once at process start and handed to the
//! serve loop; it is never mutated afterwards. Duplicate registrations for
//! the same name are rejected.

use std::collections::HashMap;

use crate::error::PluginError;
use crate::executer::Executer;

/// The only capability name the reference host and plugin register.
pub const EXECUTER_PLUGIN: &str = "executer";

/// Registry of named [`Executer`] implementations.
///
/// # Example
///
/// ```
/// use odm_plugin::{CallContext, ExecuteError, Executer, PluginRegistry, EXECUTER_PLUGIN};
///
/// struct Noop;
/// impl Executer for Noop {
///     fn execute(&self, _ctx: &CallContext, _body: &str) -> Result<String, ExecuteError> {
///         Ok(String::new())
///     }
/// }
///
/// let mut registry = PluginRegistry::new();
/// registry.register(EXECUTER_PLUGIN, Noop).expect("registration succeeds");
/// assert!(registry.get(EXECUTER_PLUGIN).is_some());
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Box<dyn Executer>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an implementation under the given capability name.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::DuplicatePlugin`] when the name is already
    /// taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        plugin: impl Executer + 'static,
    ) -> Result<(), PluginError> {
        let name = name.into();
        if self.plugins.contains_key(&name) {
            return Err(PluginError::DuplicatePlugin { name });
        }
        self.plugins.insert(name, Box::new(plugin));
        Ok(())
    }

    /// Looks up an implementation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Executer> {
        self.plugins.get(name).map(Box::as_ref)
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` when no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PluginRegistry")
            .field("plugins", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests;

//! Unit tests for the plugin registry.

use rstest::{fixture, rstest};

use super::*;
use crate::executer::{CallContext, ExecuteError};

struct ConstantExecuter {
    result: &'static str,
}

impl Executer for ConstantExecuter {
    fn execute(&self, _ctx: &CallContext, _body: &str) -> Result<String, ExecuteError> {
        Ok(self.result.to_owned())
    }
}

#[fixture]
fn populated_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry
        .register(EXECUTER_PLUGIN, ConstantExecuter { result: "Success" })
        .expect("register executer");
    registry
}

#[test]
fn new_registry_is_empty() {
    let registry = PluginRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[rstest]
fn register_and_get(populated_registry: PluginRegistry) {
    assert_eq!(populated_registry.len(), 1);
    let plugin = populated_registry
        .get(EXECUTER_PLUGIN)
        .expect("get executer");
    let result = plugin
        .execute(&CallContext::background(), "{}")
        .expect("execute");
    assert_eq!(result, "Success");
}

#[rstest]
fn register_rejects_duplicate(mut populated_registry: PluginRegistry) {
    let err = populated_registry
        .register(EXECUTER_PLUGIN, ConstantExecuter { result: "again" })
        .expect_err("duplicate should fail");
    assert!(matches!(err, PluginError::DuplicatePlugin { .. }));
    assert!(err.to_string().contains("already registered"));
}

#[rstest]
fn get_returns_none_for_missing(populated_registry: PluginRegistry) {
    assert!(populated_registry.get("nonexistent").is_none());
}

#[rstest]
fn debug_lists_registered_names(populated_registry: PluginRegistry) {
    let rendered = format!("{populated_registry:?}");
    assert!(
        rendered.contains(EXECUTER_PLUGIN),
        "expected name in debug output: {rendered}"
    );
}

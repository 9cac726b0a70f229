//! Binary entrypoint for the tester executer plugin.

use std::io::Write;
use std::process::ExitCode;

use odm_plugin::{EXECUTER_PLUGIN, HandshakeConfig, PluginRegistry, ServeConfig};
use odm_plugin_tester::{TesterExecuter, telemetry};

fn main() -> ExitCode {
    if let Err(error) = telemetry::initialise() {
        writeln!(std::io::stderr().lock(), "{error}").ok();
        return ExitCode::FAILURE;
    }

    let mut registry = PluginRegistry::new();
    if let Err(error) = registry.register(EXECUTER_PLUGIN, TesterExecuter) {
        tracing::error!(error = %error, "failed to build plugin registry");
        return ExitCode::FAILURE;
    }

    let config = ServeConfig::new(HandshakeConfig::default(), registry);
    tracing::info!("tester plugin serving");
    match odm_plugin::serve_stdio(&config) {
        Ok(()) => {
            tracing::info!("host closed the connection, exiting");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(error = %error, "serve loop failed");
            ExitCode::FAILURE
        }
    }
}

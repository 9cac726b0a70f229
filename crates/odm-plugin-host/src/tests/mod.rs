//! Unit tests for the plugin host.
//!
//! Script-based tests stand in for real plugin binaries: each test writes a
//! small shell script that speaks (or deliberately violates) the wire
//! contract. The full round-trip against a real compiled plugin lives in
//! the `odm-plugin-tester` crate's integration tests.

use std::path::PathBuf;

use rstest::rstest;

use odm_plugin::{HandshakeConfig, PluginError};

use crate::error::HostError;
use crate::host::PluginHost;

#[test]
fn host_builder_keeps_configuration() {
    let host = PluginHost::new(PathBuf::from("/usr/local/bin/plugin"))
        .with_args(vec!["--quiet".into()])
        .with_handshake(HandshakeConfig::new(1, "magic", "cookie"));
    assert_eq!(host.executable(), PathBuf::from("/usr/local/bin/plugin"));
    assert_eq!(host.args(), ["--quiet"]);
    assert_eq!(host.handshake().protocol_version(), 1);
}

#[test]
fn launch_reports_missing_executable() {
    let host = PluginHost::new(PathBuf::from("/nonexistent/plugin-binary"));
    let err = host.launch().expect_err("missing binary should fail");
    assert!(matches!(err, HostError::BinaryNotFound { .. }));
}

#[cfg(unix)]
mod scripted {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    /// A well-behaved scripted plugin: enforces the cookie, greets with the
    /// advertised version, answers the first call, then drains stdin so the
    /// host can shut it down.
    const WELL_BEHAVED: &str = concat!(
        "#!/bin/sh\n",
        "[ \"$magic\" = \"cookie\" ] || exit 1\n",
        "printf '{\"protocol_version\":1}\\n'\n",
        "IFS= read -r line || exit 0\n",
        "printf '{\"id\":0,\"outcome\":{\"status\":\"ok\",\"result\":\"pong\"}}\\n'\n",
        "cat >/dev/null\n",
    );

    const WRONG_VERSION: &str = concat!(
        "#!/bin/sh\n",
        "printf '{\"protocol_version\":2}\\n'\n",
        "cat >/dev/null\n",
    );

    const SILENT_EXIT: &str = "#!/bin/sh\nexit 1\n";

    /// Materialises a scripted plugin and returns its path with the
    /// directory guard keeping it alive.
    fn scripted_plugin(script: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create scratch directory");
        let path = dir.path().join("plugin.sh");
        std::fs::write(&path, script).expect("write plugin script");
        let mut permissions = std::fs::metadata(&path)
            .expect("read script metadata")
            .permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("mark script executable");
        (dir, path)
    }

    #[test]
    fn launch_execute_shutdown_round_trip() {
        let (_guard, path) = scripted_plugin(WELL_BEHAVED);
        let mut handle = PluginHost::new(path).launch().expect("launch");
        let result = handle.execute("ping").expect("execute");
        assert_eq!(result, "pong");
        handle.shutdown().expect("shutdown");
    }

    #[test]
    fn launch_rejects_wrong_protocol_version() {
        let (_guard, path) = scripted_plugin(WRONG_VERSION);
        let err = PluginHost::new(path)
            .launch()
            .expect_err("version mismatch should fail");
        assert!(matches!(
            err,
            HostError::Rpc(PluginError::ProtocolVersion {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn launch_fails_when_plugin_exits_before_greeting() {
        let (_guard, path) = scripted_plugin(SILENT_EXIT);
        let err = PluginHost::new(path)
            .launch()
            .expect_err("silent exit should fail");
        assert!(matches!(err, HostError::Rpc(PluginError::Handshake { .. })));
    }

    #[rstest]
    #[case::wrong_value("biscuit")]
    #[case::empty("")]
    fn mismatched_cookie_prevents_any_call(#[case] cookie: &str) {
        let (_guard, path) = scripted_plugin(WELL_BEHAVED);
        let host = PluginHost::new(path)
            .with_handshake(HandshakeConfig::new(1, "magic", cookie));
        let err = host.launch().expect_err("cookie mismatch should fail");
        // The scripted plugin refuses to greet, so the host never gets to
        // dispatch an Execute call.
        assert!(matches!(err, HostError::Rpc(PluginError::Handshake { .. })));
    }

    #[test]
    fn dropping_a_handle_kills_the_child() {
        let (_guard, path) = scripted_plugin(WELL_BEHAVED);
        let handle = PluginHost::new(path).launch().expect("launch");
        // No shutdown: dropping the handle must not hang the test.
        drop(handle);
    }
}

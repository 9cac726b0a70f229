//! Crate-level integration and BDD tests.
//!
//! The transcript tests drive both shims against each other without
//! threads: the serve loop runs over scripted request frames, and its
//! captured output becomes the scripted connection a client stub reads.

use std::io::Cursor;

use crate::client::RpcClient;
use crate::error::PluginError;
use crate::executer::{CallContext, ExecuteError, Executer};
use crate::handshake::HandshakeConfig;
use crate::protocol::{ExecutionRequestBody, RequestFrame};
use crate::registry::{EXECUTER_PLUGIN, PluginRegistry};
use crate::server::{ServeConfig, serve};


/// Reference implementation: parses the envelope and reports success.
struct ReferenceExecuter;

impl Executer for ReferenceExecuter {
    fn execute(&self, _ctx: &CallContext, body: &str) -> Result<String, ExecuteError> {
        let _envelope = ExecutionRequestBody::from_json(body)?;
        Ok(String::from("Success"))
    }
}

fn reference_config() -> ServeConfig {
    let mut registry = PluginRegistry::new();
    registry
        .register(EXECUTER_PLUGIN, ReferenceExecuter)
        .expect("register reference executer");
    ServeConfig::new(HandshakeConfig::default(), registry)
}

/// Runs the serve loop over the given request bodies and returns the raw
/// transcript the plugin side produced.
fn serve_transcript(bodies: &[&str]) -> Vec<u8> {
    let mut input = String::new();
    for (id, body) in bodies.iter().enumerate() {
        let frame = RequestFrame::new(id as u64, EXECUTER_PLUGIN, *body);
        input.push_str(&serde_json::to_string(&frame).expect("serialise request"));
        input.push('\n');
    }

    let config = reference_config();
    let mut reader = Cursor::new(input.into_bytes());
    let mut output = Vec::new();
    serve(&config, &mut reader, &mut output).expect("serve transcript");
    output
}

#[test]
fn client_and_server_agree_on_the_reference_exchange() {
    let body = r#"{"args":{"a":"1"},"options":{},"input":"hi"}"#;
    let transcript = serve_transcript(&[body]);

    let mut client = RpcClient::connect(
        Cursor::new(transcript),
        Vec::new(),
        &HandshakeConfig::default(),
    )
    .expect("handshake against serve output");

    let result = client.execute(body).expect("execute");
    assert_eq!(result, "Success");
}

#[test]
fn malformed_body_crosses_the_wire_as_an_error() {
    let transcript = serve_transcript(&["not json"]);

    let mut client = RpcClient::connect(
        Cursor::new(transcript),
        Vec::new(),
        &HandshakeConfig::default(),
    )
    .expect("handshake against serve output");

    let err = client.execute("not json").expect_err("malformed body");
    assert!(matches!(err, PluginError::Remote { .. }));
    assert!(
        err.to_string().contains("malformed request body"),
        "unexpected message: {err}"
    );
}

#[test]
fn sequential_exchanges_do_not_leak_state() {
    let first = ExecutionRequestBody::new("one")
        .to_json()
        .expect("serialise first body");
    let second = ExecutionRequestBody::new("two")
        .with_arg("k", "v")
        .to_json()
        .expect("serialise second body");
    let transcript = serve_transcript(&[first.as_str(), second.as_str()]);

    let mut client = RpcClient::connect(
        Cursor::new(transcript),
        Vec::new(),
        &HandshakeConfig::default(),
    )
    .expect("handshake against serve output");

    assert_eq!(client.execute(&first).expect("first call"), "Success");
    assert_eq!(client.execute(&second).expect("second call"), "Success");
}

#[test]
fn host_with_different_version_rejects_the_serve_greeting() {
    let transcript = serve_transcript(&[]);
    let strict_host = HandshakeConfig::new(2, "magic", "cookie");
    let err = RpcClient::connect(Cursor::new(transcript), Vec::new(), &strict_host)
        .expect_err("version mismatch");
    assert!(matches!(err, PluginError::ProtocolVersion { .. }));
}

//! Unit tests for the tester executer.

use std::time::Duration;

use rstest::rstest;

use odm_plugin::{CallContext, ExecuteError, Executer, ExecutionRequestBody};

use crate::TesterExecuter;

#[test]
fn reference_body_returns_success() {
    let result = TesterExecuter
        .execute(
            &CallContext::background(),
            r#"{"args":{"a":"1"},"options":{},"input":"hi"}"#,
        )
        .expect("execute reference body");
    assert_eq!(result, "Success");
}

#[test]
fn built_envelope_returns_success() {
    let body = ExecutionRequestBody::new("payload")
        .with_arg("mode", "fast")
        .with_option("retries", serde_json::Value::from(3))
        .to_json()
        .expect("serialise envelope");
    let result = TesterExecuter
        .execute(&CallContext::background(), &body)
        .expect("execute built envelope");
    assert_eq!(result, "Success");
}

#[rstest]
#[case::not_json("definitely not json")]
#[case::wrong_shape(r#"{"args":[1,2,3]}"#)]
#[case::empty("")]
fn malformed_body_fails_without_a_result(#[case] body: &str) {
    let err = TesterExecuter
        .execute(&CallContext::background(), body)
        .expect_err("malformed body should fail");
    assert!(matches!(err, ExecuteError::MalformedBody { .. }));
}

#[test]
fn expired_deadline_fails_the_call() {
    let ctx = CallContext::with_timeout(Duration::ZERO);
    let err = TesterExecuter
        .execute(&ctx, r#"{"args":{},"options":{},"input":"hi"}"#)
        .expect_err("expired deadline should fail");
    assert!(
        err.to_string().contains("deadline"),
        "unexpected message: {err}"
    );
}

#[test]
fn calls_are_stateless() {
    let first = TesterExecuter
        .execute(
            &CallContext::background(),
            r#"{"args":{"a":"1"},"options":{},"input":"first"}"#,
        )
        .expect("first call");
    let second = TesterExecuter
        .execute(
            &CallContext::background(),
            r#"{"args":{},"options":{},"input":"second"}"#,
        )
        .expect("second call");
    assert_eq!(first, second);
}

//! HTTP surface integration tests
//!
//! Each test binds the server to an ephemeral local port and talks to it
//! over real HTTP with reqwest.

use kube_dispatch::agent::DispatchClient;
use kube_dispatch::core::config::DispatchConfig;
use kube_dispatch::core::error::DispatchError;
use kube_dispatch::dispatch::{Dispatcher, ExecutionResult};
use kube_dispatch::llm::TranslatedInstruction;
use kube_dispatch::server::{self, ErrorBody};
use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_server(tool: &[&str], timeout_ms: u64) -> String {
    let dispatcher = Dispatcher::new(&DispatchConfig {
        tool: tool.iter().map(|a| a.to_string()).collect(),
        command_timeout_ms: timeout_ms,
        ..DispatchConfig::default()
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server::serve(listener, dispatcher).await;
    });
    format!("http://{}", addr)
}

async fn post_execute(
    base: &str,
    session_id: Option<&str>,
    body: serde_json::Value,
) -> reqwest::Response {
    let mut request = reqwest::Client::new().post(format!("{}/mcp/execute", base));
    if let Some(session_id) = session_id {
        request = request.query(&[("session_id", session_id)]);
    }
    request.json(&body).send().await.unwrap()
}

async fn expect_error(response: reqwest::Response, status: StatusCode, code: &str) -> ErrorBody {
    assert_eq!(response.status(), status);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, code);
    body
}

#[tokio::test]
async fn liveness_endpoint_responds() {
    let base = spawn_server(&["echo"], 5_000).await;
    let body: serde_json::Value = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"message": "K8s MCP Server is running"}));
}

#[tokio::test]
async fn execute_success_shape() {
    let base = spawn_server(&["echo"], 5_000).await;
    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "get_pod", "params": {"pod_name": "nginx-1"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result: ExecutionResult = response.json().await.unwrap();
    assert_eq!(
        result,
        ExecutionResult {
            session_id: "s1".into(),
            command: "kubectl get pod nginx-1 -n default".into(),
            output: "get pod nginx-1 -n default".into(),
        }
    );
}

#[tokio::test]
async fn params_may_be_omitted_or_null() {
    let base = spawn_server(&["echo"], 5_000).await;

    for body in [
        json!({"instruction": "get_pod"}),
        json!({"instruction": "get_pod", "params": null}),
    ] {
        let response = post_execute(&base, Some("s1"), body).await;
        let err = expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
        assert!(
            err.detail.contains("missing required parameter(s): pod_name"),
            "request should reach the registry with no params, got: {}",
            err.detail
        );
    }

    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "k8s_resource_status", "params": null}),
    )
    .await;
    let err = expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
    assert!(err.detail.contains("resource_type"));
}

#[tokio::test]
async fn session_id_echoed_as_sent() {
    let base = spawn_server(&["echo"], 5_000).await;
    let response = post_execute(
        &base,
        Some(" s1 "),
        json!({"instruction": "get_pod", "params": {"pod_name": "nginx-1"}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let result: ExecutionResult = response.json().await.unwrap();
    assert_eq!(result.session_id, " s1 ");
}

#[tokio::test]
async fn unparseable_query_returns_error_body() {
    let base = spawn_server(&["echo"], 5_000).await;
    let response = reqwest::Client::new()
        .post(format!("{}/mcp/execute", base))
        .query(&[("session_id", "a"), ("session_id", "b")])
        .json(&json!({"instruction": "get_pod", "params": {"pod_name": "web"}}))
        .send()
        .await
        .unwrap();

    let err = expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
    assert!(err.detail.contains("session_id"));
}

#[tokio::test]
async fn missing_session_rejected_before_anything_else() {
    let base = spawn_server(&["echo"], 5_000).await;

    let response = post_execute(&base, None, json!({"instruction": "restart_pod"})).await;
    expect_error(response, StatusCode::BAD_REQUEST, "missing_session").await;

    let response = post_execute(&base, Some(""), json!({"instruction": "get_pod"})).await;
    expect_error(response, StatusCode::BAD_REQUEST, "missing_session").await;

    let response = post_execute(&base, None, json!("not an object")).await;
    expect_error(response, StatusCode::BAD_REQUEST, "missing_session").await;
}

#[tokio::test]
async fn unknown_instruction_rejected() {
    let base = spawn_server(&["echo"], 5_000).await;
    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "restart_pod", "params": {}}),
    )
    .await;
    let body = expect_error(response, StatusCode::BAD_REQUEST, "unknown_instruction").await;
    assert!(body.detail.contains("restart_pod"));
}

#[tokio::test]
async fn invalid_parameters_rejected() {
    let base = spawn_server(&["echo"], 5_000).await;

    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "describe_pod", "params": {}}),
    )
    .await;
    let body = expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
    assert!(body.detail.contains("pod_name"));

    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "get_pod", "params": {"pod_name": "web", "force": "true"}}),
    )
    .await;
    let body = expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
    assert!(body.detail.contains("force"));

    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "get_pod", "params": {"pod_name": 7}}),
    )
    .await;
    expect_error(response, StatusCode::BAD_REQUEST, "invalid_parameters").await;
}

#[tokio::test]
async fn command_failure_is_server_error_with_stderr() {
    let base = spawn_server(&["sh", "-c", "echo 'connection refused' >&2; exit 1"], 5_000).await;
    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "get_pod", "params": {"pod_name": "web"}}),
    )
    .await;
    let body = expect_error(response, StatusCode::INTERNAL_SERVER_ERROR, "command_failed").await;
    assert_eq!(body.detail, "connection refused");
}

#[tokio::test]
async fn timeout_is_gateway_timeout() {
    let base = spawn_server(&["sh", "-c", "sleep 10"], 200).await;
    let response = post_execute(
        &base,
        Some("s1"),
        json!({"instruction": "get_pod", "params": {"pod_name": "web"}}),
    )
    .await;
    expect_error(response, StatusCode::GATEWAY_TIMEOUT, "command_timeout").await;
}

#[tokio::test]
async fn dispatch_client_round_trip() {
    let base = spawn_server(&["echo"], 5_000).await;
    let client = DispatchClient::new(&base, "vscode-session");

    let instruction = TranslatedInstruction {
        instruction: "get_pod_logs".into(),
        params: [
            ("pod_name".to_string(), "nginx-1".to_string()),
            ("container".to_string(), "app".to_string()),
        ]
        .into_iter()
        .collect(),
    };
    let result = client.execute(&instruction).await.unwrap();
    assert_eq!(result.session_id, "vscode-session");
    assert_eq!(result.command, "kubectl logs nginx-1 -n default -c app");

    let unknown = TranslatedInstruction {
        instruction: "restart_pod".into(),
        params: Default::default(),
    };
    match client.execute(&unknown).await.unwrap_err() {
        DispatchError::DispatchRejected { code, .. } => assert_eq!(code, "unknown_instruction"),
        other => panic!("expected DispatchRejected, got {:?}", other),
    }
}

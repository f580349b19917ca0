//! GenAI client tests against an in-process mock inference server.

use axum::extract::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use docflow_client::{parse_analysis_result, ClientError, GenAiClient};
use docflow_core::GenAiConfig;
use serde_json::{json, Value};

/// Serve a router on an ephemeral port and return its base URL.
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client_for(base: &str, api_key: Option<&str>) -> GenAiClient {
    GenAiClient::new(GenAiConfig {
        api_url: Some(format!("{base}/infer")),
        api_key: api_key.map(str::to_string),
        model: "test-model".to_string(),
        timeout_secs: 5,
    })
}

#[tokio::test]
async fn returns_structured_payload_on_success() {
    let app = Router::new().route(
        "/infer",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["model"], "test-model");
            assert_eq!(body["prompt"], "prompt");
            assert_eq!(body["input"], "input");
            Json(json!({"result": {"amount": 10}}))
        }),
    );
    let base = serve(app).await;

    let response = client_for(&base, None)
        .analyze("prompt", "input")
        .await
        .expect("inference call");
    assert_eq!(response.body, json!({"result": {"amount": 10}}));
    assert!(response.raw_text.contains("amount"));
}

#[tokio::test]
async fn sends_bearer_credential_when_configured() {
    let app = Router::new().route(
        "/infer",
        post(|headers: HeaderMap| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if auth == "Bearer secret-key" {
                Json(json!({"result": {}})).into_response()
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({"error": "no auth"}))).into_response()
            }
        }),
    );
    let base = serve(app).await;

    client_for(&base, Some("secret-key"))
        .analyze("p", "i")
        .await
        .expect("authorized call");
}

#[tokio::test]
async fn non_2xx_surfaces_upstream_error_detail() {
    let app = Router::new().route(
        "/infer",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "boom"})),
            )
        }),
    );
    let base = serve(app).await;

    let err = client_for(&base, None).analyze("p", "i").await.unwrap_err();
    match &err {
        ClientError::Api {
            status,
            message,
            detail,
            ..
        } => {
            assert_eq!(*status, 500);
            assert!(message.contains("boom"), "message: {message}");
            assert_eq!(detail["error"], "boom");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn malformed_response_body_does_not_fail_the_call() {
    let app = Router::new().route("/infer", post(|| async { "this is not json" }));
    let base = serve(app).await;

    let response = client_for(&base, None)
        .analyze("p", "i")
        .await
        .expect("call succeeds despite body");
    assert_eq!(response.body["raw"], "this is not json");
    // Parsing degrades to an empty field set, not an error.
    let fields = parse_analysis_result(&response.body);
    assert_eq!(fields.amount, None);
    assert_eq!(fields.vendor, None);
}

use std::sync::{Arc, Mutex};

use axum::body::{Body, to_bytes};
use axum::http::Request;
use tower::ServiceExt;

use super::*;
use crate::llm::LlmChat;
use crate::llm::types::{ChatResponse, LlmError, Message};
use crate::state::test_helpers;

// =========================================================================
// helpers
// =========================================================================

struct StubLlm {
    reply: String,
    calls: Mutex<usize>,
}

#[async_trait::async_trait]
impl LlmChat for StubLlm {
    async fn chat(&self, _max_tokens: u32, _system: &str, _messages: &[Message]) -> Result<ChatResponse, LlmError> {
        *self.calls.lock().unwrap() += 1;
        Ok(ChatResponse {
            text: self.reply.clone(),
            model: "stub".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 1,
            output_tokens: 1,
        })
    }

    fn model(&self) -> &str {
        "stub"
    }
}

fn stub(reply: &str) -> Arc<StubLlm> {
    Arc::new(StubLlm { reply: reply.into(), calls: Mutex::new(0) })
}

fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn open_session(router: &Router) -> String {
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

// =========================================================================
// status mapping
// =========================================================================

#[test]
fn error_status_mapping() {
    let missing = TroubleshootError::MissingCredential { var: "K".into() };
    assert_eq!(troubleshoot_error_to_status(&missing), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(troubleshoot_error_to_status(&TroubleshootError::EmptyInput), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        troubleshoot_error_to_status(&TroubleshootError::Service(LlmError::EmptyCompletion)),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(troubleshoot_error_to_status(&TroubleshootError::Busy), StatusCode::CONFLICT);
}

// =========================================================================
// routes
// =========================================================================

#[tokio::test]
async fn healthz_ok() {
    let router = app(test_helpers::test_app_state());
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_sets_http_only_session_cookie() {
    let router = app(test_helpers::test_app_state());
    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let raw = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(raw.starts_with(SESSION_COOKIE));
    assert!(raw.contains("HttpOnly"));
    assert!(body_text(response).await.contains("Maintenance Troubleshooter"));
}

#[tokio::test]
async fn troubleshoot_then_download_then_reset() {
    let llm = stub("A) ... H) ...");
    let router = app(test_helpers::test_app_state_with_llm(llm.clone()));
    let cookie = open_session(&router).await;

    let response = router
        .clone()
        .oneshot(post_form(
            "/troubleshoot",
            &cookie,
            "form_id=0&machine_model=&alarm_code=&problem_text=Motor+trips+overload+after+15+minutes+on+a+pump.+480V+3-phase.",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("A) ... H) ..."));
    assert!(html.contains("Motor trips overload after 15 minutes on a pump. 480V 3-phase."));
    assert_eq!(*llm.calls.lock().unwrap(), 1);

    let response = router.clone().oneshot(get("/download", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"maintenance_troubleshooting_plan.txt\""
    );
    assert_eq!(body_text(response).await, "A) ... H) ...");

    let response = router
        .clone()
        .oneshot(post_form("/reset", &cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let response = router.clone().oneshot(get("/download", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(router.oneshot(get("/", &cookie)).await.unwrap()).await;
    assert!(html.contains("name=\"form_id\" value=\"1\""));
    assert!(!html.contains("A) ... H) ..."));
}

#[tokio::test]
async fn blank_submit_does_not_dispatch() {
    let llm = stub("unused");
    let router = app(test_helpers::test_app_state_with_llm(llm.clone()));
    let cookie = open_session(&router).await;

    let response = router
        .oneshot(post_form("/troubleshoot", &cookie, "form_id=0&machine_model=+&alarm_code=&problem_text=%0A"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*llm.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn missing_credential_renders_error_page() {
    let router = app(test_helpers::test_app_state());
    let cookie = open_session(&router).await;

    let response = router
        .oneshot(post_form("/troubleshoot", &cookie, "form_id=0&machine_model=Haas+VF2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let html = body_text(response).await;
    assert!(html.contains("E_MISSING_CREDENTIAL"));
    assert!(html.contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn download_without_result_is_not_found() {
    let router = app(test_helpers::test_app_state());
    let cookie = open_session(&router).await;
    let response = router.oneshot(get("/download", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

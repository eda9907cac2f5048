//! Protocol tests for the export lifecycle against a mocked Marketo API
//!
//! Covers the create/enqueue/poll/download sequencing, the failure semantics
//! of each stage, and the request-body contract, without hitting the real
//! platform.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use marketo_bulk_extractor::client::auth::Session;
use marketo_bulk_extractor::client::ClientError;
use marketo_bulk_extractor::export::{ExportError, ExportExecutor};
use marketo_bulk_extractor::{DateRange, ExportRequest};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const EXPORT_ID: &str = "ce45a7a1-f19d-4ce2-882c-a3c795940a7d";

/// Responds with a scripted sequence of job statuses, one per poll.
struct StatusSequence {
    statuses: Vec<&'static str>,
    calls: AtomicUsize,
}

impl StatusSequence {
    fn new(statuses: Vec<&'static str>) -> Self {
        Self {
            statuses,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses[call.min(self.statuses.len() - 1)];
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"status": status}]
        }))
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/identity/oauth/token"))
        .and(query_param("grant_type", "client_credentials"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "test-token"})),
        )
        .mount(server)
        .await;
}

async fn test_session(server: &MockServer) -> Session {
    mount_token(server).await;
    Session::establish(&server.uri(), "client-id", "client-secret")
        .await
        .expect("authentication against the mock server should succeed")
}

fn fast_executor() -> ExportExecutor {
    ExportExecutor::new()
        .with_poll_interval(Duration::from_millis(5))
        .with_poll_timeout(Duration::from_secs(5))
}

fn january() -> DateRange {
    DateRange::from_ymd(2024, 1, 1, 2024, 1, 31).unwrap()
}

fn leads_request() -> ExportRequest {
    ExportRequest::leads(
        Some(january()),
        None,
        vec!["id".to_string(), "email".to_string()],
    )
}

#[tokio::test]
async fn test_leads_full_lifecycle() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    // The end-to-end request-body contract for tenant "acme"-style runs:
    // format CSV, ordered fields, createdAt filter only.
    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .and(query_param("access_token", "test-token"))
        .and(body_json(json!({
            "format": "CSV",
            "fields": ["id", "email"],
            "filter": {
                "createdAt": {"startAt": "2024-01-01", "endAt": "2024-01-31"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .and(query_param("access_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    // Scripted Queued -> Processing -> Completed: exactly 3 polls expected.
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(StatusSequence::new(vec![
            "Queued",
            "Processing",
            "Completed",
        ]))
        .expect(3)
        .mount(&server)
        .await;

    let csv = "id,email\n1,someone@example.com\n";
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .and(query_param("access_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(csv))
        .expect(1)
        .mount(&server)
        .await;

    let data = fast_executor()
        .execute(&session, &leads_request())
        .await
        .expect("lifecycle should complete");

    assert_eq!(data.as_ref(), csv.as_bytes());
}

#[tokio::test]
async fn test_activities_request_body_carries_type_ids() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/activities/export/create.json"))
        .and(body_json(json!({
            "format": "CSV",
            "filter": {
                "createdAt": {"startAt": "2024-01-01", "endAt": "2024-01-31"},
                "activityTypeIds": ["1", "12"]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/bulk/v1/activities/export/{EXPORT_ID}/enqueue.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/bulk/v1/activities/export/{EXPORT_ID}/status.json"
        )))
        .respond_with(StatusSequence::new(vec!["Completed"]))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/bulk/v1/activities/export/{EXPORT_ID}/file.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string("marketoGUID,activityDate\n"))
        .mount(&server)
        .await;

    let request = ExportRequest::activities(
        Some(january()),
        None,
        vec!["1".to_string(), "12".to_string()],
    );

    let data = fast_executor().execute(&session, &request).await.unwrap();
    assert!(!data.is_empty());
}

#[tokio::test]
async fn test_create_rejection_stops_before_enqueue() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{"code": "1035", "message": "Unsupported filter type"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The enqueue call must never be issued after a rejected create.
    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = fast_executor()
        .execute(&session, &leads_request())
        .await
        .unwrap_err();

    match err {
        ExportError::Client(ClientError::ApiRejected { stage, errors }) => {
            assert_eq!(stage, "create");
            assert!(errors.contains("1035"));
        }
        other => panic!("expected ApiRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_status_payload_is_fatal_without_repolling() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    // 200 but no result[0].status: a contract violation, not "not ready".
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": [{}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = fast_executor()
        .execute(&session, &leads_request())
        .await
        .unwrap_err();

    match err {
        ExportError::Client(ClientError::MalformedResponse { stage, .. }) => {
            assert_eq!(stage, "status");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_http_failure_is_fatal() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_executor()
        .execute(&session, &leads_request())
        .await
        .unwrap_err();

    match err {
        ExportError::Client(ClientError::HttpStatus { stage, status, .. }) => {
            assert_eq!(stage, "status");
            assert_eq!(status, 502);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_download_is_a_successful_empty_result() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(StatusSequence::new(vec!["Completed"]))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/file.json")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let data = fast_executor()
        .execute(&session, &leads_request())
        .await
        .expect("empty export must not be an error");

    assert!(data.is_empty());
}

#[tokio::test]
async fn test_validation_failure_issues_no_bulk_calls() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/activities/export/create.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // Activities with an inactive created filter
    let request = ExportRequest::activities(None, Some(january()), Vec::new());
    let err = fast_executor().execute(&session, &request).await.unwrap_err();
    assert!(matches!(err, ExportError::Validation(_)));
}

#[tokio::test]
async fn test_poll_timeout_gives_up_with_last_status() {
    let server = MockServer::start().await;
    let session = test_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/bulk/v1/leads/export/create.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{"exportId": EXPORT_ID}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/enqueue.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    // Never completes; the deadline has to end the run.
    Mock::given(method("GET"))
        .and(path(format!("/bulk/v1/leads/export/{EXPORT_ID}/status.json")))
        .respond_with(StatusSequence::new(vec!["Processing"]))
        .mount(&server)
        .await;

    let executor = ExportExecutor::new()
        .with_poll_interval(Duration::from_millis(5))
        .with_poll_timeout(Duration::from_millis(50));

    let err = executor
        .execute(&session, &leads_request())
        .await
        .unwrap_err();

    match err {
        ExportError::Timeout { last_status, .. } => assert_eq!(last_status, "Processing"),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_authentication_failure_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/identity/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = Session::establish(&server.uri(), "client-id", "wrong-secret")
        .await
        .unwrap_err();

    match err {
        ClientError::AuthFailed { status, .. } => assert_eq!(status, 401),
        other => panic!("expected AuthFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_token_response_without_access_token_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/identity/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = Session::establish(&server.uri(), "client-id", "client-secret")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse { .. }));
}

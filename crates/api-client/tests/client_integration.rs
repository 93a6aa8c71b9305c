//! Integration tests for the dashboard API client
//!
//! These tests use wiremock to stand in for the backend and cover the full
//! request/response cycle: decoding, query parameters, auth headers, and the
//! error taxonomy.

use api_client::types::{Assignment, AssignmentStatus, Course, DashboardStats};
use api_client::{ApiClient, ApiConfig, ApiError};
use app_state::Operation;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri())).unwrap()
}

// =============================================================================
// Successful Request Tests
// =============================================================================

#[tokio::test]
async fn test_get_decodes_typed_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "code": "MATH101", "name": "Calculus I",
             "instructor": "Dr. Khan", "credits": 3}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let courses: Vec<Course> = client.get("courses", &[]).await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].code, "MATH101");
}

#[tokio::test]
async fn test_get_forwards_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/assignments"))
        .and(query_param("courseId", "7"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "courseId": 7, "title": "Problem set 3",
             "dueDate": "2025-11-30T23:59:00Z", "status": "pending"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let assignments: Vec<Assignment> = client
        .get(
            "assignments",
            &[
                ("courseId", "7".to_string()),
                ("status", "pending".to_string()),
            ],
        )
        .await
        .unwrap();

    assert_eq!(assignments[0].status, AssignmentStatus::Pending);
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analytics/dashboard"))
        .and(header("Authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activeCourses": 5, "pendingAssignments": 3,
            "averageGrade": 87.5, "attendanceRate": 0.93
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.set_token("session-token");

    let stats: DashboardStats = client.get("analytics/dashboard", &[]).await.unwrap();
    assert_eq!(stats.active_courses, 5);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assignments/4/submissions"))
        .and(body_json(json!({"assignmentId": 4, "content": "my essay"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 99, "assignmentId": 4,
            "submittedAt": "2025-11-29T10:00:00Z", "accepted": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let operation = api_client::SubmitAssignmentOperation::new(client, 4);

    let receipt = operation.run("my essay".to_string()).await.unwrap();
    assert_eq!(receipt.id, 99);
    assert!(receipt.accepted);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_error_message_comes_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": "unknown semester"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get::<Vec<Course>>("courses", &[]).await.unwrap_err();

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unknown semester");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_detail_field_is_used_as_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"detail": "insufficient role"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get::<serde_json::Value>("users/profile", &[])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 403: insufficient role");
}

#[tokio::test]
async fn test_unauthorized_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get::<serde_json::Value>("users/profile", &[])
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!err.is_network_error());
}

#[tokio::test]
async fn test_server_errors_are_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analytics/dashboard"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .get::<serde_json::Value>("analytics/dashboard", &[])
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_error_without_body_uses_status_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get::<Vec<Course>>("courses", &[]).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn test_undecodable_success_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get::<Vec<Course>>("courses", &[]).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!err.is_network_error());
}

#[tokio::test]
async fn test_connection_failure_is_a_network_error() {
    // Nothing is listening on this port
    let client = ApiClient::new(
        ApiConfig::new("http://127.0.0.1:1").with_timeout(std::time::Duration::from_secs(1)),
    )
    .unwrap();

    let err = client
        .get::<serde_json::Value>("courses", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_network_error());
}

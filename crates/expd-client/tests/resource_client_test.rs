//! Contract tests for the resource services against a wiremock backend.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/vehicle-states` | `list_*` |
//! | GET    | `/vehicles/{id}` | `get_*` |
//! | POST   | `/assignments` | `create_*` |
//! | PUT    | `/insurers/{id}` | `update_*` |
//! | DELETE | `/payments/{id}` | `delete_*` |
//! | POST   | `/assignments/{id}/close` | `close_*` |
//! | GET    | `/statistics/dashboard` | `dashboard_*` |

use std::sync::Arc;

use expd_client::resources::{AssignmentInput, PartyInput};
use expd_client::statistics::Period;
use expd_client::{ApiConfig, ApiError, ExpdClient, MemoryTokenStore, TokenStore};
use expd_core::{ListFilters, RecordId};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a client pointed at the mock server with a stored token.
fn test_client(mock_server: &MockServer) -> (ExpdClient, Arc<MemoryTokenStore>) {
    let tokens = Arc::new(MemoryTokenStore::with_token("test-token"));
    let config = ApiConfig::local_mock(&format!("{}/api/v1", mock_server.uri())).unwrap();
    let client = ExpdClient::new(config, tokens.clone()).unwrap();
    (client, tokens)
}

// ── GET /vehicle-states ──────────────────────────────────────────────

#[tokio::test]
async fn list_vehicle_states_decodes_envelope_and_sends_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicle-states"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"id": 1, "code": "V1", "label": "Neuf", "created_at": "2026-01-15T12:00:00Z"}],
            "links": {"first": "/vehicle-states?page=1", "last": "/vehicle-states?page=1", "prev": null, "next": null},
            "meta": {"current_page": 1, "per_page": 20, "total": 1, "last_page": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let page = client
        .vehicle_states()
        .list(&ListFilters::new().page(1))
        .await
        .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].code, "V1");
    assert_eq!(page.data[0].label, "Neuf");
    let meta = page.meta.unwrap();
    assert_eq!((meta.current_page, meta.per_page, meta.total), (1, 20, 1));
}

#[tokio::test]
async fn list_sends_filters_as_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .and(query_param("search", "clio"))
        .and(query_param("vehicle_state_id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [], "meta": {"current_page": 1, "per_page": 20, "total": 0}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let filters = ListFilters::new()
        .search("clio")
        .with("vehicle_state_id", "2")
        .with("brand_id", "");
    let page = client.vehicles().list(&filters).await.unwrap();
    assert!(page.data.is_empty());
}

// ── GET /vehicles/{id} ───────────────────────────────────────────────

#[tokio::test]
async fn get_vehicle_returns_bare_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 12, "license_plate": "AB-123-CD", "brand": {"id": 1, "name": "Renault"}
        })))
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let vehicle = client.vehicles().get(RecordId::new(12)).await.unwrap().unwrap();
    assert_eq!(vehicle.license_plate, "AB-123-CD");
}

#[tokio::test]
async fn get_returns_none_when_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    assert!(client.vehicles().get(RecordId::new(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn get_returns_error_on_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    match client.vehicles().get(RecordId::new(5)).await.unwrap_err() {
        ApiError::Api { status, .. } => assert_eq!(status, 500),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── POST /assignments ────────────────────────────────────────────────

#[tokio::test]
async fn create_assignment_unwraps_wrapped_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/assignments"))
        .and(body_json(serde_json::json!({"reference": "EXP-2026-001", "vehicle_id": 12})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "status": "success",
            "message": "Assignment created",
            "data": {
                "id": 40, "reference": "EXP-2026-001", "vehicle_id": 12,
                "status": {"id": 1, "code": "OPEN", "label": "Ouvert"}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let input = AssignmentInput {
        reference: Some("EXP-2026-001".into()),
        vehicle_id: Some(RecordId::new(12)),
        ..Default::default()
    };
    let created = client.assignments().create(&input).await.unwrap();
    assert_eq!(created.id, RecordId::new(40));
    assert_eq!(created.status.unwrap().code.as_deref(), Some("OPEN"));
}

#[tokio::test]
async fn create_surfaces_validation_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/assignments"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "The reference field is required.",
            "errors": {"reference": ["The reference field is required."]}
        })))
        .mount(&mock_server)
        .await;

    let (client, tokens) = test_client(&mock_server);
    let err = client
        .assignments()
        .create(&AssignmentInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.user_message(), "The reference field is required.");
    assert!(tokens.is_present(), "validation errors keep the session");
}

#[tokio::test]
async fn create_rejects_wrapped_response_without_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/assignments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "error", "message": "quota"})),
        )
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let err = client
        .assignments()
        .create(&AssignmentInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

// ── PUT /insurers/{id} ───────────────────────────────────────────────

#[tokio::test]
async fn update_insurer_accepts_either_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/insurers/3"))
        .and(body_json(serde_json::json!({"phone": "+221 33 000 00 00"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": true,
            "message": "Updated",
            "data": {"id": 3, "name": "Assurances du Cap", "phone": "+221 33 000 00 00"}
        })))
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let input = PartyInput {
        phone: Some("+221 33 000 00 00".into()),
        ..Default::default()
    };
    let insurer = client.insurers().update(RecordId::new(3), &input).await.unwrap();
    assert_eq!(insurer.name, "Assurances du Cap");
}

// ── DELETE /payments/{id} ────────────────────────────────────────────

#[tokio::test]
async fn delete_payment_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/payments/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    client.payments().delete(RecordId::new(8)).await.unwrap();
}

// ── 401 handling ─────────────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_clears_token_and_signals() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/invoices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Unauthenticated."
        })))
        .mount(&mock_server)
        .await;

    let (client, tokens) = test_client(&mock_server);
    let mut rx = client.api().subscribe_unauthorized();

    let err = client.invoices().list(&ListFilters::new()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!tokens.is_present());
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), 1);
}

#[tokio::test]
async fn requests_without_token_send_no_authorization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&mock_server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let config = ApiConfig::local_mock(&format!("{}/api/v1", mock_server.uri())).unwrap();
    let client = ExpdClient::new(config, tokens).unwrap();
    client.clients().list(&ListFilters::new()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

// ── POST /assignments/{id}/close ─────────────────────────────────────

#[tokio::test]
async fn close_assignment_posts_action() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/assignments/40/close"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "data": {"id": 40, "reference": "EXP-2026-001",
                     "status": {"id": 4, "code": "CLOSED", "label": "Clôturé"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let closed = client.assignments().close(RecordId::new(40)).await.unwrap();
    assert_eq!(closed.status.unwrap().code.as_deref(), Some("CLOSED"));
}

// ── GET /statistics/dashboard ────────────────────────────────────────

#[tokio::test]
async fn dashboard_sends_period_and_decodes_figures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/statistics/dashboard"))
        .and(query_param("start_date", "2026-01-01"))
        .and(query_param("end_date", "2026-03-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "totals": {"assignments": 14, "invoices": 9},
                "assignments_by_status": [
                    {"status": {"id": 1, "code": "OPEN", "label": "Ouvert"}, "count": 5}
                ],
                "amounts": {"invoiced": 1250000, "paid": "800000.00"}
            },
            "status": "success"
        })))
        .mount(&mock_server)
        .await;

    let (client, _) = test_client(&mock_server);
    let period = Period {
        start: chrono::NaiveDate::from_ymd_opt(2026, 1, 1),
        end: chrono::NaiveDate::from_ymd_opt(2026, 3, 31),
    };
    let stats = client.statistics().dashboard(period).await.unwrap();
    assert_eq!(stats.totals.assignments, 14);
    assert_eq!(stats.totals.payments, 0);
    assert_eq!(stats.assignments_by_status[0].count, 5);
    assert_eq!(stats.amounts.invoiced.unwrap().as_str(), "1250000");
}

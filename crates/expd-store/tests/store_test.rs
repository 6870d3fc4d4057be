//! Resource store behaviour against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use expd_client::resources::{VehicleStateInput, VehicleStates};
use expd_client::{ApiConfig, ExpdClient, MemoryTokenStore};
use expd_core::{ListFilters, RecordId};
use expd_store::{ResourceStore, Stores, ToastLevel, ToastQueue};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_json(id: u64, code: &str, label: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "code": code, "label": label})
}

fn page_json(items: Vec<serde_json::Value>) -> serde_json::Value {
    let total = items.len();
    serde_json::json!({
        "data": items,
        "links": {"first": null, "last": null, "prev": null, "next": null},
        "meta": {"current_page": 1, "per_page": 25, "total": total}
    })
}

fn single_page() -> serde_json::Value {
    page_json(vec![state_json(1, "NEUF", "Neuf")])
}

fn test_store(mock_server: &MockServer) -> (ResourceStore<VehicleStates>, Arc<ToastQueue>) {
    let tokens = Arc::new(MemoryTokenStore::with_token("tok"));
    let config = ApiConfig::local_mock(&mock_server.uri()).unwrap();
    let client = ExpdClient::new(config, tokens).unwrap();
    let toasts = Arc::new(ToastQueue::new());
    let store = ResourceStore::new(client.vehicle_states(), toasts.clone());
    (store, toasts)
}

async fn seed(mock_server: &MockServer, store: &ResourceStore<VehicleStates>) {
    Mock::given(method("GET"))
        .and(path("/vehicle-states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![
            state_json(1, "NEUF", "Neuf"),
            state_json(2, "OCC", "Occasion"),
            state_json(3, "EPAVE", "Épave"),
        ])))
        .up_to_n_times(1)
        .mount(mock_server)
        .await;
    store.fetch(ListFilters::new()).await.unwrap();
}

#[tokio::test]
async fn fetch_fills_items_and_clears_loading() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicle-states"))
        .and(query_param("page", "1"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (store, _) = test_store(&mock_server);
    let items = store.fetch(ListFilters::new().page(1)).await.unwrap();

    assert_eq!(items.len(), 1);
    let state = store.snapshot();
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].label, "Neuf");
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.meta.unwrap().current_page, 1);
    assert_eq!(state.filters.current_page(), Some(1));
}

#[tokio::test]
async fn loading_is_set_while_request_is_in_flight() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicle-states"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(vec![]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let (store, _) = test_store(&mock_server);
    let pending = tokio::spawn({
        let store = store.clone();
        async move { store.fetch(ListFilters::new()).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.is_loading());

    pending.await.unwrap().unwrap();
    assert!(!store.is_loading());
}

#[tokio::test]
async fn failed_fetch_keeps_previous_items() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("GET"))
        .and(path("/vehicle-states"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let before = store.snapshot();
    assert!(store.fetch(ListFilters::new().page(2)).await.is_err());

    let state = store.snapshot();
    assert_eq!(state.items, before.items);
    assert_eq!(state.filters, before.filters);
    assert_eq!(state.filters.current_page(), None);
    assert_eq!(state.meta, before.meta);
    assert!(!state.loading);
    assert!(state.error.is_some());
    let toast = toasts.last().unwrap();
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(Some(toast.message), state.error);
}

#[tokio::test]
async fn create_appends_after_server_confirms() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("POST"))
        .and(path("/vehicle-states"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "status": "success",
            "message": "Created",
            "data": state_json(4, "ACC", "Accidenté")
        })))
        .mount(&mock_server)
        .await;

    let input = VehicleStateInput {
        code: Some("ACC".into()),
        label: Some("Accidenté".into()),
        description: None,
    };
    let created = store.create(&input).await.unwrap();

    assert_eq!(created.id, RecordId::new(4));
    let items = store.items();
    assert_eq!(items.len(), 4);
    assert_eq!(items.last().unwrap().code, "ACC");
    assert_eq!(toasts.last().unwrap().level, ToastLevel::Success);
}

#[tokio::test]
async fn rejected_create_leaves_collection_unchanged() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("POST"))
        .and(path("/vehicle-states"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "The code has already been taken."
        })))
        .mount(&mock_server)
        .await;

    let before = store.items();
    let input = VehicleStateInput {
        code: Some("NEUF".into()),
        label: Some("Neuf".into()),
        description: None,
    };
    let err = store.create(&input).await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(store.items(), before);
    assert_eq!(
        store.error().as_deref(),
        Some("The code has already been taken.")
    );
    assert_eq!(
        toasts.last().unwrap().message,
        "The code has already been taken."
    );
    assert!(!store.is_loading());
}

#[tokio::test]
async fn update_replaces_by_id() {
    let mock_server = MockServer::start().await;
    let (store, _) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("PUT"))
        .and(path("/vehicle-states/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(state_json(2, "OCC", "Seconde main")),
        )
        .mount(&mock_server)
        .await;

    let input = VehicleStateInput {
        label: Some("Seconde main".into()),
        ..VehicleStateInput::default()
    };
    store.update(RecordId::new(2), &input).await.unwrap();

    let items = store.items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1].label, "Seconde main");
    assert_eq!(items[0].label, "Neuf");
}

#[tokio::test]
async fn rejected_update_leaves_collection_unchanged() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("PUT"))
        .and(path("/vehicle-states/2"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "The label field is required."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let before = store.items();
    let input = VehicleStateInput {
        label: Some(String::new()),
        ..VehicleStateInput::default()
    };
    let err = store.update(RecordId::new(2), &input).await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(store.items(), before);
    assert!(store.error().is_some());
    assert_eq!(toasts.last().unwrap().level, ToastLevel::Error);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn delete_removes_by_id() {
    let mock_server = MockServer::start().await;
    let (store, _) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("DELETE"))
        .and(path("/vehicle-states/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    store.delete(RecordId::new(1)).await.unwrap();
    let ids: Vec<u64> = store.items().iter().map(|s| s.id.get()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn rejected_delete_leaves_collection_unchanged() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("DELETE"))
        .and(path("/vehicle-states/1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Vehicle state is in use."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let before = store.items();
    let err = store.delete(RecordId::new(1)).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(store.items(), before);
    assert!(store.error().is_some());
    assert_eq!(toasts.last().unwrap().level, ToastLevel::Error);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn batch_delete_stops_at_first_failure() {
    let mock_server = MockServer::start().await;
    let (store, toasts) = test_store(&mock_server);
    seed(&mock_server, &store).await;

    Mock::given(method("DELETE"))
        .and(path("/vehicle-states/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/vehicle-states/2"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Vehicle state is in use."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/vehicle-states/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let ids = [RecordId::new(1), RecordId::new(2), RecordId::new(3)];
    let err = store.delete_many(&ids).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    let remaining: Vec<u64> = store.items().iter().map(|s| s.id.get()).collect();
    assert_eq!(remaining, vec![2, 3]);
    assert_eq!(store.error().as_deref(), Some("Vehicle state is in use."));
    assert_eq!(toasts.last().unwrap().level, ToastLevel::Error);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn fetch_one_selects_record_and_missing_clears_it() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicle-states/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_json(3, "EPAVE", "Épave")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vehicle-states/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (store, toasts) = test_store(&mock_server);
    store.fetch_one(RecordId::new(3)).await.unwrap();
    assert_eq!(store.snapshot().selected.unwrap().code, "EPAVE");

    assert!(store.fetch_one(RecordId::new(99)).await.unwrap().is_none());
    assert!(store.snapshot().selected.is_none());
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn reset_all_clears_every_store() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vehicle-states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_page()))
        .mount(&mock_server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("tok"));
    let config = ApiConfig::local_mock(&mock_server.uri()).unwrap();
    let client = ExpdClient::new(config, tokens).unwrap();
    let stores = Stores::new(&client, Arc::new(ToastQueue::new()));

    stores.vehicle_states.fetch(ListFilters::new()).await.unwrap();
    assert_eq!(stores.vehicle_states.items().len(), 1);

    stores.reset_all();
    assert!(stores.vehicle_states.snapshot().items.is_empty());
    assert!(stores.vehicle_states.snapshot().meta.is_none());
}

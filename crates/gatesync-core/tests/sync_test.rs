// Integration tests for the sync engine against a mock gateway API
// and a mock object store sharing one wiremock server.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatesync_api::{GatewayClient, ObjectStore, TransportConfig};
use gatesync_core::{GroupOutcome, MinimalDiff, SyncEngine, SyncOptions};

const ACCOUNT: &str = "acct1";

fn envelope(result: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

fn options(groups: &[&str], store_artifacts: bool) -> SyncOptions {
    SyncOptions {
        devices_object: "devices.json".to_owned(),
        memberships_object: "memberships.json".to_owned(),
        groups: groups.iter().map(|&g| (*g).to_owned()).collect(),
        list_prefix: "VIPs - ".to_owned(),
        store_artifacts,
    }
}

async fn clients(server: &MockServer) -> (GatewayClient, ObjectStore) {
    let transport = TransportConfig::default();
    let gateway = GatewayClient::from_credentials(
        &server.uri(),
        ACCOUNT,
        "admin@example.com",
        &SecretString::from("test-key"),
        &transport,
    )
    .expect("gateway client should build");
    let store = ObjectStore::new(&format!("{}/bucket", server.uri()), None, &transport)
        .expect("object store should build");
    (gateway, store)
}

async fn mount_datasets(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/bucket/devices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "a@x.com", "name": "d1", "type": "laptop", "vip": "100.96.0.1" },
            { "email": "b@x.com", "name": "d2", "type": "phone", "vip": "100.96.0.2" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bucket/memberships.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "a@x.com", "group": "eng" },
            { "email": "b@x.com", "group": "ops" }
        ])))
        .mount(server)
        .await;
}

fn lists_path() -> String {
    format!("/client/v4/accounts/{ACCOUNT}/gateway/lists")
}

#[tokio::test]
async fn full_replace_run_patches_matched_list() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-eng", "name": "VIPs - eng" }
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/list-eng/items", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "value": "100.96.0.9" }
        ]))))
        .mount(&server)
        .await;

    // Full replace: the stale value goes, the resolved entry comes in.
    Mock::given(method("PATCH"))
        .and(path(format!("{}/list-eng", lists_path())))
        .and(header("X-Auth-Email", "admin@example.com"))
        .and(body_json(json!({
            "remove": ["100.96.0.9"],
            "append": [
                { "description": "USER:a@x.com; DEVICE:d1; TYPE:laptop", "value": "100.96.0.1" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "list-eng" }))))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], false);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect("run should succeed");

    assert!(!report.has_failures());
    assert_eq!(report.synced_count(), 1);
    assert_eq!(report.groups[0].outcome, GroupOutcome::Synced);
    assert_eq!(report.groups[0].list_id.as_deref(), Some("list-eng"));
    assert_eq!(report.groups[0].appended, 1);
    assert_eq!(report.groups[0].removed, 1);
}

#[tokio::test]
async fn missing_dataset_aborts_before_gateway_traffic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bucket/devices.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // The directory endpoint must never be hit.
    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], false);
    let err = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect_err("run should abort");

    assert!(err.is_dataset_missing());
    assert!(err.to_string().contains("devices.json"));
}

#[tokio::test]
async fn group_without_matching_list_is_skipped() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-other", "name": "VIPs - other" }
        ]))))
        .mount(&server)
        .await;

    // No item fetch, no PATCH for a skipped group.
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], false);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect("run should succeed");

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.groups[0].outcome, GroupOutcome::Skipped);
    assert!(report.groups[0].list_id.is_none());
}

#[tokio::test]
async fn failed_group_does_not_stop_later_groups() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-eng", "name": "VIPs - eng" },
            { "id": "list-ops", "name": "VIPs - ops" }
        ]))))
        .mount(&server)
        .await;

    // eng's item fetch blows up server-side.
    Mock::given(method("GET"))
        .and(path(format!("{}/list-eng/items", lists_path())))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/list-ops/items", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/list-ops", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "list-ops" }))))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng", "ops"], false);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect("run should complete despite the failed group");

    assert!(report.has_failures());
    assert!(matches!(
        report.groups[0].outcome,
        GroupOutcome::Failed { .. }
    ));
    assert_eq!(report.groups[1].outcome, GroupOutcome::Synced);
}

#[tokio::test]
async fn artifacts_persisted_before_patch_when_enabled() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-eng", "name": "VIPs - eng" }
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/list-eng/items", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    // Artifact key is the list name plus .json, under the bucket root.
    Mock::given(method("PUT"))
        .and(path("/bucket/VIPs%20-%20eng.json"))
        .and(body_json(json!({
            "remove": [],
            "append": [
                { "description": "USER:a@x.com; DEVICE:d1; TYPE:laptop", "value": "100.96.0.1" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/list-eng", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "list-eng" }))))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], true);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect("run should succeed");

    assert_eq!(report.synced_count(), 1);
}

#[tokio::test]
async fn artifact_write_failure_marks_group_failed() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-eng", "name": "VIPs - eng" }
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/list-eng/items", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/bucket/VIPs%20-%20eng.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // Persistence precedes submission, so the PATCH never happens.
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], true);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .run()
        .await
        .expect("run should complete");

    assert!(report.has_failures());
}

#[tokio::test]
async fn minimal_strategy_sends_set_difference_only() {
    let server = MockServer::start().await;
    mount_datasets(&server).await;

    Mock::given(method("GET"))
        .and(path(lists_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "list-eng", "name": "VIPs - eng" }
        ]))))
        .mount(&server)
        .await;

    // The resolved value is already present alongside one stale value.
    Mock::given(method("GET"))
        .and(path(format!("{}/list-eng/items", lists_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "value": "100.96.0.1" },
            { "value": "100.96.0.9" }
        ]))))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/list-eng", lists_path())))
        .and(body_json(json!({ "remove": ["100.96.0.9"], "append": [] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "list-eng" }))))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, store) = clients(&server).await;
    let opts = options(&["eng"], false);
    let report = SyncEngine::new(&gateway, &store, &opts)
        .with_strategy(Box::new(MinimalDiff))
        .run()
        .await
        .expect("run should succeed");

    assert_eq!(report.groups[0].appended, 0);
    assert_eq!(report.groups[0].removed, 1);
}

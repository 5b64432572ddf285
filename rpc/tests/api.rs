//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

use dagview_explorer::{Explorer, ExplorerSettings};
use dagview_nullables::{witness_addresses, NullStore, UnitFixture};
use dagview_rpc::{router, RpcMetrics, RpcSettings, RpcState};
use dagview_store::LedgerSnapshot;
use dagview_types::WitnessParams;

/// A well-formed unit hash built from `tag`.
fn hash(tag: &str) -> String {
    format!("{tag:A<43}=")
}

/// Stable main chain `H0..H5`; from `H2` on every unit names the unit two
/// below as last ball and is signed by a witness majority.
fn store() -> Arc<NullStore> {
    let w = witness_addresses(12);
    let mut units = Vec::new();
    for i in 0..6u64 {
        let mut fixture = UnitFixture::new(&hash(&format!("H{i}")), i + 1)
            .on_main_chain(i)
            .stable()
            .timestamp(1000 + 10 * i)
            .witness_list_unit(&hash("H0"));
        fixture = match i {
            0 => fixture.witnesses(&w),
            _ => fixture.best_parent(&hash(&format!("H{}", i - 1))),
        };
        if i >= 2 {
            fixture = fixture
                .last_ball(&hash(&format!("H{}", i - 2)))
                .authored_by(&w[..7]);
        }
        units.push(fixture.build());
    }
    Arc::new(
        NullStore::from_snapshot(&LedgerSnapshot {
            units,
            ..Default::default()
        })
        .unwrap(),
    )
}

fn app_with(store: Arc<NullStore>, settings: RpcSettings) -> (Router, Arc<RpcMetrics>) {
    let explorer = Explorer::new(
        store,
        ExplorerSettings {
            witness_params: WitnessParams::MAINNET,
            op_list: Vec::new(),
        },
    );
    let metrics = Arc::new(RpcMetrics::new());
    let state = Arc::new(RpcState::new(explorer, Arc::clone(&metrics), settings));
    (router(state), metrics)
}

fn app() -> Router {
    app_with(store(), RpcSettings::default()).0
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn confirmation_delays_of_a_stable_unit() {
    let (status, body) = get(app(), &format!("/api/v1/units/{}/confirmation", hash("H0"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_node_confirmation_delay"], 20);
    assert_eq!(body["light_node_confirmation_delay"], 20);
}

#[tokio::test]
async fn unstabilized_unit_has_null_delays() {
    let (status, body) = get(app(), &format!("/api/v1/units/{}/confirmation", hash("H5"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["full_node_confirmation_delay"].is_null());
    assert!(body["light_node_confirmation_delay"].is_null());
}

#[tokio::test]
async fn unit_info_includes_delays_and_relations() {
    let (status, body) = get(app(), &format!("/api/v1/units/{}", hash("H1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit"], hash("H1"));
    assert_eq!(body["parents"][0], hash("H0"));
    assert_eq!(body["child"][0], hash("H2"));
    assert_eq!(body["full_node_confirmation_delay"], 20);
}

#[tokio::test]
async fn unknown_unit_is_not_found() {
    let (status, body) = get(app(), &format!("/api/v1/units/{}", hash("NOPE"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "UNIT_NOT_FOUND");

    let (status, _) = get(app(), &format!("/api/v1/units/{}/rowid", hash("NOPE"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(
        app(),
        &format!("/api/v1/units/{}/confirmation", hash("NOPE")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_unit_is_a_bad_request() {
    let (status, body) = get(app(), "/api/v1/units/not-a-unit/confirmation").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn non_ascii_unit_of_hash_length_is_a_bad_request() {
    // 42 ASCII bytes plus a two-byte "é": 44 bytes in all.
    let unit = format!("{}%C3%A9", "a".repeat(42));
    let (status, body) = get(app(), &format!("/api/v1/units/{unit}/confirmation")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let request = serde_json::json!({ "units": [format!("{}é", "a".repeat(42))] });
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/units/stable")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listings_honour_limit() {
    let (status, body) = get(app(), "/api/v1/units/last?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["rowid"], 6);
    assert_eq!(nodes[1]["rowid"], 5);

    let (status, body) = get(app(), "/api/v1/units/before/3?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 1);

    let (_, body) = get(app(), "/api/v1/units/after/4").await;
    assert_eq!(body["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn rowid_and_trigger_lookups() {
    let (status, body) = get(app(), &format!("/api/v1/units/{}/rowid", hash("H3"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rowid"], 4);

    let (status, body) = get(app(), &format!("/api/v1/units/{}/trigger", hash("H3"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["trigger_unit"].is_null());
}

#[tokio::test]
async fn stable_subset() {
    let request = serde_json::json!({ "units": [hash("H1"), hash("NOPE")] });
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/units/stable")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let stable = body.as_array().unwrap();
    assert_eq!(stable.len(), 1);
    assert_eq!(stable[0]["unit"], hash("H1"));
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let store = store();
    store.fail_after(0);
    let (app, metrics) = app_with(Arc::clone(&store), RpcSettings::default());
    let (status, body) = get(app, &format!("/api/v1/units/{}/confirmation", hash("H0"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert_eq!(
        metrics
            .request_failures
            .with_label_values(&["confirmation"])
            .get(),
        1
    );
}

#[tokio::test]
async fn expired_deadline_is_gateway_timeout() {
    let settings = RpcSettings {
        query_timeout: Duration::ZERO,
        ..RpcSettings::default()
    };
    let (app, _) = app_with(store(), settings);
    let (status, body) = get(app, &format!("/api/v1/units/{}/confirmation", hash("H0"))).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "DEADLINE_EXCEEDED");
}

#[tokio::test]
async fn metrics_reflect_served_requests() {
    let (app, _) = app_with(store(), RpcSettings::default());
    let (status, _) = get(
        app.clone(),
        &format!("/api/v1/units/{}/confirmation", hash("H0")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("dagview_confirmations_total 1"));
    assert!(text.contains("dagview_rpc_requests_total{route=\"confirmation\"} 1"));
}

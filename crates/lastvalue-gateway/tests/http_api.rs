#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::time::{advance, Duration};
use tower::ServiceExt;

use lastvalue_gateway::{app_state::AppState, config, router};

const CFG: &str = r#"
version: 1
registry:
  ttl_ms: 3000
management:
  domain: "org.cloudfoundry"
  metric_prefix: "opentsdb.nozzle."
access:
  - { principal: "root", level: readonly }
  - { principal: "ingest", level: readwrite }
"#;

fn app() -> (AppState, Router) {
    let state = AppState::new(config::load_from_str(CFG).unwrap()).unwrap();
    let app = router::build_router(state.clone());
    (state, app)
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1 << 20).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, principal: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-lastvalue-principal", principal)
        .body(Body::empty())
        .unwrap()
}

fn post(body: Value, principal: &str) -> Request<Body> {
    Request::post("/v1/samples")
        .header("x-lastvalue-principal", principal)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sample(name: &str, value: f64, ts: i64, deployment: &str) -> Value {
    json!({
        "name": name,
        "value": value,
        "timestamp": ts,
        "tags": { "deployment": deployment, "job": "job0", "index": "index0", "ip": "0.0.0.0" }
    })
}

const D0_QS: &str = "org.cloudfoundry%3Adeployment%3Dd0%2Cjob%3Djob0%2Cindex%3Dindex0%2Cip%3D0.0.0.0";

#[tokio::test]
async fn ingest_then_query() {
    let (_, app) = app();

    let batch = json!([
        sample("cpu1", 100.0, 100, "d0"),
        sample("cpu1", 88.0, 88, "d0"),
        { "name": "cpu1", "value": 1.0, "tags": { "deployment": "d0" } }
    ]);
    let (status, body) = call(&app, post(batch, "ingest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "applied": 1, "discarded": 1, "invalid": 1 }));

    let (status, body) = call(&app, get("/v1/identities", "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!(["org.cloudfoundry:deployment=d0,job=job0,index=index0,ip=0.0.0.0"])
    );

    let uri = format!("/v1/attribute?identity={D0_QS}&name=opentsdb.nozzle.cpu1");
    let (status, body) = call(&app, get(&uri, "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "value": 100.0, "timestamp": 100 }));

    let uri = format!("/v1/attributes?identity={D0_QS}");
    let (status, body) = call(&app, get(&uri, "root")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["opentsdb.nozzle.cpu1"]["value"], json!(100.0));
}

#[tokio::test]
async fn missing_attribute_is_404() {
    let (_, app) = app();
    call(&app, post(sample("cpu1", 1.0, 1, "d0"), "ingest")).await;

    let uri = format!("/v1/attribute?identity={D0_QS}&name=cpu1");
    let (status, body) = call(&app, get(&uri, "root")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn authorization_gate() {
    let (state, app) = app();

    let (status, body) = call(&app, post(sample("cpu1", 1.0, 1, "d0"), "root")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(state.registry().physical_len(), 0);

    let req = Request::get("/v1/identities").body(Body::empty()).unwrap();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn empty_batch_still_requires_write_access() {
    let (state, app) = app();

    let req = Request::post("/v1/samples")
        .header("content-type", "application/json")
        .body(Body::from("[]"))
        .unwrap();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, body) = call(&app, post(json!([]), "root")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, body) = call(&app, post(json!([]), "ingest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "applied": 0, "discarded": 0, "invalid": 0 }));

    let text = state.metrics().render(&[]);
    assert!(text.contains("lastvalue_auth_denied_total{op=\"write\"} 2"));
}

#[tokio::test(start_paused = true)]
async fn live_gauge_drops_expired_identities() {
    let (state, app) = app();
    call(&app, post(sample("cpu1", 1.0, 1, "d0"), "ingest")).await;
    advance(Duration::from_millis(5000)).await;

    let extra = state.metrics_extra();
    assert!(extra.contains(&("lastvalue_identities_live", 0)));
    assert_eq!(state.registry().physical_len(), 1);
}

#[tokio::test]
async fn malformed_identity_key_is_400() {
    let (_, app) = app();
    let (status, body) = call(&app, get("/v1/attributes?identity=nodomain", "root")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test(start_paused = true)]
async fn expired_identity_disappears_from_listing() {
    let (_, app) = app();
    call(&app, post(sample("testingPrefix", 100.0, 100, "deployment21"), "ingest")).await;

    advance(Duration::from_millis(5000)).await;
    let batch = json!([
        sample("testingPrefix123", 100.0, 100, "deployment123"),
        sample("testingPrefix123", 100.0, 100, "deployment1234"),
        sample("testingPrefix123", 100.0, 100, "deployment1235"),
        sample("testingPrefix123", 100.0, 100, "deployment12351"),
    ]);
    call(&app, post(batch, "ingest")).await;

    let (_, body) = call(&app, get("/v1/identities", "root")).await;
    let ids = body.as_array().unwrap();
    assert_eq!(ids.len(), 4);
    assert!(ids.iter().all(|k| !k.as_str().unwrap().contains("deployment=deployment21,")));
}

#[tokio::test]
async fn metrics_endpoint_reports_counters() {
    let (_, app) = app();
    call(&app, post(sample("cpu1", 1.0, 1, "d0"), "ingest")).await;

    let res = app.clone().oneshot(get("/metrics", "anyone")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(res.into_body(), 1 << 20).await.unwrap().to_vec()).unwrap();
    assert!(text.contains("lastvalue_samples_total{outcome=\"inserted\"} 1"));
    assert!(text.contains("lastvalue_identities_live 1"));
}

#[tokio::test]
async fn shutdown_clears_registry() {
    let (state, app) = app();
    call(&app, post(sample("cpu1", 1.0, 1, "d0"), "ingest")).await;
    assert_eq!(state.shutdown(), 1);
    let (_, body) = call(&app, get("/v1/identities", "root")).await;
    assert_eq!(body, json!([]));
}

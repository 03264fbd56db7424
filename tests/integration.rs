use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use partner_router::api::rest::router;
use partner_router::catalog::InMemoryCatalog;
use partner_router::engine::selector::SelectionPolicy;
use partner_router::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Arc::new(InMemoryCatalog::new()),
        Duration::from_secs(60),
        1024,
        SelectionPolicy::default(),
    ));
    (router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn partner_json(id: &str, price: f64, eta: f64, reliability: f64, pincodes: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Partner {}", id.to_uppercase()),
        "supportsCod": true,
        "rateCard": {
            "slabs": [
                { "upToKg": 0.5, "rates": { "metro": price / 2.0, "national": price / 2.0 } },
                { "upToKg": 5.0, "rates": { "metro": price, "national": price } },
                { "upToKg": 10.0, "rates": { "metro": price * 2.0, "national": price * 2.0 } }
            ],
            "cod": { "flat": 30.0, "percent": 1.5 }
        },
        "coverage": { "pickup": { "pincodes": pincodes } },
        "reliability": reliability,
        "avgTransitHours": eta,
        "maxWeightKg": 10.0
    })
}

async fn seed(app: &axum::Router) {
    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/pincodes",
            json!([
                { "pincode": "110001", "city": "New Delhi", "state": "Delhi", "metro": true },
                { "pincode": "400001", "city": "Mumbai", "state": "Maharashtra", "metro": true }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for partner in [
        partner_json("a", 120.0, 24.0, 0.95, &["110001", "400001"]),
        partner_json("b", 90.0, 48.0, 0.80, &["110001", "400001"]),
        partner_json("c", 60.0, 12.0, 0.99, &["110001"]),
    ] {
        let res = app
            .clone()
            .oneshot(json_request("POST", "/partners", partner))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["partners"], 0);
    assert_eq!(body["selections"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _state) = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("catalog_refreshes_total"));
}

#[tokio::test]
async fn weighted_selection_over_http() {
    let (app, _state) = setup();
    seed(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 2.5,
                "clientWeights": { "cost": 0.5, "speed": 0.3, "reliability": 0.2 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let outcome = &body["outcome"];
    assert_eq!(outcome["status"], "selected");
    assert_eq!(outcome["winner"]["partnerId"], "b");
    assert_eq!(outcome["winner"]["cost"], 90.0);
    assert_eq!(outcome["zone"], "metro");
    assert_eq!(outcome["weightSource"], "request");

    let candidates = outcome["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert!((candidates[0]["score"].as_f64().unwrap() - 0.66).abs() < 1e-9);
    assert!((candidates[1]["score"].as_f64().unwrap() - 0.49).abs() < 1e-9);
    assert_eq!(candidates[1]["breakdown"]["speedScore"], 1.0);

    assert_eq!(outcome["excluded"][0]["partnerId"], "c");
    assert_eq!(outcome["excluded"][0]["reasons"][0], "destination_not_covered");

    let id = body["id"].as_str().unwrap();
    let res = app
        .oneshot(get_request(&format!("/selections/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let stored = body_json(res).await;
    assert_eq!(stored["outcome"]["winner"]["partnerId"], "b");
}

#[tokio::test]
async fn overweight_shipment_is_no_service_not_error() {
    let (app, _state) = setup();
    seed(&app).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 50.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["outcome"]["status"], "no_service");
    assert!(body["outcome"].get("winner").is_none());
    assert_eq!(body["outcome"]["excluded"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_pincode_returns_400() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "1100",
                "destinationPincode": "400001",
                "weightKg": 1.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("originPincode"));
}

#[tokio::test]
async fn out_of_range_preference_returns_400() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 1.0,
                "clientWeights": { "cost": 0.5, "speed": -0.1, "reliability": 0.2 }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stored_client_weights_are_used() {
    let (app, _state) = setup();
    seed(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/clients/acme/weights",
            json!({ "cost": 0.0, "speed": 1.0, "reliability": 0.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 2.5,
                "clientId": "acme"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["outcome"]["weightSource"], "client");
    assert_eq!(body["outcome"]["winner"]["partnerId"], "a");
}

#[tokio::test]
async fn deactivated_partner_drops_out_after_status_change() {
    let (app, _state) = setup();
    seed(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/partners/b/status",
            json!({ "active": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["active"], false);

    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 2.5
            }),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["outcome"]["winner"]["partnerId"], "a");
    assert_eq!(body["outcome"]["candidates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_partner_returns_409() {
    let (app, _state) = setup();
    let partner = partner_json("a", 100.0, 24.0, 0.9, &["110001"]);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/partners", partner.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request("POST", "/partners", partner))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn partner_with_unsorted_slabs_is_rejected() {
    let (app, _state) = setup();
    let mut partner = partner_json("a", 100.0, 24.0, 0.9, &["110001"]);
    partner["rateCard"]["slabs"] = json!([
        { "upToKg": 5.0, "rates": { "metro": 100.0 } },
        { "upToKg": 1.0, "rates": { "metro": 50.0 } }
    ]);

    let res = app
        .oneshot(json_request("POST", "/partners", partner))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_nonexistent_selection_returns_404() {
    let (app, _state) = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/selections/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sla_risk_endpoint_ranks_breached_first() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/control-tower/sla-risk",
            json!({
                "asOf": "2026-03-01T12:00:00Z",
                "shipments": [
                    {
                        "awb": "AWB100",
                        "partnerId": "a",
                        "bookedAt": "2026-02-28T12:00:00Z",
                        "promisedBy": "2026-03-04T12:00:00Z",
                        "expectedTransitHours": 48.0,
                        "partnerReliability": 0.9
                    },
                    {
                        "awb": "AWB200",
                        "partnerId": "b",
                        "bookedAt": "2026-02-25T12:00:00Z",
                        "promisedBy": "2026-02-28T12:00:00Z",
                        "expectedTransitHours": 48.0,
                        "partnerReliability": 0.8,
                        "failedAttempts": 2
                    }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body[0]["awb"], "AWB200");
    assert_eq!(body[0]["level"], "breached");
    assert_eq!(body[1]["level"], "low");
}

#[tokio::test]
async fn capacity_endpoint_flags_bottlenecks() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/control-tower/capacity",
            json!({
                "partners": [
                    { "partnerId": "a", "bookedToday": 100, "dailyCapacity": 1000, "hourlyRunRate": 10.0, "hoursRemaining": 5.0 },
                    { "partnerId": "b", "bookedToday": 900, "dailyCapacity": 1000, "hourlyRunRate": 20.0, "hoursRemaining": 5.0 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body[0]["partnerId"], "b");
    assert_eq!(body[0]["bottleneck"], true);
    assert_eq!(body[1]["bottleneck"], false);
}

#[tokio::test]
async fn dimensions_raise_chargeable_weight_over_http() {
    let (app, _state) = setup();
    seed(&app).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 1.0,
                "dimensions": { "lengthCm": 40.0, "widthCm": 30.0, "heightCm": 30.0 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let outcome = &body["outcome"];
    assert_eq!(outcome["status"], "selected");
    // 40 x 30 x 30 / 5000 = 7.2 kg, billed on the 10 kg slab
    assert!((outcome["chargeableWeightKg"].as_f64().unwrap() - 7.2).abs() < 1e-9);

    let candidates = outcome["candidates"].as_array().unwrap();
    let cost_of = |id: &str| {
        candidates
            .iter()
            .find(|c| c["partnerId"] == id)
            .and_then(|c| c["cost"].as_f64())
            .unwrap()
    };
    assert_eq!(cost_of("a"), 240.0);
    assert_eq!(cost_of("b"), 180.0);
}

#[tokio::test]
async fn zero_dimension_returns_400() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/selections",
            json!({
                "originPincode": "110001",
                "destinationPincode": "400001",
                "weightKg": 1.0,
                "dimensions": { "lengthCm": 0.0, "widthCm": 30.0, "heightCm": 30.0 }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("lengthCm"));
}

#[tokio::test]
async fn selection_list_is_newest_first_and_limited() {
    let (app, _state) = setup();
    seed(&app).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/selections",
                json!({
                    "originPincode": "110001",
                    "destinationPincode": "400001",
                    "weightKg": 1.0
                }),
            ))
            .await
            .unwrap();
        ids.push(body_json(res).await["id"].as_str().unwrap().to_string());
    }

    let res = app
        .clone()
        .oneshot(get_request("/selections?limit=2"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_json(res).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], ids[2].as_str());
    assert_eq!(page[1]["id"], ids[1].as_str());

    let res = app
        .oneshot(get_request("/selections?limit=2&offset=2"))
        .await
        .unwrap();
    let rest = body_json(res).await;
    assert_eq!(rest.as_array().unwrap().len(), 1);
    assert_eq!(rest[0]["id"], ids[0].as_str());
}

#[tokio::test]
async fn old_selections_fall_out_of_audit_log() {
    let state = Arc::new(
        AppState::new(
            Arc::new(InMemoryCatalog::new()),
            Duration::from_secs(60),
            1024,
            SelectionPolicy::default(),
        )
        .with_audit_retention(1),
    );
    let app = router(state.clone());

    let mut ids = Vec::new();
    for _ in 0..2 {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/selections",
                json!({
                    "originPincode": "110001",
                    "destinationPincode": "400001",
                    "weightKg": 1.0
                }),
            ))
            .await
            .unwrap();
        ids.push(body_json(res).await["id"].as_str().unwrap().to_string());
    }

    let res = app
        .clone()
        .oneshot(get_request(&format!("/selections/{}", ids[0])))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(body_json(res).await["selections"], 1);
}

#[tokio::test]
async fn capacity_defaults_to_partner_profile() {
    let (app, _state) = setup();
    let mut partner = partner_json("a", 100.0, 24.0, 0.9, &["110001"]);
    partner["dailyCapacity"] = json!(200);
    let res = app
        .clone()
        .oneshot(json_request("POST", "/partners", partner))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["dailyCapacity"], 200);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/control-tower/capacity",
            json!({
                "partners": [
                    { "partnerId": "a", "bookedToday": 150, "hourlyRunRate": 10.0, "hoursRemaining": 4.0 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body[0]["partnerId"], "a");
    assert!((body[0]["utilization"].as_f64().unwrap() - 0.95).abs() < 1e-9);
    assert_eq!(body[0]["bottleneck"], true);

    let res = app
        .oneshot(json_request(
            "POST",
            "/control-tower/capacity",
            json!({
                "partners": [
                    { "partnerId": "unknown", "bookedToday": 10, "hourlyRunRate": 1.0, "hoursRemaining": 1.0 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

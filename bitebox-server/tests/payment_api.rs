//! Payment endpoints against a local stand-in for the gateway REST API

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use bitebox_server::auth::Role;
use bitebox_server::{AppState, Config};
use common::TestApp;
use http::StatusCode;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct MockGateway {
    hits: Arc<AtomicUsize>,
}

async fn mock_create_order(
    State(mock): State<MockGateway>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    if headers.get("authorization").is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "description": "missing credentials" } })),
        );
    }
    let amount = body["amount"].as_i64().unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "id": "order_MockAbc123",
            "entity": "order",
            "amount": amount,
            "currency": body["currency"],
            "receipt": body["receipt"],
            "status": "created",
        })),
    )
}

/// Start the stand-in and return app state wired to it
async fn app_with_mock_gateway() -> (TestApp, MockGateway) {
    let mock = MockGateway::default();
    let router = Router::new()
        .route("/v1/orders", post(mock_create_order))
        .with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let mut app = TestApp::new();
    app.config = Config {
        razorpay_api_base: format!("http://{addr}/v1"),
        ..Config::for_tests()
    };
    app.state = AppState::new(&app.config).await.unwrap();
    (app, mock)
}

#[tokio::test]
async fn test_create_intent_through_gateway() {
    let (app, mock) = app_with_mock_gateway().await;
    let token = app.token("u1", Role::Customer);

    let (status, json) = app
        .call(
            "POST",
            "/payment/create-order",
            Some(&token),
            Some(json!({ "amount": 30000, "currency": "INR", "receipt": "rcpt_1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["gateway_order_id"], "order_MockAbc123");
    assert_eq!(json["data"]["amount"], 30000);
    assert_eq!(json["data"]["currency"], "INR");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);

    // Legacy alias, default currency
    let (status, json) = app
        .call(
            "POST",
            "/create-order",
            Some(&token),
            Some(json!({ "amount": 500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["currency"], "INR");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_amounts_never_reach_gateway() {
    let (app, mock) = app_with_mock_gateway().await;
    let token = app.token("u1", Role::Customer);

    for amount in [json!(0), json!(-5), json!(12.5)] {
        let (status, json) = app
            .call(
                "POST",
                "/payment/create-order",
                Some(&token),
                Some(json!({ "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");
        assert_eq!(json["code"], 5006);
    }
    assert_eq!(mock.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_gateway_is_bad_gateway() {
    // for_tests() points the gateway at a closed port
    let mut app = TestApp::new();
    app.state = AppState::new(&app.config).await.unwrap();
    let token = app.token("u1", Role::Customer);

    let (status, json) = app
        .call(
            "POST",
            "/payment/create-order",
            Some(&token),
            Some(json!({ "amount": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], 5009);
}

#[tokio::test]
async fn test_verify_payment_endpoint() {
    let app = TestApp::new();
    let token = app.token("u1", Role::Customer);
    let good = serde_json::to_value(app.confirmation("pay_1")).unwrap();

    let (status, json) = app
        .call("POST", "/payment/verify-payment", Some(&token), Some(good.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["verified"], true);

    let mut forged = good.clone();
    forged["razorpay_payment_id"] = json!("pay_2");
    let (status, json) = app
        .call("POST", "/verify-payment", Some(&token), Some(forged))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["verified"], false);

    let mut empty = good;
    empty["razorpay_signature"] = json!("");
    let (status, json) = app
        .call("POST", "/payment/verify-payment", Some(&token), Some(empty))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 5007);

    let (status, _) = app
        .call("POST", "/payment/verify-payment", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//! Shared fixtures for server integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use bitebox_server::auth::Role;
use bitebox_server::db::MemoryOrderStore;
use bitebox_server::payment::{self, GatewayError, PaymentGateway};
use bitebox_server::{AppState, Config};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use shared::order::{CreateOrderRequest, OrderLine, PaymentMethod};
use shared::payment::{PaymentConfirmation, PaymentIntent};
use shared::restaurant::RestaurantInfo;
use tower::ServiceExt;

pub const RESTAURANT_ID: &str = "r1";

/// Gateway stand-in that hands out sequential intent ids
#[derive(Default)]
pub struct StubGateway {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentIntent {
            gateway_order_id: format!("order_stub_{n}"),
            amount,
            currency: currency.to_string(),
            receipt: receipt.map(String::from),
        })
    }
}

pub fn restaurant() -> RestaurantInfo {
    RestaurantInfo {
        id: RESTAURANT_ID.into(),
        name: "Dosa Corner".into(),
        location: "Block A, Ground Floor".into(),
    }
}

pub struct TestApp {
    pub config: Config,
    pub state: AppState,
    pub gateway: Arc<StubGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::for_tests();
        let gateway = Arc::new(StubGateway::default());
        let store = Arc::new(MemoryOrderStore::with_restaurants([restaurant()]));
        let state = AppState::with_parts(&config, store, gateway.clone());
        Self {
            config,
            state,
            gateway,
        }
    }

    pub fn router(&self) -> Router {
        bitebox_server::api::create_router(self.state.clone())
    }

    pub fn token(&self, user_id: &str, role: Role) -> String {
        self.state
            .jwt
            .generate_token(user_id, user_id, role)
            .unwrap()
    }

    pub fn confirmation(&self, payment_id: &str) -> PaymentConfirmation {
        let order_id = format!("order_for_{payment_id}");
        PaymentConfirmation {
            signature: payment::sign(&order_id, payment_id, &self.config.razorpay_key_secret)
                .unwrap(),
            gateway_order_id: order_id,
            gateway_payment_id: payment_id.into(),
        }
    }

    /// Issue one request against a fresh router, returning status and JSON body
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

/// A cart of (A 100 × 2, B 50 × 1): subtotal 250, fee 30, tax 20, total 300
pub fn order_request(payment: Option<PaymentConfirmation>) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: "Asha".into(),
        restaurant_id: RESTAURANT_ID.into(),
        lines: vec![
            OrderLine {
                food_id: "A".into(),
                name: "Masala Dosa".into(),
                quantity: 2,
                unit_price: dec!(100),
            },
            OrderLine {
                food_id: "B".into(),
                name: "Filter Coffee".into(),
                quantity: 1,
                unit_price: dec!(50),
            },
        ],
        total_amount: dec!(300),
        delivery_fee: dec!(30),
        tax: dec!(20),
        payment_method: if payment.is_some() {
            PaymentMethod::Online
        } else {
            PaymentMethod::Cash
        },
        payment,
        note: None,
    }
}

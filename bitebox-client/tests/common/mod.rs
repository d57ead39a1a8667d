//! In-process order server and sandbox checkout for client tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bitebox_client::{
    CheckoutPrefill, CheckoutResolver, ClientConfig, HostedCheckout, HttpClient, PaymentError,
    PaymentIntent,
};
use bitebox_server::auth::Role;
use bitebox_server::db::MemoryOrderStore;
use bitebox_server::payment::{self, GatewayError, PaymentGateway};
use bitebox_server::{AppState, Config};
use rust_decimal_macros::dec;
use shared::payment::PaymentConfirmation;
use shared::restaurant::{MenuItem, RestaurantInfo};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const RESTAURANT_ID: &str = "r1";

/// Records every amount it is asked to reserve
#[derive(Default)]
pub struct RecordingGateway {
    pub amounts: Mutex<Vec<i64>>,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut amounts = self.amounts.lock().unwrap();
        amounts.push(amount);
        Ok(PaymentIntent {
            gateway_order_id: format!("order_sandbox_{}", amounts.len()),
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

pub fn item_a() -> MenuItem {
    MenuItem {
        id: "A".into(),
        name: "Masala Dosa".into(),
        price: dec!(100),
        is_available: true,
    }
}

pub fn item_b() -> MenuItem {
    MenuItem {
        id: "B".into(),
        name: "Filter Coffee".into(),
        price: dec!(50),
        is_available: true,
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub config: Config,
    pub state: AppState,
    pub gateway: Arc<RecordingGateway>,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let config = Config::for_tests();
        let gateway = Arc::new(RecordingGateway::default());
        let store = Arc::new(MemoryOrderStore::with_restaurants([restaurant()]));
        let state = AppState::with_parts(&config, store, gateway.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(bitebox_server::serve(listener, state.clone(), async move {
            rx.await.ok();
        }));

        Self {
            addr,
            config,
            state,
            gateway,
            _shutdown: tx,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.addr))
            .with_request_timeout(Duration::from_secs(5))
    }

    pub fn client(&self, user_id: &str, role: Role) -> HttpClient {
        let token = self
            .state
            .jwt
            .generate_token(user_id, user_id, role)
            .unwrap();
        HttpClient::new(&self.client_config()).unwrap().with_token(token)
    }

    pub fn secret(&self) -> String {
        self.config.razorpay_key_secret.clone()
    }
}

/// What the sandbox checkout does once opened
#[derive(Debug, Clone)]
pub enum Sandbox {
    /// Pay with a fresh payment id
    Pay,
    /// Pay with a fixed payment id
    PayWith(String),
    Cancel,
    /// Close the UI without reporting anything
    Close,
    /// Never answer
    Hang,
}

/// Hosted checkout stand-in that signs confirmations with the merchant secret
pub struct SandboxCheckout {
    secret: String,
    pub behaviour: Mutex<Sandbox>,
    pub opened: AtomicUsize,
    pub intents: Mutex<Vec<PaymentIntent>>,
    held: Mutex<Vec<CheckoutResolver>>,
}

impl SandboxCheckout {
    pub fn new(secret: impl Into<String>, behaviour: Sandbox) -> Self {
        Self {
            secret: secret.into(),
            behaviour: Mutex::new(behaviour),
            opened: AtomicUsize::new(0),
            intents: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, behaviour: Sandbox) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    fn confirmation(&self, intent: &PaymentIntent, payment_id: String) -> PaymentConfirmation {
        PaymentConfirmation {
            signature: payment::sign(&intent.gateway_order_id, &payment_id, &self.secret).unwrap(),
            gateway_order_id: intent.gateway_order_id.clone(),
            gateway_payment_id: payment_id,
        }
    }
}

#[async_trait]
impl HostedCheckout for SandboxCheckout {
    async fn open(
        &self,
        intent: &PaymentIntent,
        _prefill: &CheckoutPrefill,
        resolver: CheckoutResolver,
    ) -> Result<(), PaymentError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        self.intents.lock().unwrap().push(intent.clone());
        let behaviour = self.behaviour.lock().unwrap().clone();
        match behaviour {
            Sandbox::Pay => resolver.confirm(self.confirmation(intent, format!("pay_sandbox_{n}"))),
            Sandbox::PayWith(payment_id) => {
                resolver.confirm(self.confirmation(intent, payment_id))
            }
            Sandbox::Cancel => resolver.cancel(),
            Sandbox::Close => drop(resolver),
            Sandbox::Hang => self.held.lock().unwrap().push(resolver),
        }
        Ok(())
    }
}

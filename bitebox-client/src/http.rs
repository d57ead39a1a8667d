//! HTTP client for the order server API

use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::order::{
    CreateOrderRequest, Order, OrderCountResponse, OrderStatus, UpdateStatusRequest,
};
use shared::payment::{
    CreateIntentRequest, PaymentConfirmation, PaymentIntent, VerifyPaymentResponse,
};

use crate::{ClientConfig, ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Unwrap the `ApiResponse` envelope, turning error envelopes into
    /// [`ClientError::Api`]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                // Non-envelope failure (proxy, extractor rejection)
                let code = match status.as_u16() {
                    401 => ErrorCode::NotAuthenticated,
                    403 => ErrorCode::PermissionDenied,
                    404 => ErrorCode::NotFound,
                    400 | 415 | 422 => ErrorCode::InvalidRequest,
                    502 | 503 => ErrorCode::NetworkError,
                    _ => ErrorCode::Unknown,
                };
                let text = String::from_utf8_lossy(&bytes).into_owned();
                return Err(ClientError::Api(AppError::with_message(code, text)));
            }
            Err(e) => return Err(e.into()),
        };

        envelope
            .into_result()
            .map_err(ClientError::Api)?
            .ok_or_else(|| ClientError::InvalidResponse(format!("{status}: missing data")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    /// GET, retried once on a transient failure
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        match self.get(path).await {
            Err(e) if e.is_transient() => {
                tracing::debug!(path, error = %e, "Retrying read");
                self.get(path).await
            }
            other => other,
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.send(Method::PUT, path, Some(body)).await
    }

    // ========== Payment API ==========

    /// Create a payment intent for `amount` minor units
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: Option<&str>,
    ) -> ClientResult<PaymentIntent> {
        let request = CreateIntentRequest {
            amount: amount.into(),
            currency: Some(currency.to_string()),
            receipt: receipt.map(String::from),
        };
        self.post("/payment/create-order", &request).await
    }

    pub async fn verify_payment(&self, confirmation: &PaymentConfirmation) -> ClientResult<bool> {
        let resp: VerifyPaymentResponse =
            self.post("/payment/verify-payment", confirmation).await?;
        Ok(resp.verified)
    }

    // ========== Order API ==========

    /// Never retried: a lost response may still have created the order.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        self.post("/orders", request).await
    }

    pub async fn get_order(&self, id: i64) -> ClientResult<Order> {
        self.get_with_retry(&format!("/orders/id/{id}")).await
    }

    pub async fn list_orders_for_user(&self, user_id: &str) -> ClientResult<Vec<Order>> {
        self.get_with_retry(&format!("/orders/{user_id}")).await
    }

    /// Staff only
    pub async fn list_all_orders(&self) -> ClientResult<Vec<Order>> {
        self.get_with_retry("/orders").await
    }

    /// Staff only
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> ClientResult<Order> {
        self.put(
            &format!("/orders/{id}/status"),
            &UpdateStatusRequest { status },
        )
        .await
    }

    pub async fn order_count(&self) -> ClientResult<i64> {
        let resp: OrderCountResponse = self.get_with_retry("/orders/count").await?;
        Ok(resp.count)
    }
}

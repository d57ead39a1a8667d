//! Razorpay REST client (no SDK dependency)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::payment::PaymentIntent;
use std::time::Duration;

use super::{GatewayError, PaymentGateway};

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a str>,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    receipt: Option<String>,
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(
        api_base: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency,
                receipt,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let order: OrderResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        if order.amount != amount {
            return Err(GatewayError::Malformed(format!(
                "gateway reserved {} instead of {amount}",
                order.amount
            )));
        }

        Ok(PaymentIntent {
            gateway_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            receipt: order.receipt,
        })
    }
}

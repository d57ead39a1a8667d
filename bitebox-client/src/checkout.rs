//! Checkout orchestration
//!
//! cart → quote → validate → payment intent → hosted checkout → create
//! order → clear.
//!
//! The cart is only cleared once the server has returned the saved order, so
//! every failure leaves it intact for another attempt.

use std::sync::Arc;
use std::time::Duration;

use shared::money::{PricingPolicy, to_minor_units};
use shared::order::{CreateOrderRequest, Order, PaymentMethod, validate_create};
use shared::payment::{CheckoutPrefill, PaymentConfirmation};

use crate::cart::CartStore;
use crate::error::CheckoutError;
use crate::http::HttpClient;
use crate::payment::{HostedCheckout, collect_payment};
use crate::ClientConfig;

/// Customer-supplied part of an order
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub prefill: CheckoutPrefill,
    pub note: Option<String>,
}

impl CheckoutDetails {
    /// Online payment, prefilled with the customer's name
    pub fn online(customer_name: impl Into<String>) -> Self {
        let customer_name = customer_name.into();
        Self {
            prefill: CheckoutPrefill {
                name: customer_name.clone(),
                ..Default::default()
            },
            customer_name,
            payment_method: PaymentMethod::Online,
            note: None,
        }
    }

    pub fn cash(customer_name: impl Into<String>) -> Self {
        Self {
            payment_method: PaymentMethod::Cash,
            ..Self::online(customer_name)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

pub struct CheckoutFlow {
    api: HttpClient,
    checkout: Arc<dyn HostedCheckout>,
    pricing: PricingPolicy,
    currency: String,
    timeout: Duration,
}

impl CheckoutFlow {
    pub fn new(config: &ClientConfig, api: HttpClient, checkout: Arc<dyn HostedCheckout>) -> Self {
        Self {
            api,
            checkout,
            pricing: config.pricing,
            currency: config.currency.clone(),
            timeout: config.checkout_timeout,
        }
    }

    pub fn api(&self) -> &HttpClient {
        &self.api
    }

    /// Place an order for one restaurant's cart.
    ///
    /// Order creation is never retried here: a failed create after a
    /// captured payment surfaces as [`CheckoutError::OrderNotSaved`].
    pub async fn place_order(
        &self,
        cart: &mut CartStore,
        restaurant_id: &str,
        details: &CheckoutDetails,
    ) -> Result<Order, CheckoutError> {
        let lines = cart.order_lines(restaurant_id);
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart(restaurant_id.to_string()));
        }
        let quote = cart.quote(restaurant_id, &self.pricing);

        let mut request = CreateOrderRequest {
            customer_name: details.customer_name.clone(),
            restaurant_id: restaurant_id.to_string(),
            lines,
            total_amount: quote.total,
            delivery_fee: quote.delivery_fee,
            tax: quote.tax,
            payment_method: details.payment_method,
            payment: None,
            note: details.note.clone(),
        };
        // Same checks the server runs; anything it would refuse must fail
        // here, before the customer is charged.
        validate_create(&request, &self.pricing)?;

        if details.payment_method == PaymentMethod::Online {
            request.payment = Some(self.collect(restaurant_id, quote.total, details).await?);
        }

        let order = match self.api.create_order(&request).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(
                    restaurant_id,
                    payment_id = request.payment.as_ref().map(|p| p.gateway_payment_id.as_str()),
                    error = %e,
                    "Order creation failed after checkout"
                );
                return Err(CheckoutError::OrderNotSaved(e));
            }
        };

        cart.clear(restaurant_id);
        tracing::info!(
            order_id = order.id,
            order_number = order.order_number,
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    async fn collect(
        &self,
        restaurant_id: &str,
        total: rust_decimal::Decimal,
        details: &CheckoutDetails,
    ) -> Result<PaymentConfirmation, CheckoutError> {
        let amount = to_minor_units(total)?;
        let receipt = format!("rcpt_{restaurant_id}_{}", shared::util::now_millis());
        let intent = self
            .api
            .create_payment_intent(amount, &self.currency, Some(&receipt))
            .await
            .map_err(CheckoutError::Intent)?;
        tracing::debug!(
            gateway_order_id = %intent.gateway_order_id,
            amount,
            "Payment intent created"
        );

        let confirmation =
            collect_payment(self.checkout.as_ref(), &intent, &details.prefill, self.timeout)
                .await
                .inspect_err(|e| tracing::info!(error = %e, "Checkout did not complete"))?;
        Ok(confirmation)
    }
}

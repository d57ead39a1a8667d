//! Payment gateway adapter (client half)
//!
//! The hosted checkout is an external UI. [`collect_payment`] opens it with a
//! single-use [`CheckoutResolver`] and waits for the UI callback to resolve
//! it, bounded by a timeout.

use async_trait::async_trait;
use shared::payment::{CheckoutPrefill, PaymentConfirmation, PaymentIntent};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::PaymentError;

/// How a hosted checkout ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Confirmed(PaymentConfirmation),
    Cancelled,
    Failed { reason: String },
}

/// Completes one checkout. Consumed on use, so a checkout resolves at most
/// once; dropping it unresolved counts as a failure.
#[derive(Debug)]
pub struct CheckoutResolver {
    tx: oneshot::Sender<CheckoutOutcome>,
}

impl CheckoutResolver {
    pub fn resolve(self, outcome: CheckoutOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("Checkout resolved after the caller stopped waiting");
        }
    }

    pub fn confirm(self, confirmation: PaymentConfirmation) {
        self.resolve(CheckoutOutcome::Confirmed(confirmation));
    }

    pub fn cancel(self) {
        self.resolve(CheckoutOutcome::Cancelled);
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.resolve(CheckoutOutcome::Failed {
            reason: reason.into(),
        });
    }
}

/// Launches the provider's hosted checkout UI
#[async_trait]
pub trait HostedCheckout: Send + Sync {
    /// Present the checkout for `intent`. Returns once the UI is open; the
    /// result arrives later through `resolver`.
    async fn open(
        &self,
        intent: &PaymentIntent,
        prefill: &CheckoutPrefill,
        resolver: CheckoutResolver,
    ) -> Result<(), PaymentError>;
}

/// Run one hosted checkout to completion.
///
/// `Cancelled` and `Timeout` are distinct so the UI can word them
/// differently; a checkout that ends without a result is `Failed`.
pub async fn collect_payment(
    checkout: &dyn HostedCheckout,
    intent: &PaymentIntent,
    prefill: &CheckoutPrefill,
    timeout: Duration,
) -> Result<PaymentConfirmation, PaymentError> {
    let (tx, rx) = oneshot::channel();
    checkout
        .open(intent, prefill, CheckoutResolver { tx })
        .await?;

    let outcome = match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => {
            return Err(PaymentError::Failed {
                reason: "checkout closed without a result".into(),
            });
        }
        Err(_) => {
            tracing::warn!(
                gateway_order_id = %intent.gateway_order_id,
                timeout_ms = timeout.as_millis() as u64,
                "Hosted checkout timed out"
            );
            return Err(PaymentError::Timeout);
        }
    };

    match outcome {
        CheckoutOutcome::Confirmed(confirmation) => {
            if confirmation.gateway_order_id != intent.gateway_order_id {
                return Err(PaymentError::Failed {
                    reason: format!(
                        "confirmation is for {}, expected {}",
                        confirmation.gateway_order_id, intent.gateway_order_id
                    ),
                });
            }
            Ok(confirmation)
        }
        CheckoutOutcome::Cancelled => Err(PaymentError::Cancelled),
        CheckoutOutcome::Failed { reason } => Err(PaymentError::Failed { reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Resolves with a fixed behaviour
    enum Behaviour {
        Confirm(String),
        Cancel,
        Fail,
        Drop,
        /// Keep the resolver and never answer
        Hang,
    }

    struct ScriptedCheckout {
        behaviour: Behaviour,
        held: Mutex<Option<CheckoutResolver>>,
    }

    impl ScriptedCheckout {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                held: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl HostedCheckout for ScriptedCheckout {
        async fn open(
            &self,
            intent: &PaymentIntent,
            _prefill: &CheckoutPrefill,
            resolver: CheckoutResolver,
        ) -> Result<(), PaymentError> {
            match &self.behaviour {
                Behaviour::Confirm(order_id) => {
                    let order_id = order_id.clone();
                    let payment_id = format!("pay_for_{}", intent.gateway_order_id);
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        resolver.confirm(PaymentConfirmation {
                            gateway_order_id: order_id,
                            gateway_payment_id: payment_id,
                            signature: "sig".into(),
                        });
                    });
                }
                Behaviour::Cancel => resolver.cancel(),
                Behaviour::Fail => resolver.fail("card declined"),
                Behaviour::Drop => drop(resolver),
                Behaviour::Hang => *self.held.lock().unwrap() = Some(resolver),
            }
            Ok(())
        }
    }

    fn intent() -> PaymentIntent {
        PaymentIntent {
            gateway_order_id: "order_1".into(),
            amount: 30000,
            currency: "INR".into(),
            receipt: None,
        }
    }

    async fn run(behaviour: Behaviour) -> Result<PaymentConfirmation, PaymentError> {
        let checkout = ScriptedCheckout::new(behaviour);
        collect_payment(
            &checkout,
            &intent(),
            &CheckoutPrefill::default(),
            Duration::from_millis(100),
        )
        .await
    }

    #[tokio::test]
    async fn test_confirmed_checkout_returns_confirmation() {
        let confirmation = run(Behaviour::Confirm("order_1".into())).await.unwrap();
        assert_eq!(confirmation.gateway_payment_id, "pay_for_order_1");
    }

    #[tokio::test]
    async fn test_confirmation_for_another_intent_fails() {
        let err = run(Behaviour::Confirm("order_other".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_outcomes_map_to_distinct_errors() {
        assert_eq!(run(Behaviour::Cancel).await.unwrap_err(), PaymentError::Cancelled);
        assert_eq!(
            run(Behaviour::Fail).await.unwrap_err(),
            PaymentError::Failed {
                reason: "card declined".into()
            }
        );
        assert!(matches!(
            run(Behaviour::Drop).await.unwrap_err(),
            PaymentError::Failed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_checkout_times_out() {
        assert_eq!(run(Behaviour::Hang).await.unwrap_err(), PaymentError::Timeout);
    }
}

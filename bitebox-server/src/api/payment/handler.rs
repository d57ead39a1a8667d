//! Payment API handlers

use axum::{Json, extract::State};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::payment::{
    CreateIntentRequest, PaymentConfirmation, PaymentIntent, VerifyPaymentResponse,
};

use crate::auth::CurrentUser;
use crate::payment::{self, Verification};
use crate::state::AppState;

/// Reserve the amount (minor units) with the gateway
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateIntentRequest>,
) -> AppResult<ApiResponse<PaymentIntent>> {
    let currency = req.currency.as_deref().unwrap_or(&state.currency);
    tracing::debug!(user_id = %user.id, amount = %req.amount, currency, "Create payment intent");

    let intent = payment::create_intent(
        state.gateway.as_ref(),
        req.amount,
        currency,
        req.receipt.as_deref(),
    )
    .await?;
    Ok(ApiResponse::success(intent))
}

/// Check a checkout confirmation without creating an order
pub async fn verify_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(confirmation): Json<PaymentConfirmation>,
) -> AppResult<ApiResponse<VerifyPaymentResponse>> {
    let verification = payment::verify(&confirmation, &state.key_secret)
        .map_err(|e| AppError::with_message(ErrorCode::PaymentVerificationFailed, e.to_string()))?;

    if verification == Verification::Rejected {
        tracing::warn!(
            user_id = %user.id,
            gateway_order_id = %confirmation.gateway_order_id,
            "Payment signature rejected"
        );
    }

    Ok(ApiResponse::success(VerifyPaymentResponse {
        verified: verification.is_verified(),
    }))
}

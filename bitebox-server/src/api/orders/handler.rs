//! Order API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppError};
use shared::order::{CreateOrderRequest, Order, OrderCountResponse, UpdateStatusRequest};

use crate::auth::{CurrentUser, StaffUser};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Create an order from a verified checkout
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> ServiceResult<ApiResponse<Order>> {
    let order = state.orders.create_order(&user, req).await?;
    Ok(ApiResponse::success(order))
}

/// All orders, newest first
pub async fn list_all(
    State(state): State<AppState>,
    StaffUser(_staff): StaffUser,
) -> ServiceResult<ApiResponse<Vec<Order>>> {
    Ok(ApiResponse::success(state.orders.list_all_orders().await?))
}

/// One user's orders, newest first
pub async fn list_for_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
) -> ServiceResult<ApiResponse<Vec<Order>>> {
    if !user.can_access_user(&user_id) {
        return Err(AppError::permission_denied("Cannot read another user's orders").into());
    }
    Ok(ApiResponse::success(
        state.orders.list_orders_for_user(&user_id).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ServiceResult<ApiResponse<Order>> {
    let order = state.orders.get_order(id).await?;
    if !user.can_access_user(&order.user_id) {
        return Err(AppError::permission_denied("Cannot read another user's order").into());
    }
    Ok(ApiResponse::success(order))
}

pub async fn update_status(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ServiceResult<ApiResponse<Order>> {
    tracing::debug!(order_id = id, staff_id = %staff.id, status = %req.status, "Status change requested");
    let order = state.orders.update_status(id, req.status).await?;
    Ok(ApiResponse::success(order))
}

pub async fn count(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ServiceResult<ApiResponse<OrderCountResponse>> {
    let count = state.orders.order_count().await?;
    Ok(ApiResponse::success(OrderCountResponse { count }))
}

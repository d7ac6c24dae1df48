//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::handlers::{BalanceHandler, WithdrawCommand, WithdrawHandler};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// JSON number or decimal string
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: i64,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub user_id: i64,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub transaction_id: i64,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/balance/:user_id", get(get_balance))
        .route("/withdraw/:user_id", post(withdraw))
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Path segments are parsed here so malformed IDs get the JSON error envelope
fn parse_user_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidUserId(raw.to_string()))
}

// =========================================================================
// GET /balance/:user_id
// =========================================================================

/// Get wallet balance
async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let user_id = parse_user_id(&user_id)?;

    let handler = BalanceHandler::new(state.store.clone());
    let result = handler.execute(user_id).await?;

    Ok(Json(BalanceResponse {
        user_id: result.user_id,
        balance: result.balance,
    }))
}

// =========================================================================
// POST /withdraw/:user_id
// =========================================================================

/// Withdraw from wallet
async fn withdraw(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<WithdrawResponse>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let handler = WithdrawHandler::new(state.store.clone());
    let result = handler
        .execute(WithdrawCommand::new(user_id, request.amount))
        .await?;

    tracing::info!(
        user_id = result.user_id,
        amount = %result.amount,
        balance_after = %result.balance_after,
        transaction_id = result.transaction_id,
        "Withdrawal committed"
    );

    Ok(Json(WithdrawResponse {
        user_id: result.user_id,
        amount: result.amount,
        balance_before: result.balance_before,
        balance_after: result.balance_after,
        transaction_id: result.transaction_id,
    }))
}

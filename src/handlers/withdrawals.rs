//! User withdrawal handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use tracing::info;

use super::{WithdrawalView, require_user};
use crate::{account, db, error::ApiError, money::Money, state::AppState};

/// Withdrawal request body.
#[derive(Deserialize, Debug)]
pub struct WithdrawRequest {
    /// Requested amount as a decimal string.
    pub amount: Money,
}

/// `POST /api/withdrawals` — open a pending withdrawal request.
///
/// # Errors
/// Returns a conflict when a pending request already exists or the balance
/// does not cover the amount.
pub async fn request_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<WithdrawalView>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    let request = account::request_withdrawal(&mut conn, user.id, req.amount).await?;
    info!(user_id = user.id, amount = %req.amount, "withdrawal requested");
    Ok(Json(WithdrawalView::from(request)))
}

/// `GET /api/withdrawals` — the caller's withdrawal history, newest first.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] for unauthenticated callers.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WithdrawalView>>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    let rows = db::list_withdrawals_for_user(&mut conn, user.id).await?;
    Ok(Json(rows.into_iter().map(WithdrawalView::from).collect()))
}

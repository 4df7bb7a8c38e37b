//! Deposit handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AccountView, DepositView, EventView, require_user};
use crate::{account, db, error::ApiError, money::Money, state::AppState};

/// Deposit request body.
#[derive(Deserialize, Debug)]
pub struct DepositRequest {
    /// Deposited amount as a decimal string.
    pub amount: Money,
}

/// Response to a recorded deposit.
#[derive(Serialize, Debug)]
pub struct DepositResponse {
    /// Account after the deposit.
    pub account: AccountView,
    /// Audit events the deposit produced.
    pub events: Vec<EventView>,
}

/// `POST /api/deposits` — record a deposit, releasing any gated payouts.
///
/// # Errors
/// Returns a validation error for non-positive amounts.
pub async fn create_deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    let outcome = account::record_deposit(&mut conn, user.id, req.amount).await?;
    info!(user_id = user.id, amount = %req.amount, "deposit recorded");
    Ok(Json(DepositResponse {
        account: AccountView::new(&user, &outcome.state),
        events: EventView::from_events(&outcome.events),
    }))
}

/// `GET /api/deposits` — the caller's deposit history, newest first.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] for unauthenticated callers.
pub async fn list_deposits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DepositView>>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    let rows = db::list_deposits_for_user(&mut conn, user.id).await?;
    Ok(Json(rows.into_iter().map(DepositView::from).collect()))
}

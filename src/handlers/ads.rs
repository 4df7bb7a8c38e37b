//! Ad listing and click handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use tracing::debug;

use super::{AccountView, AdView, EventView, require_user};
use crate::{account, db, error::ApiError, state::AppState};

/// Response to a completed ad click.
#[derive(Serialize, Debug)]
pub struct ClickResponse {
    /// Account after the click.
    pub account: AccountView,
    /// Audit events the click produced.
    pub events: Vec<EventView>,
}

/// `GET /api/ads` — ads currently available to the caller.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] for unauthenticated callers.
pub async fn list_ads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdView>>, ApiError> {
    let mut conn = state.conn().await?;
    require_user(&state, &headers, &mut conn).await?;
    let ads = db::list_active_ads(&mut conn).await?;
    Ok(Json(ads.into_iter().map(AdView::from).collect()))
}

/// `POST /api/ads/{id}/click` — record a completed view and credit it.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for unknown or inactive ads and a
/// conflict when the account is locked or awaiting a deposit.
pub async fn click_ad(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ad_id): Path<i32>,
) -> Result<Json<ClickResponse>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    let outcome = account::click_ad(&mut conn, user.id, ad_id).await?;
    debug!(user_id = user.id, ad_id, "ad click recorded");
    Ok(Json(ClickResponse {
        account: AccountView::new(&user, &outcome.state),
        events: EventView::from_events(&outcome.events),
    }))
}

//! Admin surface handlers.
//!
//! Every handler here authenticates the caller and requires `is_admin`
//! before touching the addressed user, ad, or withdrawal request.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use tracing::info;

use super::{AccountView, AdView, LedgerEntryView, WithdrawalView, require_admin};
use crate::{
    account::{self, AdjustTarget},
    db,
    error::ApiError,
    ledger::{AdjustOp, Milestone, MilestoneKind, MoneyField},
    models::{NewAd, NewUser, WithdrawStatus},
    money::Money,
    passwords,
    state::AppState,
};

/// Rows returned per ledger page.
const LEDGER_PAGE: i64 = 100;

/// Body for `POST /api/admin/users`.
#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    /// Login name for the new account.
    pub username: String,
    /// Plaintext password for the new account.
    pub password: String,
    /// Whether the account gets admin rights.
    #[serde(default)]
    pub is_admin: bool,
}

/// Body for `POST /api/admin/users/{id}/balance`.
#[derive(Deserialize, Debug)]
pub struct AdjustRequest {
    /// Field to mutate: `milestone_amount`, `milestone_reward`,
    /// `destination_amount`, or `points`.
    pub field: String,
    /// Operation: `set`, `add`, or `reset`.
    pub op: String,
    /// Amount; decimal string for money fields, integer string for points.
    /// Ignored for `reset`.
    pub amount: Option<String>,
}

/// Body for `PUT /api/admin/users/{id}/restriction`.
#[derive(Deserialize, Debug)]
pub struct RestrictionRequest {
    /// Ads that must be completed under the restriction.
    pub ads_limit: i32,
    /// Deposit required to release the escrow.
    pub deposit: Money,
    /// Per-ad commission while restricted.
    pub commission: Money,
}

/// Body for `PUT /api/admin/users/{id}/milestone`.
#[derive(Deserialize, Debug)]
pub struct MilestoneRequest {
    /// Target completed-ad count.
    pub target: i32,
    /// Payout behaviour: `voucher` or `bonus`.
    pub kind: String,
    /// Prize on completion.
    pub prize: Money,
}

/// Body for `POST /api/admin/ads`.
#[derive(Deserialize, Debug)]
pub struct CreateAdRequest {
    /// Display title.
    pub title: String,
    /// Reward per completed view.
    pub price: Money,
    /// Whether the ad is served immediately; defaults to true.
    pub active: Option<bool>,
}

/// Body for `PATCH /api/admin/ads/{id}`.
#[derive(Deserialize, Debug)]
pub struct UpdateAdRequest {
    /// New display title.
    pub title: Option<String>,
    /// New per-view reward.
    pub price: Option<Money>,
    /// New serving state.
    pub active: Option<bool>,
}

/// Query string for `GET /api/admin/withdrawals`.
#[derive(Deserialize, Debug, Default)]
pub struct WithdrawalFilter {
    /// Restrict to one lifecycle state.
    pub status: Option<String>,
}

/// `GET /api/admin/users` — every account with balances.
///
/// # Errors
/// Returns [`ApiError::Forbidden`] for non-admin callers.
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let users = db::list_users(&mut conn).await?;
    Ok(Json(users.iter().map(AccountView::from_user).collect()))
}

/// `GET /api/admin/users/{id}` — one account with balances.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user.
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let user = db::get_user(&mut conn, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(AccountView::from_user(&user)))
}

/// `POST /api/admin/users` — create an account.
///
/// # Errors
/// Returns a validation error for empty fields and a conflict for a taken
/// username.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "username and password must be non-empty".to_owned(),
        ));
    }
    let hashed = passwords::hash_password(&state.argon2, &req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;
    let new_user = NewUser {
        username: &req.username,
        password: &hashed,
        is_admin: req.is_admin,
        created_at: Utc::now().naive_utc(),
    };
    let user_id = db::create_user(&mut conn, &new_user)
        .await
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::Conflict(format!("username '{}' is taken", req.username))
            }
            other => ApiError::Db(other),
        })?;
    info!(username = %req.username, user_id, "user created");
    let user = db::get_user(&mut conn, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(AccountView::from_user(&user)))
}

/// `GET /api/admin/users/{id}/ledger` — a user's audit trail.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user.
pub async fn user_ledger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<LedgerEntryView>>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    db::get_user(&mut conn, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let entries = db::list_entries_for_user(&mut conn, user_id, LEDGER_PAGE).await?;
    Ok(Json(entries.into_iter().map(LedgerEntryView::from).collect()))
}

/// `POST /api/admin/users/{id}/balance` — set/add/reset a named field.
///
/// # Errors
/// Returns a validation error for unknown fields or operations and a
/// bad-request when the result would be negative.
pub async fn adjust_balance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let op = AdjustOp::parse(&req.op)
        .ok_or_else(|| ApiError::Validation(format!("unknown operation '{}'", req.op)))?;
    let target = parse_target(&req, op)?;
    account::adjust_balance(&mut conn, user_id, target, op).await?;
    info!(user_id, field = %req.field, op = %req.op, "balance adjusted");
    reload_view(&mut conn, user_id).await
}

/// `PUT /api/admin/users/{id}/restriction` — impose a restriction.
///
/// # Errors
/// Returns a validation error for non-positive quota or commission.
pub async fn put_restriction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
    Json(req): Json<RestrictionRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    account::impose_restriction(&mut conn, user_id, req.ads_limit, req.deposit, req.commission)
        .await?;
    info!(user_id, ads_limit = req.ads_limit, "restriction imposed");
    reload_view(&mut conn, user_id).await
}

/// `DELETE /api/admin/users/{id}/restriction` — lift a restriction.
///
/// Any escrowed earnings are released to the withdrawable balance.
///
/// # Errors
/// Returns [`ApiError::NotFound`] when no restriction is imposed.
pub async fn delete_restriction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    account::lift_restriction(&mut conn, user_id).await?;
    info!(user_id, "restriction lifted");
    reload_view(&mut conn, user_id).await
}

/// `PUT /api/admin/users/{id}/milestone` — configure the milestone.
///
/// # Errors
/// Returns a validation error for an unknown kind and a conflict while the
/// account is voucher-locked.
pub async fn put_milestone(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
    Json(req): Json<MilestoneRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let kind = MilestoneKind::parse(&req.kind)
        .ok_or_else(|| ApiError::Validation(format!("unknown milestone kind '{}'", req.kind)))?;
    let milestone = Milestone {
        target: req.target,
        kind,
        prize: req.prize,
    };
    account::set_milestone(&mut conn, user_id, milestone).await?;
    info!(user_id, target = req.target, kind = %req.kind, "milestone configured");
    reload_view(&mut conn, user_id).await
}

/// `GET /api/admin/ads` — every ad, including inactive ones.
///
/// # Errors
/// Returns [`ApiError::Forbidden`] for non-admin callers.
pub async fn list_ads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdView>>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let ads = db::list_ads(&mut conn).await?;
    Ok(Json(ads.into_iter().map(AdView::from).collect()))
}

/// `POST /api/admin/ads` — create an ad.
///
/// # Errors
/// Returns a validation error for an empty title or non-positive price.
pub async fn create_ad(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAdRequest>,
) -> Result<Json<AdView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    if req.title.is_empty() {
        return Err(ApiError::Validation("title must be non-empty".to_owned()));
    }
    if !req.price.is_positive() {
        return Err(ApiError::Validation("price must be positive".to_owned()));
    }
    let ad_id = db::create_ad(
        &mut conn,
        &NewAd {
            title: &req.title,
            price: req.price.minor_units(),
            active: req.active.unwrap_or(true),
            created_at: Utc::now().naive_utc(),
        },
    )
    .await?;
    info!(ad_id, title = %req.title, "ad created");
    let ad = db::get_ad(&mut conn, ad_id)
        .await?
        .ok_or(ApiError::NotFound("ad"))?;
    Ok(Json(AdView::from(ad)))
}

/// `PATCH /api/admin/ads/{id}` — update title, price, or serving state.
///
/// # Errors
/// Returns a validation error for an empty changeset or non-positive price
/// and [`ApiError::NotFound`] for an unknown ad.
pub async fn update_ad(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ad_id): Path<i32>,
    Json(req): Json<UpdateAdRequest>,
) -> Result<Json<AdView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    if let Some(price) = req.price {
        if !price.is_positive() {
            return Err(ApiError::Validation("price must be positive".to_owned()));
        }
    }
    let changes = db::AdChanges {
        title: req.title.as_deref(),
        price: req.price.map(Money::minor_units),
        active: req.active,
    };
    if changes.is_empty() {
        return Err(ApiError::Validation("no changes supplied".to_owned()));
    }
    let touched = db::update_ad(&mut conn, ad_id, &changes).await?;
    if touched == 0 {
        return Err(ApiError::NotFound("ad"));
    }
    let ad = db::get_ad(&mut conn, ad_id)
        .await?
        .ok_or(ApiError::NotFound("ad"))?;
    Ok(Json(AdView::from(ad)))
}

/// `GET /api/admin/withdrawals` — requests, optionally filtered by status.
///
/// # Errors
/// Returns a validation error for an unknown status value.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<WithdrawalFilter>,
) -> Result<Json<Vec<WithdrawalView>>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let status = match filter.status.as_deref() {
        Some(raw) => Some(
            WithdrawStatus::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown status '{raw}'")))?,
        ),
        None => None,
    };
    let rows = db::list_withdrawals(&mut conn, status).await?;
    Ok(Json(rows.into_iter().map(WithdrawalView::from).collect()))
}

/// `POST /api/admin/withdrawals/{id}/approve` — approve and debit.
///
/// # Errors
/// Returns a conflict when the request is not pending or the balance no
/// longer covers it.
pub async fn approve_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<i32>,
) -> Result<Json<WithdrawalView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let request = account::resolve_withdrawal(&mut conn, withdrawal_id, true).await?;
    info!(withdrawal_id, user_id = request.user_id, "withdrawal approved");
    Ok(Json(WithdrawalView::from(request)))
}

/// `POST /api/admin/withdrawals/{id}/reject` — reject without debiting.
///
/// # Errors
/// Returns a conflict when the request is not pending.
pub async fn reject_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(withdrawal_id): Path<i32>,
) -> Result<Json<WithdrawalView>, ApiError> {
    let mut conn = state.conn().await?;
    require_admin(&state, &headers, &mut conn).await?;
    let request = account::resolve_withdrawal(&mut conn, withdrawal_id, false).await?;
    info!(withdrawal_id, user_id = request.user_id, "withdrawal rejected");
    Ok(Json(WithdrawalView::from(request)))
}

/// Decode the adjust request into a typed target.
fn parse_target(req: &AdjustRequest, op: AdjustOp) -> Result<AdjustTarget, ApiError> {
    let amount = |kind: &str| -> Result<&str, ApiError> {
        req.amount
            .as_deref()
            .ok_or_else(|| ApiError::Validation(format!("'{kind}' requires an amount")))
    };
    if req.field == "points" {
        let value = match op {
            AdjustOp::Reset => 0,
            AdjustOp::Set | AdjustOp::Add => amount("points")?
                .parse::<i32>()
                .map_err(|e| ApiError::Validation(format!("invalid points value: {e}")))?,
        };
        return Ok(AdjustTarget::Points(value));
    }
    let field = MoneyField::parse(&req.field)
        .ok_or_else(|| ApiError::Validation(format!("unknown field '{}'", req.field)))?;
    let value = match op {
        AdjustOp::Reset => Money::ZERO,
        AdjustOp::Set | AdjustOp::Add => amount(&req.field)?
            .parse::<Money>()
            .map_err(|e| ApiError::Validation(format!("invalid amount: {e}")))?,
    };
    Ok(AdjustTarget::Money(field, value))
}

/// Reload the target user and shape the standard account view.
async fn reload_view(
    conn: &mut crate::db::DbConnection,
    user_id: i32,
) -> Result<Json<AccountView>, ApiError> {
    let user = db::get_user(conn, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(AccountView::from_user(&user)))
}

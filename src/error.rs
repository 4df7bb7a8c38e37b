//! API error taxonomy and HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors surfaced by the HTTP layer.
///
/// Every handler returns `Result<_, ApiError>`; the [`IntoResponse`]
/// implementation maps each variant onto a status code and a JSON body of
/// the form `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login failed: unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Missing, malformed, or expired bearer token.
    #[error("missing or invalid bearer token")]
    Unauthorized,
    /// The authenticated account lacks admin rights.
    #[error("administrator access required")]
    Forbidden,
    /// The addressed resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Request payload failed validation.
    #[error("{0}")]
    Validation(String),
    /// A ledger transition was refused.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The request clashes with existing state (e.g. a taken username).
    #[error("{0}")]
    Conflict(String),
    /// The user already has an unresolved withdrawal request.
    #[error("a withdrawal request is already pending")]
    PendingWithdrawalExists,
    /// The withdrawal request is not in the pending state.
    #[error("withdrawal request is not pending")]
    WithdrawalNotPending,
    /// Database query failure.
    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
    /// Connection pool failure.
    #[error("database unavailable: {0}")]
    Pool(String),
    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(e) => match e {
                LedgerError::AccountLocked
                | LedgerError::AwaitingDeposit
                | LedgerError::InsufficientBalance => StatusCode::CONFLICT,
                LedgerError::AmountNotPositive
                | LedgerError::NegativeBalance
                | LedgerError::Overflow => StatusCode::BAD_REQUEST,
            },
            Self::Conflict(_) | Self::PendingWithdrawalExists | Self::WithdrawalNotPending => {
                StatusCode::CONFLICT
            }
            Self::Db(_) | Self::Pool(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

//! Response envelope, pagination DTOs and the error boundary shared by
//! every REST handler.

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::shared::{DomainError, ErrorKind, PaginatedResult, PaginationParams};

/// Standard API response wrapper
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "...", "code": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Human-readable error, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-readable error code, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code.into()),
        }
    }
}

/// Page selection for list endpoints
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Items per page, 1-100 (default 20)
    pub limit: Option<u64>,
}

impl From<PageQuery> for PaginationParams {
    fn from(q: PageQuery) -> Self {
        PaginationParams::new(q.page, q.limit)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T, D> From<PaginatedResult<D>> for PaginatedResponse<T>
where
    T: From<D>,
{
    fn from(r: PaginatedResult<D>) -> Self {
        Self {
            items: r.items.into_iter().map(T::from).collect(),
            total: r.total,
            page: r.page,
            limit: r.limit,
            total_pages: r.total_pages,
        }
    }
}

/// Domain failure on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::EntryWindow => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = if kind == ErrorKind::Internal {
            error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = ApiResponse::<()>::error(message, self.0.code());
        (status_for(kind), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

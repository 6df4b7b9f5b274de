//! Booking HTTP handlers
//!
//! Thin wrappers: extract, delegate to the application service, wrap the
//! result in [`ApiResponse`]. Domain errors go out through [`ApiError`].

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::application::{BookingService, EntryVerifier};
use crate::domain::Caller;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PageQuery, PaginatedResponse, ValidatedJson,
};
use crate::shared::Clock;

use super::dto::*;

/// Application state for booking handlers.
#[derive(Clone)]
pub struct BookingAppState {
    pub bookings: BookingService,
    pub entry: EntryVerifier,
    /// Source of the entry time recorded at check-in
    pub clock: Arc<dyn Clock>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Invalid time, capacity exceeded or bad request"),
        (status = 404, description = "Room or member not found"),
        (status = 409, description = "Room already booked for that interval")
    )
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), ApiError> {
    let booking = state.bookings.create(&caller, request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(booking.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<PaginatedResponse<BookingResponse>>)
    )
)]
pub async fn list_my_bookings(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<BookingResponse>> {
    let result = state.bookings.list_for_member(&caller, page.into()).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/all",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Every booking", body = ApiResponse<PaginatedResponse<BookingResponse>>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_all_bookings(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<BookingResponse>> {
    let result = state.bookings.list_all(&caller, page.into()).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = ApiResponse<BookingResponse>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<BookingResponse> {
    let booking = state.bookings.get(&caller, &id).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking changed", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Invalid change"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Booking or room not found"),
        (status = 409, description = "New interval is taken")
    )
)]
pub async fn update_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBookingRequest>,
) -> ApiResult<BookingResponse> {
    let booking = state.bookings.update(&caller, &id, request.into()).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/extend",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking extended by one increment", body = ApiResponse<BookingResponse>),
        (status = 409, description = "Extension collides with the next booking")
    )
)]
pub async fn extend_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<BookingResponse> {
    let booking = state.bookings.extend(&caller, &id).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/finish",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking finished", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Booking has not started or is cancelled")
    )
)]
pub async fn finish_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<BookingResponse> {
    let booking = state.bookings.finish(&caller, &id).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingResponse>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    State(state): State<BookingAppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<BookingResponse> {
    let booking = state.bookings.cancel(&caller, &id).await?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/entry",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    request_body = EntryRequest,
    responses(
        (status = 200, description = "Entry accepted", body = ApiResponse<EntryResponse>),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Wrong code or outside the entry window")
    )
)]
pub async fn verify_entry(
    State(state): State<BookingAppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<EntryRequest>,
) -> ApiResult<EntryResponse> {
    let ack = state
        .entry
        .verify_entry(&id, &request.code, state.clock.now())
        .await?;
    Ok(Json(ApiResponse::success(ack.into())))
}

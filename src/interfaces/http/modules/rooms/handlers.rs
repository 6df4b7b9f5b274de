//! Room schedule handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::modules::bookings::{BookingAppState, BookingResponse};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomDayQuery {
    /// UTC calendar day, `YYYY-MM-DD`
    pub date: NaiveDate,
}

/// One room's bookings for one day
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomScheduleResponse {
    pub room_id: String,
    pub date: NaiveDate,
    /// Earliest start first, cancelled bookings included
    pub bookings: Vec<BookingResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/bookings",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    params(
        ("room_id" = String, Path, description = "Meeting room ID"),
        RoomDayQuery
    ),
    responses(
        (status = 200, description = "Bookings starting that day, earliest first", body = ApiResponse<RoomScheduleResponse>),
        (status = 404, description = "Room not found")
    )
)]
pub async fn list_room_bookings(
    State(state): State<BookingAppState>,
    Path(room_id): Path<String>,
    Query(query): Query<RoomDayQuery>,
) -> ApiResult<RoomScheduleResponse> {
    let bookings = state.bookings.list_for_room_on(&room_id, query.date).await?;
    Ok(Json(ApiResponse::success(RoomScheduleResponse {
        room_id,
        date: query.date,
        bookings: bookings.into_iter().map(BookingResponse::from).collect(),
    })))
}

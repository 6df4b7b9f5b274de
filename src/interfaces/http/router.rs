//! API Router with Swagger UI

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PageQuery, PaginatedResponse};
use super::middleware::{auth_middleware, AuthState};
use super::modules::bookings::{self, BookingAppState};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::rooms;

/// State shared by every authenticated route.
/// Handlers and the auth layer pull their own slice via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub bookings: BookingAppState,
    pub auth: AuthState,
}

impl FromRef<ApiState> for BookingAppState {
    fn from_ref(s: &ApiState) -> Self {
        s.bookings.clone()
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the identity provider, sub = member e-mail"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::list_all_bookings,
        bookings::get_booking,
        bookings::update_booking,
        bookings::extend_booking,
        bookings::finish_booking,
        bookings::cancel_booking,
        bookings::verify_entry,
        rooms::list_room_bookings,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ApiResponse<bookings::BookingResponse>,
            ApiResponse<bookings::EntryResponse>,
            PaginatedResponse<bookings::BookingResponse>,
            PageQuery,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingRequest,
            bookings::EntryRequest,
            bookings::BookingResponse,
            bookings::EntryResponse,
            rooms::RoomScheduleResponse,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Bookings", description = "Create, change, extend, finish and cancel room bookings; door check-in"),
        (name = "Rooms", description = "Per-room daily schedule"),
    ),
    info(
        title = "Meetbook API",
        version = "1.0.0",
        description = "Meeting room booking service"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
///
/// `/metrics` is mounted only when a Prometheus handle is supplied.
pub fn create_api_router(
    bookings_state: BookingAppState,
    auth_state: AuthState,
    health_state: HealthState,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let api_state = ApiState {
        bookings: bookings_state,
        auth: auth_state,
    };

    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_my_bookings).post(bookings::create_booking),
        )
        .route("/all", get(bookings::list_all_bookings))
        .route(
            "/{id}",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::cancel_booking),
        )
        .route("/{id}/extend", post(bookings::extend_booking))
        .route("/{id}/finish", post(bookings::finish_booking))
        .route("/{id}/entry", post(bookings::verify_entry))
        .layer(middleware::from_fn_with_state(
            api_state.clone(),
            auth_middleware,
        ))
        .with_state(api_state.clone());

    let room_routes = Router::new()
        .route("/{room_id}/bookings", get(rooms::list_room_bookings))
        .layer(middleware::from_fn_with_state(
            api_state.clone(),
            auth_middleware,
        ))
        .with_state(api_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/rooms", room_routes);

    if let Some(handle) = prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

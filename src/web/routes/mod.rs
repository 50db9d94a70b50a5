use crate::web::{AppState, doc::ApiDoc};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod consultations;
pub mod courses;
pub mod users;

pub static DEFAULT_PAGE_LIMIT: i64 = 50;
pub static MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams, utoipa::ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/health",
    description = "Liveness check",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: String::from("OK"),
        message: String::from("Course marketplace API is running"),
    })
}

fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = client_origin else {
        return CorsLayer::very_permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!("client origin {origin:?} is not a valid header value: {e}");
            CorsLayer::new()
        }
    }
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState) -> Router<S> {
    let docs = state.config().app().docs();
    let cors = cors_layer(state.config().host().client_origin());

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api/auth", auth::routes(state.clone()))
        .nest("/api/courses", courses::routes(state.clone()))
        .nest("/api/consultations", consultations::routes(state.clone()))
        .nest("/api/users", users::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if docs {
        router = router.merge(
            SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()),
        );
    }

    router
}

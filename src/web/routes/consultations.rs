use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Decision, Permission},
    model::{
        ResourceTyped,
        entity::{Consultation, ConsultationSlot},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            consultations::{
                BookingBody, BookingResponse, ConsultationListResponse, SlotCreateBody,
                SlotListResponse, SlotResponse,
            },
        },
        error::ErrorResponse,
        extract::{JsonBody, PathId},
        middlewares,
    },
};

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let slot_admin = Router::new()
        .route("/slots", post(slot_create_handler))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Permission::ManageConsultationSlots),
            middlewares::admin_guard_fn,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    let overview_admin = Router::new()
        .route("/all", get(consultation_all_handler))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Permission::ViewAllConsultations),
            middlewares::admin_guard_fn,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    let protected = Router::new()
        .route("/book", post(consultation_book_handler))
        .route("/my-consultations", get(consultation_mine_handler))
        .route("/{id}/cancel", post(consultation_cancel_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    Router::new()
        .route("/slots", get(slot_list_handler))
        .merge(slot_admin)
        .merge(overview_admin)
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/consultations/slots",
    description = "Unbooked slots from today on, earliest first",
    responses(
        (status = 200, description = "Available slots", body = SlotListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations"
)]
pub async fn slot_list_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let slots = state
        .store()
        .list_available_slots(today())
        .await
        .map_err(|e| WebError::resource_fetch_error(ConsultationSlot::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SlotListResponse { slots })))
}

#[utoipa::path(
    post,
    path = "/api/consultations/slots",
    request_body = SlotCreateBody,
    description = "Publishes a bookable slot",
    responses(
        (status = 201, description = "Slot created", body = SlotResponse),
        (status = 400, description = "Date and time are required", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn slot_create_handler(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SlotCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let slot = state
        .store()
        .create_slot(payload.into_create())
        .await
        .map_err(|e| WebError::from_database(ConsultationSlot::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(SlotResponse {
            message: String::from("Slot created successfully"),
            slot,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/consultations/all",
    description = "Every consultation with its slot, newest first",
    responses(
        (status = 200, description = "Consultations found", body = ConsultationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn consultation_all_handler(
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let consultations = state
        .store()
        .list_consultations(None)
        .await
        .map_err(|e| WebError::resource_fetch_error(Consultation::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ConsultationListResponse { consultations })))
}

#[utoipa::path(
    post,
    path = "/api/consultations/book",
    request_body = BookingBody,
    description = "Books a slot, the slot is taken by at most one consultation",
    responses(
        (status = 201, description = "Consultation booked", body = BookingResponse),
        (status = 400, description = "Missing fields or slot no longer available", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Slot not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn consultation_book_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BookingBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    payload.validate().map_err(WebError::from_validation)?;

    let booking = state
        .store()
        .book(payload.into_create(user.user_id()), today())
        .await
        .map_err(|e| WebError::from_database(ConsultationSlot::get_resource_type(), e))?;

    tracing::info!(consultation_id = %booking.id, slot_id = %booking.slot_id, "slot booked");
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: String::from("Consultation booked successfully"),
            booking,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/consultations/my-consultations",
    description = "Caller's consultations with their slots, newest first",
    responses(
        (status = 200, description = "Consultations found", body = ConsultationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn consultation_mine_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let consultations = state
        .store()
        .list_consultations(Some(user.user_id()))
        .await
        .map_err(|e| WebError::resource_fetch_error(Consultation::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ConsultationListResponse { consultations })))
}

#[utoipa::path(
    post,
    path = "/api/consultations/{id}/cancel",
    params(("id" = Uuid, Path, description = "Consultation id")),
    description = "Cancels a scheduled consultation and releases its slot",
    responses(
        (status = 200, description = "Consultation cancelled", body = MessageResponse),
        (status = 400, description = "Consultation is not scheduled", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Consultation not found or not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "consultations",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn consultation_cancel_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    PathId(id, _): PathId<Consultation>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let consultation = state
        .store()
        .find_consultation(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Consultation::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Consultation::get_resource_type()))?;

    let permission = Permission::CancelConsultation {
        owner_id: consultation.user_id,
    };
    if let Decision::Deny(reason) = user.authorize(&permission) {
        tracing::debug!(user_id = %user.user_id(), ?reason, "cancel denied");
        return Err(WebError::from_denial(
            Consultation::get_resource_type(),
            reason,
        ));
    }

    state
        .store()
        .cancel(id)
        .await
        .map_err(|e| WebError::from_database(Consultation::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Consultation cancelled successfully")),
    ))
}

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Permission,
    model::{
        ResourceTyped,
        entity::{Course, CourseModule, Enrollment, Profile, ProgressUpdate},
        progress::derive_progress,
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::users::{
            MyCoursesResponse, ProfileResponse, ProfileUpdateBody, ProfileUpdatedResponse,
            ProgressBody, ProgressResponse, RoleBody, StatusBody, UserPageResponse,
        },
        error::ErrorResponse,
        extract::{JsonBody, PathId, QueryParams},
        middlewares,
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let admin = Router::new()
        .route("/", get(user_list_handler))
        .route("/{id}/role", put(user_role_handler))
        .route("/{id}/status", put(user_status_handler))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Permission::ManageUsers),
            middlewares::admin_guard_fn,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    let protected = Router::new()
        .route(
            "/profile",
            get(profile_get_handler).put(profile_update_handler),
        )
        .route("/my-courses", get(my_courses_handler))
        .route("/my-courses/{course_id}/progress", put(progress_update_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    Router::new()
        .merge(admin)
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    description = "Caller's profile",
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn profile_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let profile = state
        .store()
        .find_profile(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Profile::get_resource_type()))?;

    Ok((StatusCode::OK, Json(ProfileResponse { profile })))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = ProfileUpdateBody,
    description = "Partially updates the caller's profile, omitted fields are kept",
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdatedResponse),
        (status = 400, description = "Invalid field value", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn profile_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProfileUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    payload.validate().map_err(WebError::from_validation)?;

    let profile = state
        .store()
        .update_profile(user.user_id(), payload.into())
        .await
        .map_err(|e| WebError::from_database(Profile::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProfileUpdatedResponse {
            message: String::from("Profile updated successfully"),
            profile,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/my-courses",
    description = "Caller's enrollments with their courses",
    responses(
        (status = 200, description = "Enrollments found", body = MyCoursesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollments = state
        .store()
        .list_enrollments(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MyCoursesResponse { enrollments })))
}

#[utoipa::path(
    put,
    path = "/api/users/my-courses/{course_id}/progress",
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = ProgressBody,
    description = "Records completed modules; the percentage is derived from them when the course has modules",
    responses(
        (status = 200, description = "Progress updated", body = ProgressResponse),
        (status = 400, description = "Missing or out of range progress, or unknown module", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Not enrolled in this course", body = ErrorResponse),
        (status = 409, description = "Enrollment changed since `version`", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn progress_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    PathId(course_id, _): PathId<Course>,
    JsonBody(payload): JsonBody<ProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (enrollment, modules) = tokio::try_join!(
        state.store().find_enrollment(user.user_id(), course_id),
        state.store().list_modules(course_id),
    )
    .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    let enrollment =
        enrollment.ok_or(WebError::resource_not_found(Enrollment::get_resource_type()))?;
    let module_ids: Vec<Uuid> = modules.iter().map(|m: &CourseModule| m.id).collect();

    let derived = derive_progress(
        payload.progress,
        payload.completed_modules,
        enrollment.progress,
        &enrollment.completed_modules,
        &module_ids,
    )
    .map_err(|e| WebError::validation(e.to_string()))?;

    let update = ProgressUpdate {
        progress: derived.progress,
        completed_modules: derived.completed_modules,
        expected_version: payload.version.unwrap_or(enrollment.version),
    };

    let enrollment = state
        .store()
        .update_progress(user.user_id(), course_id, update)
        .await
        .map_err(|e| WebError::from_database(Enrollment::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProgressResponse {
            message: String::from("Progress updated successfully"),
            enrollment,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(PaginationQuery),
    description = "Pages through every profile",
    responses(
        (status = 200, description = "Users found", body = UserPageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn user_list_handler(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<PaginationQuery>,
) -> WebResult<impl IntoResponse> {
    let (limit, offset) = (page.limit(), page.offset());

    let (users, total) = tokio::try_join!(
        state.store().list_profiles(limit, offset),
        state.store().count_profiles(),
    )
    .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(UserPageResponse {
            users,
            total,
            limit,
            offset,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = RoleBody,
    description = "Changes a user's role",
    responses(
        (status = 200, description = "Role updated", body = ProfileUpdatedResponse),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn user_role_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Profile>,
    JsonBody(payload): JsonBody<RoleBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let role = payload
        .role
        .as_deref()
        .and_then(UserRole::parse)
        .ok_or(WebError::validation(
            "Invalid role. Must be one of: student, instructor, admin",
        ))?;

    let profile = state
        .store()
        .set_role(id, role)
        .await
        .map_err(|e| WebError::from_database(Profile::get_resource_type(), e))?;

    tracing::info!(user_id = %id, role = %profile.role, "role changed");
    Ok((
        StatusCode::OK,
        Json(ProfileUpdatedResponse {
            message: String::from("User role updated successfully"),
            profile,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = StatusBody,
    description = "Activates or deactivates an account",
    responses(
        (status = 200, description = "Status updated", body = ProfileUpdatedResponse),
        (status = 400, description = "Missing flag or self-deactivation", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn user_status_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    PathId(id, _): PathId<Profile>,
    JsonBody(payload): JsonBody<StatusBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    payload.validate().map_err(WebError::from_validation)?;

    let is_active = payload.is_active.unwrap_or(true);
    if !is_active && id == user.user_id() {
        return Err(WebError::validation("You cannot deactivate your own account"));
    }

    let profile = state
        .store()
        .set_active(id, is_active)
        .await
        .map_err(|e| WebError::from_database(Profile::get_resource_type(), e))?;

    let message = if is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };

    tracing::info!(user_id = %id, is_active, "account status changed");
    Ok((
        StatusCode::OK,
        Json(ProfileUpdatedResponse {
            message: String::from(message),
            profile,
        }),
    ))
}

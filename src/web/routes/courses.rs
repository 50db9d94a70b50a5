use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Permission,
    model::{
        ResourceTyped,
        entity::{Course, CourseModule, Enrollment},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            courses::{
                CourseCreateBody, CourseDetailResponse, CourseListQuery, CourseListResponse,
                CourseResponse, CourseUpdateBody, CourseWithModules, EnrollmentResponse,
                ModuleCreateBody, ModuleListResponse, ModuleResponse,
            },
        },
        error::ErrorResponse,
        extract::{JsonBody, PathId, QueryParams},
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let admin = Router::new()
        .route("/", post(course_create_handler))
        .route(
            "/{id}",
            put(course_update_handler).delete(course_delete_handler),
        )
        .route("/{id}/modules", post(module_create_handler))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Permission::ManageCourses),
            middlewares::admin_guard_fn,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    let protected = Router::new()
        .route("/{id}/enroll", post(course_enroll_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    Router::new()
        .route("/", get(course_list_handler))
        .route("/{id}", get(course_get_handler))
        .route("/{id}/modules", get(module_list_handler))
        .merge(admin)
        .merge(protected)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    description = "Lists courses, newest first",
    responses(
        (status = 200, description = "Courses found", body = CourseListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
pub async fn course_list_handler(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CourseListQuery>,
) -> WebResult<impl IntoResponse> {
    let courses = state
        .store()
        .list_courses(query.into())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(CourseListResponse { courses })))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    description = "Course with its modules in order",
    responses(
        (status = 200, description = "Course found", body = CourseDetailResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
pub async fn course_get_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
) -> WebResult<impl IntoResponse> {
    let course = state
        .store()
        .find_course(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    let modules = state
        .store()
        .list_modules(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseModule::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseDetailResponse {
            course: CourseWithModules { course, modules },
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseCreateBody,
    description = "Creates a course owned by the calling admin",
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CourseCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    payload.validate().map_err(WebError::from_validation)?;

    let course = state
        .store()
        .create_course(payload.into_create(user.user_id()))
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %course.id, "course created");
    Ok((
        StatusCode::CREATED,
        Json(CourseResponse {
            message: String::from("Course created successfully"),
            course,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = CourseUpdateBody,
    description = "Partially updates a course",
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid field value", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_update_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
    JsonBody(payload): JsonBody<CourseUpdateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let course = state
        .store()
        .update_course(id, payload.into())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CourseResponse {
            message: String::from("Course updated successfully"),
            course,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    description = "Deletes a course with its modules and enrollments",
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_delete_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
) -> WebResult<impl IntoResponse> {
    state
        .store()
        .delete_course(id)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    tracing::info!(course_id = %id, "course deleted");
    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Course deleted successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = Uuid, Path, description = "Course id")),
    description = "Enrolls the caller with progress 0",
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 400, description = "Already enrolled", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let enrollment = state
        .store()
        .enroll(user.user_id(), id)
        .await
        .map_err(|e| WebError::from_database(Enrollment::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            message: String::from("Successfully enrolled in course"),
            enrollment,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/modules",
    params(("id" = Uuid, Path, description = "Course id")),
    description = "Modules of a course in ascending order",
    responses(
        (status = 200, description = "Modules found", body = ModuleListResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses"
)]
pub async fn module_list_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
) -> WebResult<impl IntoResponse> {
    let (course, modules) = tokio::try_join!(
        state.store().find_course(id),
        state.store().list_modules(id),
    )
    .map_err(|e| WebError::resource_fetch_error(CourseModule::get_resource_type(), e))?;

    if course.is_none() {
        return Err(WebError::resource_not_found(Course::get_resource_type()));
    }

    Ok((StatusCode::OK, Json(ModuleListResponse { modules })))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/modules",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = ModuleCreateBody,
    description = "Adds a module to a course",
    responses(
        (status = 201, description = "Module created", body = ModuleResponse),
        (status = 400, description = "Module title is required", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn module_create_handler(
    State(state): State<AppState>,
    PathId(id, _): PathId<Course>,
    JsonBody(payload): JsonBody<ModuleCreateBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let module = state
        .store()
        .create_module(payload.into_create(id))
        .await
        .map_err(|e| WebError::from_database(CourseModule::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(ModuleResponse {
            message: String::from("Module created successfully"),
            module,
        }),
    ))
}

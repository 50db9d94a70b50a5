use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        ResourceTyped,
        entity::{AccountCreate, Profile},
    },
    web::{
        AppState, RequestContext, UserRole, WebError, WebResult,
        dto::{
            MessageResponse,
            auth::{AuthUser, LoginBody, LoginResponse, MeResponse, Session, SignupBody, SignupResponse},
        },
        error::ErrorResponse,
        extract::JsonBody,
        middlewares::{self, AUTH_TOKEN},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::require_auth_fn,
        ));

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signs a session token and mirrors it into the `SID` cookie.
fn issue_session(state: &AppState, cookies: &Cookies, user_id: Uuid) -> WebResult<Session> {
    let expires_at = chrono::Utc::now() + state.config().app().token_ttl();
    let claims = UserClaims::expiring_at(user_id, expires_at);

    let token = auth::generate_token(&claims, state.config().app().jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token.clone());
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(Session::bearer(token, expires_at))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupBody,
    description = "Registers a student account and opens a session",
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Missing fields, invalid email, short password or email taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<SignupBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let password = payload.password.unwrap_or_default();
    let hash = hash_password(&password).map_err(WebError::server_crypt_error)?;

    let data = AccountCreate {
        email: normalize_email(&payload.email.unwrap_or_default()),
        password_hash: hash,
        first_name: payload.first_name.unwrap_or_default(),
        last_name: payload.last_name.unwrap_or_default(),
        role: UserRole::Student,
    };

    let (account, profile) = state
        .store()
        .create_account(data)
        .await
        .map_err(|e| WebError::from_database(Profile::get_resource_type(), e))?;

    tracing::info!(user_id = %account.id, "account registered");
    let session = issue_session(&state, &cookies, account.id)?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: String::from("User created successfully"),
            user: AuthUser::new(account, Some(profile)),
            session,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    description = "Authenticates with email and password",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid login credentials", body = ErrorResponse),
        (status = 403, description = "Account is deactivated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(payload): JsonBody<LoginBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate().map_err(WebError::from_validation)?;

    let email = normalize_email(&payload.email.unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    let Some(account) = state
        .store()
        .find_account_by_email(&email)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?
    else {
        return Err(WebError::auth_invalid_credentials());
    };

    let is_verified =
        verify_password(&account.password_hash, &password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let profile = state
        .store()
        .find_profile(account.id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    if profile.as_ref().is_some_and(|p| !p.is_active) {
        return Err(WebError::auth_account_disabled());
    }

    let session = issue_session(&state, &cookies, account.id)?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            message: String::from("Login successful"),
            session,
            user: AuthUser::new(account, profile),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    description = "Ends the session and clears the cookie",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn logout_handler(
    ctx: RequestContext,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let mut cookie = Cookie::new(AUTH_TOKEN, "");
    cookie.set_path("/");
    cookies.remove(cookie);

    tracing::debug!(user_id = %user.user_id(), "session closed");
    Ok((StatusCode::OK, Json(MessageResponse::new("Logout successful"))))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    description = "Returns the authenticated user with profile",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn me_handler(
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

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            user: AuthUser::from_profile(profile),
        }),
    ))
}

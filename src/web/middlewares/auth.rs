use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    auth,
    model::{ResourceTyped, entity::Profile},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Resolves the caller from `Authorization: Bearer` or the `SID` cookie and
/// rejects the request when neither yields an active account.
pub async fn require_auth_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = match req.headers().get(AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(WebError::auth_token_missing())?,
        None => cookies
            .get(AUTH_TOKEN)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(WebError::auth_token_missing())?,
    };

    let claims = auth::process_token(&token, state.config().app().jwt())
        .map_err(|e| WebError::auth_token_invalid(e.to_string()))?;

    let id = claims
        .claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|e| WebError::auth_token_invalid(e.to_string()))?;

    let profile = state
        .store()
        .find_profile(id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Profile::get_resource_type(), e))?;

    match profile {
        Some(profile) if profile.is_active => {
            tracing::debug!(user_id = %id, role = %profile.role, "request authenticated");
            req.extensions_mut()
                .insert(RequestContext::new(Some(AuthenticatedUser::new(id, profile.role))));

            Ok(next.run(req).await)
        }
        Some(_) => Err(WebError::auth_token_invalid("account is deactivated")),
        None => Err(WebError::auth_token_invalid("account no longer exists")),
    }
}

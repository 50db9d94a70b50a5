use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{Decision, Permission},
    model::{ResourceTyped, entity::Profile},
    web::{AppState, AuthenticatedUser, RequestContext, error::WebError},
};

/// Runs after `require_auth_fn`. The role is read again from the store so a
/// demotion takes effect without waiting for the token to expire.
pub async fn admin_guard_fn(
    State((state, permission)): State<(AppState, Permission)>,
    ctx: RequestContext,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = ctx.user()?;

    let profile = match state.store().find_profile(user.user_id()).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            tracing::warn!(user_id = %user.user_id(), "profile missing during role check");
            return Err(WebError::role_lookup_failed());
        }
        Err(e) => {
            crate::error::log_error(&e);
            return Err(WebError::role_lookup_failed());
        }
    };

    let current = AuthenticatedUser::new(profile.id, profile.role);
    match current.authorize(&permission) {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Deny(reason) => Err(WebError::from_denial(
            Profile::get_resource_type(),
            reason,
        )),
    }
}

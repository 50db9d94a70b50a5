mod auth;
pub use auth::{AUTH_TOKEN, require_auth_fn};

mod admin;
pub use admin::admin_guard_fn;

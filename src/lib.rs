use std::sync::Arc;

use crate::auth::hash_password;
use crate::config::Storage;
use crate::model::{DbConnection, ModelManager, entity::AccountCreate};
use crate::utils::signal::shutdown_signal;
use crate::web::{AppState, UserRole};
use crate::{error::AppResult, web::routes::auth::normalize_email};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

pub static APPLICATION_NAME: &str = "coursehub";

/// Schema migrations embedded from `migrations/` at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;

    let mm = match config.app().storage() {
        Storage::Postgres => {
            tracing::debug!("using postgres store");
            let db = DbConnection::connect(config.app().database_uri())?;

            tracing::debug!("applying migrations...");
            MIGRATOR
                .run(db.pool())
                .await
                .map_err(model::DatabaseError::from)?;

            ModelManager::postgres(db)
        }
        Storage::Memory => {
            tracing::debug!("using in-memory store, data is lost on shutdown");
            ModelManager::in_memory()
        }
    };

    build_server_with_store(mm, config.clone()).await
}

/// Builds the app over an already constructed store, used by tests and the binary alike.
pub async fn build_server_with_store(
    mm: ModelManager,
    config: Config,
) -> AppResult<(AppState, Router)> {
    let state = AppState::new(mm, Arc::new(config));
    ensure_admin(&state).await?;

    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

/// Creates the configured admin account, or promotes it when it already exists.
async fn ensure_admin(state: &AppState) -> AppResult<()> {
    let Some((email, password)) = state.config().app().admin_credentials() else {
        return Ok(());
    };
    let email = normalize_email(email);

    match state.store().find_account_by_email(&email).await? {
        Some(account) => {
            let profile = state.store().find_profile(account.id).await?;
            if profile.is_some_and(|p| p.role != UserRole::Admin) {
                state.store().set_role(account.id, UserRole::Admin).await?;
                tracing::info!("promoted {email} to admin");
            }
        }
        None => {
            let data = AccountCreate {
                email: email.clone(),
                password_hash: hash_password(password)?,
                first_name: String::from("Admin"),
                last_name: String::from("User"),
                role: UserRole::Admin,
            };
            state.store().create_account(data).await?;
            tracing::info!("created admin account {email}");
        }
    }

    Ok(())
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let bindto = state.config().host().bindto().to_string();
    let listener = TcpListener::bind(&bindto).await?;

    tracing::info!("{APPLICATION_NAME} is starting at: {bindto}");
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    tracing::info!("{APPLICATION_NAME} stopped");
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}

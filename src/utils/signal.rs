use tokio::signal;

/// Resolves on Ctrl+C so `axum::serve` can drain in-flight requests.
pub async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            #[cfg(not(windows))]
            println!();
            tracing::info!("Ctrl+C received. Finishing in-flight requests.");
        }
        Err(e) => {
            // without a handler the server keeps running until killed
            crate::error::log_error(&e);
            std::future::pending::<()>().await;
        }
    }
}

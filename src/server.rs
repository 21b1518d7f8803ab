use std::{sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::timeout,
};

use crate::{Res, api, api::CallbackState, error::SpotError, info, success, warning};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn start_api_server(
    listener: TcpListener,
    state: Arc<Mutex<CallbackState>>,
    shutdown: oneshot::Receiver<()>,
) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)));

    let addr = listener.local_addr().map_err(|e| SpotError::Auth(e.to_string()))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await
        .map_err(|e| SpotError::Auth(format!("callback server on {} failed: {}", addr, e)))
}

/// Asks the server to stop and waits at most five seconds for it.
pub async fn shutdown(handle: JoinHandle<Res<()>>, stop: oneshot::Sender<()>) {
    info!("Shutting down server...");
    let _ = stop.send(());

    match timeout(SHUTDOWN_TIMEOUT, handle).await {
        Ok(Ok(Ok(()))) => success!("Server successfully shut down"),
        Ok(Ok(Err(e))) => warning!("{}", e),
        Ok(Err(e)) => warning!("Server task failed: {}", e),
        Err(_) => warning!(
            "Server did not shut down within {} seconds",
            SHUTDOWN_TIMEOUT.as_secs()
        ),
    }
}

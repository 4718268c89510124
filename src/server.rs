//! Webhook HTTP server.
//!
//! Three routes: `POST /<token>` receives updates from Telegram,
//! `GET /setwebhook` registers that route with Telegram, and `GET /` serves a
//! greeting (also used for anything unrouted).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing::{debug, error, info, warn};

use crate::bot;
use crate::config::Config;
use crate::platform::telegram::{self, Update};
use crate::platform::MessageSender;

const INDEX_TEXT: &str = "Hello, welcome to the telegram bot index page";

// ── Shared state ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    sender: Arc<dyn MessageSender>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            config: Arc::new(config),
            sender,
            http: reqwest::Client::new(),
        }
    }
}

// ── Handlers ───────────────────────────────────────────────────────────────────

async fn index() -> &'static str {
    INDEX_TEXT
}

async fn webhook(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read webhook body: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Malformed update: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let Some(msg) = update.message else {
        debug!("Update {:?} carries no message, ignoring", update.update_id);
        return (StatusCode::OK, "ok").into_response();
    };

    info!(
        "Telegram message in chat {} (id {}): {}",
        msg.chat.id,
        msg.message_id,
        msg.text.as_deref().unwrap_or_default()
    );

    // Telegram only needs a 2xx; delivery failures stay on our side.
    let reply = bot::reply_for(&msg);
    if let Err(e) = state.sender.send_message(&reply).await {
        error!("Failed to send reply: {:#}", e);
    }

    (StatusCode::OK, "ok").into_response()
}

async fn set_webhook(State(state): State<AppState>) -> (StatusCode, &'static str) {
    info!("Setting webhook");

    let config = &state.config;
    match telegram::set_webhook(
        &state.http,
        &config.telegram.api_url,
        &config.telegram.bot_token,
        &config.webhook_url(),
    )
    .await
    {
        Ok(status) => {
            info!("Webhook response status: {}", status.as_u16());
            (StatusCode::OK, "webhook setup ok")
        }
        Err(e) => {
            error!("Webhook error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "webhook setup failed")
        }
    }
}

// ── Router / entry point ───────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/setwebhook", get(set_webhook));

    match state.config.webhook_path() {
        Some(path) => app = app.route(&path, post(webhook)),
        None => warn!("No bot token configured, webhook route is not mounted"),
    }

    app.fallback(index).with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Starting server on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ── Tests ──────────────────────────────────────────────────────────────────────

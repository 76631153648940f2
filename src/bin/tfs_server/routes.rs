//! HTTP route registration for the webhook server.

use super::*;

/// Header Telegram sets when the webhook was registered with a secret.
pub(super) const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub(super) fn hash_secret(secret: &str) -> String {
    blake3::hash(secret.as_bytes()).to_hex().to_string()
}

pub(super) fn build_router(state: Arc<AppState>) -> Router {
    let hook = Router::new()
        .route("/webhook", post(webhook))
        .layer(middleware::from_fn_with_state(state.clone(), require_secret));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(hook)
        .with_state(state)
}

async fn require_secret(
    State(state): State<Arc<AppState>>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    let Some(expected) = &state.webhook_secret_hash else {
        return next.run(req).await;
    };

    let Some(value) = req.headers().get(SECRET_HEADER) else {
        warn!("webhook call without secret");
        return unauthorized();
    };
    let Ok(value) = value.to_str() else {
        return unauthorized();
    };
    if hash_secret(value) != *expected {
        warn!("webhook call with wrong secret");
        return unauthorized();
    }

    next.run(req).await
}

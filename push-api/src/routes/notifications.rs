use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use push_contract::PushSubscription;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{ActionResponse, SubscriptionStatusResponse, VapidPublicKeyResponse},
    app_state::AppState,
    routes::{error::ErrorCode, ApiError},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vapid-public-key", get(vapid_public_key))
        .route("/subscription", get(subscription_status))
        .route("/subscribe", post(subscribe).delete(unsubscribe))
        .route("/send", post(send))
}

async fn vapid_public_key(State(app_state): State<AppState>) -> Json<VapidPublicKeyResponse> {
    Json(VapidPublicKeyResponse {
        public_key: app_state.application_server_key.to_base64url(),
    })
}

#[instrument(name = "subscription_status", skip(app_state))]
async fn subscription_status(
    State(app_state): State<AppState>,
) -> Result<Json<SubscriptionStatusResponse>, ApiError> {
    let current = app_state.push_service.current().await?;

    Ok(Json(SubscriptionStatusResponse {
        subscribed: current.is_some(),
        endpoint: current.map(|s| s.endpoint),
    }))
}

#[instrument(name = "subscribe", skip(app_state, body))]
async fn subscribe(
    State(app_state): State<AppState>,
    body: Result<Json<PushSubscription>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(subscription) = body.map_err(rejected_body)?;

    app_state.push_service.subscribe(subscription).await?;

    Ok(Json(ActionResponse::ok()))
}

#[instrument(name = "unsubscribe", skip(app_state))]
async fn unsubscribe(State(app_state): State<AppState>) -> Result<Json<ActionResponse>, ApiError> {
    app_state.push_service.unsubscribe().await?;

    Ok(Json(ActionResponse::ok()))
}

#[derive(Debug, Deserialize)]
pub struct SendPayload {
    message: String,
    /// The page may send the subscription it holds; otherwise the stored one is used.
    #[serde(default)]
    subscription: Option<PushSubscription>,
}

#[instrument(name = "send", skip(app_state, body))]
async fn send(
    State(app_state): State<AppState>,
    body: Result<Json<SendPayload>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(body) = body.map_err(rejected_body)?;

    app_state
        .push_service
        .send(body.subscription, &body.message)
        .await
        .map_err(|e| {
            tracing::error!("Failed to send notification: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(ActionResponse::ok()))
}

/// Bodies that fail to deserialize get the JSON error body, not axum's plain-text rejection.
fn rejected_body(rejection: JsonRejection) -> ApiError {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    ApiError::unprocessable(rejection.body_text()).with_code(ErrorCode::InvalidSubscription)
}

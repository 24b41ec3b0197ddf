//! LINE webhook handler
//!
//! The handler awaits the whole batch before responding, so the body carries
//! one outcome per event (`null` for ignored and duplicate events).

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::api::ApiState;
use crate::line::WebhookBody;
use crate::line::signature::{self, SIGNATURE_HEADER};
use crate::relay::EventOutcome;

/// Error body for a rejected delivery
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn reject(reason: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: reason }),
    )
        .into_response()
}

/// Handle a LINE webhook delivery
pub async fn handle_callback(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let provided = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    if let Err(e) = signature::verify(state.channel_secret.expose_secret(), &body, provided) {
        tracing::warn!(error = %e, "rejecting LINE webhook");
        return reject(e.to_string());
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable LINE webhook body");
            return reject(format!("invalid webhook body: {e}"));
        }
    };

    tracing::debug!(
        destination = %payload.destination,
        events = payload.events.len(),
        "received LINE webhook"
    );

    let outcomes: Vec<Option<EventOutcome>> = state
        .dispatcher
        .handle_batch(payload.into_events())
        .await;

    Json(outcomes).into_response()
}

//! Producer endpoints: accept an event and fan it out to subscribers.

use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devsync_hub::{kinds, DeliveryReport, EmitRequest, Event, HubError};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Every subscriber failed and the producer asked to be told.
    #[error("event was not delivered to any subscriber")]
    Undelivered(DeliveryReport),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> Response {
        match self {
            EventApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            EventApiError::Undelivered(report) => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": "event was not delivered to any subscriber",
                    "report": report,
                })),
            )
                .into_response(),
            EventApiError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}

impl From<JsonRejection> for EventApiError {
    fn from(rejection: JsonRejection) -> Self {
        EventApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for EventApiError {
    fn from(rejection: QueryRejection) -> Self {
        EventApiError::BadRequest(rejection.body_text())
    }
}

impl From<HubError> for EventApiError {
    fn from(e: HubError) -> Self {
        match e {
            HubError::MalformedEvent(msg) => EventApiError::BadRequest(msg),
            other => EventApiError::InternalServerError(other.to_string()),
        }
    }
}

/// Query parameters for `POST /events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitParams {
    /// Fail with `502` when subscribers existed but none accepted the event.
    #[serde(default)]
    pub require_delivery: bool,
}

/// Body of `POST /emit-deploy`.
#[derive(Debug, Deserialize)]
pub struct DeployNotice {
    pub repo: String,
}

async fn broadcast(
    state: &AppState,
    event: Event,
    require_delivery: bool,
) -> Result<Json<DeliveryReport>, EventApiError> {
    let report = state.hub.emit(&event).await?;

    tracing::info!(
        kind = %event.kind,
        subject = %event.subject,
        delivered = report.delivered,
        evicted = report.failed(),
        "event emitted"
    );

    if require_delivery && report.all_failed() {
        return Err(EventApiError::Undelivered(report));
    }
    Ok(Json(report))
}

/// Handler for `POST /events`.
///
/// Accepts `{kind, subject, detail}`, stamps it and pushes it to every live
/// subscriber. Subscriber-side failures never fail the request unless
/// `requireDelivery=true` and no subscriber accepted the event.
pub async fn emit_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<EmitParams>, QueryRejection>,
    payload: Result<Json<EmitRequest>, JsonRejection>,
) -> Result<Json<DeliveryReport>, EventApiError> {
    let Query(params) = params?;
    let Json(request) = payload.inspect_err(|rejection| {
        tracing::warn!("rejected malformed event payload: {}", rejection.body_text());
    })?;
    let event = request.into_event()?;
    broadcast(&state, event, params.require_delivery).await
}

/// Handler for `POST /emit-deploy`.
///
/// Shorthand used by deploy pipelines: `{repo}` becomes a `repo-update`
/// event with detail `deployed`.
pub async fn emit_deploy_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<DeployNotice>, JsonRejection>,
) -> Result<Json<DeliveryReport>, EventApiError> {
    let Json(notice) = payload?;
    let event = EmitRequest {
        kind: kinds::REPO_UPDATE.to_string(),
        subject: notice.repo,
        detail: "deployed".to_string(),
    }
    .into_event()?;
    broadcast(&state, event, false).await
}

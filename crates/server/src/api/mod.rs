use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use server_api::submit_contact;
use shared::{
    error::ContactError,
    protocol::{contact_route, legacy_contact_route, ContactPayload, SubmitResponse},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::warn;

use crate::app_state::AppState;

const MAX_CONTACT_BODY_BYTES: usize = 64 * 1024;

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(contact_route(), any(http_contact))
        .route(legacy_contact_route(), any(http_contact))
        .layer(RequestBodyLimitLayer::new(MAX_CONTACT_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.api.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok").into_response(),
        Err(error) => {
            warn!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable").into_response()
        }
    }
}

async fn http_contact(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return method_not_allowed();
    }

    let payload = match serde_json::from_slice::<ContactPayload>(&body) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(%error, "contact request body is not valid JSON");
            return failure(ContactError::MalformedBody);
        }
    };

    match submit_contact(&state.api, payload).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(SubmitResponse::accepted(receipt.message())),
        )
            .into_response(),
        Err(err) => failure(err),
    }
}

fn method_not_allowed() -> Response {
    let err = ContactError::MethodNotAllowed;
    (
        status_code(&err),
        [(header::ALLOW, "POST")],
        err.client_message().to_string(),
    )
        .into_response()
}

fn failure(err: ContactError) -> Response {
    (
        status_code(&err),
        Json(SubmitResponse::rejected(err.client_message())),
    )
        .into_response()
}

fn status_code(err: &ContactError) -> StatusCode {
    StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

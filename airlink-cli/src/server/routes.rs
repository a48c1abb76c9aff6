//! HTTP route handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use log::{error, warn};
use serde::Serialize;

use super::AppState;
use crate::config::repository::extensions::fetch_extension_and_verify_password;
use crate::extension::ExtensionContext;
use crate::handlers::{
    self, ErrorKind, FetchInitialLinkedRecordsInput, FetchInitialLinkedRecordsOutput,
    FetchRecordsForLinkedRecordsSelectorInput, FetchRecordsForLinkedRecordsSelectorOutput,
};
use crate::session::{Action, LinkedRecordIdsToPrimaryValues, ScreenState};

pub const EXTENSION_ID_HEADER: &str = "x-extension-id";
pub const EXTENSION_PASSWORD_HEADER: &str = "x-extension-password";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub extension_session_id: String,
    pub screen_state: Option<ScreenState>,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::SchemaDrift => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidInput | ErrorKind::InvalidCall => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(kind: ErrorKind, message: impl Into<String>) -> HandlerError {
    (
        status_for(kind),
        Json(ErrorResponse {
            error: message.into(),
            kind: kind.as_str(),
        }),
    )
}

/// Map an error chain to a status and body. Typed errors are surfaced with
/// their own message, everything else with the full chain.
pub fn error_response(err: anyhow::Error) -> HandlerError {
    let kind = handlers::classify(&err);
    let message = match kind {
        ErrorKind::Upstream | ErrorKind::Internal => {
            error!("Request failed: {:#}", err);
            format!("{:#}", err)
        }
        _ => {
            warn!("Request rejected ({}): {:#}", kind.as_str(), err);
            err.root_cause().to_string()
        }
    };
    reject(kind, message)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn verified_extension(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ExtensionContext, HandlerError> {
    let extension_id = header(headers, EXTENSION_ID_HEADER).ok_or_else(|| {
        reject(
            ErrorKind::InvalidInput,
            format!("Missing {} header", EXTENSION_ID_HEADER),
        )
    })?;
    let password = header(headers, EXTENSION_PASSWORD_HEADER);

    fetch_extension_and_verify_password(&state.pool, extension_id, password)
        .await
        .map_err(error_response)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn fetch_initial_linked_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<FetchInitialLinkedRecordsInput>,
) -> Result<Json<FetchInitialLinkedRecordsOutput>, HandlerError> {
    let context = verified_extension(&state, &headers).await?;
    handlers::fetch_initial_linked_records(
        state.api.as_ref(),
        &context,
        state.lookup_resolution_tries,
        input,
    )
    .await
    .map(Json)
    .map_err(error_response)
}

pub async fn fetch_records_for_linked_records_selector(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<FetchRecordsForLinkedRecordsSelectorInput>,
) -> Result<Json<FetchRecordsForLinkedRecordsSelectorOutput>, HandlerError> {
    let context = verified_extension(&state, &headers).await?;
    handlers::fetch_records_for_linked_records_selector(
        state.api.as_ref(),
        &context,
        state.lookup_resolution_tries,
        input,
    )
    .await
    .map(Json)
    .map_err(error_response)
}

pub async fn post_session_action(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(action): Json<Action>,
) -> Result<Json<SessionResponse>, HandlerError> {
    if let Some(target) = action.session_id() {
        if target != session_id {
            return Err(reject(
                ErrorKind::InvalidInput,
                format!(
                    "Action targets session '{}' but was posted to '{}'",
                    target, session_id
                ),
            ));
        }
    }

    let screen_state = match state.sessions.apply(action).await {
        Ok(Some(screen_state)) => Some(screen_state),
        Ok(None) => state.sessions.screen_state(&session_id).await,
        Err(err) => return Err(error_response(err.into())),
    };

    Ok(Json(SessionResponse {
        extension_session_id: session_id,
        screen_state,
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, HandlerError> {
    match state.sessions.screen_state(&session_id).await {
        Some(screen_state) => Ok(Json(SessionResponse {
            extension_session_id: session_id,
            screen_state: Some(screen_state),
        })),
        None => Err(reject(
            ErrorKind::NotFound,
            format!("Session '{}' not found", session_id),
        )),
    }
}

pub async fn get_primary_values(
    State(state): State<AppState>,
) -> Json<LinkedRecordIdsToPrimaryValues> {
    Json(state.sessions.primary_values().await)
}

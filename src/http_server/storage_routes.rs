//! Document HTTP Routes
//!
//! Whole-document transfer authorized by a storage claim token in the path.
//!
//! - `GET /storage/{token}` streams the document
//! - `PUT /storage/{token}` stores the request body as the document

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::errors::GatewayError;
use super::state::{body_stream, AppState};
use crate::claims::{extract_storage_claim, StorageClaim};
use crate::observability::{log_event_with_fields, Event};

pub const STORAGE_ROUTE: &str = "/storage";

/// Create document routes
pub fn storage_routes(state: AppState) -> Router {
    Router::new()
        .route(
            &format!("{}/:token", STORAGE_ROUTE),
            get(download_document_handler).put(upload_document_handler),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

fn authorize(
    state: &AppState,
    token: &str,
    request_id: &str,
    route: &str,
) -> Result<StorageClaim, GatewayError> {
    extract_storage_claim(state.claims.as_ref(), token)
        .map_err(|e| GatewayError::from(e).logged(request_id, route))
}

async fn upload_document_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Body,
) -> Result<Json<Value>, GatewayError> {
    const ROUTE: &str = "upload_document";
    let request_id = Uuid::new_v4().to_string();

    let claim = authorize(&state, &token, &request_id, ROUTE)?;

    state
        .backend
        .store_document(&claim.user_id, &claim.document_id, body_stream(body))
        .await
        .map_err(|e| GatewayError::from(e).logged(&request_id, ROUTE))?;

    log_event_with_fields(
        Event::DocumentUploaded,
        &[
            ("request_id", &request_id),
            ("user_id", &claim.user_id),
            ("document_id", &claim.document_id),
        ],
    );

    Ok(Json(json!({})))
}

async fn download_document_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, GatewayError> {
    const ROUTE: &str = "download_document";
    let request_id = Uuid::new_v4().to_string();

    let claim = authorize(&state, &token, &request_id, ROUTE)?;

    let stream = state
        .backend
        .get_document(&claim.user_id, &claim.document_id)
        .await
        .map_err(|e| GatewayError::from(e).logged(&request_id, ROUTE))?;

    log_event_with_fields(
        Event::DocumentDownloaded,
        &[
            ("request_id", &request_id),
            ("user_id", &claim.user_id),
            ("document_id", &claim.document_id),
        ],
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    Ok((headers, Body::from_stream(stream)).into_response())
}

//! Blob HTTP Routes
//!
//! Blob transfer authorized by signed URL parameters
//! (`uid`, `blobid`, `exp`, `signature`).
//!
//! - `GET /blobstorage` streams the blob and reports its generation
//! - `PUT /blobstorage` stores the body if `x-goog-if-generation-match`
//!   (absent = 0) equals the stored generation, and reports the new one

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::errors::GatewayError;
use super::state::{body_stream, AppState};
use crate::file_storage::{BlobKey, Generation};
use crate::observability::{log_event_with_fields, Event};
use crate::signing::blob_url::BLOB_ROUTE;
use crate::signing::SignedUrlRequest;

/// Generation of the blob as stored after the request
pub const GENERATION_HEADER: &str = "x-goog-generation";

/// Generation the client expects to overwrite
pub const GENERATION_MATCH_HEADER: &str = "x-goog-if-generation-match";

/// Create blob routes
pub fn blob_routes(state: AppState) -> Router {
    Router::new()
        .route(BLOB_ROUTE, get(download_blob_handler).put(upload_blob_handler))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Verify the signed parameters and build the blob key
fn authorize(
    state: &AppState,
    request: &SignedUrlRequest,
    request_id: &str,
    route: &str,
) -> Result<BlobKey, GatewayError> {
    request
        .verify(&state.key)
        .map_err(|e| GatewayError::from(e).logged(request_id, route))?;

    if request.blob_id.is_empty() {
        return Err(GatewayError::MissingBlobId.logged(request_id, route));
    }

    Ok(BlobKey::new(&request.uid, &request.blob_id))
}

/// Read the client's generation precondition
///
/// Absent or empty means generation 0. A value that is not an integer is
/// rejected in strict mode and otherwise treated as 0.
fn expected_generation(
    headers: &HeaderMap,
    strict: bool,
    request_id: &str,
    route: &str,
) -> Result<Generation, GatewayError> {
    let Some(value) = headers.get(GENERATION_MATCH_HEADER) else {
        return Ok(Generation::NONE);
    };

    let raw = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
    if raw.is_empty() {
        return Ok(Generation::NONE);
    }

    match raw.parse::<i64>() {
        Ok(generation) => Ok(Generation(generation)),
        Err(_) if strict => Err(GatewayError::MalformedGeneration(raw).logged(request_id, route)),
        Err(_) => {
            log_event_with_fields(
                Event::GenerationHeaderMalformed,
                &[
                    ("request_id", request_id),
                    ("route", route),
                    ("value", &raw),
                    ("fallback", "0"),
                ],
            );
            Ok(Generation::NONE)
        }
    }
}

fn generation_headers(generation: Generation) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(GENERATION_HEADER),
        HeaderValue::from(generation.value()),
    );
    headers
}

async fn download_blob_handler(
    State(state): State<AppState>,
    Query(request): Query<SignedUrlRequest>,
) -> Result<Response, GatewayError> {
    const ROUTE: &str = "download_blob";
    let request_id = Uuid::new_v4().to_string();

    let key = authorize(&state, &request, &request_id, ROUTE)?;

    let (stream, generation) = state
        .backend
        .load_blob(&key)
        .await
        .map_err(|e| GatewayError::from(e).logged(&request_id, ROUTE))?;

    let generation_str = generation.to_string();
    log_event_with_fields(
        Event::BlobLoaded,
        &[
            ("request_id", &request_id),
            ("user_id", &key.user_id),
            ("blob_id", &key.blob_id),
            ("generation", &generation_str),
        ],
    );

    let mut headers = generation_headers(generation);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    Ok((headers, Body::from_stream(stream)).into_response())
}

async fn upload_blob_handler(
    State(state): State<AppState>,
    Query(request): Query<SignedUrlRequest>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    const ROUTE: &str = "upload_blob";
    let request_id = Uuid::new_v4().to_string();

    let key = authorize(&state, &request, &request_id, ROUTE)?;
    let expected = expected_generation(
        &headers,
        state.strict_generation_header,
        &request_id,
        ROUTE,
    )?;

    let generation = state
        .backend
        .store_blob(&key, body_stream(body), expected)
        .await
        .map_err(|e| GatewayError::from(e).logged(&request_id, ROUTE))?;

    let expected_str = expected.to_string();
    let generation_str = generation.to_string();
    log_event_with_fields(
        Event::BlobStored,
        &[
            ("request_id", &request_id),
            ("user_id", &key.user_id),
            ("blob_id", &key.blob_id),
            ("expected_generation", &expected_str),
            ("generation", &generation_str),
        ],
    );

    Ok((generation_headers(generation), Json(json!({}))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(GENERATION_MATCH_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_absent_header_is_generation_zero() {
        let generation = expected_generation(&HeaderMap::new(), true, "r", "t").unwrap();
        assert_eq!(generation, Generation::NONE);
    }

    #[test]
    fn test_header_parsed() {
        let generation = expected_generation(&headers_with(" 42 "), true, "r", "t").unwrap();
        assert_eq!(generation, Generation(42));
    }

    #[test]
    fn test_malformed_header_permissive() {
        let generation = expected_generation(&headers_with("abc"), false, "r", "t").unwrap();
        assert_eq!(generation, Generation::NONE);
    }

    #[test]
    fn test_malformed_header_strict() {
        let result = expected_generation(&headers_with("abc"), true, "r", "t");
        assert!(matches!(result, Err(GatewayError::MalformedGeneration(v)) if v == "abc"));
    }

    #[test]
    fn test_generation_header_value() {
        let headers = generation_headers(Generation(7));
        assert_eq!(headers[GENERATION_HEADER], "7");
    }
}

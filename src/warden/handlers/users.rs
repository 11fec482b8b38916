use crate::{
    store::SharedStore,
    warden::{
        handlers::CredentialsRequest,
        pipeline,
        response::{CreatedBody, ErrorBody, Reply},
        validate::{self, MessageStyle},
    },
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, instrument};

/// Error code reported in the body of a validation failure on this route.
///
/// Kept at 500 (with an HTTP 400 status) for compatibility with existing clients.
const VALIDATION_ERROR_CODE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

#[utoipa::path(
    post,
    path = "/users",
    request_body = CredentialsRequest,
    responses (
        (status = 201, description = "User created", body = CreatedBody, content_type = "application/json"),
        (status = 400, description = "Invalid payload (errorCode 500), or username already taken (errorCode 400)", body = ErrorBody),
        (status = 500, description = "User could not be stored", body = ErrorBody),
        (status = 413, description = "Body exceeds the 2 MiB request limit", body = ErrorBody),
    ),
    tag = "users"
)]
// axum handler for user registration
#[instrument(skip(store, headers, body))]
pub async fn register(
    store: Extension<SharedStore>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!("unreadable body: {}", rejection);
            return Reply::from(rejection);
        }
    };

    let credentials = match validate::credentials(&headers, &body, MessageStyle::Quoted) {
        Ok(credentials) => credentials,
        Err(e) => {
            debug!("invalid payload: {}", e);
            return Reply::invalid(VALIDATION_ERROR_CODE, &e);
        }
    };

    Reply::from(pipeline::register(store.0.as_ref(), credentials).await)
}

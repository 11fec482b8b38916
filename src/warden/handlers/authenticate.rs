use crate::{
    store::SharedStore,
    warden::{
        handlers::CredentialsRequest,
        pipeline,
        response::{ErrorBody, Reply, SuccessBody},
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
const VALIDATION_ERROR_CODE: StatusCode = StatusCode::BAD_REQUEST;

#[utoipa::path(
    post,
    path = "/authenticate",
    request_body = CredentialsRequest,
    responses (
        (status = 200, description = "Credentials match a user", body = SuccessBody, content_type = "application/json"),
        (status = 400, description = "Missing or malformed username/password", body = ErrorBody),
        (status = 401, description = "Credentials do not match any user", body = ErrorBody),
        (status = 413, description = "Body exceeds the 2 MiB request limit", body = ErrorBody),
    ),
    tag = "authenticate"
)]
// axum handler for authenticate
#[instrument(skip(store, headers, body))]
pub async fn authenticate(
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

    let credentials = match validate::credentials(&headers, &body, MessageStyle::BareRequired) {
        Ok(credentials) => credentials,
        Err(e) => {
            debug!("invalid payload: {}", e);
            return Reply::invalid(VALIDATION_ERROR_CODE, &e);
        }
    };

    Reply::from(pipeline::authenticate(store.0.as_ref(), &credentials).await)
}

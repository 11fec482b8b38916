//! Pipeline outcomes to HTTP status codes and JSON bodies.

use crate::store::{User, UserId};
use crate::warden::pipeline::{AuthError, RegisterError};
use crate::warden::validate::ValidationError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const AUTHORISED: &str = "Authorised";
pub const NOT_AUTHORISED: &str = "Not Authorised";
pub const BAD_REQUEST: &str = "Bad Request";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// `200` body of `/authenticate`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuccessBody {
    pub message: String,
    pub success_code: u16,
}

/// Every non-2xx body.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: u16,
    pub message: String,
}

/// `201` body of `/users`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedBody {
    /// Store-assigned UUID
    #[schema(value_type = String, example = "3f2b8c1e-9d4a-4e6b-8f21-7a5c0d9e1b44")]
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Authorised,
    NotAuthorised,
    Created(UserId),
    BadRequest,
    InternalServerError,
    /// Validation failure; `error_code` is the value the route reports in the body.
    Invalid { error_code: u16, message: String },
    /// The body could not be read (too large, aborted).
    Rejected { status: StatusCode, message: String },
}

impl Reply {
    #[must_use]
    pub fn invalid(error_code: StatusCode, err: &ValidationError) -> Self {
        Self::Invalid {
            error_code: error_code.as_u16(),
            message: err.message().to_string(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Authorised => StatusCode::OK,
            Self::NotAuthorised => StatusCode::UNAUTHORIZED,
            Self::Created(_) => StatusCode::CREATED,
            Self::BadRequest | Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn error_body(error_code: StatusCode, message: &str) -> ErrorBody {
        ErrorBody {
            error_code: error_code.as_u16(),
            message: message.to_string(),
        }
    }
}

impl From<BytesRejection> for Reply {
    fn from(rejection: BytesRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<Result<User, AuthError>> for Reply {
    fn from(result: Result<User, AuthError>) -> Self {
        match result {
            Ok(_) => Self::Authorised,
            Err(AuthError::CredentialMismatch | AuthError::Store(_)) => Self::NotAuthorised,
        }
    }
}

impl From<Result<User, RegisterError>> for Reply {
    fn from(result: Result<User, RegisterError>) -> Self {
        match result {
            Ok(user) => Self::Created(user.id),
            Err(RegisterError::DuplicateUsername | RegisterError::Lookup(_)) => Self::BadRequest,
            Err(RegisterError::Insert(_)) => Self::InternalServerError,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::Authorised => (
                status,
                Json(SuccessBody {
                    message: AUTHORISED.to_string(),
                    success_code: status.as_u16(),
                }),
            )
                .into_response(),
            Self::Created(id) => (status, Json(CreatedBody { id })).into_response(),
            Self::NotAuthorised => {
                (status, Json(Self::error_body(status, NOT_AUTHORISED))).into_response()
            }
            Self::BadRequest => (status, Json(Self::error_body(status, BAD_REQUEST))).into_response(),
            Self::InternalServerError => {
                (status, Json(Self::error_body(status, INTERNAL_SERVER_ERROR))).into_response()
            }
            Self::Invalid {
                error_code,
                message,
            } => (status, Json(ErrorBody { error_code, message })).into_response(),
            Self::Rejected { message, .. } => (
                status,
                Json(ErrorBody {
                    error_code: status.as_u16(),
                    message,
                }),
            )
                .into_response(),
        }
    }
}

//! Axum handlers for the public routes.

pub mod authenticate;
pub use self::authenticate::authenticate;

pub mod health;
pub use self::health::health;

pub mod users;
pub use self::users::register;


use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body accepted by `/authenticate` and `/users`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CredentialsRequest {
    /// Mandatory username
    pub username: String,
    /// Mandatory password
    pub password: String,
}

//! Request body validation shared by `/authenticate` and `/users`.
//!
//! Both routes accept `{ "username": string, "password": string }` and nothing
//! else. Validation stops at the first violation: keys are checked in schema
//! order, then unknown keys. Nothing here touches the store.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use secrecy::SecretString;
use serde_json::{Map, Value};
use std::fmt;

/// Required keys, in the order they are checked.
pub const FIELDS: [&str; 2] = ["username", "password"];

/// How the "missing key" message renders the key name.
///
/// `/authenticate` prints the bare key (`username is required`) while every
/// other message, and every message on `/users`, quotes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageStyle {
    Quoted,
    BareRequired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    Required(&'static str),
    NotString(&'static str),
    Empty(&'static str),
    NotAllowed(String),
    NotObject,
    /// Body was declared JSON but could not be parsed as an object or array.
    Malformed,
}

impl Violation {
    #[must_use]
    pub fn message(&self, style: MessageStyle) -> String {
        match (self, style) {
            (Self::Required(key), MessageStyle::BareRequired) => format!("{key} is required"),
            (Self::Required(key), MessageStyle::Quoted) => format!("\"{key}\" is required"),
            (Self::NotString(key), _) => format!("\"{key}\" must be a string"),
            (Self::Empty(key), _) => format!("\"{key}\" is not allowed to be empty"),
            (Self::NotAllowed(key), _) => format!("\"{key}\" is not allowed"),
            (Self::NotObject, _) => "\"value\" must be an object".to_string(),
            (Self::Malformed, _) => String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    violation: Violation,
    message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(violation: Violation, style: MessageStyle) -> Self {
        let message = violation.message(style);
        Self { violation, message }
    }

    #[must_use]
    pub const fn violation(&self) -> &Violation {
        &self.violation
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Validated request payload.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Parse and validate a raw request into [`Credentials`].
///
/// # Errors
/// Returns the first violation found, rendered with `style`.
pub fn credentials(
    headers: &HeaderMap,
    body: &[u8],
    style: MessageStyle,
) -> Result<Credentials, ValidationError> {
    let payload = parse_body(headers, body).map_err(|v| ValidationError::new(v, style))?;
    validate(&payload, style)
}

/// Decode the body the way a JSON body parser would: anything not declared as
/// JSON, or an empty body, is treated as an empty object.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, Violation> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(value),
        Ok(_) | Err(_) => Err(Violation::Malformed),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

/// Check a decoded payload against the credentials schema.
///
/// # Errors
/// Returns the first violation found, rendered with `style`.
pub fn validate(payload: &Value, style: MessageStyle) -> Result<Credentials, ValidationError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ValidationError::new(Violation::NotObject, style))?;

    let username = required_string(object, FIELDS[0]).map_err(|v| ValidationError::new(v, style))?;
    let password = required_string(object, FIELDS[1]).map_err(|v| ValidationError::new(v, style))?;

    if let Some(unknown) = object.keys().find(|key| !FIELDS.contains(&key.as_str())) {
        return Err(ValidationError::new(
            Violation::NotAllowed(unknown.clone()),
            style,
        ));
    }

    Ok(Credentials {
        username: username.to_string(),
        password: SecretString::from(password.to_string()),
    })
}

fn required_string<'a>(object: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, Violation> {
    match object.get(key) {
        None => Err(Violation::Required(key)),
        Some(Value::String(value)) if value.is_empty() => Err(Violation::Empty(key)),
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(Violation::NotString(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn message(payload: &Value, style: MessageStyle) -> Option<String> {
        validate(payload, style).err().map(|e| e.message().to_string())
    }

    #[test]
    fn accepts_username_and_password() {
        let result = validate(
            &json!({"username": "test", "password": "jhkwdhfkh"}),
            MessageStyle::Quoted,
        );
        assert!(result.is_ok());
        if let Ok(credentials) = result {
            assert_eq!(credentials.username, "test");
            assert_eq!(credentials.password.expose_secret(), "jhkwdhfkh");
        }
    }

    #[test]
    fn missing_password_is_reported() {
        let payload = json!({"username": "test@test.com"});
        assert_eq!(
            message(&payload, MessageStyle::BareRequired).as_deref(),
            Some("password is required")
        );
        assert_eq!(
            message(&payload, MessageStyle::Quoted).as_deref(),
            Some("\"password\" is required")
        );
    }

    #[test]
    fn username_is_checked_before_password() {
        let payload = json!({});
        assert_eq!(
            message(&payload, MessageStyle::BareRequired).as_deref(),
            Some("username is required")
        );
    }

    #[test]
    fn non_string_values_are_rejected_not_coerced() {
        assert_eq!(
            message(&json!({"username": "test@test.com", "password": 2222}), MessageStyle::BareRequired)
                .as_deref(),
            Some("\"password\" must be a string")
        );
        assert_eq!(
            message(&json!({"username": 123, "password": "test123"}), MessageStyle::Quoted).as_deref(),
            Some("\"username\" must be a string")
        );
        assert_eq!(
            message(&json!({"username": null, "password": "test123"}), MessageStyle::Quoted).as_deref(),
            Some("\"username\" must be a string")
        );
    }

    #[test]
    fn empty_strings_are_rejected() {
        assert_eq!(
            message(&json!({"username": "", "password": "x"}), MessageStyle::Quoted).as_deref(),
            Some("\"username\" is not allowed to be empty")
        );
    }

    #[test]
    fn unknown_keys_are_rejected_after_required_ones() {
        assert_eq!(
            message(&json!({"username": "a", "password": "b", "admin": true}), MessageStyle::Quoted)
                .as_deref(),
            Some("\"admin\" is not allowed")
        );
        // a missing required key wins over an unknown one
        assert_eq!(
            message(&json!({"admin": true}), MessageStyle::Quoted).as_deref(),
            Some("\"username\" is required")
        );
    }

    #[test]
    fn arrays_are_not_objects() {
        assert_eq!(
            message(&json!(["username", "password"]), MessageStyle::Quoted).as_deref(),
            Some("\"value\" must be an object")
        );
    }

    #[test]
    fn non_json_content_type_validates_as_empty_object() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let result = credentials(&headers, br#"{"username":"a","password":"b"}"#, MessageStyle::Quoted);
        assert_eq!(
            result.err().map(|e| e.violation().clone()),
            Some(Violation::Required("username"))
        );
    }

    #[test]
    fn json_content_type_with_charset_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let result = credentials(&headers, br#"{"username":"a","password":"b"}"#, MessageStyle::Quoted);
        assert!(result.is_ok());
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        let result = credentials(&json_headers(), b"", MessageStyle::BareRequired);
        assert_eq!(
            result.err().map(|e| e.message().to_string()).as_deref(),
            Some("username is required")
        );
    }

    #[test]
    fn malformed_json_has_empty_message() {
        let result = credentials(&json_headers(), b"{\"username\":", MessageStyle::Quoted);
        assert_eq!(
            result.err().map(|e| e.violation().clone()),
            Some(Violation::Malformed)
        );

        let result = credentials(&json_headers(), b"\"just a string\"", MessageStyle::Quoted);
        assert_eq!(result.err().map(|e| e.message().to_string()).as_deref(), Some(""));
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials {
            username: "bob".to_string(),
            password: SecretString::from("test123".to_string()),
        };
        let output = format!("{credentials:?}");
        assert!(output.contains("bob"));
        assert!(!output.contains("test123"));
    }
}

//! Response classification: executor outcome to payload or typed error.
//!
//! | Status | Request            | Token creation      |
//! |--------|--------------------|---------------------|
//! | 401    | Unauthorized       | Unauthorized        |
//! | 403    | Role               | Generic             |
//! | 404    | NotFound           | NotFound            |
//! | 422    | UnprocessableEntity, body kept when it has `errors` | Generic |
//! | 500    | InternalServer     | InternalServer      |
//! | other >= 400 or transport failure | Generic | Generic |
//!
//! The message is the body's `message` field when the body is an object
//! that has one, otherwise the executor message. The code is the HTTP status,
//! or the transport code when no response arrived.

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// What the HTTP executor reported for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A response arrived. `body` is already decoded.
    Http {
        status: u16,
        message: String,
        body: Value,
    },
    /// No response at all (DNS, connect, timeout, request build failure).
    Transport { code: u32, message: String },
}

impl Outcome {
    /// Whether the executor flagged this outcome as failed.
    pub fn is_error(&self) -> bool {
        match self {
            Outcome::Http { status, .. } => *status >= 400,
            Outcome::Transport { .. } => true,
        }
    }
}

/// Which status table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTable {
    /// Authenticated GET/POST.
    Request,
    /// Unauthenticated token creation.
    TokenCreation,
}

impl StatusTable {
    fn kind_for(self, status: u16) -> ErrorKind {
        match (self, status) {
            (_, 401) => ErrorKind::Unauthorized,
            (_, 404) => ErrorKind::NotFound,
            (_, 500) => ErrorKind::InternalServer,
            (StatusTable::Request, 403) => ErrorKind::Role,
            (StatusTable::Request, 422) => ErrorKind::UnprocessableEntity,
            _ => ErrorKind::Generic,
        }
    }
}

/// Last validation payload returned with a 422.
///
/// Overwritten by each new 422 that carries an `errors` field; never cleared
/// automatically.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    last: Mutex<Option<Value>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole body of the most recent qualifying 422, if any.
    pub fn get(&self) -> Option<Value> {
        self.last.lock().clone()
    }

    fn store(&self, body: Value) {
        *self.last.lock() = Some(body);
    }

    /// Forget the stored payload.
    pub fn clear(&self) {
        *self.last.lock() = None;
    }
}

/// Decode a response body. Empty or non-JSON text becomes `Null`.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or(Value::Null)
}

/// Prefer the body's `message` field over the executor message.
fn resolve_message(body: &Value, fallback: String) -> String {
    match body.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => fallback,
        Some(other) => other.to_string(),
    }
}

/// Turn an outcome into the decoded payload or the matching error.
///
/// A 422 under [`StatusTable::Request`] whose body is an object with an
/// `errors` field is stored into `validation` before the error is returned.
pub fn classify(
    outcome: Outcome,
    table: StatusTable,
    validation: &ValidationErrors,
) -> Result<Value> {
    match outcome {
        Outcome::Transport { code, message } => Err(Error::new(ErrorKind::Generic, code, message)),
        Outcome::Http { status, body, .. } if status < 400 => Ok(body),
        Outcome::Http {
            status,
            message,
            body,
        } => {
            let kind = table.kind_for(status);
            let message = resolve_message(&body, message);
            if kind == ErrorKind::UnprocessableEntity && body.get("errors").is_some() {
                tracing::warn!(status, "request failed validation");
                validation.store(body);
            }
            Err(Error::new(kind, u32::from(status), message))
        }
    }
}

//! Core types shared by the facade and the per-namespace APIs.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::normalize::normalize_credential;

// ─────────────────────────────────────────────────────────────────────────────
// Namespaces
// ─────────────────────────────────────────────────────────────────────────────

/// Path prefix of the external-application API.
pub const EXTERNAL_APP_PREFIX: &str = "ex-app";

/// Path prefix of the customer API.
pub const CUSTOMER_API_PREFIX: &str = "customer-api";

/// Token-creation sub-path for key/secret authentication.
pub const CREATE_TOKEN_PATH: &str = "create-token";

/// Token-creation sub-path for username/password authentication.
pub const LOGIN_PATH: &str = "login";

/// An API family, identified by the first path segment after the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `ex-app`, authenticated with a key/secret pair.
    ExternalApp,
    /// `customer-api`, authenticated with username/password.
    CustomerApi,
    /// Any caller-named prefix. Not validated.
    Other(String),
}

impl Namespace {
    /// Build an `Other` namespace from an arbitrary prefix.
    pub fn other(prefix: impl Into<String>) -> Self {
        Namespace::Other(prefix.into())
    }

    /// The path segment this namespace is served under.
    pub fn prefix(&self) -> &str {
        match self {
            Namespace::ExternalApp => EXTERNAL_APP_PREFIX,
            Namespace::CustomerApi => CUSTOMER_API_PREFIX,
            Namespace::Other(prefix) => prefix,
        }
    }

    /// Default sub-path used to obtain a token for this namespace.
    pub fn default_token_path(&self) -> &'static str {
        match self {
            Namespace::ExternalApp => CREATE_TOKEN_PATH,
            Namespace::CustomerApi | Namespace::Other(_) => LOGIN_PATH,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Payload is sent as a query string.
    Get,
    /// Payload is sent as the request body.
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// How POST bodies are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`.
    #[default]
    Form,
    /// `application/json`.
    Json,
}

/// Empty payload for calls that carry no parameters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoParams {}

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Login material for a token-creation call. Both halves are trimmed.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as `key` / `password`.
    KeySecret { key: String, secret: String },
    /// Sent as `username` / `password`.
    UsernamePassword { username: String, password: String },
}

impl Credentials {
    pub fn key_secret(key: &str, secret: &str) -> Self {
        Credentials::KeySecret {
            key: normalize_credential(key),
            secret: normalize_credential(secret),
        }
    }

    pub fn username_password(username: &str, password: &str) -> Self {
        Credentials::UsernamePassword {
            username: normalize_credential(username),
            password: normalize_credential(password),
        }
    }

    /// The public half (key or username).
    pub fn identity(&self) -> &str {
        match self {
            Credentials::KeySecret { key, .. } => key,
            Credentials::UsernamePassword { username, .. } => username,
        }
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Credentials", 2)?;
        match self {
            Credentials::KeySecret { key, secret } => {
                state.serialize_field("key", key)?;
                state.serialize_field("password", secret)?;
            }
            Credentials::UsernamePassword { username, password } => {
                state.serialize_field("username", username)?;
                state.serialize_field("password", password)?;
            }
        }
        state.end()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::KeySecret { key, .. } => f
                .debug_struct("KeySecret")
                .field("key", key)
                .field("secret", &"<redacted>")
                .finish(),
            Credentials::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

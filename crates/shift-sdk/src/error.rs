//! Client error types.

use thiserror::Error;

/// Code carried by [`Error::Client`] when the caller passes an invalid argument.
pub const CLIENT_ERROR_CODE: u32 = 9001;

/// Message used when a token-creation response carries no usable token.
pub(crate) const CREATE_TOKEN_ERROR: &str = "create token error";

/// Client error type.
///
/// Every variant except [`Error::Config`] carries a numeric `code` (the HTTP
/// status, a transport error code, or [`CLIENT_ERROR_CODE`]) and a
/// human-readable `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid argument supplied by the caller. Never reaches the network.
    #[error("client error [{code}]: {message}")]
    Client { code: u32, message: String },

    /// HTTP 401: credentials or token rejected.
    #[error("unauthorized [{code}]: {message}")]
    Unauthorized { code: u32, message: String },

    /// HTTP 403: authenticated but not allowed.
    #[error("role error [{code}]: {message}")]
    Role { code: u32, message: String },

    /// HTTP 404.
    #[error("not found [{code}]: {message}")]
    NotFound { code: u32, message: String },

    /// HTTP 422. Field detail is available from
    /// [`ShiftClient::validation_errors`](crate::ShiftClient::validation_errors).
    #[error("unprocessable entity [{code}]: {message}")]
    UnprocessableEntity { code: u32, message: String },

    /// HTTP 500.
    #[error("internal server error [{code}]: {message}")]
    InternalServer { code: u32, message: String },

    /// Any other status, an unclassified transport failure, or a malformed
    /// token-creation response.
    #[error("error [{code}]: {message}")]
    Generic { code: u32, message: String },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`Error`], handy for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Client,
    Unauthorized,
    Role,
    NotFound,
    UnprocessableEntity,
    InternalServer,
    Generic,
    Config,
}

impl Error {
    /// Build an error of the given kind.
    ///
    /// [`ErrorKind::Config`] ignores `code`.
    pub fn new(kind: ErrorKind, code: u32, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Client => Error::Client { code, message },
            ErrorKind::Unauthorized => Error::Unauthorized { code, message },
            ErrorKind::Role => Error::Role { code, message },
            ErrorKind::NotFound => Error::NotFound { code, message },
            ErrorKind::UnprocessableEntity => Error::UnprocessableEntity { code, message },
            ErrorKind::InternalServer => Error::InternalServer { code, message },
            ErrorKind::Generic => Error::Generic { code, message },
            ErrorKind::Config => Error::Config(message),
        }
    }

    /// The empty-endpoint argument error.
    pub(crate) fn empty_endpoint() -> Self {
        Error::Client {
            code: CLIENT_ERROR_CODE,
            message: "end point empty".to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Client { .. } => ErrorKind::Client,
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Role { .. } => ErrorKind::Role,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::UnprocessableEntity { .. } => ErrorKind::UnprocessableEntity,
            Error::InternalServer { .. } => ErrorKind::InternalServer,
            Error::Generic { .. } => ErrorKind::Generic,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Numeric code: HTTP status, transport code, or 9001. `0` for config errors.
    pub fn code(&self) -> u32 {
        match self {
            Error::Client { code, .. }
            | Error::Unauthorized { code, .. }
            | Error::Role { code, .. }
            | Error::NotFound { code, .. }
            | Error::UnprocessableEntity { code, .. }
            | Error::InternalServer { code, .. }
            | Error::Generic { code, .. } => *code,
            Error::Config(_) => 0,
        }
    }

    /// The message without the kind/code prefix that `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            Error::Client { message, .. }
            | Error::Unauthorized { message, .. }
            | Error::Role { message, .. }
            | Error::NotFound { message, .. }
            | Error::UnprocessableEntity { message, .. }
            | Error::InternalServer { message, .. }
            | Error::Generic { message, .. }
            | Error::Config(message) => message,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is an authentication or authorization error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized { .. } | Error::Role { .. })
    }

    /// Check if the server rejected the request payload (HTTP 422).
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::UnprocessableEntity { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        match self {
            Error::InternalServer { .. } => true,
            Error::Generic { code, .. } => (500..600).contains(code),
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

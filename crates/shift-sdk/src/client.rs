//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::{CustomerApi, ExternalAppApi, OtherApi};
use crate::classify::{Outcome, StatusTable, ValidationErrors, classify, decode_body};
use crate::config::SdkConfig;
use crate::encode::{encode_params, invalid_payload};
use crate::error::{CREATE_TOKEN_ERROR, Error, ErrorKind, Result};
use crate::normalize::{normalize_base_url, normalize_credential, normalize_endpoint};
use crate::token::TokenStore;
use crate::types::{BodyEncoding, Credentials, Method, Namespace};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport codes for failures with no HTTP response, numbered as in libcurl.
const CONNECT_FAILED_CODE: u32 = 7;
const TIMEOUT_CODE: u32 = 28;
const RECEIVE_FAILED_CODE: u32 = 56;

/// Shift API client.
///
/// Holds one bearer token per namespace and the last validation payload.
/// Clones share that state.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use shift_sdk::ShiftClient;
///
/// # async fn example() -> shift_sdk::Result<()> {
/// let client = ShiftClient::new("https://shift.example.com/", "key", "secret")?;
///
/// client.external_app().create_token("key", "secret").await?;
/// let shifts = client
///     .external_app()
///     .get("shifts", &json!({"month": "2024-05"}))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ShiftClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// Key/secret pair for the single-namespace `create_token` call.
    api_credentials: Option<Credentials>,
    /// Request timeout.
    timeout: Duration,
    /// POST body encoding.
    body_encoding: BodyEncoding,
    /// Bearer tokens per namespace.
    tokens: TokenStore,
    /// Last 422 payload carrying `errors`.
    validation: ValidationErrors,
}

impl ShiftClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with a base URL and external-app key/secret.
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Result<Self> {
        Self::builder()
            .base_url(base_url)
            .api_key(api_key)
            .api_secret(api_secret)
            .build()
    }

    /// Get the normalized base URL.
    pub fn api_base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The external-app key given at construction.
    pub fn api_key(&self) -> Option<&str> {
        match &self.inner.api_credentials {
            Some(Credentials::KeySecret { key, .. }) => Some(key),
            _ => None,
        }
    }

    /// The external-app secret given at construction.
    pub fn api_secret(&self) -> Option<&str> {
        match &self.inner.api_credentials {
            Some(Credentials::KeySecret { secret, .. }) => Some(secret),
            _ => None,
        }
    }

    /// Body of the most recent 422 response that carried an `errors` field.
    pub fn validation_errors(&self) -> Option<Value> {
        self.inner.validation.get()
    }

    /// Forget the stored validation payload.
    pub fn clear_validation_errors(&self) {
        self.inner.validation.clear();
    }

    /// Current token for a namespace.
    pub fn token(&self, namespace: &Namespace) -> Option<String> {
        self.inner.tokens.get(namespace)
    }

    /// Replace the token for a namespace, e.g. one obtained out of band.
    pub fn set_token(&self, namespace: &Namespace, token: impl Into<String>) {
        self.inner.tokens.set(namespace, token);
    }

    /// Drop the token for a namespace.
    pub fn clear_token(&self, namespace: &Namespace) -> Option<String> {
        self.inner.tokens.clear(namespace)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the external-application API (`ex-app`).
    pub fn external_app(&self) -> ExternalAppApi {
        ExternalAppApi::new(self.clone())
    }

    /// Access the customer API (`customer-api`).
    pub fn customer_api(&self) -> CustomerApi {
        CustomerApi::new(self.clone())
    }

    /// Access an API served under an arbitrary prefix.
    ///
    /// All such APIs share one token slot.
    pub fn other_api(&self, prefix: impl Into<String>) -> OtherApi {
        OtherApi::new(self.clone(), prefix.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token creation
    // ─────────────────────────────────────────────────────────────────────────

    /// Obtain an external-app token with the key/secret given at construction.
    pub async fn create_token(&self) -> Result<()> {
        let credentials = self.inner.api_credentials.clone().ok_or_else(|| {
            Error::Config("api_key and api_secret are required for create_token".to_string())
        })?;
        self.create_token_for(
            &Namespace::ExternalApp,
            Namespace::ExternalApp.default_token_path(),
            &credentials,
        )
        .await
    }

    /// POST `credentials` to `{base}/{prefix}/{path}` without a bearer token
    /// and store the returned `token` in the namespace's slot.
    ///
    /// The slot is left untouched on any failure.
    pub async fn create_token_for(
        &self,
        namespace: &Namespace,
        path: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        let path = normalize_endpoint(path);
        if path.is_empty() {
            return Err(Error::empty_endpoint());
        }

        let url = self.url(namespace.prefix(), &path);
        let outcome = self.execute(Method::Post, &url, None, credentials).await?;
        let body = classify(outcome, StatusTable::TokenCreation, &self.inner.validation)?;

        let token = token_from_body(&body)
            .ok_or_else(|| Error::new(ErrorKind::Generic, 0, CREATE_TOKEN_ERROR))?;

        self.inner.tokens.set(namespace, token);
        tracing::debug!(%namespace, "stored new token");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authenticated requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Send an authenticated request using the namespace's stored token.
    pub async fn request<P>(
        &self,
        method: Method,
        namespace: &Namespace,
        endpoint: &str,
        payload: &P,
    ) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let token = self.inner.tokens.get(namespace);
        self.request_with_token(method, namespace.prefix(), token.as_deref(), endpoint, payload)
            .await
    }

    /// Send a request to `{base}/{prefix}/{endpoint}` with an explicit token.
    ///
    /// An unset token still produces an `Authorization: Bearer ` header; the
    /// server decides what to do with it. GET payloads become the query
    /// string, POST payloads the body.
    ///
    /// Fails with [`Error::Client`] (code 9001) before any network activity
    /// when the normalized endpoint is empty or the payload cannot be encoded.
    pub async fn request_with_token<P>(
        &self,
        method: Method,
        prefix: &str,
        token: Option<&str>,
        endpoint: &str,
        payload: &P,
    ) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let endpoint = normalize_endpoint(endpoint);
        if endpoint.is_empty() {
            return Err(Error::empty_endpoint());
        }

        let url = self.url(prefix, &endpoint);
        let bearer = format!("Bearer {}", token.unwrap_or_default());
        let outcome = self
            .execute(method, &url, Some(bearer.as_str()), payload)
            .await?;
        classify(outcome, StatusTable::Request, &self.inner.validation)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a namespaced endpoint.
    pub(crate) fn url(&self, prefix: &str, endpoint: &str) -> String {
        format!("{}/{}/{}", self.inner.base_url, prefix, endpoint)
    }

    /// Perform exactly one round trip and report what happened.
    ///
    /// Only payload encoding can fail here, and it fails before anything is
    /// sent.
    async fn execute<P>(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        payload: &P,
    ) -> Result<Outcome>
    where
        P: Serialize + ?Sized,
    {
        let http = &self.inner.http;
        let mut request = match (method, self.inner.body_encoding) {
            (Method::Get, _) => {
                let query = encode_params(payload)?;
                if query.is_empty() {
                    http.get(url)
                } else {
                    http.get(format!("{}?{}", url, query))
                }
            }
            (Method::Post, BodyEncoding::Form) => http
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encode_params(payload)?),
            (Method::Post, BodyEncoding::Json) => {
                let body = serde_json::to_vec(payload).map_err(invalid_payload)?;
                http.post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
            }
        };
        request = request
            .header(ACCEPT, "application/json")
            .timeout(self.inner.timeout);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        tracing::debug!(%method, url, "sending request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Ok(transport_failure(&e)),
        };

        let status = response.status();
        let message = match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        };
        tracing::debug!(status = status.as_u16(), url, "received response");

        Ok(match response.text().await {
            Ok(text) => Outcome::Http {
                status: status.as_u16(),
                message,
                body: decode_body(&text),
            },
            Err(e) => transport_failure(&e),
        })
    }
}

/// The `token` field of a token-creation response. Numbers are accepted and
/// stored as their decimal text.
fn token_from_body(body: &Value) -> Option<String> {
    match body.get("token")? {
        Value::String(token) => Some(token.clone()),
        Value::Number(token) => Some(token.to_string()),
        _ => None,
    }
}

fn transport_failure(e: &reqwest::Error) -> Outcome {
    let code = if e.is_timeout() {
        TIMEOUT_CODE
    } else if e.is_connect() {
        CONNECT_FAILED_CODE
    } else if e.is_body() || e.is_decode() {
        RECEIVE_FAILED_CODE
    } else {
        0
    };
    tracing::debug!(code, error = %e, "request failed without a response");
    Outcome::Transport {
        code,
        message: e.to_string(),
    }
}

/// Builder for creating a ShiftClient.
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    body_encoding: BodyEncoding,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded [`SdkConfig`].
    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            base_url: Some(config.base_url.clone()),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            user_agent: config.user_agent.clone(),
            body_encoding: config.body_encoding,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the external-app key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the external-app secret.
    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Choose how POST bodies are encoded. Defaults to form encoding.
    pub fn body_encoding(mut self, encoding: BodyEncoding) -> Self {
        self.body_encoding = encoding;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ShiftClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        let base_url = normalize_base_url(&base_url);
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {}", base_url, e)))?;

        let api_credentials = match (self.api_key, self.api_secret) {
            (Some(key), Some(secret)) => Some(Credentials::KeySecret {
                key: normalize_credential(&key),
                secret: normalize_credential(&secret),
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "api_key and api_secret must be set together".to_string(),
                ));
            }
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("shift-sdk/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(ShiftClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_credentials,
                timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                body_encoding: self.body_encoding,
                tokens: TokenStore::new(),
                validation: ValidationErrors::new(),
            }),
        })
    }
}

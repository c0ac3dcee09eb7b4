//! External-application API (`ex-app`).

use serde::Serialize;
use serde_json::Value;

use crate::client::ShiftClient;
use crate::error::Result;
use crate::types::{CREATE_TOKEN_PATH, Credentials, Method, Namespace};

/// External-application API client.
///
/// Authenticates with a key/secret pair against `ex-app/create-token`.
pub struct ExternalAppApi {
    client: ShiftClient,
}

impl ExternalAppApi {
    pub(crate) fn new(client: ShiftClient) -> Self {
        Self { client }
    }

    /// Obtain and store a token for this namespace.
    pub async fn create_token(&self, key: &str, secret: &str) -> Result<()> {
        self.client
            .create_token_for(
                &Namespace::ExternalApp,
                CREATE_TOKEN_PATH,
                &Credentials::key_secret(key, secret),
            )
            .await
    }

    /// GET an endpoint with `query` as the query string.
    pub async fn get<Q>(&self, endpoint: &str, query: &Q) -> Result<Value>
    where
        Q: Serialize + ?Sized,
    {
        self.client
            .request(Method::Get, &Namespace::ExternalApp, endpoint, query)
            .await
    }

    /// POST `data` to an endpoint.
    pub async fn post<B>(&self, endpoint: &str, data: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .request(Method::Post, &Namespace::ExternalApp, endpoint, data)
            .await
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<String> {
        self.client.token(&Namespace::ExternalApp)
    }

    /// Replace the current token.
    pub fn set_token(&self, token: impl Into<String>) {
        self.client.set_token(&Namespace::ExternalApp, token);
    }
}

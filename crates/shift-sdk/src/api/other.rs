//! APIs served under a caller-chosen prefix.

use serde::Serialize;
use serde_json::Value;

use crate::client::ShiftClient;
use crate::error::Result;
use crate::types::{Credentials, LOGIN_PATH, Method, Namespace};

/// Client for an arbitrary API prefix.
///
/// Every `OtherApi` shares one token slot regardless of prefix: creating a
/// token through any of them replaces the token all of them send.
pub struct OtherApi {
    client: ShiftClient,
    namespace: Namespace,
}

impl OtherApi {
    pub(crate) fn new(client: ShiftClient, prefix: String) -> Self {
        Self {
            client,
            namespace: Namespace::Other(prefix),
        }
    }

    /// The prefix this accessor targets.
    pub fn prefix(&self) -> &str {
        self.namespace.prefix()
    }

    /// Log in at `{prefix}/login`.
    pub async fn create_token(&self, username: &str, password: &str) -> Result<()> {
        self.create_token_at(LOGIN_PATH, username, password).await
    }

    /// Log in at `{prefix}/{path}`.
    pub async fn create_token_at(&self, path: &str, username: &str, password: &str) -> Result<()> {
        self.client
            .create_token_for(
                &self.namespace,
                path,
                &Credentials::username_password(username, password),
            )
            .await
    }

    /// GET an endpoint with `query` as the query string.
    pub async fn get<Q>(&self, endpoint: &str, query: &Q) -> Result<Value>
    where
        Q: Serialize + ?Sized,
    {
        self.client
            .request(Method::Get, &self.namespace, endpoint, query)
            .await
    }

    /// POST `data` to an endpoint.
    pub async fn post<B>(&self, endpoint: &str, data: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .request(Method::Post, &self.namespace, endpoint, data)
            .await
    }

    /// The shared "other" token.
    pub fn token(&self) -> Option<String> {
        self.client.token(&self.namespace)
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.client.set_token(&self.namespace, token);
    }
}

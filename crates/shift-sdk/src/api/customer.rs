//! Customer API (`customer-api`).

use serde::Serialize;
use serde_json::Value;

use crate::client::ShiftClient;
use crate::error::Result;
use crate::types::{Credentials, LOGIN_PATH, Method, Namespace};

/// Customer API client.
pub struct CustomerApi {
    client: ShiftClient,
}

impl CustomerApi {
    pub(crate) fn new(client: ShiftClient) -> Self {
        Self { client }
    }

    /// Log in with username/password and store the returned token.
    pub async fn create_token(&self, username: &str, password: &str) -> Result<()> {
        self.client
            .create_token_for(
                &Namespace::CustomerApi,
                LOGIN_PATH,
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
            .request(Method::Get, &Namespace::CustomerApi, endpoint, query)
            .await
    }

    /// POST `data` to an endpoint.
    pub async fn post<B>(&self, endpoint: &str, data: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.client
            .request(Method::Post, &Namespace::CustomerApi, endpoint, data)
            .await
    }

    pub fn token(&self) -> Option<String> {
        self.client.token(&Namespace::CustomerApi)
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.client.set_token(&Namespace::CustomerApi, token);
    }
}

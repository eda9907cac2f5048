//! Marketo HTTP helper module
//!
//! Thin wrapper over a shared [`reqwest::Client`] used by both the identity
//! handshake and the bulk endpoint calls. Every bulk request carries the
//! access token as the `access_token` query parameter, matching the remote
//! API contract. Calls are single-shot: failures are fatal to the run, so
//! there is no retry layer here (the only intentional repetition is the
//! orchestrator's poll loop).

use bytes::Bytes;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::{ClientError, ClientResult};

/// HTTP client bound to one tenant base URL.
#[derive(Clone)]
pub struct MarketoHttpClient {
    client: Client,
    base_url: String,
}

impl MarketoHttpClient {
    /// Create a new client for the given tenant base URL
    /// (e.g. `https://123-ABC-456.mktorest.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// The tenant base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request and deserialize the JSON response.
    ///
    /// # Arguments
    /// * `stage` - lifecycle stage label carried into error diagnostics
    /// * `path` - endpoint path (e.g. `/identity/oauth/token`)
    /// * `params` - query parameters as key-value pairs
    pub async fn get_json<T>(
        &self,
        stage: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(stage, %url, "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                stage,
                message: e.to_string(),
            })?;

        Self::parse_json(stage, response).await
    }

    /// Execute a GET request and return the raw response body.
    ///
    /// Used for the file download step, where the payload is CSV bytes that
    /// must be passed through verbatim. An empty body is a valid outcome.
    pub async fn get_bytes(
        &self,
        stage: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> ClientResult<Bytes> {
        let url = format!("{}{}", self.base_url, path);
        debug!(stage, %url, "GET (raw)");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                stage,
                message: e.to_string(),
            })?;

        let response = Self::check_status(stage, response).await?;
        response.bytes().await.map_err(|e| ClientError::Network {
            stage,
            message: e.to_string(),
        })
    }

    /// Execute a POST request with a JSON body and deserialize the JSON
    /// response.
    pub async fn post_json<T, B>(
        &self,
        stage: &'static str,
        path: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(stage, %url, "POST");

        let response = self
            .client
            .post(&url)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                stage,
                message: e.to_string(),
            })?;

        Self::parse_json(stage, response).await
    }

    /// Execute a bodyless POST request, validating only the status code.
    ///
    /// Used for the enqueue step, whose response carries no payload worth
    /// validating beyond a 200.
    pub async fn post_ok(
        &self,
        stage: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> ClientResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(stage, %url, "POST (no body)");

        let response = self
            .client
            .post(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                stage,
                message: e.to_string(),
            })?;

        Self::check_status(stage, response).await?;
        Ok(())
    }

    /// Reject non-200 responses, keeping the body for diagnostics.
    async fn check_status(stage: &'static str, response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.as_u16() != 200 {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::HttpStatus {
                stage,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_json<T>(stage: &'static str, response: Response) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = Self::check_status(stage, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::MalformedResponse {
                stage,
                reason: format!("failed to deserialize response: {e}"),
            })
    }
}

//! Session establishment via the Marketo identity endpoint
//!
//! Exchanges client credentials for a short-lived bearer token with a single
//! `grant_type=client_credentials` request. A run is assumed short enough
//! that one token suffices; expiry is not tracked or renewed. Failure here is
//! fatal to the whole run, so there is no retry.

use serde::Deserialize;
use tracing::info;

use crate::client::http::MarketoHttpClient;
use crate::client::{ClientError, ClientResult};

const AUTH_STAGE: &str = "Fetching access token";

/// Build the tenant-specific base URL from a Munchkin id.
pub fn munchkin_base_url(munchkin_id: &str) -> String {
    format!("https://{munchkin_id}.mktorest.com")
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Authenticated session against one tenant instance.
///
/// Created once per invocation; immutable thereafter. The token is carried
/// as a query parameter on every bulk call.
#[derive(Clone)]
pub struct Session {
    http: MarketoHttpClient,
    access_token: String,
}

impl Session {
    /// Exchange client credentials for a bearer token.
    ///
    /// # Arguments
    /// * `base_url` - tenant base URL (see [`munchkin_base_url`])
    /// * `client_id` / `client_secret` - opaque credential strings; the
    ///   secret is never logged
    ///
    /// # Errors
    /// [`ClientError::AuthFailed`] on a non-200 response, and the usual
    /// network/malformed-payload errors on transport or contract failures.
    pub async fn establish(
        base_url: &str,
        client_id: &str,
        client_secret: &str,
    ) -> ClientResult<Self> {
        let http = MarketoHttpClient::new(base_url);

        let response: TokenResponse = http
            .get_json(
                AUTH_STAGE,
                "/identity/oauth/token",
                &[
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("grant_type", "client_credentials"),
                ],
            )
            .await
            .map_err(|e| match e {
                ClientError::HttpStatus { status, .. } => ClientError::AuthFailed {
                    stage: AUTH_STAGE,
                    status,
                },
                other => other,
            })?;

        let access_token = response
            .access_token
            .ok_or_else(|| ClientError::MalformedResponse {
                stage: AUTH_STAGE,
                reason: "token response is missing the access_token field".to_string(),
            })?;

        info!("{AUTH_STAGE}");

        Ok(Self { http, access_token })
    }

    /// HTTP client bound to this session's tenant
    pub fn http(&self) -> &MarketoHttpClient {
        &self.http
    }

    /// The bearer token obtained at authentication time
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.http.base_url())
            .field("access_token", &"<redacted>")
            .finish()
    }
}

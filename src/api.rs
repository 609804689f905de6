// API client module: a small blocking HTTP client that logs in against
// the auth endpoint and submits text to the RLE encoding endpoint.
// Encoding itself happens server-side; this module only moves JSON.

use crate::config::{ApiSettings, Credentials};
use crate::error::{AuthError, EncodeError};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Holds the reqwest blocking client and the two endpoint URLs. Dropping
/// it releases the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_url: String,
    encode_url: String,
}

/// Login request payload.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

/// Expected response from the token endpoint. Other fields the server
/// may send are ignored.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EncodeRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EncodeResponse {
    pub encoded: String,
}

impl ApiClient {
    /// Build a client for validated settings. Every request declares
    /// `Accept: application/json`.
    pub fn new(settings: &ApiSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(settings.accept_invalid_certificates)
            .build()?;

        Ok(ApiClient {
            client,
            auth_url: settings.auth_url(),
            encode_url: settings.encode_url(),
        })
    }

    /// POST the credentials to the auth endpoint and return the bearer
    /// token. A single attempt; no retry.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let req = AuthRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        };
        tracing::debug!(url = %self.auth_url, "sending auth request");
        let res = self.client.post(&self.auth_url).json(&req).send()?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "auth rejected");
            return Err(AuthError::Status(status));
        }

        let body: AuthResponse = read_json(res)?.map_err(AuthError::MalformedResponse)?;
        if body.token.is_empty() {
            return Err(AuthError::MalformedResponse("token is empty".into()));
        }
        tracing::info!("authenticated");
        Ok(body.token)
    }

    /// Authenticate and wrap the token in a `Session`.
    pub fn login(self, credentials: &Credentials) -> Result<Session, AuthError> {
        let token = self.authenticate(credentials)?;
        Ok(Session::new(self, token))
    }
}

/// An authenticated session: the client plus the bearer token attached
/// to every encode request. There is no refresh; the token lives as long
/// as the session.
pub struct Session {
    api: ApiClient,
    token: String,
}

impl Session {
    pub fn new(api: ApiClient, token: String) -> Self {
        Session { api, token }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Submit `text` to the encoding endpoint and return the `encoded`
    /// field. Blank text is rejected before any request is built.
    pub fn encode(&self, text: &str) -> Result<String, EncodeError> {
        if text.trim().is_empty() {
            return Err(EncodeError::InvalidInput);
        }

        let req = EncodeRequest { text: text.to_string() };
        tracing::debug!(url = %self.api.encode_url, chars = text.chars().count(), "sending encode request");
        let res = self
            .api
            .client
            .post(&self.api.encode_url)
            .bearer_auth(&self.token)
            .json(&req)
            .send()?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!(%status, "encode rejected");
            return Err(EncodeError::Status(status));
        }

        let body: EncodeResponse = read_json(res)?.map_err(EncodeError::MalformedResponse)?;
        Ok(body.encoded)
    }
}

/// Read the whole body, then parse it. The outer error is a transport
/// failure while reading; the inner one is a body that does not match `T`.
fn read_json<T: DeserializeOwned>(res: Response) -> Result<Result<T, String>, reqwest::Error> {
    let text = res.text()?;
    Ok(serde_json::from_str(&text).map_err(|e| e.to_string()))
}

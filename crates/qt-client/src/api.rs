//! HTTP client for the session API

use reqwest::Response;
use serde::de::DeserializeOwned;

use qt_protocol::{
    AdvanceRequest, ErrorBody, JoinRequest, JoinResponse, LeaveRequest, Role, SessionSnapshot,
};

use crate::error::ClientError;

/// Thin wrapper over the five REST operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client against `api_base`, e.g. `http://localhost:8080`.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            base: api_base.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL this client talks to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `POST /api/sessions`
    pub async fn create(&self) -> Result<SessionSnapshot, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/sessions", self.base))
            .send()
            .await?;
        decode(response).await
    }

    /// `GET /api/sessions/:id`
    pub async fn fetch(&self, id: &str) -> Result<SessionSnapshot, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/sessions/{}", self.base, id))
            .send()
            .await?;
        decode(response).await
    }

    /// `POST /api/sessions/:id/join`
    pub async fn join(
        &self,
        id: &str,
        role: Role,
        token: Option<&str>,
    ) -> Result<JoinResponse, ClientError> {
        let body = JoinRequest {
            role,
            token: token.map(String::from),
        };
        let response = self
            .http
            .post(format!("{}/api/sessions/{}/join", self.base, id))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// `POST /api/sessions/:id/advance`
    pub async fn advance(&self, id: &str, token: &str) -> Result<SessionSnapshot, ClientError> {
        let body = AdvanceRequest {
            token: token.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/sessions/{}/advance", self.base, id))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// `POST /api/sessions/:id/leave`
    pub async fn leave(&self, id: &str, token: &str) -> Result<SessionSnapshot, ClientError> {
        let body = LeaveRequest {
            token: token.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/sessions/{}/leave", self.base, id))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }
}

/// Decode a success body, or surface the server's error reason.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("request failed with status {}", status),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

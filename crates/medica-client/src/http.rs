//! reqwest-backed [`Backend`] implementation.

use async_trait::async_trait;
use log::{debug, info};
use medica_config::BackendConfig;
use medica_core::Backend;
use medica_core::identity::{Credential, Role};
use medica_protocol::{
    AuthResponse, BackendError, ChatReply, ChatRequest, ErrorBody, LoginRequest, SignupRequest,
    SummaryReply, SummaryRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the assistant backend.
///
/// Every request carries the configured timeout, so a hung backend always
/// resolves an exchange through the failure path.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(
            "backend client ready (base_url={}, timeout_secs={})",
            base_url, config.timeout_secs
        );
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<R, BackendError> {
        debug!("POST {path}");
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Self::decode(response).await
    }

    /// Check the status and decode the body, extracting the backend's
    /// `detail` message from rejections.
    async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(BackendError::Status {
                code: status.as_u16(),
                detail,
            });
        }
        response
            .json::<R>()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        self.post_json("/auth/login", request, None).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, BackendError> {
        self.post_json("/auth/signup", request, None).await
    }

    async fn fetch_dashboard(
        &self,
        role: Role,
        credential: &Credential,
    ) -> Result<(), BackendError> {
        let path = format!("/{}/dashboard", role.as_str());
        debug!("GET {path}");
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(credential.as_str())
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                code: status.as_u16(),
                detail: None,
            });
        }
        // Response content is informational only.
        Ok(())
    }

    async fn chat(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<ChatReply, BackendError> {
        self.post_json("/agent/chat", request, Some(credential))
            .await
    }

    async fn summary(
        &self,
        credential: &Credential,
        request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError> {
        self.post_json("/agent/chat/get-summary", request, Some(credential))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::HttpBackend;
    use medica_config::BackendConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_from_default_config() {
        let backend = HttpBackend::new(&BackendConfig::default()).expect("client");
        assert_eq!(backend.url("/auth/login"), "http://127.0.0.1:8000/auth/login");
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "https://api.medica.example/".to_string(),
            timeout_secs: 5,
        })
        .expect("client");
        assert_eq!(
            backend.url("/agent/chat"),
            "https://api.medica.example/agent/chat"
        );
    }
}

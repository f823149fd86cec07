use async_trait::async_trait;
use medica_core::identity::{Credential, Role};
use medica_core::Backend;
use medica_protocol::{
    AuthResponse, BackendError, ChatReply, ChatRequest, LoginRequest, SignupRequest, SummaryReply,
    SummaryRequest,
};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Backend that always succeeds with canned responses.
///
/// Login answers with the configured user fields; signup echoes the
/// request's name, email, and role back, like the real backend does.
#[derive(Debug, Clone)]
pub struct FixedBackend {
    reply: String,
    summary: String,
    user_id: Uuid,
    user_name: String,
    user_role: Role,
    signup_notice: Option<String>,
}

impl FixedBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            summary: "mock summary".to_string(),
            user_id: Uuid::new_v4(),
            user_name: "Test User".to_string(),
            user_role: Role::Patient,
            signup_notice: Some("Account created successfully".to_string()),
        }
    }

    pub fn with_user(mut self, name: impl Into<String>, role: Role) -> Self {
        self.user_name = name.into();
        self.user_role = role;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    fn auth_response(&self, email: &str, name: &str, role: &str, notice: Option<String>) -> AuthResponse {
        AuthResponse {
            access_token: "fixed-token".to_string(),
            token_type: "bearer".to_string(),
            user_role: role.to_string(),
            user_name: name.to_string(),
            user_email: email.to_string(),
            user_id: self.user_id,
            message: notice,
        }
    }
}

#[async_trait]
impl Backend for FixedBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        Ok(self.auth_response(
            &request.email,
            &self.user_name,
            self.user_role.as_str(),
            None,
        ))
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, BackendError> {
        Ok(self.auth_response(
            &request.email,
            &request.full_name,
            &request.role,
            self.signup_notice.clone(),
        ))
    }

    async fn fetch_dashboard(
        &self,
        _role: Role,
        _credential: &Credential,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn chat(
        &self,
        _credential: &Credential,
        _request: &ChatRequest,
    ) -> Result<ChatReply, BackendError> {
        Ok(ChatReply {
            reply: self.reply.clone(),
        })
    }

    async fn summary(
        &self,
        _credential: &Credential,
        _request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError> {
        Ok(SummaryReply {
            message: self.summary.clone(),
        })
    }
}

/// Backend that records what it is asked, then answers like
/// [`FixedBackend`].
#[derive(Clone)]
pub struct RecordingBackend {
    inner: FixedBackend,
    /// Last chat request observed, including its context transcript.
    pub last_chat: Arc<Mutex<Option<ChatRequest>>>,
    /// Roles of dashboard fetches, in call order.
    pub dashboard_fetches: Arc<Mutex<Vec<Role>>>,
}

impl RecordingBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            inner: FixedBackend::new(reply),
            last_chat: Arc::new(Mutex::new(None)),
            dashboard_fetches: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        self.inner.login(request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, BackendError> {
        self.inner.signup(request).await
    }

    async fn fetch_dashboard(
        &self,
        role: Role,
        credential: &Credential,
    ) -> Result<(), BackendError> {
        self.dashboard_fetches.lock().push(role);
        self.inner.fetch_dashboard(role, credential).await
    }

    async fn chat(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<ChatReply, BackendError> {
        *self.last_chat.lock() = Some(request.clone());
        self.inner.chat(credential, request).await
    }

    async fn summary(
        &self,
        credential: &Credential,
        request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError> {
        self.inner.summary(credential, request).await
    }
}

/// Backend that fails every call with a configured error.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    message: String,
    status: Option<(u16, Option<String>)>,
}

impl FailingBackend {
    /// Fail with a transport error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Fail with a non-2xx rejection carrying an optional detail body.
    pub fn with_status(code: u16, detail: Option<&str>) -> Self {
        Self {
            message: String::new(),
            status: Some((code, detail.map(str::to_string))),
        }
    }

    fn error(&self) -> BackendError {
        match &self.status {
            Some((code, detail)) => BackendError::Status {
                code: *code,
                detail: detail.clone(),
            },
            None => BackendError::Transport(self.message.clone()),
        }
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        Err(self.error())
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, BackendError> {
        Err(self.error())
    }

    async fn fetch_dashboard(
        &self,
        _role: Role,
        _credential: &Credential,
    ) -> Result<(), BackendError> {
        Err(self.error())
    }

    async fn chat(
        &self,
        _credential: &Credential,
        _request: &ChatRequest,
    ) -> Result<ChatReply, BackendError> {
        Err(self.error())
    }

    async fn summary(
        &self,
        _credential: &Credential,
        _request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError> {
        Err(self.error())
    }
}

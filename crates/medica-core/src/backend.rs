//! Backend interface seaming out all HTTP exchange.

use crate::identity::{Credential, Role};
use async_trait::async_trait;
use medica_protocol::{
    AuthResponse, BackendError, ChatReply, ChatRequest, LoginRequest, SignupRequest, SummaryReply,
    SummaryRequest,
};

/// Assistant backend interface.
///
/// All network exchange goes through this trait so that the session and
/// conversation state machines can be exercised against canned
/// implementations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Authenticate an existing account.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, BackendError>;

    /// Register a new account.
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, BackendError>;

    /// Fetch role-specific dashboard data. The response content is
    /// informational only, so success carries no payload.
    async fn fetch_dashboard(
        &self,
        role: Role,
        credential: &Credential,
    ) -> Result<(), BackendError>;

    /// Exchange one chat turn with the assistant.
    async fn chat(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<ChatReply, BackendError>;

    /// Generate a report from free-form input (doctor-only feature).
    async fn summary(
        &self,
        credential: &Credential,
        request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError>;
}

//! Conversation engine integration tests.

use async_trait::async_trait;
use medica_core::identity::{Credential, Identity, Role};
use medica_core::{ChatRole, ConversationEngine, GREETING, SERVER_ERROR_NOTICE, SendOutcome};
use medica_core::{Backend, SessionStore};
use medica_protocol::{
    AuthResponse, BackendError, ChatReply, ChatRequest, LoginRequest, SignupRequest, SummaryReply,
    SummaryRequest,
};
use medica_test_utils::{FailingBackend, FixedBackend, RecordingBackend};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

fn authed_store() -> SessionStore {
    let store = SessionStore::in_memory();
    store
        .login(
            Identity {
                id: Uuid::new_v4(),
                display_name: "Pat".to_string(),
                email: "pat@example.com".to_string(),
                role: Role::Patient,
            },
            Credential::new("tok"),
        )
        .expect("login");
    store
}

#[tokio::test]
async fn transcript_opens_with_the_greeting() {
    let engine = ConversationEngine::new(Arc::new(FixedBackend::new("hi")), authed_store());
    let transcript = engine.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].role, ChatRole::Assistant);
    assert_eq!(transcript[0].text, GREETING);
}

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let backend = Arc::new(RecordingBackend::new("hi"));
    let engine = ConversationEngine::new(backend.clone(), authed_store());

    assert_eq!(engine.send_message("").await, SendOutcome::Ignored);
    assert_eq!(engine.send_message("   ").await, SendOutcome::Ignored);
    assert_eq!(engine.send_message("\n\t").await, SendOutcome::Ignored);

    assert_eq!(engine.transcript().len(), 1);
    assert!(backend.last_chat.lock().is_none(), "no request issued");
}

#[tokio::test]
async fn successful_send_appends_user_then_assistant() {
    let engine = ConversationEngine::new(
        Arc::new(FixedBackend::new("You should rest.")),
        authed_store(),
    );

    assert_eq!(engine.send_message("hello").await, SendOutcome::Delivered);

    let transcript = engine.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].role, ChatRole::User);
    assert_eq!(transcript[1].text, "hello");
    assert_eq!(transcript[2].role, ChatRole::Assistant);
    assert_eq!(transcript[2].text, "You should rest.");
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn empty_reply_becomes_the_fallback_text() {
    let engine = ConversationEngine::new(Arc::new(FixedBackend::new("")), authed_store());
    assert_eq!(engine.send_message("hello").await, SendOutcome::Delivered);
    assert_eq!(engine.transcript()[2].text, "No response from agent");
}

#[tokio::test]
async fn transport_failure_is_absorbed_into_the_transcript() {
    let engine = ConversationEngine::new(
        Arc::new(FailingBackend::new("connection refused")),
        authed_store(),
    );

    assert_eq!(engine.send_message("hello").await, SendOutcome::Recovered);

    let transcript = engine.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].role, ChatRole::User);
    assert_eq!(transcript[1].text, "hello");
    assert_eq!(transcript[2].role, ChatRole::Assistant);
    assert_eq!(transcript[2].text, SERVER_ERROR_NOTICE);
    assert!(!engine.is_busy());
}

#[tokio::test]
async fn server_rejection_is_absorbed_like_a_transport_failure() {
    let engine = ConversationEngine::new(
        Arc::new(FailingBackend::with_status(500, None)),
        authed_store(),
    );
    assert_eq!(engine.send_message("hello").await, SendOutcome::Recovered);
    assert_eq!(engine.transcript()[2].text, SERVER_ERROR_NOTICE);
}

#[tokio::test]
async fn context_carries_the_full_prior_transcript_in_order() {
    let backend = Arc::new(RecordingBackend::new("ok"));
    let engine = ConversationEngine::new(backend.clone(), authed_store());

    engine.send_message("first").await;
    engine.send_message("second").await;

    let request = backend.last_chat.lock().clone().expect("chat request");
    assert_eq!(request.message, "second");
    // Everything appended before the second submission, unmodified.
    let context: Vec<(String, String)> = request
        .messages
        .iter()
        .map(|m| (m.role.clone(), m.text.clone()))
        .collect();
    assert_eq!(
        context,
        vec![
            ("assistant".to_string(), GREETING.to_string()),
            ("user".to_string(), "first".to_string()),
            ("assistant".to_string(), "ok".to_string()),
        ]
    );
}

/// Backend whose chat call blocks until released, to hold the engine in
/// its sending state.
struct GatedBackend {
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedBackend {
    fn new(release: oneshot::Receiver<()>) -> Self {
        Self {
            release: Mutex::new(Some(release)),
        }
    }
}

#[async_trait]
impl Backend for GatedBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, BackendError> {
        Err(BackendError::Transport("not under test".to_string()))
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, BackendError> {
        Err(BackendError::Transport("not under test".to_string()))
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
        if let Some(release) = self.release.lock().await.take() {
            let _ = release.await;
        }
        Ok(ChatReply {
            reply: "late reply".to_string(),
        })
    }

    async fn summary(
        &self,
        _credential: &Credential,
        _request: &SummaryRequest,
    ) -> Result<SummaryReply, BackendError> {
        Err(BackendError::Transport("not under test".to_string()))
    }
}

#[tokio::test]
async fn concurrent_send_is_rejected_outright() {
    let (release, gate) = oneshot::channel();
    let engine = ConversationEngine::new(Arc::new(GatedBackend::new(gate)), authed_store());

    let in_flight = engine.clone();
    let handle = tokio::spawn(async move { in_flight.send_message("first").await });
    while !engine.is_busy() {
        tokio::task::yield_now().await;
    }

    assert_eq!(engine.send_message("second").await, SendOutcome::Busy);

    release.send(()).expect("release gate");
    assert_eq!(handle.await.expect("join"), SendOutcome::Delivered);

    // The rejected submission left no trace.
    let transcript = engine.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].text, "first");
    assert_eq!(transcript[2].text, "late reply");
}

#[tokio::test]
async fn logged_out_session_recovers_through_the_error_path() {
    let store = authed_store();
    let engine = ConversationEngine::new(Arc::new(FixedBackend::new("hi")), store.clone());
    store.logout().expect("logout");

    assert_eq!(engine.send_message("hello").await, SendOutcome::Recovered);
    assert_eq!(engine.transcript()[2].text, SERVER_ERROR_NOTICE);
}

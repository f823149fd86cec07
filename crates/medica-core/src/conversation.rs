//! Conversation engine: transcript ownership and chat exchange.

use crate::backend::Backend;
use crate::session::SessionStore;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use medica_protocol::{ChatRequest, WireMessage};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Greeting the transcript always opens with.
pub const GREETING: &str = "Hello! How can I help you today?";
/// Fixed assistant notice appended when an exchange fails.
pub const SERVER_ERROR_NOTICE: &str = "Server error. Try again later.";
/// Fallback reply text when the backend answers with an empty reply.
const EMPTY_REPLY_FALLBACK: &str = "No response from agent";

/// Chat speaker for a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
}

impl ChatRole {
    /// Return the role as its lowercase wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// Message stored in a conversation transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Speaker that produced the message.
    pub role: ChatRole,
    /// Message text.
    pub text: String,
    /// Client-local timestamp; not part of the wire form.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Build an assistant message stamped with the current time.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Wire form sent as conversation context.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role.as_str().to_string(),
            text: self.text.clone(),
        }
    }
}

/// Result of a [`ConversationEngine::send_message`] call. Never an error:
/// transport failures are absorbed into the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant replied and the reply was appended.
    Delivered,
    /// The exchange failed; the fixed error notice was appended.
    Recovered,
    /// The input was empty or whitespace-only; nothing happened.
    Ignored,
    /// An exchange is already in flight; nothing happened.
    Busy,
}

/// Exchange state for one in-flight turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Idle,
    Sending,
}

/// Owns the ordered transcript for one chat session and mediates all
/// exchange with the assistant backend.
///
/// Clones share state so the shell can render the transcript while a
/// send task is in flight. The transcript is reset only by constructing
/// a new engine (dashboard remount).
#[derive(Clone)]
pub struct ConversationEngine {
    backend: Arc<dyn Backend>,
    session: SessionStore,
    transcript: Arc<RwLock<Vec<Message>>>,
    state: Arc<Mutex<ExchangeState>>,
}

impl ConversationEngine {
    /// Create an engine whose transcript opens with the assistant
    /// greeting.
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        Self {
            backend,
            session,
            transcript: Arc::new(RwLock::new(vec![Message::assistant(GREETING)])),
            state: Arc::new(Mutex::new(ExchangeState::Idle)),
        }
    }

    /// Snapshot of the transcript in insertion order.
    pub fn transcript(&self) -> Vec<Message> {
        self.transcript.read().clone()
    }

    /// Whether an exchange is currently in flight.
    pub fn is_busy(&self) -> bool {
        *self.state.lock() == ExchangeState::Sending
    }

    /// Submit one user message and reconcile the backend's answer (or
    /// failure) into the transcript.
    ///
    /// Ordering is fixed: the user message is appended before the request
    /// is issued, and the resolution message is appended immediately
    /// after it settles, on both success and failure paths. A call while
    /// an exchange is in flight is rejected rather than queued.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            debug!("ignoring empty chat submission");
            return SendOutcome::Ignored;
        }
        {
            let mut state = self.state.lock();
            if *state == ExchangeState::Sending {
                warn!("rejecting concurrent chat submission");
                return SendOutcome::Busy;
            }
            *state = ExchangeState::Sending;
        }

        // Context is the transcript as it stood before this submission;
        // taking it and appending under one lock keeps the two in step.
        let request = {
            let mut transcript = self.transcript.write();
            let context: Vec<WireMessage> =
                transcript.iter().map(Message::to_wire).collect();
            transcript.push(Message::user(text));
            ChatRequest {
                message: text.to_string(),
                messages: context,
            }
        };
        debug!(
            "dispatching chat turn (text_len={}, context_len={})",
            request.message.len(),
            request.messages.len()
        );

        let outcome = match self.session.current_credential() {
            Some(credential) => match self.backend.chat(&credential, &request).await {
                Ok(reply) => {
                    let text = if reply.reply.is_empty() {
                        EMPTY_REPLY_FALLBACK.to_string()
                    } else {
                        reply.reply
                    };
                    self.transcript.write().push(Message::assistant(text));
                    SendOutcome::Delivered
                }
                Err(err) => {
                    warn!("chat exchange failed (error={err})");
                    self.transcript
                        .write()
                        .push(Message::assistant(SERVER_ERROR_NOTICE));
                    SendOutcome::Recovered
                }
            },
            None => {
                // Session was cleared while the dashboard was up; the
                // guard redirects on the next render.
                warn!("chat submission without an active session");
                self.transcript
                    .write()
                    .push(Message::assistant(SERVER_ERROR_NOTICE));
                SendOutcome::Recovered
            }
        };

        *self.state.lock() = ExchangeState::Idle;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatRole, GREETING, Message};
    use pretty_assertions::assert_eq;

    #[test]
    fn greeting_constant_is_assistant_authored() {
        let message = Message::assistant(GREETING);
        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.text, GREETING);
    }

    #[test]
    fn message_wire_form_drops_timestamp() {
        let message = Message::user("hello");
        let wire = message.to_wire();
        assert_eq!(wire.role, "user");
        assert_eq!(wire.text, "hello");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}

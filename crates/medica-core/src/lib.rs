//! Core session, authorization, and conversation state for the Medica
//! client.
//!
//! This crate owns the session store, the access guard, and the
//! conversation engine; all HTTP exchange is seamed out through the
//! [`Backend`] trait.

pub mod auth;
pub mod backend;
pub mod conversation;
pub mod guard;
pub mod identity;
pub mod session;

pub use auth::{AuthError, AuthOutcome, SignupDetails};
pub use backend::Backend;
pub use conversation::{
    ChatRole, ConversationEngine, GREETING, Message, SERVER_ERROR_NOTICE, SendOutcome,
};
pub use guard::{AccessDecision, authorize};
pub use identity::{Credential, Identity, Role, Route, UnknownRole};
pub use session::{SessionDocument, SessionError, SessionFile, SessionPersistence, SessionStore};

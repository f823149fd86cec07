//! Login and signup flows committing identities into the session store.

use crate::backend::Backend;
use crate::identity::{Credential, Identity, Role};
use crate::session::SessionStore;
use log::{info, warn};
use medica_protocol::{AuthResponse, BackendError, LoginRequest, SignupRequest};
use thiserror::Error;

/// Generic notification when a login rejection carries no detail.
pub const LOGIN_FALLBACK: &str = "Login failed";
/// Generic notification when a signup rejection carries no detail.
pub const SIGNUP_FALLBACK: &str = "Signup failed";

/// Errors surfaced to the user as a blocking notification. Session state
/// is left untouched on every variant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Backend rejected the attempt; `message` is the backend-provided
    /// detail or a generic fallback.
    #[error("{message}")]
    Rejected { message: String },
    /// Backend answered with a role this client cannot route.
    #[error("unknown role in auth response: {0}")]
    InvalidRole(String),
}

/// Successful authentication: the committed identity plus an optional
/// informational notice from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    /// Identity now held by the session store.
    pub identity: Identity,
    /// Backend notice, e.g. "Account created successfully" on signup.
    pub notice: Option<String>,
}

/// Details captured by the signup form.
#[derive(Debug, Clone)]
pub struct SignupDetails {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Authenticate an existing account and commit the session.
pub async fn login(
    backend: &dyn Backend,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<AuthOutcome, AuthError> {
    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = backend
        .login(&request)
        .await
        .map_err(|err| rejection(err, LOGIN_FALLBACK))?;
    commit(store, response)
}

/// Register a new account and commit the session.
pub async fn signup(
    backend: &dyn Backend,
    store: &SessionStore,
    details: SignupDetails,
) -> Result<AuthOutcome, AuthError> {
    let request = SignupRequest {
        full_name: details.full_name,
        email: details.email,
        password: details.password,
        role: details.role.as_str().to_string(),
    };
    let response = backend
        .signup(&request)
        .await
        .map_err(|err| rejection(err, SIGNUP_FALLBACK))?;
    commit(store, response)
}

/// Map a backend failure to the user-facing rejection message.
fn rejection(err: BackendError, fallback: &str) -> AuthError {
    warn!("auth request failed (error={err})");
    let message = err
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string());
    AuthError::Rejected { message }
}

/// Build identity and credential from the auth response and store both.
fn commit(store: &SessionStore, response: AuthResponse) -> Result<AuthOutcome, AuthError> {
    let role = Role::parse(&response.user_role).map_err(|err| AuthError::InvalidRole(err.0))?;
    let identity = Identity {
        id: response.user_id,
        display_name: response.user_name,
        email: response.user_email,
        role,
    };
    let credential = Credential::new(response.access_token);
    if let Err(err) = store.login(identity.clone(), credential) {
        // The in-memory session stands; only the durable copy is stale.
        warn!("failed to persist session (error={err})");
    }
    info!(
        "authenticated (user_id={}, role={})",
        identity.id,
        identity.role.as_str()
    );
    Ok(AuthOutcome {
        identity,
        notice: response.message,
    })
}

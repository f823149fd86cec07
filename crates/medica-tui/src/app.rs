//! Application state for the Medica TUI.

use log::{info, warn};
use medica_core::{
    AccessDecision, AuthError, AuthOutcome, Backend, ConversationEngine, Role, Route,
    SessionStore, SignupDetails, authorize,
};
use std::cmp::min;
use std::sync::Arc;

/// Which auth form is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Login with an existing account.
    Login,
    /// Create a new account.
    Signup,
}

/// Focusable fields on the auth forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
    Role,
}

/// Active view of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Unauthenticated entry point.
    Auth,
    /// Role-gated dashboard.
    Dashboard(Route),
}

/// Blocking overlay shown until dismissed (auth failures, reports).
#[derive(Debug, Clone)]
pub struct Modal {
    /// Title line.
    pub title: String,
    /// Body content.
    pub content: String,
    /// Current scroll offset.
    pub scroll: u16,
}

/// Validated form submission handed to the async auth task.
#[derive(Debug, Clone)]
pub enum AuthSubmission {
    Login { email: String, password: String },
    Signup(SignupDetails),
}

/// Top-level application state for the TUI.
pub struct App {
    backend: Arc<dyn Backend>,
    /// Shared session store; read fresh on every guard evaluation.
    pub session: SessionStore,
    /// Active screen.
    pub screen: Screen,
    /// Auth form mode.
    pub auth_mode: AuthMode,
    /// Focused auth form field.
    pub auth_focus: AuthField,
    /// Signup name field.
    pub name_input: String,
    /// Email field.
    pub email_input: String,
    /// Password field.
    pub password_input: String,
    /// Signup role selector, patient preselected.
    pub role_choice: Role,
    /// Whether an auth attempt is in flight.
    pub auth_busy: bool,
    /// Conversation engine for the mounted dashboard, if any.
    pub engine: Option<ConversationEngine>,
    /// Chat input buffer.
    pub input: String,
    /// Status line text.
    pub status: String,
    /// Blocking overlay, if any.
    pub modal: Option<Modal>,
    /// Whether a summary request is in flight.
    pub summary_busy: bool,
    /// Current chat scroll offset.
    pub scroll: u16,
    /// Whether to auto-scroll to the bottom.
    pub auto_scroll: bool,
    /// Maximum scroll offset for the chat view.
    pub chat_max_scroll: u16,
}

impl App {
    /// Create application state showing the auth screen.
    pub fn new(backend: Arc<dyn Backend>, session: SessionStore) -> Self {
        Self {
            backend,
            session,
            screen: Screen::Auth,
            auth_mode: AuthMode::Login,
            auth_focus: AuthField::Email,
            name_input: String::new(),
            email_input: String::new(),
            password_input: String::new(),
            role_choice: Role::Patient,
            auth_busy: false,
            engine: None,
            input: String::new(),
            status: "ready".to_string(),
            modal: None,
            summary_busy: false,
            scroll: 0,
            auto_scroll: true,
            chat_max_scroll: 0,
        }
    }

    /// Set the status line.
    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Open a blocking overlay.
    pub fn open_modal(&mut self, title: impl Into<String>, content: impl Into<String>) {
        self.modal = Some(Modal {
            title: title.into(),
            content: content.into(),
            scroll: 0,
        });
    }

    /// Dismiss the overlay.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Scroll the overlay upward by a number of lines.
    pub fn modal_scroll_up(&mut self, lines: u16) {
        if let Some(modal) = &mut self.modal {
            modal.scroll = modal.scroll.saturating_sub(lines);
        }
    }

    /// Scroll the overlay downward by a number of lines.
    pub fn modal_scroll_down(&mut self, lines: u16) {
        if let Some(modal) = &mut self.modal {
            modal.scroll = modal.scroll.saturating_add(lines);
        }
    }

    /// Navigate to a route, evaluating the access guard fresh.
    ///
    /// Returns the role whose dashboard was mounted, so the caller can
    /// trigger the informational dashboard fetch.
    pub fn navigate(&mut self, route: Route) -> Option<Role> {
        match route {
            Route::Auth => {
                // An authenticated user has no business on the auth
                // screen; forward to their dashboard.
                if let Some(user) = self.session.current_user() {
                    return self.navigate(user.role.dashboard_route());
                }
                self.show_auth();
                None
            }
            Route::NotFound => {
                self.push_status("not found");
                None
            }
            Route::DoctorDashboard | Route::PatientDashboard => {
                let user = self.session.current_user();
                let decision = match route.required_roles() {
                    Some(roles) => authorize(roles, user.as_ref()),
                    None => AccessDecision::RedirectToAuth,
                };
                if decision == AccessDecision::RedirectToAuth {
                    self.show_auth();
                    return None;
                }
                let role = user.map(|user| user.role)?;
                info!("mounting dashboard (route={})", route.path());
                self.screen = Screen::Dashboard(route);
                // A fresh mount starts a fresh conversation.
                self.engine = Some(ConversationEngine::new(
                    self.backend.clone(),
                    self.session.clone(),
                ));
                self.input.clear();
                self.scroll = 0;
                self.auto_scroll = true;
                self.chat_max_scroll = 0;
                self.summary_busy = false;
                Some(role)
            }
        }
    }

    /// Re-evaluate the guard for the current screen. Called before every
    /// draw so a session cleared elsewhere redirects on the next paint.
    pub fn enforce_guard(&mut self) {
        if let Screen::Dashboard(route) = self.screen {
            let user = self.session.current_user();
            let decision = match route.required_roles() {
                Some(roles) => authorize(roles, user.as_ref()),
                None => AccessDecision::RedirectToAuth,
            };
            if decision == AccessDecision::RedirectToAuth {
                self.show_auth();
            }
        }
    }

    /// Clear the session and return to the auth screen.
    pub fn logout(&mut self) {
        if let Err(err) = self.session.logout() {
            warn!("failed to clear persisted session (error={err})");
        }
        self.show_auth();
        self.push_status("logged out");
    }

    fn show_auth(&mut self) {
        self.screen = Screen::Auth;
        self.engine = None;
        self.input.clear();
        self.auth_busy = false;
        self.summary_busy = false;
        self.auth_focus = match self.auth_mode {
            AuthMode::Login => AuthField::Email,
            AuthMode::Signup => AuthField::Name,
        };
    }

    /// Toggle between login and signup forms.
    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = match self.auth_mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
        self.auth_focus = match self.auth_mode {
            AuthMode::Login => AuthField::Email,
            AuthMode::Signup => AuthField::Name,
        };
    }

    fn field_order(&self) -> &'static [AuthField] {
        match self.auth_mode {
            AuthMode::Login => &[AuthField::Email, AuthField::Password],
            AuthMode::Signup => &[
                AuthField::Name,
                AuthField::Email,
                AuthField::Password,
                AuthField::Role,
            ],
        }
    }

    /// Move focus to the next auth form field.
    pub fn focus_next_field(&mut self) {
        let order = self.field_order();
        let index = order
            .iter()
            .position(|field| *field == self.auth_focus)
            .unwrap_or(0);
        self.auth_focus = order[(index + 1) % order.len()];
    }

    /// Move focus to the previous auth form field.
    pub fn focus_prev_field(&mut self) {
        let order = self.field_order();
        let index = order
            .iter()
            .position(|field| *field == self.auth_focus)
            .unwrap_or(0);
        self.auth_focus = order[(index + order.len() - 1) % order.len()];
    }

    /// Type a character into the focused auth field.
    pub fn type_auth_char(&mut self, ch: char) {
        match self.auth_focus {
            AuthField::Name => self.name_input.push(ch),
            AuthField::Email => self.email_input.push(ch),
            AuthField::Password => self.password_input.push(ch),
            AuthField::Role => {}
        }
    }

    /// Delete the last character of the focused auth field.
    pub fn backspace_auth_char(&mut self) {
        match self.auth_focus {
            AuthField::Name => {
                self.name_input.pop();
            }
            AuthField::Email => {
                self.email_input.pop();
            }
            AuthField::Password => {
                self.password_input.pop();
            }
            AuthField::Role => {}
        }
    }

    /// Flip the signup role selector.
    pub fn toggle_role_choice(&mut self) {
        self.role_choice = match self.role_choice {
            Role::Patient => Role::Doctor,
            Role::Doctor => Role::Patient,
        };
    }

    /// Validate the auth form and produce a submission for the async
    /// task, marking the form busy. Returns `None` (with a status
    /// message) when required fields are missing or an attempt is
    /// already in flight.
    pub fn take_auth_submission(&mut self) -> Option<AuthSubmission> {
        if self.auth_busy {
            return None;
        }
        let email = self.email_input.trim().to_string();
        let password = self.password_input.clone();
        if email.is_empty() || password.is_empty() {
            self.push_status("email and password are required");
            return None;
        }
        let submission = match self.auth_mode {
            AuthMode::Login => {
                self.push_status("logging in...");
                AuthSubmission::Login { email, password }
            }
            AuthMode::Signup => {
                let full_name = self.name_input.trim().to_string();
                if full_name.is_empty() {
                    self.push_status("name is required");
                    return None;
                }
                self.push_status("creating account...");
                AuthSubmission::Signup(SignupDetails {
                    full_name,
                    email,
                    password,
                    role: self.role_choice,
                })
            }
        };
        self.auth_busy = true;
        Some(submission)
    }

    /// Apply a settled auth attempt. Returns the role whose dashboard was
    /// mounted on success.
    pub fn auth_settled(&mut self, result: Result<AuthOutcome, AuthError>) -> Option<Role> {
        self.auth_busy = false;
        match result {
            Ok(outcome) => {
                self.password_input.clear();
                let notice = outcome
                    .notice
                    .unwrap_or_else(|| "Login successful".to_string());
                self.push_status(notice);
                self.navigate(outcome.identity.role.dashboard_route())
            }
            Err(err) => {
                // Blocking notification with the backend detail.
                self.open_modal("Sign-in failed", err.to_string());
                self.push_status("ready");
                None
            }
        }
    }

    /// Scroll the chat view upward by a number of lines.
    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll the chat view downward by a number of lines.
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = min(self.scroll.saturating_add(lines), self.chat_max_scroll);
        if self.scroll >= self.chat_max_scroll {
            self.auto_scroll = true;
        }
    }

    /// Update scroll bounds after layout changes.
    pub fn update_scroll_bounds(&mut self, max_scroll: u16) {
        let was_at_bottom = self.scroll >= self.chat_max_scroll;
        self.chat_max_scroll = max_scroll;
        if self.auto_scroll || was_at_bottom {
            self.scroll = max_scroll;
        }
    }
}

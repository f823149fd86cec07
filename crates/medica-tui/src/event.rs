//! TUI event types for input and settled network calls.

use crossterm::event::KeyEvent;
use medica_core::{AuthError, AuthOutcome, SendOutcome};

/// Application event emitted by input handlers or spawned tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Periodic tick event (repaints busy indicators).
    Tick,
    /// A login or signup attempt settled.
    AuthSettled(Result<AuthOutcome, AuthError>),
    /// A chat exchange settled.
    ChatSettled(SendOutcome),
    /// A summary request settled; errors arrive as display strings.
    SummarySettled(Result<String, String>),
}

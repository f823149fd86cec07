//! Terminal UI shell for the Medica client.
//!
//! Provides a reusable [`run`] function that launches the Ratatui shell
//! against a pre-configured backend and session store.

mod app;
mod event;
mod ui;

pub use app::{App, AuthSubmission, Screen};

use anyhow::anyhow;
use app::AuthField;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info, warn};
use medica_core::identity::Credential;
use medica_core::{Backend, ConversationEngine, Role, SendOutcome, SessionStore, auth};
use medica_protocol::SummaryRequest;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Supported slash commands in the chat input box.
#[derive(Debug)]
enum SlashCommand {
    Logout,
    Summary(String),
}

/// Launch the Medica TUI.
///
/// The caller is responsible for building the backend, opening the
/// session store, and initializing logging before calling `run`.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(backend: Arc<dyn Backend>, session: SessionStore) -> anyhow::Result<()> {
    let mut app = App::new(backend.clone(), session.clone());

    let (tx, mut rx) = mpsc::channel(256);

    // A restored session lands straight on its dashboard.
    if let Some(user) = session.current_user() {
        info!("restoring persisted session (role={})", user.role.as_str());
        if let Some(role) = app.navigate(user.role.dashboard_route()) {
            spawn_dashboard_fetch(backend.clone(), session.clone(), role);
        }
    }

    let mut terminal = setup_terminal()?;
    spawn_input_handler(tx.clone());
    spawn_tick(tx.clone());

    loop {
        // The guard runs on every paint, never from a cached decision.
        app.enforce_guard();
        terminal.draw(|frame| ui::draw(frame, &mut app))?;
        let event = rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
        if handle_app_event(event, &backend, &session, &mut app, tx.clone()) {
            break;
        }
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

/// Dispatch a UI event and return true when the app should exit.
fn handle_app_event(
    event: AppEvent,
    backend: &Arc<dyn Backend>,
    session: &SessionStore,
    app: &mut App,
    sender: mpsc::Sender<AppEvent>,
) -> bool {
    match event {
        AppEvent::Input(key) => handle_input(key, backend, session, app, sender),
        AppEvent::Tick => false,
        AppEvent::AuthSettled(result) => {
            if let Some(role) = app.auth_settled(result) {
                spawn_dashboard_fetch(backend.clone(), session.clone(), role);
            }
            false
        }
        AppEvent::ChatSettled(outcome) => {
            match outcome {
                SendOutcome::Delivered | SendOutcome::Recovered => app.push_status("ready"),
                SendOutcome::Busy => app.push_status("assistant is typing..."),
                SendOutcome::Ignored => {}
            }
            false
        }
        AppEvent::SummarySettled(result) => {
            app.summary_busy = false;
            match result {
                Ok(report) => {
                    app.open_modal("Report", report);
                    app.push_status("ready");
                }
                Err(err) => app.push_status(format!("summary failed: {err}")),
            }
            false
        }
    }
}

/// Handle keyboard input and dispatch actions.
fn handle_input(
    key: KeyEvent,
    backend: &Arc<dyn Backend>,
    session: &SessionStore,
    app: &mut App,
    sender: mpsc::Sender<AppEvent>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.modal.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.close_modal(),
            KeyCode::Up => app.modal_scroll_up(1),
            KeyCode::Down => app.modal_scroll_down(1),
            KeyCode::PageUp => app.modal_scroll_up(5),
            KeyCode::PageDown => app.modal_scroll_down(5),
            _ => {}
        }
        return false;
    }

    if key.code == KeyCode::Esc {
        return true;
    }

    match app.screen {
        Screen::Auth => handle_auth_input(key, backend, session, app, sender),
        Screen::Dashboard(_) => handle_dashboard_input(key, backend, session, app, sender),
    }
    false
}

/// Handle keyboard input on the auth screen.
fn handle_auth_input(
    key: KeyEvent,
    backend: &Arc<dyn Backend>,
    session: &SessionStore,
    app: &mut App,
    sender: mpsc::Sender<AppEvent>,
) {
    match key.code {
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_auth_mode();
        }
        KeyCode::Tab | KeyCode::Down => app.focus_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev_field(),
        KeyCode::Left | KeyCode::Right if app.auth_focus == AuthField::Role => {
            app.toggle_role_choice();
        }
        KeyCode::Enter => {
            if let Some(submission) = app.take_auth_submission() {
                spawn_auth(backend.clone(), session.clone(), submission, sender);
            }
        }
        KeyCode::Backspace => app.backspace_auth_char(),
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                app.type_auth_char(ch);
            }
        }
        _ => {}
    }
}

/// Handle keyboard input on a dashboard.
fn handle_dashboard_input(
    key: KeyEvent,
    backend: &Arc<dyn Backend>,
    session: &SessionStore,
    app: &mut App,
    sender: mpsc::Sender<AppEvent>,
) {
    match key.code {
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(5),
        KeyCode::PageDown => app.scroll_down(5),
        KeyCode::Enter => {
            if app.input.trim().is_empty() {
                return;
            }
            if app.input.trim_start().starts_with('/') {
                let command = std::mem::take(&mut app.input);
                if let Err(err) = handle_slash_command(backend, session, app, sender, command) {
                    app.push_status(err);
                }
            } else {
                send_chat_message(app, sender);
            }
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(ch) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL) {
                app.input.push(ch);
            }
        }
        _ => {}
    }
}

/// Submit the chat input unless an exchange is already in flight.
fn send_chat_message(app: &mut App, sender: mpsc::Sender<AppEvent>) {
    let Some(engine) = app.engine.clone() else {
        return;
    };
    if engine.is_busy() {
        // Input is preserved; the submit path is suppressed while busy.
        app.push_status("assistant is typing...");
        return;
    }
    let text = std::mem::take(&mut app.input);
    debug!("submitting chat message (text_len={})", text.len());
    app.push_status("typing...");
    app.auto_scroll = true;
    spawn_chat(engine, text, sender);
}

/// Handle slash commands entered in the chat input box.
fn handle_slash_command(
    backend: &Arc<dyn Backend>,
    session: &SessionStore,
    app: &mut App,
    sender: mpsc::Sender<AppEvent>,
    input: String,
) -> Result<(), String> {
    let Some(command) = parse_slash_command(&input)? else {
        return Ok(());
    };
    match command {
        SlashCommand::Logout => app.logout(),
        SlashCommand::Summary(notes) => {
            let user = session.current_user();
            if user.map(|user| user.role) != Some(Role::Doctor) {
                return Err("summary is available to doctors only".to_string());
            }
            if app.summary_busy {
                return Err("a report is already being generated".to_string());
            }
            let Some(credential) = session.current_credential() else {
                return Err("not signed in".to_string());
            };
            app.summary_busy = true;
            app.push_status("generating report...");
            spawn_summary(backend.clone(), credential, notes, sender);
        }
    }
    Ok(())
}

/// Parse a slash command from the input line.
fn parse_slash_command(input: &str) -> Result<Option<SlashCommand>, String> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(None);
    }
    let body = trimmed.trim_start_matches('/');
    let (command, rest) = match body.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (body, ""),
    };
    match command.to_lowercase().as_str() {
        "logout" => Ok(Some(SlashCommand::Logout)),
        "summary" => {
            if rest.is_empty() {
                return Err("usage: /summary <notes>".to_string());
            }
            Ok(Some(SlashCommand::Summary(rest.to_string())))
        }
        other => Err(format!("unknown command: {other}")),
    }
}

/// Spawn a task to run a login or signup attempt.
fn spawn_auth(
    backend: Arc<dyn Backend>,
    session: SessionStore,
    submission: AuthSubmission,
    sender: mpsc::Sender<AppEvent>,
) {
    tokio::spawn(async move {
        let result = match submission {
            AuthSubmission::Login { email, password } => {
                auth::login(backend.as_ref(), &session, &email, &password).await
            }
            AuthSubmission::Signup(details) => {
                auth::signup(backend.as_ref(), &session, details).await
            }
        };
        let _ = sender.send(AppEvent::AuthSettled(result)).await;
    });
}

/// Spawn a task to exchange one chat turn.
fn spawn_chat(engine: ConversationEngine, text: String, sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let outcome = engine.send_message(&text).await;
        let _ = sender.send(AppEvent::ChatSettled(outcome)).await;
    });
}

/// Spawn a task to generate a doctor report.
fn spawn_summary(
    backend: Arc<dyn Backend>,
    credential: Credential,
    input: String,
    sender: mpsc::Sender<AppEvent>,
) {
    tokio::spawn(async move {
        let request = SummaryRequest { input };
        let result = backend
            .summary(&credential, &request)
            .await
            .map(|reply| reply.message)
            .map_err(|err| err.to_string());
        let _ = sender.send(AppEvent::SummarySettled(result)).await;
    });
}

/// Spawn the informational dashboard fetch. Failure is logged and
/// otherwise ignored; it affects neither authorization nor chat.
fn spawn_dashboard_fetch(backend: Arc<dyn Backend>, session: SessionStore, role: Role) {
    tokio::spawn(async move {
        let Some(credential) = session.current_credential() else {
            return;
        };
        match backend.fetch_dashboard(role, &credential).await {
            Ok(()) => debug!("dashboard data fetched (role={})", role.as_str()),
            Err(err) => warn!(
                "dashboard fetch failed (role={}, error={err})",
                role.as_str()
            ),
        }
    });
}

/// Spawn a task to poll for input events.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                let event = match crossterm::event::read() {
                    Ok(event) => event,
                    Err(_) => break,
                };
                if let CrosstermEvent::Key(key) = event {
                    let _ = sender.send(AppEvent::Input(key)).await;
                }
            }
        }
    });
}

/// Spawn a periodic tick event generator.
fn spawn_tick(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            let _ = sender.send(AppEvent::Tick).await;
        }
    });
}

/// Configure terminal in raw mode with alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

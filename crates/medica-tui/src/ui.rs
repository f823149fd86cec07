//! Rendering routines for the Medica TUI.

use crate::app::{App, AuthField, AuthMode, Screen};
use medica_core::{ChatRole, Role, Route};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

// ── Theme ─────────────────────────────────────────────────────────────

const INDIGO: Color = Color::Rgb(79, 70, 229); // #4F46E5, patient accent
const EMERALD: Color = Color::Rgb(5, 150, 105); // #059669, doctor accent
const TEXT: Color = Color::Rgb(238, 238, 238); // #eeeeee
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128); // #808080
const BORDER: Color = Color::Rgb(60, 60, 60); // #3c3c3c
const ERROR: Color = Color::Rgb(224, 108, 117); // #e06c75

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Accent color for a role's dashboard.
fn accent(role: Role) -> Color {
    match role {
        Role::Doctor => EMERALD,
        Role::Patient => INDIGO,
    }
}

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    match app.screen {
        Screen::Auth => draw_auth(frame, app),
        Screen::Dashboard(route) => draw_dashboard(frame, app, route),
    }
    if app.modal.is_some() {
        draw_modal(frame, app);
    }
}

/// Centered rect of the given size inside `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

// ── Auth screen ───────────────────────────────────────────────────────

fn draw_auth(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();
    let card = centered_rect(56, 16, area);

    let title = match app.auth_mode {
        AuthMode::Login => " Welcome ",
        AuthMode::Signup => " Create Account ",
    };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(INDIGO).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(card);
    frame.render_widget(Clear, card);
    frame.render_widget(block, card);

    let mut lines: Vec<Line<'_>> = vec![Line::from(Span::styled(
        format!("  Medica v{VERSION} · AI Medical Assistant"),
        Style::default().fg(TEXT_MUTED),
    ))];
    lines.push(Line::from(""));

    if app.auth_mode == AuthMode::Signup {
        lines.push(field_line(
            "Name",
            &app.name_input,
            app.auth_focus == AuthField::Name,
        ));
    }
    lines.push(field_line(
        "Email",
        &app.email_input,
        app.auth_focus == AuthField::Email,
    ));
    let masked = "•".repeat(app.password_input.chars().count());
    lines.push(field_line(
        "Password",
        &masked,
        app.auth_focus == AuthField::Password,
    ));
    if app.auth_mode == AuthMode::Signup {
        lines.push(role_selector_line(app));
    }

    lines.push(Line::from(""));
    let submit = if app.auth_busy {
        match app.auth_mode {
            AuthMode::Login => "  Logging in...",
            AuthMode::Signup => "  Creating...",
        }
    } else {
        "  Enter to submit"
    };
    lines.push(Line::from(Span::styled(
        submit,
        Style::default().fg(TEXT),
    )));
    let toggle_hint = match app.auth_mode {
        AuthMode::Login => "  Ctrl+T create account · Tab next field · Ctrl+C quit",
        AuthMode::Signup => "  Ctrl+T back to login · Tab next field · Ctrl+C quit",
    };
    lines.push(Line::from(Span::styled(
        toggle_hint,
        Style::default().fg(TEXT_MUTED),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {}", app.status),
        Style::default().fg(TEXT_MUTED),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MUTED)
    };
    let cursor = if focused { "▏" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {label:<9}"), label_style),
        Span::styled(value.to_string(), Style::default().fg(TEXT)),
        Span::styled(cursor, Style::default().fg(INDIGO)),
    ])
}

fn role_selector_line(app: &App) -> Line<'_> {
    let focused = app.auth_focus == AuthField::Role;
    let label_style = if focused {
        Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MUTED)
    };
    let option = |role: Role| {
        let selected = app.role_choice == role;
        let style = if selected {
            Style::default().fg(accent(role)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MUTED)
        };
        let marker = if selected { "●" } else { "○" };
        Span::styled(format!("{marker} {} ", capitalize(role.as_str())), style)
    };
    Line::from(vec![
        Span::styled(format!("  {:<9}", "Role"), label_style),
        option(Role::Patient),
        option(Role::Doctor),
        Span::styled(
            if focused { " (←/→ to switch)" } else { "" },
            Style::default().fg(TEXT_MUTED),
        ),
    ])
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────

fn draw_dashboard(frame: &mut Frame<'_>, app: &mut App, route: Route) {
    let area = frame.area();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);

    draw_sidebar(frame, app, route, cols[0]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
        ])
        .split(cols[1]);

    draw_chat_header(frame, route, main[0]);
    draw_chat(frame, app, main[1]);
    draw_input(frame, app, main[2]);
    draw_status_bar(frame, app, main[3]);
}

fn draw_sidebar(frame: &mut Frame<'_>, app: &App, route: Route, area: Rect) {
    let (title, role) = match route {
        Route::DoctorDashboard => (" Doctor Panel ", Role::Doctor),
        _ => (" Patient Panel ", Role::Patient),
    };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(accent(role)).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_style = Style::default().fg(TEXT_MUTED);
    let value_style = Style::default().fg(TEXT);

    let mut lines: Vec<Line<'_>> = Vec::new();
    if let Some(user) = app.session.current_user() {
        lines.push(Line::from(Span::styled(
            format!(" {}", user.display_name),
            value_style.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(" {}", user.email),
            label_style,
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" Role  ", label_style),
            Span::styled(capitalize(user.role.as_str()), value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Commands", label_style)));
    if route == Route::DoctorDashboard {
        lines.push(Line::from(Span::styled(
            " /summary <notes>",
            value_style,
        )));
    }
    lines.push(Line::from(Span::styled(" /logout", value_style)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ↑/↓ scroll · Ctrl+C quit",
        label_style,
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_chat_header(frame: &mut Frame<'_>, route: Route, area: Rect) {
    let (workspace, role) = match route {
        Route::DoctorDashboard => ("Doctor Workspace", Role::Doctor),
        _ => ("Patient Workspace", Role::Patient),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let line = Line::from(vec![
        Span::styled(
            " AI Medical Assistant",
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {workspace}"),
            Style::default().fg(accent(role)),
        ),
    ]);
    frame.render_widget(Paragraph::new(vec![line]), inner);
}

fn draw_chat(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line<'_>> = Vec::new();
    let busy = app
        .engine
        .as_ref()
        .map(|engine| engine.is_busy())
        .unwrap_or(false);
    if let Some(engine) = &app.engine {
        for message in engine.transcript() {
            let (prefix, style) = match message.role {
                ChatRole::User => ("you", Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)),
                ChatRole::Assistant => ("assistant", Style::default().fg(EMERALD)),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{prefix}: "), style),
                Span::styled(message.text.clone(), Style::default().fg(TEXT)),
            ]));
            lines.push(Line::from(""));
        }
    }
    if busy {
        lines.push(Line::from(Span::styled(
            "typing...",
            Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total_lines = paragraph.line_count(inner.width) as u16;
    let max_scroll = total_lines.saturating_sub(inner.height);
    app.update_scroll_bounds(max_scroll);
    frame.render_widget(paragraph.scroll((app.scroll, 0)), inner);
}

fn draw_input(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let busy = app
        .engine
        .as_ref()
        .map(|engine| engine.is_busy())
        .unwrap_or(false);
    let border = if busy { TEXT_MUTED } else { INDIGO };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = if app.input.is_empty() {
        Line::from(Span::styled(
            "Describe your symptoms...",
            Style::default().fg(TEXT_MUTED),
        ))
    } else {
        Line::from(vec![
            Span::styled(app.input.as_str(), Style::default().fg(TEXT)),
            Span::styled("▏", Style::default().fg(INDIGO)),
        ])
    };
    frame.render_widget(Paragraph::new(vec![content]), inner);
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let style = if app.status.contains("failed") || app.status.contains("error") {
        Style::default().fg(ERROR)
    } else {
        Style::default().fg(TEXT_MUTED)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", app.status),
            style,
        ))),
        area,
    );
}

// ── Modal overlay ─────────────────────────────────────────────────────

fn draw_modal(frame: &mut Frame<'_>, app: &App) {
    let Some(modal) = &app.modal else {
        return;
    };
    let area = frame.area();
    let width = (area.width * 7 / 10).clamp(30, 90);
    let height = (area.height * 6 / 10).clamp(8, 30);
    let card = centered_rect(width, height, area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", modal.title),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(
            " Esc to dismiss · ↑/↓ scroll ",
            Style::default().fg(TEXT_MUTED),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(INDIGO));
    let inner = block.inner(card);
    frame.render_widget(Clear, card);
    frame.render_widget(block, card);

    let paragraph = Paragraph::new(modal.content.as_str())
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: false })
        .scroll((modal.scroll, 0));
    frame.render_widget(paragraph, inner);
}

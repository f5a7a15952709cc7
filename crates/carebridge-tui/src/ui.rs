use std::time::Instant;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
};

use carebridge_core::chat::QUICK_MESSAGES;
use carebridge_core::dashboard::{DeleteFlow, FormField, MedicationPart};
use carebridge_core::toast::ToastPhase;
use carebridge_core::{ChatRole, LoginMode, NoticeLevel, Session};

use crate::app::{App, DashboardFocus, EditTarget, FormSlot, InputMode, Screen};

/// Render `**bold**` runs in assistant replies; an unmatched marker stays literal
fn parse_bold_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even number of parts means the last marker never closed
    let balanced = parts.len() % 2 == 1;

    let mut spans = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let is_last = i == parts.len() - 1;
        if i % 2 == 1 && (balanced || !is_last) {
            spans.push(Span::styled(part.to_string(), Style::default().add_modifier(Modifier::BOLD)));
        } else if i % 2 == 1 {
            spans.push(Span::raw(format!("**{}", part)));
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Login => render_login_screen(app, frame, body_area),
        Screen::Dashboard => render_dashboard_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Popups, lowest priority first
    if app.dashboard.delete.is_modal_visible() {
        render_delete_modal(app, frame, area);
    } else {
        app.modal_area = None;
    }
    render_toasts(app, frame, body_area);
    render_notice(app, frame, area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let who = match &app.session {
        Some(Session::Nurse) => " Nurse ".to_string(),
        Some(Session::Patient { patient_id }) => format!(" Patient {} ", patient_id),
        None => " Not signed in ".to_string(),
    };

    let (link_text, link_color) = match app.connectivity.is_online() {
        Some(true) => ("● online ", Color::Green),
        Some(false) => ("● offline ", Color::Red),
        None => ("○ ", Color::Gray),
    };

    let mut spans = vec![
        Span::styled(" CareBridge ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(who, Style::default().fg(Color::White)),
        Span::styled(link_text, Style::default().fg(link_color)),
        Span::styled(app.server_url.clone(), Style::default().fg(Color::Gray)),
    ];
    if app.is_busy() {
        spans.push(Span::styled("  working...", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Login => " LOGIN ",
        Screen::Dashboard => " NURSE ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let pairs: Vec<(&'static str, &'static str)> = if app.current_notice().is_some() {
        vec![("Enter", "dismiss")]
    } else if app.dashboard.delete.is_modal_visible() {
        vec![("y", "delete"), ("n/Esc", "cancel")]
    } else {
        match (app.screen, app.input_mode) {
            (Screen::Login, InputMode::Normal) => vec![
                ("j/k", "nav"),
                ("Enter", "select"),
                ("1-3", "pick"),
                ("q", "quit"),
            ],
            (Screen::Login, InputMode::Editing) => vec![
                ("Tab", "next field"),
                ("Enter", "log in"),
                ("Esc", "back"),
            ],
            (Screen::Dashboard, InputMode::Normal) => {
                let mut pairs = match app.dashboard_focus {
                    DashboardFocus::Form => vec![
                        ("j/k", "field"),
                        ("Enter", "edit"),
                        ("m", "add med"),
                        ("x", "remove med"),
                        ("s", "create"),
                    ],
                    DashboardFocus::Patients => vec![
                        ("j/k", "patient"),
                        ("a", "add"),
                        ("Enter", "instruct"),
                        ("r", "refresh"),
                        ("d", "delete"),
                    ],
                };
                pairs.extend([
                    ("Tab", "focus"),
                    ("S", "stats"),
                    ("C", "clear alerts"),
                    ("L", "logout"),
                    ("q", "quit"),
                ]);
                pairs
            }
            (Screen::Dashboard, InputMode::Editing) => match app.edit_target {
                Some(EditTarget::Form(_)) => vec![("Tab", "next field"), ("Enter/Esc", "done")],
                Some(EditTarget::Instruction(_)) => vec![("Enter", "send"), ("Esc", "cancel")],
                _ => vec![("Enter", "add"), ("Esc", "cancel")],
            },
            (Screen::Chat, InputMode::Normal) => vec![
                ("i", "type"),
                ("1-4", "quick message"),
                ("c", "copy last"),
                ("j/k", "scroll"),
                ("L", "logout"),
                ("q", "quit"),
            ],
            (Screen::Chat, InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.extend(hint(key, label));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn input_block(title: impl Into<String>, active: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active { Color::Yellow } else { Color::DarkGray }))
        .title(format!(" {} ", title.into()))
}

fn show_cursor(frame: &mut Frame, area: Rect, text: &str) {
    let offset = (text.chars().count() as u16).min(area.width.saturating_sub(3));
    frame.set_cursor_position((area.x + offset + 1, area.y + 1));
}

fn render_login_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [_, column, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(60.min(area.width)),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [list_area, first_area, second_area, _] = Layout::vertical([
        Constraint::Length(LoginMode::all().len() as u16 + 2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(column);

    let items: Vec<ListItem> = LoginMode::all()
        .iter()
        .enumerate()
        .map(|(i, mode)| ListItem::new(format!(" {}. {} ", i + 1, mode.display_name())))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Sign in "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.login_state);

    let editing = app.input_mode == InputMode::Editing;
    match app.selected_login_mode() {
        LoginMode::Nurse => {
            let hint = Paragraph::new("Press Enter to open the nurse dashboard")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, first_area.inner(ratatui::layout::Margin::new(1, 1)));
        }
        LoginMode::PatientPassword => {
            let id_active = editing && app.edit_target == Some(EditTarget::LoginPatientId);
            let pw_active = editing && app.edit_target == Some(EditTarget::LoginPassword);

            let id = Paragraph::new(app.login.patient_id.as_str())
                .style(Style::default().fg(Color::Cyan))
                .block(input_block("Patient ID", id_active));
            frame.render_widget(id, first_area);

            let masked = "*".repeat(app.login.password.chars().count());
            let password = Paragraph::new(masked.as_str())
                .style(Style::default().fg(Color::Cyan))
                .block(input_block("Password", pw_active));
            frame.render_widget(password, second_area);

            if id_active {
                show_cursor(frame, first_area, &app.login.patient_id);
            } else if pw_active {
                show_cursor(frame, second_area, &masked);
            }
        }
        LoginMode::PatientToken => {
            let active = editing && app.edit_target == Some(EditTarget::LoginToken);
            let token = Paragraph::new(app.login.token.as_str())
                .style(Style::default().fg(Color::Cyan))
                .block(input_block("Login token from your email", active));
            frame.render_widget(token, first_area);
            if active {
                show_cursor(frame, first_area, &app.login.token);
            }
        }
    }
}

fn field_label(field: FormField) -> String {
    match field {
        FormField::Name => "Name".into(),
        FormField::Email => "Email".into(),
        FormField::PatientId => "Patient ID".into(),
        FormField::Conditions => "Conditions (comma separated)".into(),
        FormField::Allergies => "Allergies (comma separated)".into(),
        FormField::DischargePlan => "Discharge plan".into(),
        FormField::Medication { row, part } => {
            let part = match part {
                MedicationPart::Name => "name",
                MedicationPart::Dosage => "dosage",
                MedicationPart::Frequency => "frequency",
            };
            format!("Medication {} {}", row + 1, part)
        }
    }
}

fn render_dashboard_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [form_area, side_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    render_patient_form(app, frame, form_area);

    let [stats_area, roster_area, input_area] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(side_area);

    render_stats(app, frame, stats_area);
    render_roster(app, frame, roster_area);
    render_patient_input(app, frame, input_area);
}

fn render_patient_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.dashboard_focus == DashboardFocus::Form;
    let editing = match (&app.edit_target, app.input_mode) {
        (Some(EditTarget::Form(field)), InputMode::Editing) => Some(*field),
        _ => None,
    };

    let form = &app.dashboard.form;
    let label_width = 30;

    let items: Vec<ListItem> = app
        .form_slots()
        .into_iter()
        .map(|slot| match slot {
            FormSlot::Field(field) => {
                let value = form.field(field).unwrap_or_default();
                let check = match field {
                    FormField::Email => Some(&form.email_check),
                    FormField::PatientId => Some(&form.patient_id_check),
                    _ => None,
                };
                let invalid = check.map(|c| c.is_invalid()).unwrap_or(false);

                let value_style = if editing == Some(field) {
                    Style::default().fg(Color::Yellow)
                } else if invalid {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Cyan)
                };

                let mut lines = vec![Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", field_label(field), width = label_width),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(value.to_string(), value_style),
                ])];
                if let Some(message) = check.and_then(|c| c.message()) {
                    lines.push(Line::from(Span::styled(
                        format!("{:<width$}{}", "", message, width = label_width),
                        Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
                    )));
                }
                ListItem::new(Text::from(lines))
            }
            FormSlot::Submit => {
                let button = form.button();
                let style = if button.enabled {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
                };
                ListItem::new(Line::from(Span::styled(format!("[ {} ]", button.label), style)))
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" New patient ");

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.form_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_stats(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" System ");

    let text = match &app.dashboard.stats {
        Some(stats) => {
            let row = |label: &'static str, value: u32, color: Color| {
                Line::from(vec![
                    Span::styled(format!("{:<22}", label), Style::default().fg(Color::Gray)),
                    Span::styled(value.to_string(), Style::default().fg(color).bold()),
                ])
            };
            let alert_color = if stats.high_priority_alerts > 0 { Color::Red } else { Color::Green };
            Text::from(vec![
                row("Patients", stats.total_patients, Color::Cyan),
                row("Active assistants", stats.active_agents, Color::Cyan),
                row("Alerts", stats.total_alerts, Color::Yellow),
                row("High priority alerts", stats.high_priority_alerts, alert_color),
                row("Instructions sent", stats.total_instructions, Color::Cyan),
            ])
        }
        None => Text::from(Span::styled(
            "Statistics not loaded (S to refresh)",
            Style::default().fg(Color::DarkGray),
        )),
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_roster(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.dashboard_focus == DashboardFocus::Patients;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(format!(" Patients ({}) ", app.dashboard.roster().len()));

    if app.dashboard.roster().is_empty() {
        let empty = Paragraph::new("No patients yet. Create one, or press a to add an existing name.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .dashboard
        .roster()
        .iter()
        .map(|name| {
            let draft = app.dashboard.instructions.text(name);
            let mut spans = vec![Span::raw(format!(" {} ", name))];
            if !draft.is_empty() {
                spans.push(Span::styled("(draft)", Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.roster_state);
}

/// Bottom-right input: a new roster name or the selected patient's instruction
fn render_patient_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let (title, text, active) = match &app.edit_target {
        Some(EditTarget::NewPatient) if editing => {
            ("Add patient by name".to_string(), app.new_patient.as_str(), true)
        }
        _ => match app.selected_patient() {
            Some(patient) => {
                let active = editing && app.edit_target == Some(EditTarget::Instruction(patient.clone()));
                (
                    format!("Instruction for {}", patient),
                    app.dashboard.instructions.text(&patient),
                    active,
                )
            }
            None => ("Instruction".to_string(), "", false),
        },
    };

    let input = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block(title, active));
    frame.render_widget(input, area);

    if active {
        show_cursor(frame, area, text);
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, quick_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Your care assistant ");

    let transcript = app.chat.transcript();
    let chat_text = if transcript.is_empty() && !app.chat.typing.is_visible() {
        Text::from(Span::styled(
            "Ask a question about your discharge plan, medications or symptoms...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            let color = match msg.role {
                ChatRole::User => Color::Cyan,
                ChatRole::Assistant => Color::Yellow,
                ChatRole::Nurse => Color::Magenta,
            };
            lines.push(Line::from(Span::styled(
                msg.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(parse_bold_line(line));
            }
            lines.push(Line::default());
        }

        if let Some(status) = app.chat.typing.status_line() {
            lines.push(Line::from(Span::styled(
                status,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let total_lines = chat_text.lines.len() as u16;
    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    if total_lines > app.chat_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state =
            ScrollbarState::new(total_lines as usize).position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            chat_area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    let mut quick = Vec::new();
    for (i, preset) in QUICK_MESSAGES.iter().enumerate() {
        quick.push(Span::styled(
            format!(" {} ", i + 1),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ));
        quick.push(Span::styled(format!(" {} ", preset), Style::default().fg(Color::Gray)));
    }
    frame.render_widget(Paragraph::new(Line::from(quick)), quick_area);

    let active = app.input_mode == InputMode::Editing;
    let input = Paragraph::new(app.chat.input.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(input_block("Message", active));
    frame.render_widget(input, input_area);

    if active {
        show_cursor(frame, input_area, &app.chat.input);
    }
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_delete_modal(app: &mut App, frame: &mut Frame, area: Rect) {
    let Some(target) = app.dashboard.delete.target().map(str::to_string) else {
        return;
    };
    let deleting = matches!(app.dashboard.delete, DeleteFlow::Deleting { .. });

    let popup_area = centered_popup(area, 50, 7);
    app.modal_area = Some(popup_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete patient ");

    let action = if deleting {
        Line::from(Span::styled("Deleting...", Style::default().fg(Color::DarkGray).italic()))
    } else {
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(" delete   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" cancel"),
        ])
    };

    let text = Text::from(vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(target, Style::default().bold()),
            Span::raw("?"),
        ]),
        Line::from(Span::styled(
            "This removes the patient and their assistant.",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        action,
    ]);

    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), popup_area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notice) = app.current_notice() else {
        return;
    };

    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };

    let width = 60.min(area.width.saturating_sub(4)).max(20);
    let inner_width = width.saturating_sub(2).max(1) as usize;
    let body_lines: u16 = notice
        .text
        .lines()
        .map(|l| (l.chars().count() / inner_width + 1) as u16)
        .sum();
    let popup_area = centered_popup(area, width, body_lines + 4);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", notice.title()));

    let mut lines: Vec<Line> = notice.text.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press Enter to continue",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }).block(block),
        popup_area,
    );
}

/// Stack toasts upward from the bottom-right corner of the body
fn render_toasts(app: &App, frame: &mut Frame, area: Rect) {
    let now = Instant::now();
    let mut bottom = area.y + area.height;

    for toast in app.toasts.iter().collect::<Vec<_>>().into_iter().rev() {
        let style = match toast.phase(now) {
            ToastPhase::Visible => Style::default().bg(Color::Green).fg(Color::Black),
            ToastPhase::FadingIn | ToastPhase::FadingOut => {
                Style::default().bg(Color::DarkGray).fg(Color::Gray)
            }
            ToastPhase::Gone => continue,
        };

        let width = (toast.message.chars().count() as u16 + 4).min(area.width);
        if bottom < area.y + 1 {
            break;
        }
        bottom -= 1;
        let toast_area = Rect::new(area.x + area.width - width, bottom, width, 1);

        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(format!("  {}  ", toast.message)).style(style),
            toast_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(line: &Line) -> (String, Vec<bool>) {
        let text = line.spans.iter().map(|s| s.content.as_ref()).collect::<String>();
        let bold = line
            .spans
            .iter()
            .map(|s| s.style.add_modifier.contains(Modifier::BOLD))
            .collect();
        (text, bold)
    }

    #[test]
    fn test_bold_runs_are_styled() {
        let (text, bold) = rendered(&parse_bold_line("Take **two** tablets"));
        assert_eq!(text, "Take two tablets");
        assert_eq!(bold, vec![false, true, false]);
    }

    #[test]
    fn test_unclosed_marker_stays_literal() {
        let (text, bold) = rendered(&parse_bold_line("Rest **well"));
        assert_eq!(text, "Rest **well");
        assert!(bold.iter().all(|b| !b));
    }

    #[test]
    fn test_popup_stays_inside_small_terminals() {
        let popup = centered_popup(Rect::new(0, 0, 30, 10), 50, 7);
        assert_eq!(popup.width, 26);
        assert_eq!(popup.height, 6);
        assert_eq!(popup.x, 2);
    }
}

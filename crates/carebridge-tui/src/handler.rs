use std::time::Instant;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use carebridge_core::LoginMode;

use crate::app::{App, DashboardFocus, EditTarget, FormSlot, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(Instant::now()),
        AppEvent::HealthCheck => app.start_health_probe(),
    }

    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A notice blocks everything until acknowledged
    if app.current_notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notice();
        }
        return;
    }

    if app.dashboard.delete.is_modal_visible() {
        handle_delete_modal(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_delete_modal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => app.confirm_delete(),
        KeyCode::Esc | KeyCode::Char('n') => app.dashboard.delete.cancel(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Login => handle_login_normal(app, key),
        Screen::Dashboard => handle_dashboard_normal(app, key),
        Screen::Chat => handle_chat_normal(app, key),
    }
}

fn handle_login_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.login_nav(true),
        KeyCode::Char('k') | KeyCode::Up => app.login_nav(false),
        KeyCode::Char('1') => app.choose_login_mode(LoginMode::Nurse),
        KeyCode::Char('2') => app.choose_login_mode(LoginMode::PatientPassword),
        KeyCode::Char('3') => app.choose_login_mode(LoginMode::PatientToken),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            let mode = app.selected_login_mode();
            app.choose_login_mode(mode);
        }
        _ => {}
    }
}

fn handle_dashboard_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('S') => app.refresh_stats(),
        KeyCode::Char('C') => app.clear_alerts(),

        KeyCode::Tab => {
            app.dashboard_focus = match app.dashboard_focus {
                DashboardFocus::Form => {
                    if app.roster_state.selected().is_none() {
                        app.roster_nav(true);
                    }
                    DashboardFocus::Patients
                }
                DashboardFocus::Patients => DashboardFocus::Form,
            };
        }

        _ => match app.dashboard_focus {
            DashboardFocus::Form => handle_form_keys(app, key),
            DashboardFocus::Patients => handle_patient_keys(app, key),
        },
    }
}

fn handle_form_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.form_nav(true),
        KeyCode::Char('k') | KeyCode::Up => app.form_nav(false),
        KeyCode::Char('g') => app.form_cursor = 0,
        KeyCode::Char('G') => app.form_cursor = app.form_slots().len() - 1,
        KeyCode::Enter | KeyCode::Char('i') => app.activate_form_slot(),
        KeyCode::Char('s') => app.submit_form(),
        KeyCode::Char('m') => app.add_medication(),
        KeyCode::Char('x') => app.remove_selected_medication(),
        _ => {}
    }
}

fn handle_patient_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.roster_nav(true),
        KeyCode::Char('k') | KeyCode::Up => app.roster_nav(false),
        KeyCode::Char('a') => {
            app.new_patient.clear();
            app.start_editing(EditTarget::NewPatient);
        }
        KeyCode::Enter | KeyCode::Char('i') => {
            if let Some(patient) = app.selected_patient() {
                app.start_editing(EditTarget::Instruction(patient));
            }
        }
        KeyCode::Char('d') => app.open_delete_modal(),
        KeyCode::Char('r') => app.refresh_context(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('L') => app.logout(),
        KeyCode::Enter | KeyCode::Char('i') => app.start_editing(EditTarget::ChatInput),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.quick_message(index);
        }
        KeyCode::Char('c') => app.copy_last_message(),
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let Some(target) = app.edit_target.clone() else {
        app.input_mode = InputMode::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Enter => commit_edit(app, target),
        KeyCode::Tab => match target {
            EditTarget::LoginPatientId => app.start_editing(EditTarget::LoginPassword),
            EditTarget::LoginPassword => app.start_editing(EditTarget::LoginPatientId),
            EditTarget::Form(_) => {
                // Move straight on to the next field
                app.form_nav(true);
                match app.selected_slot() {
                    FormSlot::Field(field) => app.start_editing(EditTarget::Form(field)),
                    FormSlot::Submit => app.stop_editing(),
                }
            }
            _ => {}
        },
        KeyCode::Backspace => app.edit_buffer(|s| {
            s.pop();
        }),
        KeyCode::Char(c) => app.edit_buffer(|s| s.push(c)),
        _ => {}
    }
}

fn commit_edit(app: &mut App, target: EditTarget) {
    match target {
        EditTarget::LoginPatientId | EditTarget::LoginPassword | EditTarget::LoginToken => {
            app.submit_login()
        }
        EditTarget::Form(_) => app.stop_editing(),
        EditTarget::NewPatient => app.commit_new_patient(),
        EditTarget::Instruction(patient) => app.send_instruction(&patient),
        EditTarget::ChatInput => app.send_chat(),
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !app.dashboard.delete.is_modal_visible() {
                return;
            }
            let inside = app.modal_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
            if !inside {
                app.dashboard.delete.click_outside();
            }
        }
        MouseEventKind::ScrollDown if app.screen == Screen::Chat => {
            app.chat_scroll = app.chat_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp if app.screen == Screen::Chat => {
            app.chat_scroll = app.chat_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use carebridge_core::dashboard::FormField;
    use carebridge_core::Config;

    fn app() -> App {
        App::new(Config::new(), "http://127.0.0.1:9").unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        handle_mouse(
            app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        );
    }

    fn dashboard_app() -> App {
        let mut app = app();
        app.screen = Screen::Dashboard;
        app
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = dashboard_app();
        app.start_editing(EditTarget::Form(FormField::Name));
        handle_key(
            &mut app,
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                kind: crossterm::event::KeyEventKind::Press,
                state: KeyEventState::NONE,
            },
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_into_form_runs_validation() {
        let mut app = dashboard_app();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.edit_target, Some(EditTarget::Form(FormField::Email)));

        type_text(&mut app, "jane@");
        assert!(app.dashboard.form.email_check.is_invalid());

        type_text(&mut app, "example.com");
        assert!(!app.dashboard.form.email_check.is_invalid());

        // Tab moves on to the patient id field
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.edit_target, Some(EditTarget::Form(FormField::PatientId)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_notice_blocks_keys_until_dismissed() {
        let mut app = dashboard_app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(
            app.current_notice().map(|n| n.text.as_str()),
            Some("Patient name, email, and ID are required")
        );

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Enter);
        assert!(app.current_notice().is_none());
    }

    #[test]
    fn test_delete_modal_closes_on_outside_click() {
        let mut app = dashboard_app();
        app.dashboard.add_patient("Jane Doe");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.dashboard.delete.is_modal_visible());

        app.modal_area = Some(Rect::new(10, 5, 40, 7));
        click(&mut app, 20, 8);
        assert!(app.dashboard.delete.is_modal_visible());

        click(&mut app, 1, 1);
        assert!(!app.dashboard.delete.is_modal_visible());
        assert_eq!(app.dashboard.roster(), ["Jane Doe"]);
    }

    #[test]
    fn test_delete_modal_cancel_key() {
        let mut app = dashboard_app();
        app.dashboard.add_patient("Jane Doe");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.dashboard.delete.is_modal_visible());
    }

    #[test]
    fn test_new_patient_is_added_to_roster() {
        let mut app = dashboard_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Jane Doe");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.dashboard.roster(), ["Jane Doe"]);
        assert_eq!(app.selected_patient().as_deref(), Some("Jane Doe"));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_patient_login_without_password_is_rejected() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.edit_target, Some(EditTarget::LoginPatientId));

        type_text(&mut app, "JD001");
        press(&mut app, KeyCode::Enter);

        assert!(app.pending.is_empty());
        assert_eq!(
            app.current_notice().map(|n| n.text.as_str()),
            Some("Patient ID and password are required")
        );
    }
}

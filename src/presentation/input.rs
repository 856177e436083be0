use crate::application::{App, AppMode, SubmissionJob};
use crate::infrastructure::{FileRepository, copy_to_clipboard};
use crossterm::event::{KeyCode, KeyModifiers};

/// Side effects the event loop performs on behalf of a key press.
#[derive(Debug)]
pub enum InputAction {
    None,
    /// Run the job off the UI thread
    Submit(SubmissionJob),
    /// Reconnect the wallet
    Reconnect,
    Quit,
}

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> InputAction {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            return InputAction::Quit;
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => {
                Self::handle_help_mode(app, key);
                InputAction::None
            }
            AppMode::Alert => {
                Self::handle_alert_mode(app, key);
                InputAction::None
            }
            AppMode::SaveAs => {
                Self::handle_filename_input_mode(app, key);
                InputAction::None
            }
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> InputAction {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('q') => return InputAction::Quit,
                KeyCode::Char('x') => {
                    app.clear();
                    return InputAction::None;
                }
                KeyCode::Char('w') => return InputAction::Reconnect,
                KeyCode::Char('s') => {
                    app.start_save_as();
                    return InputAction::None;
                }
                KeyCode::Char('y') => {
                    match app.request_id() {
                        Some(id) => app.set_copy_result(copy_to_clipboard(&id)),
                        None => app.status_message = Some("No request id to copy".to_string()),
                    }
                    return InputAction::None;
                }
                _ => return InputAction::None,
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Enter => {
                let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
                if let Some(job) = app.submit(timestamp) {
                    return InputAction::Submit(job);
                }
            }
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
            KeyCode::Left if app.focus.is_select() => app.select_previous(),
            KeyCode::Right if app.focus.is_select() => app.select_next(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Home => app.move_cursor_home(),
            KeyCode::End => app.move_cursor_end(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.delete(),
            KeyCode::PageUp => app.data_scroll = app.data_scroll.saturating_sub(5),
            KeyCode::PageDown => app.data_scroll += 5,
            KeyCode::F(1) => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
        InputAction::None
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_alert_mode(app: &mut App, key: KeyCode) {
        if matches!(key, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_save_filename();
                let result = match app.result() {
                    Some(data) => FileRepository::save_request_data(data, &filename),
                    None => Err("request data was cleared".to_string()),
                };
                app.set_save_result(result);
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                app.filename_backspace();
            }
            KeyCode::Left => {
                app.cursor_position = app.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if app.cursor_position < app.filename_input.chars().count() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.chars().count();
            }
            KeyCode::Char(c) => {
                app.insert_filename_char(c);
            }
            _ => {}
        }
    }
}

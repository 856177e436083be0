//! Application state for the create-a-request terminal form.
//!
//! This module ties the form input model, the wallet connection and the
//! submission workflow together, and holds the UI-only state (focus,
//! cursor, dialogs) the presentation layer renders.

use super::form::{FormField, FormState};
use super::ports::Connection;
use super::submission::SubmissionJob;
use super::workflow::{StatusUpdate, SubmissionEvent, Workflow, WorkflowStatus};
use crate::domain::{RequestResult, ReferenceData};
use tracing::{info, warn};

/// Default filename offered when saving request data.
pub const DEFAULT_EXPORT_FILENAME: &str = "request.json";

/// Represents the current mode of the application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    /// Form editing - keys edit the focused field
    Normal,
    /// Help screen is displayed
    Help,
    /// A blocking error notification is displayed
    Alert,
    /// Save dialog for the request data is open
    SaveAs,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use rn_create_request::application::{App, FormField, WorkflowStatus};
///
/// let app = App::default();
/// assert_eq!(app.focus, FormField::StorageChain);
/// assert_eq!(app.workflow.status(), WorkflowStatus::AwaitingInput);
/// ```
#[derive(Debug)]
pub struct App {
    /// Supported storage chains and currencies
    pub reference: ReferenceData,
    /// User-entered request fields
    pub form: FormState,
    /// Submission status and the last request data
    pub workflow: Workflow,
    /// Wallet connection supplying the payee identity
    pub connection: Connection,
    /// Current application mode
    pub mode: AppMode,
    /// Field receiving keyboard input
    pub focus: FormField,
    /// Cursor position (in characters) within the focused text field or dialog input
    pub cursor_position: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Scroll position in the request data pane
    pub data_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Message of the blocking notification
    pub alert: Option<String>,
    /// Input buffer for filename entry
    pub filename_input: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new(ReferenceData::default())
    }
}

impl App {
    pub fn new(reference: ReferenceData) -> Self {
        let form = FormState::with_defaults(&reference);
        Self {
            reference,
            form,
            workflow: Workflow::default(),
            connection: Connection::Disconnected,
            mode: AppMode::Normal,
            focus: FormField::StorageChain,
            cursor_position: 0,
            help_scroll: 0,
            data_scroll: 0,
            status_message: None,
            alert: None,
            filename_input: String::new(),
        }
    }

    pub fn set_connection(&mut self, connection: Connection) {
        match &connection {
            Connection::Ready(account) => info!(address = %account.address, "wallet connected"),
            Connection::ConnectionError(e) => warn!(error = %e, "wallet connection failed"),
            Connection::Connecting => info!("wallet connecting"),
            Connection::Disconnected => info!("wallet disconnected"),
        }
        self.connection = connection;
    }

    pub fn can_submit(&self) -> bool {
        self.form.can_submit(self.workflow.status(), &self.connection)
    }

    pub fn result(&self) -> Option<&RequestResult> {
        self.workflow.result()
    }

    /// Starts a submission if the form allows it.
    ///
    /// Returns the job to run off the UI thread. Returns `None` when the
    /// submit action is disabled or the selection cannot be resolved; the
    /// latter ends the attempt in `Failed`.
    pub fn submit(&mut self, timestamp: u64) -> Option<SubmissionJob> {
        if !self.can_submit() {
            return None;
        }
        let account = self.connection.account()?.clone();

        let resolved = self
            .reference
            .currency(&self.form.currency_key)
            .cloned()
            .and_then(|currency| {
                self.reference
                    .storage_chain(&self.form.storage_chain_key)
                    .map(|chain| (currency, chain.gateway.clone()))
            });

        let submission = self.workflow.begin()?;
        self.data_scroll = 0;
        self.status_message = None;

        match resolved {
            Ok((currency, gateway)) => Some(SubmissionJob {
                submission,
                form: self.form.clone(),
                currency,
                gateway,
                account,
                timestamp,
            }),
            Err(e) => {
                self.handle_status_update(StatusUpdate {
                    submission,
                    event: SubmissionEvent::Failed(e.to_string()),
                });
                None
            }
        }
    }

    /// Applies a status update from a submission job.
    pub fn handle_status_update(&mut self, update: StatusUpdate) {
        if !self.workflow.apply(update) {
            return;
        }
        if self.workflow.status() == WorkflowStatus::Failed {
            self.alert = self.workflow.error().map(str::to_string);
            self.mode = AppMode::Alert;
        }
    }

    /// Discards the request data and resets the form.
    pub fn clear(&mut self) {
        self.workflow.clear();
        self.form = FormState::with_defaults(&self.reference);
        self.cursor_position = self.focused_len();
        self.data_scroll = 0;
        self.status_message = None;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mode = AppMode::Normal;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
        self.cursor_position = self.focused_len();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
        self.cursor_position = self.focused_len();
    }

    /// Selects the next entry of the focused select field.
    pub fn select_next(&mut self) {
        match self.focus {
            FormField::StorageChain => {
                let key = self.reference.storage_chains.next_key(&self.form.storage_chain_key);
                self.form.set_storage_chain(key);
            }
            FormField::Currency => {
                let key = self.reference.currencies.next_key(&self.form.currency_key);
                self.form.set_currency(key);
            }
            _ => {}
        }
    }

    /// Selects the previous entry of the focused select field.
    pub fn select_previous(&mut self) {
        match self.focus {
            FormField::StorageChain => {
                let key = self.reference.storage_chains.previous_key(&self.form.storage_chain_key);
                self.form.set_storage_chain(key);
            }
            FormField::Currency => {
                let key = self.reference.currencies.previous_key(&self.form.currency_key);
                self.form.set_currency(key);
            }
            _ => {}
        }
    }

    /// Inserts a character at the cursor of the focused text field.
    pub fn insert_char(&mut self, c: char) {
        if self.focus.is_select() {
            return;
        }
        let mut value = self.form.value(self.focus).to_string();
        let index = byte_index(&value, self.cursor_position);
        value.insert(index, c);
        self.form.set_value(self.focus, value);
        self.cursor_position += 1;
    }

    /// Deletes the character before the cursor of the focused text field.
    pub fn backspace(&mut self) {
        if self.focus.is_select() || self.cursor_position == 0 {
            return;
        }
        let mut value = self.form.value(self.focus).to_string();
        let index = byte_index(&value, self.cursor_position - 1);
        value.remove(index);
        self.form.set_value(self.focus, value);
        self.cursor_position -= 1;
    }

    /// Deletes the character under the cursor of the focused text field.
    pub fn delete(&mut self) {
        if self.focus.is_select() || self.cursor_position >= self.focused_len() {
            return;
        }
        let mut value = self.form.value(self.focus).to_string();
        let index = byte_index(&value, self.cursor_position);
        value.remove(index);
        self.form.set_value(self.focus, value);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.focused_len() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.focused_len();
    }

    fn focused_len(&self) -> usize {
        if self.focus.is_select() {
            0
        } else {
            self.form.value(self.focus).chars().count()
        }
    }

    /// Switches to save-as mode to prompt for a filename.
    ///
    /// Only available once request data is displayed.
    pub fn start_save_as(&mut self) {
        if self.result().is_none() {
            self.status_message = Some("No request data to save".to_string());
            return;
        }
        self.mode = AppMode::SaveAs;
        self.filename_input = DEFAULT_EXPORT_FILENAME.to_string();
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    /// Cancels filename input and returns to normal mode.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = self.focused_len();
    }

    /// Filename input, or the default filename when the input is empty.
    pub fn get_save_filename(&self) -> String {
        if self.filename_input.is_empty() {
            DEFAULT_EXPORT_FILENAME.to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Processes the result of a save operation and returns to normal mode.
    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Saved request data to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }

        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = self.focused_len();
    }

    /// Identifier of the displayed request, if any.
    pub fn request_id(&self) -> Option<String> {
        self.result().and_then(|r| r.request_id()).map(str::to_string)
    }

    /// Processes the result of copying the request id to the clipboard.
    pub fn set_copy_result(&mut self, result: Result<String, String>) {
        self.status_message = Some(match result {
            Ok(id) => format!("Copied request id {}", id),
            Err(error) => format!("Copy failed: {}", error),
        });
    }

    pub fn insert_filename_char(&mut self, c: char) {
        let index = byte_index(&self.filename_input, self.cursor_position);
        self.filename_input.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn filename_backspace(&mut self) {
        if self.cursor_position > 0 {
            let index = byte_index(&self.filename_input, self.cursor_position - 1);
            self.filename_input.remove(index);
            self.cursor_position -= 1;
        }
    }
}

fn byte_index(s: &str, char_position: usize) -> usize {
    s.char_indices()
        .nth(char_position)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::ClientError;
    use crate::application::ports::Account;
    use crate::application::submission::tests::{FakeClient, FakeSigner, OTHER, PAYEE};
    use serde_json::json;
    use std::sync::Arc;

    fn connected_app() -> App {
        let mut app = App::default();
        app.set_connection(Connection::Ready(Account::new(Arc::new(FakeSigner))));
        app.form.set_expected_amount("2.5");
        app
    }

    /// Submits and feeds every update of the job back into the app.
    fn submit_and_run(app: &mut App, client: &FakeClient) -> Vec<WorkflowStatus> {
        let mut statuses = Vec::new();
        let job = app.submit(1_700_000_000).expect("submission should start");
        statuses.push(app.workflow.status());
        let mut updates = Vec::new();
        job.run(client, |u| updates.push(u));
        for update in updates {
            app.handle_status_update(update);
            statuses.push(app.workflow.status());
        }
        statuses
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.form.storage_chain_key, "100");
        assert!(app.form.expected_amount.is_empty());
        assert!(matches!(app.connection, Connection::Disconnected));
        assert!(app.result().is_none());
        assert!(!app.can_submit());
    }

    #[test]
    fn test_submit_is_inert_when_disabled() {
        let mut app = App::default();
        app.form.set_expected_amount("1");
        assert!(app.submit(0).is_none());
        assert_eq!(app.workflow.status(), WorkflowStatus::AwaitingInput);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_submit_blocked_while_submitting() {
        let mut app = connected_app();
        assert!(app.submit(0).is_some());
        assert_eq!(app.workflow.status(), WorkflowStatus::Submitting);
        assert!(!app.can_submit());
        assert!(app.submit(0).is_none());
    }

    #[test]
    fn test_full_submission_through_app() {
        let mut app = connected_app();
        let client = FakeClient::default();
        let statuses = submit_and_run(&mut app, &client);

        assert_eq!(
            statuses,
            vec![
                WorkflowStatus::Submitting,
                WorkflowStatus::PersistingToRemoteStore,
                WorkflowStatus::PersistingOnChain,
                WorkflowStatus::Confirmed,
            ]
        );
        assert_eq!(app.request_id().as_deref(), Some("01feed"));
        assert_eq!(app.mode, AppMode::Normal);

        let seen = client.seen.lock().unwrap();
        let (gateway, params) = &seen[0];
        assert_eq!(gateway, "https://xdai.gateway.request.network/");
        assert_eq!(params.request_info.expected_amount, "2500000000000000000");
        assert_eq!(params.request_info.payee.value, PAYEE);
        assert!(params.request_info.payer.is_none());
    }

    #[test]
    fn test_failed_submission_raises_alert() {
        let mut app = connected_app();
        app.form.set_payer_identity(OTHER);
        let client = FakeClient {
            fail_create: Some(ClientError::Http("connection refused".to_string())),
            ..FakeClient::default()
        };
        let statuses = submit_and_run(&mut app, &client);

        assert_eq!(statuses.last(), Some(&WorkflowStatus::Failed));
        assert!(app.result().is_none());
        assert_eq!(app.mode, AppMode::Alert);
        assert_eq!(app.alert.as_deref(), Some("HTTP request failed: connection refused"));

        app.dismiss_alert();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.alert.is_none());
        assert_eq!(app.workflow.status(), WorkflowStatus::Failed);
    }

    #[test]
    fn test_unknown_selection_fails_submission() {
        let mut app = connected_app();
        app.form.set_currency("nope");
        assert!(app.submit(0).is_none());
        assert_eq!(app.workflow.status(), WorkflowStatus::Failed);
        assert_eq!(app.alert.as_deref(), Some("Unknown currency: nope"));
    }

    #[test]
    fn test_clear_resets_workflow_and_form() {
        let mut app = connected_app();
        app.form.set_reason("rent");
        let client = FakeClient::default();
        submit_and_run(&mut app, &client);
        assert!(app.result().is_some());

        app.clear();
        assert_eq!(app.workflow.status(), WorkflowStatus::AwaitingInput);
        assert!(app.result().is_none());
        assert!(app.form.reason.is_empty());
        assert!(app.form.expected_amount.is_empty());
        assert_eq!(app.form.currency_key, app.reference.currencies.default_key());
    }

    #[test]
    fn test_clear_while_in_flight_drops_late_updates() {
        let mut app = connected_app();
        let job = app.submit(0).unwrap();
        app.clear();

        let client = FakeClient::default();
        let mut updates = Vec::new();
        job.run(&client, |u| updates.push(u));
        for update in updates {
            app.handle_status_update(update);
        }
        assert_eq!(app.workflow.status(), WorkflowStatus::AwaitingInput);
        assert!(app.result().is_none());
    }

    #[test]
    fn test_text_editing_on_focused_field() {
        let mut app = App::default();
        app.focus_next();
        assert_eq!(app.focus, FormField::Amount);

        for c in "12.5".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.form.expected_amount, "12.5");

        app.move_cursor_left();
        app.backspace();
        assert_eq!(app.form.expected_amount, "125");

        app.move_cursor_home();
        app.delete();
        assert_eq!(app.form.expected_amount, "25");

        app.move_cursor_end();
        assert_eq!(app.cursor_position, 2);
    }

    #[test]
    fn test_editing_handles_multibyte_characters() {
        let mut app = App::default();
        app.focus = FormField::Reason;
        for c in "café".chars() {
            app.insert_char(c);
        }
        app.backspace();
        app.insert_char('e');
        assert_eq!(app.form.reason, "cafe");
    }

    #[test]
    fn test_select_fields_cycle_and_ignore_typing() {
        let mut app = App::default();
        assert_eq!(app.focus, FormField::StorageChain);
        app.insert_char('x');
        assert_eq!(app.form.storage_chain_key, "100");

        app.select_next();
        assert_eq!(app.form.storage_chain_key, "11155111");
        app.select_previous();
        assert_eq!(app.form.storage_chain_key, "100");
    }

    #[test]
    fn test_save_dialog_requires_result() {
        let mut app = App::default();
        app.start_save_as();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.status_message.as_deref(), Some("No request data to save"));

        let mut app = connected_app();
        submit_and_run(&mut app, &FakeClient::default());
        app.start_save_as();
        assert_eq!(app.mode, AppMode::SaveAs);
        assert_eq!(app.get_save_filename(), DEFAULT_EXPORT_FILENAME);

        app.filename_backspace();
        app.insert_filename_char('x');
        assert_eq!(app.filename_input, "request.jsox");

        app.set_save_result(Ok("out.json".to_string()));
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.filename_input.is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Saved request data to out.json"));
    }

    #[test]
    fn test_copy_result_messages() {
        let mut app = App::default();
        app.set_copy_result(Err("no clipboard".to_string()));
        assert_eq!(app.status_message.as_deref(), Some("Copy failed: no clipboard"));
        app.set_copy_result(Ok("01ab".to_string()));
        assert_eq!(app.status_message.as_deref(), Some("Copied request id 01ab"));
    }

    #[test]
    fn test_stale_result_fields() {
        let mut app = App::default();
        assert!(app.request_id().is_none());
        app.handle_status_update(StatusUpdate {
            submission: 7,
            event: SubmissionEvent::Confirmed(RequestResult(json!({"requestId": "x"}))),
        });
        assert!(app.request_id().is_none());
    }
}

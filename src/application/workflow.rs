//! Request submission workflow state machine.

use crate::domain::RequestResult;
use tracing::{info, warn};

/// Status of the current submission session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowStatus {
    #[default]
    AwaitingInput,
    Submitting,
    PersistingToRemoteStore,
    PersistingOnChain,
    Confirmed,
    Failed,
}

impl WorkflowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStatus::AwaitingInput => "awaiting input",
            WorkflowStatus::Submitting => "submitting",
            WorkflowStatus::PersistingToRemoteStore => "persisting to ipfs",
            WorkflowStatus::PersistingOnChain => "persisting on-chain",
            WorkflowStatus::Confirmed => "request confirmed",
            WorkflowStatus::Failed => "error occurred",
        }
    }

    /// A submission job is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Submitting
                | WorkflowStatus::PersistingToRemoteStore
                | WorkflowStatus::PersistingOnChain
        )
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress reported by a running submission job.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// The payload was built and the create call is about to be made.
    PersistingToRemoteStore,
    /// The create call returned a request handle.
    Persisted(RequestResult),
    /// The request was anchored on-chain.
    Confirmed(RequestResult),
    Failed(String),
}

/// A [`SubmissionEvent`] tagged with the submission that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub submission: u64,
    pub event: SubmissionEvent,
}

/// Current status plus the result data held for display.
///
/// Every accepted submit gets a fresh submission id; updates carrying any
/// other id are stale and dropped.
#[derive(Debug, Default)]
pub struct Workflow {
    status: WorkflowStatus,
    result: Option<RequestResult>,
    error: Option<String>,
    submission: u64,
}

impl Workflow {
    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn result(&self) -> Option<&RequestResult> {
        self.result.as_ref()
    }

    /// Message of the last failure, kept until the next submit or clear.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_submission(&self) -> u64 {
        self.submission
    }

    /// Moves to `Submitting` and returns the new submission id.
    ///
    /// Returns `None` while another submission is in flight.
    pub fn begin(&mut self) -> Option<u64> {
        if self.status.is_in_flight() {
            warn!(status = %self.status, "submit ignored while a submission is in flight");
            return None;
        }
        self.submission += 1;
        self.status = WorkflowStatus::Submitting;
        self.result = None;
        self.error = None;
        info!(submission = self.submission, "submission started");
        Some(self.submission)
    }

    /// Applies a job update. Returns `false` if it was stale or out of order.
    pub fn apply(&mut self, update: StatusUpdate) -> bool {
        if update.submission != self.submission {
            warn!(
                submission = update.submission,
                current = self.submission,
                "dropping update from a stale submission"
            );
            return false;
        }

        let next = match (&self.status, &update.event) {
            (WorkflowStatus::Submitting, SubmissionEvent::PersistingToRemoteStore) => {
                WorkflowStatus::PersistingToRemoteStore
            }
            (WorkflowStatus::PersistingToRemoteStore, SubmissionEvent::Persisted(_)) => {
                WorkflowStatus::PersistingOnChain
            }
            (WorkflowStatus::PersistingOnChain, SubmissionEvent::Confirmed(_)) => {
                WorkflowStatus::Confirmed
            }
            (status, SubmissionEvent::Failed(_)) if status.is_in_flight() => WorkflowStatus::Failed,
            (status, event) => {
                warn!(status = %status, event = ?event, "ignoring out-of-order submission event");
                return false;
            }
        };

        match update.event {
            SubmissionEvent::Persisted(data) | SubmissionEvent::Confirmed(data) => {
                self.result = Some(data);
            }
            SubmissionEvent::Failed(message) => {
                self.result = None;
                self.error = Some(message);
            }
            SubmissionEvent::PersistingToRemoteStore => {}
        }

        info!(submission = self.submission, from = %self.status, to = %next, "workflow transition");
        self.status = next;
        true
    }

    /// Returns to `AwaitingInput`, discarding result data.
    ///
    /// Any in-flight submission becomes stale.
    pub fn clear(&mut self) {
        if self.status.is_in_flight() {
            self.submission += 1;
        }
        self.status = WorkflowStatus::AwaitingInput;
        self.result = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(submission: u64, event: SubmissionEvent) -> StatusUpdate {
        StatusUpdate { submission, event }
    }

    fn data(state: &str) -> RequestResult {
        RequestResult(json!({"requestId": "01ab", "state": state}))
    }

    #[test]
    fn test_successful_run() {
        let mut workflow = Workflow::default();
        assert_eq!(workflow.status(), WorkflowStatus::AwaitingInput);

        let id = workflow.begin().unwrap();
        assert_eq!(workflow.status(), WorkflowStatus::Submitting);

        assert!(workflow.apply(update(id, SubmissionEvent::PersistingToRemoteStore)));
        assert!(workflow.result().is_none());

        assert!(workflow.apply(update(id, SubmissionEvent::Persisted(data("pending")))));
        assert_eq!(workflow.status(), WorkflowStatus::PersistingOnChain);
        assert_eq!(workflow.result().unwrap().state(), Some("pending"));

        assert!(workflow.apply(update(id, SubmissionEvent::Confirmed(data("created")))));
        assert_eq!(workflow.status(), WorkflowStatus::Confirmed);
        assert_eq!(workflow.result().unwrap().state(), Some("created"));
    }

    #[test]
    fn test_failure_from_each_in_flight_state() {
        for steps in 0..3 {
            let mut workflow = Workflow::default();
            let id = workflow.begin().unwrap();
            let events = [
                SubmissionEvent::PersistingToRemoteStore,
                SubmissionEvent::Persisted(data("pending")),
            ];
            for event in events.iter().take(steps) {
                assert!(workflow.apply(update(id, event.clone())));
            }

            assert!(workflow.apply(update(id, SubmissionEvent::Failed("boom".to_string()))));
            assert_eq!(workflow.status(), WorkflowStatus::Failed);
            assert!(workflow.result().is_none());
            assert_eq!(workflow.error(), Some("boom"));
        }
    }

    #[test]
    fn test_out_of_order_events_are_ignored() {
        let mut workflow = Workflow::default();
        let id = workflow.begin().unwrap();

        assert!(!workflow.apply(update(id, SubmissionEvent::Confirmed(data("created")))));
        assert_eq!(workflow.status(), WorkflowStatus::Submitting);

        // Nothing may follow a terminal state.
        workflow.apply(update(id, SubmissionEvent::Failed("x".to_string())));
        assert!(!workflow.apply(update(id, SubmissionEvent::Failed("y".to_string()))));
        assert_eq!(workflow.error(), Some("x"));
    }

    #[test]
    fn test_begin_is_rejected_while_in_flight() {
        let mut workflow = Workflow::default();
        let id = workflow.begin().unwrap();
        assert!(workflow.begin().is_none());
        workflow.apply(update(id, SubmissionEvent::PersistingToRemoteStore));
        assert!(workflow.begin().is_none());
        assert_eq!(workflow.current_submission(), id);
    }

    #[test]
    fn test_begin_after_terminal_state_starts_fresh() {
        let mut workflow = Workflow::default();
        let first = workflow.begin().unwrap();
        workflow.apply(update(first, SubmissionEvent::Failed("boom".to_string())));

        let second = workflow.begin().unwrap();
        assert_ne!(first, second);
        assert_eq!(workflow.status(), WorkflowStatus::Submitting);
        assert!(workflow.error().is_none());
    }

    #[test]
    fn test_clear_from_any_state() {
        let reach = |steps: usize| {
            let mut workflow = Workflow::default();
            if steps == 0 {
                return workflow;
            }
            let id = workflow.begin().unwrap();
            let events = [
                SubmissionEvent::PersistingToRemoteStore,
                SubmissionEvent::Persisted(data("pending")),
                SubmissionEvent::Confirmed(data("created")),
            ];
            for event in events.iter().take(steps - 1) {
                workflow.apply(update(id, event.clone()));
            }
            workflow
        };

        for steps in 0..5 {
            let mut workflow = reach(steps);
            workflow.clear();
            assert_eq!(workflow.status(), WorkflowStatus::AwaitingInput);
            assert!(workflow.result().is_none());
        }

        let mut failed = reach(1);
        let id = failed.current_submission();
        failed.apply(update(id, SubmissionEvent::Failed("boom".to_string())));
        failed.clear();
        assert_eq!(failed.status(), WorkflowStatus::AwaitingInput);
        assert!(failed.error().is_none());
    }

    #[test]
    fn test_updates_after_clear_are_stale() {
        let mut workflow = Workflow::default();
        let id = workflow.begin().unwrap();
        workflow.apply(update(id, SubmissionEvent::PersistingToRemoteStore));
        workflow.clear();

        assert!(!workflow.apply(update(id, SubmissionEvent::Persisted(data("pending")))));
        assert_eq!(workflow.status(), WorkflowStatus::AwaitingInput);
        assert!(workflow.result().is_none());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(WorkflowStatus::PersistingToRemoteStore.to_string(), "persisting to ipfs");
        assert_eq!(WorkflowStatus::Failed.label(), "error occurred");
    }
}

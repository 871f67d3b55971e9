use crate::{AuthMode, FieldValue, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited a form field.
    FieldEdited { name: String, value: FieldValue },
    /// User picked another auth mode on the connection panel.
    AuthModeChanged(AuthMode),
    /// User clicked Execute.
    ExecuteClicked,
    /// Runner accepted the job and spawned its worker.
    JobStarted { job_id: JobId },
    /// Admission failed before any worker was spawned.
    StartRejected { reason: String, connection: bool },
    /// Lines drained from the message channel, in push order.
    MessagesDrained(Vec<String>),
    /// Display sink was asked to clear the results.
    ResultsCleared,
    /// Latest progress values read from the worker's side channel.
    ProgressObserved { percent: u8, status: String },
    /// Poller observed the worker's termination.
    JobFinished { job_id: JobId },
    /// Fallback for placeholder wiring.
    NoOp,
}

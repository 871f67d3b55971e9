#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Collect parameters and hand them to the job runner.
    StartJob,
    /// Write the current form values to the settings file.
    PersistSettings,
    /// Tell the operator why a job did not start.
    ReportError { title: String, message: String },
}

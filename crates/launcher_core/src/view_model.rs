use crate::{FieldCapability, JobId, TextField};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub title: String,
    pub fields: Vec<FieldRowView>,
    pub start_enabled: bool,
    pub job_running: bool,
    pub last_finished: Option<JobId>,
    pub results: Vec<String>,
    pub progress: u8,
    pub status: String,
    pub last_error: Option<String>,
    pub dirty: bool,
}

/// One labelled entry as shown on the form; masked values are starred out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRowView {
    pub name: String,
    pub label: String,
    pub value: String,
}

impl FieldRowView {
    pub(crate) fn new(name: String, field: &TextField) -> Self {
        Self {
            name,
            label: field.label().to_string(),
            value: field.display_text(),
        }
    }
}

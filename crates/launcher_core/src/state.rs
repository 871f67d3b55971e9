use crate::view_model::{AppViewModel, FieldRowView};
use crate::{Field, FieldCapability, FieldSet};

pub type JobId = u64;

/// Status shown while no job is running.
pub const READY_STATUS: &str = "Ready";
/// Status shown right after a job starts, until the script sets its own.
pub const RUNNING_STATUS: &str = "Running";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    title: String,
    fields: FieldSet,
    start_enabled: bool,
    current_job: Option<JobId>,
    last_finished: Option<JobId>,
    results: Vec<String>,
    progress: u8,
    status: String,
    last_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(String::new(), FieldSet::default())
    }
}

impl AppState {
    pub fn new(title: impl Into<String>, fields: FieldSet) -> Self {
        Self {
            title: title.into(),
            fields,
            start_enabled: true,
            current_job: None,
            last_finished: None,
            results: Vec::new(),
            progress: 0,
            status: READY_STATUS.to_string(),
            last_error: None,
            dirty: false,
        }
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Mutable access for the admission path, which writes normalized values back.
    pub fn fields_mut(&mut self) -> &mut FieldSet {
        self.dirty = true;
        &mut self.fields
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn current_job(&self) -> Option<JobId> {
        self.current_job
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    /// Latest rejected edit or admission failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            title: self.title.clone(),
            fields: self.field_rows(),
            start_enabled: self.start_enabled,
            job_running: self.current_job.is_some(),
            last_finished: self.last_finished,
            results: self.results.clone(),
            progress: self.progress,
            status: self.status.clone(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_admission(&mut self) {
        self.start_enabled = false;
        self.current_job = None;
        self.results.clear();
        self.last_error = None;
        self.mark_dirty();
    }

    pub(crate) fn job_started(&mut self, job_id: JobId) {
        self.current_job = Some(job_id);
        self.progress = 0;
        self.status = RUNNING_STATUS.to_string();
        self.mark_dirty();
    }

    pub(crate) fn reject_start(&mut self, reason: String) {
        self.start_enabled = true;
        self.current_job = None;
        self.last_error = Some(reason);
        self.mark_dirty();
    }

    /// Re-arms the start control; true only for the first call per job.
    pub(crate) fn finish_job(&mut self, job_id: JobId) -> bool {
        if self.start_enabled || self.current_job != Some(job_id) {
            return false;
        }
        self.start_enabled = true;
        self.current_job = None;
        self.last_finished = Some(job_id);
        self.mark_dirty();
        true
    }

    pub(crate) fn append_results(&mut self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        self.results.extend(lines);
        self.mark_dirty();
    }

    pub(crate) fn clear_results(&mut self) {
        if !self.results.is_empty() {
            self.results.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn observe_progress(&mut self, percent: u8, status: String) {
        let percent = percent.min(100);
        if self.progress != percent || self.status != status {
            self.progress = percent;
            self.status = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn record_error(&mut self, error: String) {
        self.last_error = Some(error);
        self.mark_dirty();
    }

    fn field_rows(&self) -> Vec<FieldRowView> {
        let mut rows = Vec::new();
        for entry in self.fields.iter() {
            match &entry.field {
                Field::Client(client) => {
                    rows.push(FieldRowView::new(
                        format!("{}.url", entry.name),
                        client.url(),
                    ));
                    rows.push(FieldRowView {
                        name: format!("{}.auth_mode", entry.name),
                        label: "Authentication mode:".to_string(),
                        value: client.auth_mode().label().to_string(),
                    });
                    rows.push(FieldRowView::new(
                        format!("{}.user_id", entry.name),
                        client.user_id(),
                    ));
                    rows.push(FieldRowView::new(
                        format!("{}.secret", entry.name),
                        client.secret(),
                    ));
                }
                Field::Text(text) => rows.push(FieldRowView::new(entry.name.clone(), text)),
                Field::Path(path) => rows.push(FieldRowView {
                    name: entry.name.clone(),
                    label: path.label().to_string(),
                    value: path.path().to_string(),
                }),
                Field::Choice(choice) => rows.push(FieldRowView {
                    name: entry.name.clone(),
                    label: choice.label().to_string(),
                    value: choice.selected_option().to_string(),
                }),
            }
        }
        rows
    }
}

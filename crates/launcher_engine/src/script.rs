use launcher_core::{JobId, ParameterSnapshot};

use crate::{MessageChannel, ProgressState};

/// User-supplied job body, run once per start on the worker thread.
///
/// Failures should be reported through [`JobContext::emit_message`] before
/// returning; an `Err` or a panic only ends the job.
pub trait Script: Send + Sync + 'static {
    fn run(&self, params: &ParameterSnapshot, ctx: &JobContext) -> anyhow::Result<()>;
}

impl<F> Script for F
where
    F: Fn(&ParameterSnapshot, &JobContext) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn run(&self, params: &ParameterSnapshot, ctx: &JobContext) -> anyhow::Result<()> {
        self(params, ctx)
    }
}

/// Reporting handle given to a running script.
#[derive(Debug, Clone)]
pub struct JobContext {
    job_id: JobId,
    messages: MessageChannel,
    progress: ProgressState,
}

impl JobContext {
    pub(crate) fn new(job_id: JobId, messages: MessageChannel, progress: ProgressState) -> Self {
        Self {
            job_id,
            messages,
            progress,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Queues a line for the results view.
    pub fn emit_message(&self, line: impl Into<String>) {
        self.messages.push(line);
    }

    pub fn update_progress(&self, percent: u8) {
        self.progress.set_percent(percent);
    }

    /// Progress as `done / total`, truncated to a whole percent.
    pub fn update_progress_fraction(&self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        self.progress.set_percent(percent);
    }

    pub fn set_status_message(&self, status: impl Into<String>) {
        self.progress.set_status(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_truncates_and_handles_empty_totals() {
        let ctx = JobContext::new(1, MessageChannel::new(), ProgressState::new());
        ctx.update_progress_fraction(2, 3);
        assert_eq!(ctx.progress.percent(), 66);
        ctx.update_progress_fraction(0, 0);
        assert_eq!(ctx.progress.percent(), 100);
    }
}

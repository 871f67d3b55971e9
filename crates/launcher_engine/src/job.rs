use std::any::Any;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use launcher_core::{CollectError, JobId, ParameterSnapshot};
use launcher_logging::{launcher_debug, launcher_info, launcher_warn};
use thiserror::Error;

use crate::{JobContext, MessageChannel, ProgressState, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    /// Worker termination was observed; admits a new start like `Idle`.
    Completed,
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("a job is already running")]
    AlreadyRunning,
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// One execution of the script.
#[derive(Debug)]
pub struct Job {
    id: JobId,
    state: JobState,
    parameters: Arc<ParameterSnapshot>,
    worker: Option<JoinHandle<()>>,
}

impl Job {
    fn idle() -> Self {
        Self {
            id: 0,
            state: JobState::Idle,
            parameters: Arc::new(ParameterSnapshot::new()),
            worker: None,
        }
    }

    /// Zero until the first job starts.
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn parameters(&self) -> &ParameterSnapshot {
        &self.parameters
    }
}

/// Owns the lifecycle of at most one job at a time.
///
/// All methods run on the interactive thread; only the message channel and
/// progress state are shared with the worker.
pub struct JobRunner {
    script: Arc<dyn Script>,
    messages: MessageChannel,
    progress: ProgressState,
    job: Job,
    next_id: JobId,
}

impl JobRunner {
    pub fn new<S: Script>(script: S) -> Self {
        Self {
            script: Arc::new(script),
            messages: MessageChannel::new(),
            progress: ProgressState::new(),
            job: Job::idle(),
            next_id: 1,
        }
    }

    /// Convenience for closures, which need the signature spelled out.
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(&ParameterSnapshot, &JobContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new(script)
    }

    pub fn messages(&self) -> &MessageChannel {
        &self.messages
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> JobState {
        self.job.state
    }

    /// Admits and spawns a job.
    ///
    /// `provider` runs on the caller's thread and only when no job is running;
    /// if it fails, nothing is spawned and the state is left untouched.
    pub fn start<P>(&mut self, provider: P) -> Result<JobId, StartError>
    where
        P: FnOnce() -> Result<ParameterSnapshot, CollectError>,
    {
        if self.job.state == JobState::Running {
            launcher_debug!("start ignored, job {} is still running", self.job.id);
            return Err(StartError::AlreadyRunning);
        }

        let parameters = match provider() {
            Ok(parameters) => Arc::new(parameters),
            Err(err) => {
                launcher_warn!("job admission rejected: {}", err);
                return Err(err.into());
            }
        };

        let job_id = self.next_id;
        let stale = self.messages.drain_all();
        if !stale.is_empty() {
            launcher_debug!("discarded {} undrained lines before job {}", stale.len(), job_id);
        }
        self.progress.reset_for_start();

        let context = JobContext::new(job_id, self.messages.clone(), self.progress.clone());
        let script = Arc::clone(&self.script);
        let worker_parameters = Arc::clone(&parameters);
        let worker = thread::Builder::new()
            .name(format!("launcher-job-{job_id}"))
            .spawn(move || run_worker(job_id, script.as_ref(), &worker_parameters, &context))?;

        self.next_id += 1;
        self.job = Job {
            id: job_id,
            state: JobState::Running,
            parameters,
            worker: Some(worker),
        };
        launcher_info!(
            "job {} started with {} parameters",
            job_id,
            self.job.parameters.len()
        );
        Ok(job_id)
    }

    /// True while the current job's worker thread is alive. Never blocks.
    pub fn is_running(&self) -> bool {
        self.job.state == JobState::Running
            && self
                .job
                .worker
                .as_ref()
                .is_some_and(|worker| !worker.is_finished())
    }

    /// Marks a terminated job `Completed`.
    ///
    /// Returns true only for the call that performed the transition; calls on
    /// an idle, completed or still-alive job change nothing.
    pub fn on_worker_finished(&mut self) -> bool {
        if self.job.state != JobState::Running || self.is_running() {
            return false;
        }
        if let Some(worker) = self.job.worker.take() {
            // The worker has already exited, so this join returns immediately.
            if let Err(panic) = worker.join() {
                launcher_warn!(
                    "job {} worker panicked: {}",
                    self.job.id,
                    panic_message(panic.as_ref())
                );
            }
        }
        self.job.state = JobState::Completed;
        launcher_info!("job {} completed", self.job.id);
        true
    }
}

fn run_worker(job_id: JobId, script: &dyn Script, parameters: &ParameterSnapshot, ctx: &JobContext) {
    launcher_logging::set_current_job(Some(job_id));
    launcher_debug!("worker started");
    match script.run(parameters, ctx) {
        Ok(()) => launcher_debug!("script returned"),
        // Faults end the job like a normal return; the script owns reporting.
        Err(err) => launcher_warn!("script failed: {:#}", err),
    }
    launcher_logging::set_current_job(None);
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

use std::time::{Duration, Instant};

use launcher_core::JobId;
use launcher_logging::launcher_debug;

use crate::{JobRunner, JobState, ProgressSnapshot};

/// Receives drained lines; only ever called on the interactive thread.
pub trait DisplaySink {
    fn append_message(&mut self, line: &str);
    fn clear(&mut self);
}

impl DisplaySink for Vec<String> {
    fn append_message(&mut self, line: &str) {
        self.push(line.to_string());
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

/// Cadence of the two periodic tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub message_delay: Duration,
    pub message_interval: Duration,
    pub completion_delay: Duration,
    pub completion_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            message_delay: Duration::from_millis(100),
            message_interval: Duration::from_millis(40),
            completion_delay: Duration::from_millis(500),
            completion_interval: Duration::from_millis(500),
        }
    }
}

/// One-shot timer re-armed explicitly by the task it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    due: Option<Instant>,
}

impl Ticker {
    /// A disarmed ticker.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            due: None,
        }
    }

    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// Schedules the next run one interval after `now`.
    pub fn rearm(&mut self, now: Instant) {
        self.due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Consumes the pending run if it is due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// What one [`Poller::poll`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Lines handed to the sink.
    pub delivered: usize,
    /// Progress read by the message pump, if it ran.
    pub progress: Option<ProgressSnapshot>,
    /// Set once, on the poll that observed the worker's termination.
    pub job_finished: Option<JobId>,
}

/// Drives the message pump and the completion watch on the interactive thread.
#[derive(Debug, Clone)]
pub struct Poller {
    config: PollerConfig,
    message_pump: Ticker,
    completion_watch: Ticker,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(PollerConfig::default())
    }
}

impl Poller {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            message_pump: Ticker::new(config.message_interval),
            completion_watch: Ticker::new(config.completion_interval),
        }
    }

    /// Schedules both tasks; call right after a successful start.
    pub fn arm(&mut self, now: Instant) {
        self.message_pump.arm(now, self.config.message_delay);
        self.completion_watch.arm(now, self.config.completion_delay);
    }

    /// False once both tasks have stopped rescheduling themselves.
    pub fn is_active(&self) -> bool {
        self.message_pump.is_armed() || self.completion_watch.is_armed()
    }

    /// Earliest instant at which [`Poller::poll`] has work to do.
    pub fn next_due(&self) -> Option<Instant> {
        match (self.message_pump.due(), self.completion_watch.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs whichever tasks are due at `now`. Never blocks.
    pub fn poll(
        &mut self,
        now: Instant,
        runner: &mut JobRunner,
        sink: &mut dyn DisplaySink,
    ) -> PollReport {
        let mut report = PollReport::default();
        if self.completion_watch.fire(now) {
            self.watch_completion(now, runner, &mut report);
        }
        if self.message_pump.fire(now) {
            self.pump_messages(now, runner, sink, &mut report);
        }
        report
    }

    fn pump_messages(
        &mut self,
        now: Instant,
        runner: &JobRunner,
        sink: &mut dyn DisplaySink,
        report: &mut PollReport,
    ) {
        // Drain before checking the state: once the job reads as completed,
        // every line the worker pushed is already in the queue.
        for line in runner.messages().drain_all() {
            sink.append_message(&line);
            report.delivered += 1;
        }
        report.progress = Some(runner.progress().snapshot());

        if runner.state() == JobState::Running {
            self.message_pump.rearm(now);
        } else {
            launcher_debug!("message pump stopped after job {}", runner.job().id());
        }
    }

    fn watch_completion(&mut self, now: Instant, runner: &mut JobRunner, report: &mut PollReport) {
        if runner.is_running() {
            self.completion_watch.rearm(now);
            return;
        }
        if runner.on_worker_finished() {
            report.job_finished = Some(runner.job().id());
        }
    }
}

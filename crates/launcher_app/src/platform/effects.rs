use std::path::PathBuf;
use std::time::Instant;

use launcher_core::{
    AppState, ClientFactory, CollectError, Effect, FieldSet, Msg, ParameterCollector,
    ParameterSnapshot,
};
use launcher_engine::{DisplaySink, JobRunner, Poller, StartError};
use launcher_logging::{launcher_error, launcher_info, launcher_warn};

use super::persistence::{save_settings, StoredSettings};

/// Lines and clears handed over by the engine, turned into messages.
#[derive(Debug, Default)]
pub struct ResultsInbox {
    cleared: bool,
    lines: Vec<String>,
}

impl ResultsInbox {
    pub fn into_messages(self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        if self.cleared {
            msgs.push(Msg::ResultsCleared);
        }
        if !self.lines.is_empty() {
            msgs.push(Msg::MessagesDrained(self.lines));
        }
        msgs
    }
}

impl DisplaySink for ResultsInbox {
    fn append_message(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn clear(&mut self) {
        self.cleared = true;
        self.lines.clear();
    }
}

/// Engine-side pieces an effect may touch.
pub struct EffectTargets<'a> {
    pub state: &'a mut AppState,
    pub runner: &'a mut JobRunner,
    pub poller: &'a mut Poller,
    pub inbox: &'a mut ResultsInbox,
}

pub struct EffectRunner<F> {
    collector: ParameterCollector<F>,
    settings_path: PathBuf,
}

impl<F: ClientFactory> EffectRunner<F> {
    pub fn new(collector: ParameterCollector<F>, settings_path: PathBuf) -> Self {
        Self {
            collector,
            settings_path,
        }
    }

    pub fn collect(&self, fields: &mut FieldSet) -> Result<ParameterSnapshot, CollectError> {
        self.collector.collect(fields)
    }

    /// Runs one effect; returns the messages it produced, in order.
    pub fn run(&self, effect: Effect, targets: EffectTargets<'_>) -> Vec<Msg> {
        match effect {
            Effect::StartJob => self.start_job(targets),
            Effect::PersistSettings => {
                let settings = StoredSettings::capture(targets.state.fields());
                match save_settings(&self.settings_path, &settings) {
                    Ok(()) => launcher_info!("Saved settings to {:?}", self.settings_path),
                    Err(err) => launcher_error!(
                        "Failed to save settings to {:?}: {}",
                        self.settings_path,
                        err
                    ),
                }
                Vec::new()
            }
            Effect::ReportError { title, message } => {
                launcher_warn!("{}: {}", title, message);
                eprintln!("{title}: {message}");
                Vec::new()
            }
        }
    }

    fn start_job(&self, targets: EffectTargets<'_>) -> Vec<Msg> {
        let EffectTargets {
            state,
            runner,
            poller,
            inbox,
        } = targets;
        inbox.clear();

        let collector = &self.collector;
        let fields = state.fields_mut();
        let msg = match runner.start(|| collector.collect(fields)) {
            Ok(job_id) => {
                poller.arm(Instant::now());
                Msg::JobStarted { job_id }
            }
            Err(StartError::AlreadyRunning) => {
                // The start control stays disabled until the running job ends.
                launcher_warn!("start requested while job {} is running", runner.job().id());
                return inbox_messages(inbox);
            }
            Err(StartError::Collect(err)) => Msg::StartRejected {
                reason: err.to_string(),
                connection: err.is_connection_failure(),
            },
            Err(err @ StartError::Spawn(_)) => Msg::StartRejected {
                reason: err.to_string(),
                connection: false,
            },
        };

        let mut msgs = inbox_messages(inbox);
        msgs.push(msg);
        msgs
    }
}

fn inbox_messages(inbox: &mut ResultsInbox) -> Vec<Msg> {
    std::mem::take(inbox).into_messages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_reports_clear_before_lines() {
        let mut inbox = ResultsInbox::default();
        inbox.append_message("stale");
        inbox.clear();
        inbox.append_message("fresh");
        assert_eq!(
            inbox.into_messages(),
            vec![
                Msg::ResultsCleared,
                Msg::MessagesDrained(vec!["fresh".to_string()])
            ]
        );
    }

    #[test]
    fn empty_inbox_produces_nothing() {
        assert!(ResultsInbox::default().into_messages().is_empty());
    }
}

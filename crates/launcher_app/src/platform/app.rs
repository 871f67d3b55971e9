use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use launcher_core::{
    update, AppState, ClientFactory, FieldSet, FieldValue, Msg, ParameterCollector, CLIENT_KEY,
};
use launcher_engine::{JobRunner, Poller, RestClientFactory, RestSettings};
use launcher_logging::{launcher_debug, launcher_info, launcher_warn};

use super::cli::Cli;
use super::effects::{EffectRunner, EffectTargets, ResultsInbox};
use super::ui::constants::TITLE;
use super::ui::render::TerminalRenderer;
use super::{logging, persistence};
use crate::scripts::print_projects::PrintProjects;

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);
    launcher_info!("{} starting", TITLE);

    let mut fields = FieldSet::from_specs(&PrintProjects::field_specs())?;
    for name in persistence::load_settings(&cli.settings).apply(&mut fields) {
        launcher_warn!("Ignoring stored value for unknown or invalid field {}", name);
    }

    let factory =
        RestClientFactory::new(RestSettings::default()).context("failed to start HTTP runtime")?;
    let effects = EffectRunner::new(ParameterCollector::new(factory), cli.settings.clone());
    let mut app = App::new(
        AppState::new(TITLE, fields),
        JobRunner::new(PrintProjects),
        effects,
        TerminalRenderer::new(io::stdout()),
    );

    for msg in override_messages(&cli, app.state.fields()) {
        app.dispatch(msg);
    }
    if let Some(err) = app.state.last_error() {
        bail!("invalid command line value: {err}");
    }
    app.renderer.render_form(&app.state.view())?;

    if cli.dry_run {
        return app.dry_run();
    }

    app.dispatch(Msg::ExecuteClicked);
    if let Some(err) = app.state.last_error() {
        bail!("job not started: {err}");
    }
    app.run_until_idle();
    launcher_info!("{} exiting", TITLE);
    Ok(())
}

/// Form edits requested on the command line, applied after stored settings.
fn override_messages(cli: &Cli, fields: &FieldSet) -> Vec<Msg> {
    let mut msgs = Vec::new();
    if let Some(auth) = cli.auth {
        msgs.push(Msg::AuthModeChanged(auth.into()));
    }

    if let Some(client) = fields.client_field() {
        let mut settings = client.settings();
        let mut edited = false;
        if let Some(auth) = cli.auth {
            settings.auth_mode = auth.into();
        }
        if let Some(url) = &cli.url {
            settings.url = url.clone();
            edited = true;
        }
        if let Some(user) = &cli.user {
            settings.user_id = user.clone();
            edited = true;
        }
        if let Some(secret) = &cli.secret {
            settings.secret = secret.clone();
            edited = true;
        }
        if edited {
            msgs.push(Msg::FieldEdited {
                name: CLIENT_KEY.to_string(),
                value: FieldValue::Connection(settings),
            });
        }
    }

    for (name, value) in &cli.assignments {
        msgs.push(Msg::FieldEdited {
            name: name.clone(),
            value: FieldValue::Text(value.clone()),
        });
    }
    msgs
}

struct App<F> {
    state: AppState,
    runner: JobRunner,
    poller: Poller,
    effects: EffectRunner<F>,
    renderer: TerminalRenderer<Stdout>,
}

impl<F: ClientFactory> App<F> {
    fn new(
        state: AppState,
        runner: JobRunner,
        effects: EffectRunner<F>,
        renderer: TerminalRenderer<Stdout>,
    ) -> Self {
        Self {
            state,
            runner,
            poller: Poller::default(),
            effects,
            renderer,
        }
    }

    /// Applies `msg` and every message its effects produce, in order.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.consume_dirty() {
                if let Err(err) = self.renderer.render(&self.state.view()) {
                    launcher_warn!("Failed to render: {}", err);
                }
            }

            for effect in effects {
                let mut inbox = ResultsInbox::default();
                let produced = self.effects.run(
                    effect,
                    EffectTargets {
                        state: &mut self.state,
                        runner: &mut self.runner,
                        poller: &mut self.poller,
                        inbox: &mut inbox,
                    },
                );
                queue.extend(produced);
            }
        }
    }

    /// Drives the poller until the job has finished and every line is shown.
    fn run_until_idle(&mut self) {
        while !self.state.start_enabled() || self.poller.is_active() {
            let Some(due) = self.poller.next_due() else {
                launcher_warn!("Start control disabled with nothing scheduled; giving up");
                break;
            };
            thread::sleep(due.saturating_duration_since(Instant::now()));

            let mut inbox = ResultsInbox::default();
            let report = self
                .poller
                .poll(Instant::now(), &mut self.runner, &mut inbox);
            if report.delivered > 0 {
                launcher_debug!("delivered {} lines", report.delivered);
            }

            let mut msgs = inbox.into_messages();
            if let Some(progress) = report.progress {
                msgs.push(Msg::ProgressObserved {
                    percent: progress.percent,
                    status: progress.status,
                });
            }
            if let Some(job_id) = report.job_finished {
                msgs.push(Msg::JobFinished { job_id });
            }
            for msg in msgs {
                self.dispatch(msg);
            }
        }
    }

    /// Collects and connects like a start would, then prints the parameters.
    fn dry_run(&mut self) -> anyhow::Result<()> {
        let snapshot = self
            .effects
            .collect(self.state.fields_mut())
            .context("parameters rejected")?;
        for (name, value) in snapshot.iter() {
            println!("{name}: {value}");
        }
        Ok(())
    }
}

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldEdited { name, value } => {
            if let Err(err) = state.fields_mut().set_value(&name, value) {
                state.record_error(format!("{name}: {err}"));
            }
            Vec::new()
        }
        Msg::AuthModeChanged(mode) => {
            if let Some(client) = state.fields_mut().client_field_mut() {
                client.set_auth_mode(mode);
            }
            Vec::new()
        }
        Msg::ExecuteClicked => {
            // A disabled start control means a job is being admitted or running.
            if state.start_enabled() {
                state.begin_admission();
                vec![Effect::StartJob]
            } else {
                Vec::new()
            }
        }
        Msg::JobStarted { job_id } => {
            state.job_started(job_id);
            vec![Effect::PersistSettings]
        }
        Msg::StartRejected { reason, connection } => {
            state.reject_start(reason.clone());
            let title = if connection {
                "Unable to connect"
            } else {
                "Invalid parameters"
            };
            vec![Effect::ReportError {
                title: title.to_string(),
                message: reason,
            }]
        }
        Msg::MessagesDrained(lines) => {
            state.append_results(lines);
            Vec::new()
        }
        Msg::ResultsCleared => {
            state.clear_results();
            Vec::new()
        }
        Msg::ProgressObserved { percent, status } => {
            state.observe_progress(percent, status);
            Vec::new()
        }
        Msg::JobFinished { job_id } => {
            state.finish_job(job_id);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

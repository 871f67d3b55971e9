use std::io::{self, Write};

use chrono::Local;
use launcher_core::{AppViewModel, JobId};

use super::constants::{CLIENT_PANEL_LABEL, PROGRESS_BAR_WIDTH, RESULTS_LABEL};

/// Writes view model changes to a terminal.
///
/// Only what changed since the previous render is written: new results
/// lines, a changed status line, and the finish of a job.
pub struct TerminalRenderer<W: Write> {
    out: W,
    printed: usize,
    status: Option<(u8, String)>,
    last_finished: Option<JobId>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            status: None,
            last_finished: None,
        }
    }

    /// Prints the title and every form row.
    pub fn render_form(&mut self, view: &AppViewModel) -> io::Result<()> {
        writeln!(self.out, "{}", view.title)?;
        for line in form_lines(view) {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{RESULTS_LABEL}:")?;
        self.out.flush()
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.results.len() < self.printed {
            self.printed = 0;
        }
        for line in &view.results[self.printed..] {
            writeln!(self.out, "{line}")?;
        }
        self.printed = view.results.len();

        let status = (view.progress, view.status.clone());
        if self.status.as_ref() != Some(&status) {
            writeln!(self.out, "{}", status_line(status.0, &status.1))?;
            self.status = Some(status);
        }

        if view.last_finished != self.last_finished {
            if let Some(job_id) = view.last_finished {
                writeln!(
                    self.out,
                    "Job {} finished at {}",
                    job_id,
                    Local::now().format("%H:%M:%S")
                )?;
            }
            self.last_finished = view.last_finished;
        }
        self.out.flush()
    }
}

pub fn status_line(percent: u8, status: &str) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled),
        percent,
        status
    )
}

fn form_lines(view: &AppViewModel) -> Vec<String> {
    let width = view
        .fields
        .iter()
        .map(|row| row.label.len())
        .max()
        .unwrap_or(0);
    let mut lines = Vec::with_capacity(view.fields.len() + 1);
    let mut in_client = false;
    for row in &view.fields {
        let nested = row.name.contains('.');
        if nested && !in_client {
            lines.push(format!("{CLIENT_PANEL_LABEL}:"));
        }
        in_client = nested;
        let indent = if nested { "  " } else { "" };
        lines.push(format!("{indent}{:<width$} {}", row.label, row.value));
    }
    lines
}

//! Lists every project visible to the connected account.

use anyhow::Context;
use launcher_core::{
    FieldKind, FieldSpec, ParameterSnapshot, RemoteClient, CLIENT_KEY, READY_STATUS,
};
use launcher_engine::{JobContext, Script};
use serde_json::Value;

const PROJECTS_RESOURCE: &str = "projects";

pub struct PrintProjects;

impl PrintProjects {
    /// Form declaration: the connection panel followed by the script's own fields.
    pub fn field_specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(CLIENT_KEY, "Client Settings", FieldKind::Client),
            FieldSpec::new("project_id", "Project ID", FieldKind::Text),
            FieldSpec::new("mapping_version", "Mapping Version", FieldKind::Choice)
                .with_options(["A", "B", "C", "D"]),
            FieldSpec::new("item_type", "Item Type", FieldKind::Choice)
                .with_options(["Component", "Folder", "Text", "Item"]),
            FieldSpec::new("input_file", "Input File", FieldKind::FilePath),
            FieldSpec::new("output_location", "Output Location", FieldKind::DirectoryPath),
        ]
    }
}

impl Script for PrintProjects {
    fn run(&self, params: &ParameterSnapshot, ctx: &JobContext) -> anyhow::Result<()> {
        ctx.emit_message("Input Parameters:");
        for spec in Self::field_specs() {
            match params.get(&spec.name) {
                Some(value) => ctx.emit_message(format!("{}: {}", spec.name, value)),
                None => ctx.emit_message(format!("Unable to locate argument {}.", spec.name)),
            }
        }

        let Some(client) = params.client(CLIENT_KEY) else {
            ctx.emit_message("No client available, nothing to list.");
            return Ok(());
        };
        print_projects(client.as_ref(), ctx)
    }
}

fn print_projects(client: &dyn RemoteClient, ctx: &JobContext) -> anyhow::Result<()> {
    let projects = match client.get_all(PROJECTS_RESOURCE) {
        Ok(projects) => projects,
        Err(err) => {
            ctx.emit_message(format!("Failed to fetch projects: {err}"));
            ctx.set_status_message(READY_STATUS);
            return Err(err).context("fetching projects");
        }
    };

    let total = projects.len();
    for (index, project) in projects.iter().enumerate() {
        ctx.set_status_message(format!("Running: {index}/{total}"));
        ctx.update_progress_fraction(index, total);

        let name = project
            .pointer("/fields/name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>");
        ctx.emit_message(format!("\n---------------{name}---------------"));
        if let Value::Object(entries) = project {
            for (field_name, field_data) in entries {
                match field_data {
                    Value::Object(nested) => {
                        ctx.emit_message(format!("{field_name}:"));
                        for (key, value) in nested {
                            ctx.emit_message(format!("\t{key}: {}", plain(value)));
                        }
                    }
                    other => ctx.emit_message(format!("{field_name}: {}", plain(other))),
                }
            }
        }
        ctx.emit_message("");
    }

    ctx.update_progress(100);
    ctx.set_status_message(READY_STATUS);
    Ok(())
}

/// Strings without their JSON quotes.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

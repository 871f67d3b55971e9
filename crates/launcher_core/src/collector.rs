use crate::{
    validate_endpoint, ClientFactory, ClientField, ClientHandle, CollectError, ConnectionSettings,
    Field, FieldSet, ParamValue, ParameterSnapshot,
};

/// Builds a [`ParameterSnapshot`] from a form and connects its client fields.
#[derive(Debug, Clone)]
pub struct ParameterCollector<F> {
    factory: F,
}

impl<F: ClientFactory> ParameterCollector<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Validates every field, then connects every client field.
    ///
    /// Normalized endpoints are written back into the form even when a later
    /// step fails. No connection is attempted unless all fields validate.
    pub fn collect(&self, fields: &mut FieldSet) -> Result<ParameterSnapshot, CollectError> {
        let mut pending = Vec::with_capacity(fields.len());
        for entry in fields.iter_mut() {
            let slot = match &mut entry.field {
                Field::Client(client) => Pending::Connect(prepare_connection(&entry.name, client)?),
                Field::Text(field) => Pending::Ready(ParamValue::Text(checked_text(
                    &entry.name,
                    entry.required,
                    field.text(),
                )?)),
                Field::Path(field) => Pending::Ready(ParamValue::Text(checked_text(
                    &entry.name,
                    entry.required,
                    field.path(),
                )?)),
                Field::Choice(field) => Pending::Ready(ParamValue::Choice {
                    index: field.selected(),
                    option: field.selected_option().to_string(),
                }),
            };
            pending.push((entry.name.clone(), slot));
        }

        let mut snapshot = ParameterSnapshot::new();
        for (name, slot) in pending {
            let value = match slot {
                Pending::Ready(value) => value,
                Pending::Connect(settings) => ParamValue::Client(self.connect(&settings)?),
            };
            snapshot.insert(name, value);
        }
        Ok(snapshot)
    }

    fn connect(&self, settings: &ConnectionSettings) -> Result<ClientHandle, CollectError> {
        let client = self.factory.connect(settings)?;
        client.available_endpoints()?;
        Ok(client)
    }
}

enum Pending {
    Ready(ParamValue),
    Connect(ConnectionSettings),
}

fn checked_text(name: &str, required: bool, text: &str) -> Result<String, CollectError> {
    let trimmed = text.trim();
    if required && trimmed.is_empty() {
        return Err(CollectError::validation(name, "a value is required"));
    }
    Ok(trimmed.to_string())
}

fn prepare_connection(
    name: &str,
    client: &mut ClientField,
) -> Result<ConnectionSettings, CollectError> {
    let url = validate_endpoint(&format!("{name}.url"), client.url().text())?;
    client.set_url(url);

    let mut settings = client.settings();
    settings.user_id = settings.user_id.trim().to_string();
    settings.secret = settings.secret.trim().to_string();
    if settings.user_id.is_empty() {
        let label = settings.auth_mode.credential_labels().user_id;
        return Err(CollectError::validation(
            &format!("{name}.user_id"),
            format!("{} is required", label.trim_end_matches(':')),
        ));
    }
    Ok(settings)
}

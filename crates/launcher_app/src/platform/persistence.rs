use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use launcher_core::{AuthMode, FieldSet};
use launcher_engine::{AtomicFileWriter, PersistError};
use launcher_logging::{launcher_info, launcher_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoredConnection {
    pub url: String,
    pub auth_mode: AuthMode,
    pub user_id: String,
}

/// Contents of the settings file. The connection secret is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StoredSettings {
    pub connection: StoredConnection,
    pub fields: BTreeMap<String, String>,
}

impl StoredSettings {
    pub(crate) fn capture(fields: &FieldSet) -> Self {
        let connection = fields
            .client_field()
            .map(|client| {
                let settings = client.settings();
                StoredConnection {
                    url: settings.url,
                    auth_mode: settings.auth_mode,
                    user_id: settings.user_id,
                }
            })
            .unwrap_or_default();
        Self {
            connection,
            fields: fields.stored_values(),
        }
    }

    /// Writes the stored values into `fields`; returns names it could not apply.
    pub(crate) fn apply(&self, fields: &mut FieldSet) -> Vec<String> {
        if let Some(client) = fields.client_field_mut() {
            client.set_url(self.connection.url.clone());
            client.set_user_id(self.connection.user_id.clone());
            client.set_auth_mode(self.connection.auth_mode);
        }
        fields.restore(&self.fields)
    }
}

/// Missing, unreadable or malformed files all yield the defaults.
pub(crate) fn load_settings(path: &Path) -> StoredSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return StoredSettings::default();
        }
        Err(err) => {
            launcher_warn!("Failed to read settings from {:?}: {}", path, err);
            return StoredSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            launcher_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            launcher_warn!("Failed to parse settings from {:?}: {}", path, err);
            StoredSettings::default()
        }
    }
}

pub(crate) fn save_settings(path: &Path, settings: &StoredSettings) -> Result<(), PersistError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty)
        .map_err(|err| PersistError::Io(std::io::Error::other(err)))?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("launcher_settings.ron");
    AtomicFileWriter::for_file(path).write(filename, &content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_core::{FieldKind, FieldSpec, FieldValue};

    fn form() -> FieldSet {
        FieldSet::from_specs(&[
            FieldSpec::new("client", "Client Settings", FieldKind::Client),
            FieldSpec::new("project_id", "Project ID", FieldKind::Text),
            FieldSpec::new("mapping_version", "Mapping Version", FieldKind::Choice)
                .with_options(["A", "B", "C", "D"]),
            FieldSpec::new("token", "Token", FieldKind::MaskedText),
        ])
        .unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.ron"));
        assert_eq!(settings, StoredSettings::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(&path, "(connection: [").unwrap();
        assert_eq!(load_settings(&path), StoredSettings::default());
    }

    #[test]
    fn saved_form_restores_without_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ron");

        let mut fields = form();
        let client = fields.client_field_mut().unwrap();
        client.set_url("https://example.com");
        client.set_user_id("alice");
        client.set_secret("hunter2");
        client.set_auth_mode(AuthMode::OAuth);
        fields
            .set_value("project_id", FieldValue::Text("42".into()))
            .unwrap();
        fields
            .set_value("mapping_version", FieldValue::Choice(2))
            .unwrap();
        fields
            .set_value("token", FieldValue::Text("masked".into()))
            .unwrap();

        save_settings(&path, &StoredSettings::capture(&fields)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hunter2"));
        assert!(!content.contains("masked"));

        let mut restored = form();
        let rejected = load_settings(&path).apply(&mut restored);
        assert!(rejected.is_empty());

        let client = restored.client_field().unwrap();
        assert_eq!(client.url().text(), "https://example.com");
        assert_eq!(client.user_id().text(), "alice");
        assert_eq!(client.secret().text(), "");
        assert_eq!(client.auth_mode(), AuthMode::OAuth);
        assert_eq!(restored.stored_values(), fields.stored_values());
    }

    #[test]
    fn unknown_stored_fields_are_reported() {
        let mut settings = StoredSettings::default();
        settings
            .fields
            .insert("retired".to_string(), "x".to_string());
        let mut fields = form();
        assert_eq!(settings.apply(&mut fields), vec!["retired".to_string()]);
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AuthMode, ConnectionSettings, FieldError};

/// Declared widget type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    /// Single-line text displayed as `*`.
    MaskedText,
    /// Single choice among `options`.
    Choice,
    FilePath,
    DirectoryPath,
    /// Connection panel producing a connected client.
    Client,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::MaskedText => "masked text",
            FieldKind::Choice => "choice",
            FieldKind::FilePath => "file path",
            FieldKind::DirectoryPath => "directory path",
            FieldKind::Client => "client",
        }
    }
}

/// One entry of a form declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub options: Vec<String>,
    /// Text and path values must be non-empty when collected.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            options: Vec::new(),
            required: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Value held by a field capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice(usize),
    Connection(ConnectionSettings),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Choice(_) => "choice",
            FieldValue::Connection(_) => "connection",
        }
    }
}

/// What the collector needs from a widget: read and write its value.
pub trait FieldCapability {
    fn label(&self) -> &str;
    fn get_value(&self) -> FieldValue;
    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct TextField {
    label: String,
    value: String,
    masked: bool,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            masked: false,
        }
    }

    pub fn masked(label: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    pub fn text(&self) -> &str {
        &self.value
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Text as it should be shown on screen.
    pub fn display_text(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

impl fmt::Debug for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextField")
            .field("label", &self.label)
            .field("value", &self.display_text())
            .field("masked", &self.masked)
            .finish()
    }
}

impl FieldCapability for TextField {
    fn label(&self) -> &str {
        &self.label
    }

    fn get_value(&self) -> FieldValue {
        FieldValue::Text(self.value.clone())
    }

    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        match value {
            FieldValue::Text(text) => {
                self.value = text;
                Ok(())
            }
            other => Err(FieldError::KindMismatch {
                expected: "text",
                found: other.kind_name(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceField {
    label: String,
    options: Vec<String>,
    selected: usize,
}

impl ChoiceField {
    pub fn new<I, S>(label: impl Into<String>, options: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(FieldError::NoOptions);
        }
        Ok(Self {
            label: label.into(),
            options,
            selected: 0,
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> &str {
        &self.options[self.selected]
    }

    pub fn select_option(&mut self, option: &str) -> Result<(), FieldError> {
        let index = self
            .options
            .iter()
            .position(|candidate| candidate == option)
            .ok_or_else(|| FieldError::UnknownOption(option.to_string()))?;
        self.selected = index;
        Ok(())
    }
}

impl FieldCapability for ChoiceField {
    fn label(&self) -> &str {
        &self.label
    }

    fn get_value(&self) -> FieldValue {
        FieldValue::Choice(self.selected)
    }

    /// Accepts an index, or option text as restored from persisted settings.
    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        match value {
            FieldValue::Choice(index) if index < self.options.len() => {
                self.selected = index;
                Ok(())
            }
            FieldValue::Choice(index) => Err(FieldError::ChoiceOutOfRange {
                index,
                len: self.options.len(),
            }),
            FieldValue::Text(option) => self.select_option(&option),
            other => Err(FieldError::KindMismatch {
                expected: "choice",
                found: other.kind_name(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathField {
    inner: TextField,
    mode: PathMode,
}

impl PathField {
    pub fn new(label: impl Into<String>, mode: PathMode) -> Self {
        Self {
            inner: TextField::new(label),
            mode,
        }
    }

    pub fn mode(&self) -> PathMode {
        self.mode
    }

    pub fn path(&self) -> &str {
        self.inner.text()
    }
}

impl FieldCapability for PathField {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn get_value(&self) -> FieldValue {
        self.inner.get_value()
    }

    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        self.inner.set_value(value)
    }
}

/// Connection panel: endpoint, auth mode selector and the credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientField {
    label: String,
    url: TextField,
    auth_mode: AuthMode,
    user_id: TextField,
    secret: TextField,
}

impl ClientField {
    pub fn new(label: impl Into<String>) -> Self {
        let labels = AuthMode::Basic.credential_labels();
        Self {
            label: label.into(),
            url: TextField::new("Connect URL:"),
            auth_mode: AuthMode::Basic,
            user_id: TextField::new(labels.user_id),
            secret: TextField::masked(labels.secret),
        }
    }

    pub fn url(&self) -> &TextField {
        &self.url
    }

    pub fn user_id(&self) -> &TextField {
        &self.user_id
    }

    pub fn secret(&self) -> &TextField {
        &self.secret
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Switches the auth mode and relabels the credential entries.
    pub fn set_auth_mode(&mut self, mode: AuthMode) {
        self.auth_mode = mode;
        let labels = mode.credential_labels();
        self.user_id.set_label(labels.user_id);
        self.secret.set_label(labels.secret);
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url.set_text(url);
    }

    pub fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id.set_text(user_id);
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret.set_text(secret);
    }

    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            url: self.url.text().to_string(),
            auth_mode: self.auth_mode,
            user_id: self.user_id.text().to_string(),
            secret: self.secret.text().to_string(),
        }
    }
}

impl FieldCapability for ClientField {
    fn label(&self) -> &str {
        &self.label
    }

    fn get_value(&self) -> FieldValue {
        FieldValue::Connection(self.settings())
    }

    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        match value {
            FieldValue::Connection(settings) => {
                self.url.set_text(settings.url);
                self.user_id.set_text(settings.user_id);
                self.secret.set_text(settings.secret);
                self.set_auth_mode(settings.auth_mode);
                Ok(())
            }
            other => Err(FieldError::KindMismatch {
                expected: "connection",
                found: other.kind_name(),
            }),
        }
    }
}

/// Tagged field variant sharing the [`FieldCapability`] interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(TextField),
    Choice(ChoiceField),
    Path(PathField),
    Client(ClientField),
}

impl Field {
    pub fn from_spec(spec: &FieldSpec) -> Result<Self, FieldError> {
        let label = spec.label.clone();
        Ok(match spec.kind {
            FieldKind::Text => Field::Text(TextField::new(label)),
            FieldKind::MaskedText => Field::Text(TextField::masked(label)),
            FieldKind::Choice => Field::Choice(ChoiceField::new(label, spec.options.clone())?),
            FieldKind::FilePath => Field::Path(PathField::new(label, PathMode::File)),
            FieldKind::DirectoryPath => Field::Path(PathField::new(label, PathMode::Directory)),
            FieldKind::Client => Field::Client(ClientField::new(label)),
        })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Text(field) if field.is_masked() => FieldKind::MaskedText,
            Field::Text(_) => FieldKind::Text,
            Field::Choice(_) => FieldKind::Choice,
            Field::Path(field) => match field.mode() {
                PathMode::File => FieldKind::FilePath,
                PathMode::Directory => FieldKind::DirectoryPath,
            },
            Field::Client(_) => FieldKind::Client,
        }
    }

    fn capability(&self) -> &dyn FieldCapability {
        match self {
            Field::Text(field) => field,
            Field::Choice(field) => field,
            Field::Path(field) => field,
            Field::Client(field) => field,
        }
    }

    fn capability_mut(&mut self) -> &mut dyn FieldCapability {
        match self {
            Field::Text(field) => field,
            Field::Choice(field) => field,
            Field::Path(field) => field,
            Field::Client(field) => field,
        }
    }

    /// Value in the form used by persisted settings; `None` for client fields.
    fn stored_value(&self) -> Option<String> {
        match self {
            Field::Text(field) if field.is_masked() => None,
            Field::Text(field) => Some(field.text().to_string()),
            Field::Path(field) => Some(field.path().to_string()),
            Field::Choice(field) => Some(field.selected_option().to_string()),
            Field::Client(_) => None,
        }
    }
}

impl FieldCapability for Field {
    fn label(&self) -> &str {
        self.capability().label()
    }

    fn get_value(&self) -> FieldValue {
        self.capability().get_value()
    }

    fn set_value(&mut self, value: FieldValue) -> Result<(), FieldError> {
        self.capability_mut().set_value(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub required: bool,
    pub field: Field,
}

/// Declared fields of a form in declaration order; names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet {
    entries: Vec<FieldEntry>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[FieldSpec]) -> Result<Self, FieldError> {
        let mut set = Self::new();
        for spec in specs {
            set.declare(spec)?;
        }
        Ok(set)
    }

    pub fn declare(&mut self, spec: &FieldSpec) -> Result<(), FieldError> {
        if self.get(&spec.name).is_some() {
            return Err(FieldError::DuplicateName(spec.name.clone()));
        }
        self.entries.push(FieldEntry {
            name: spec.name.clone(),
            required: spec.required,
            field: Field::from_spec(spec)?,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldEntry> {
        self.entries.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.field)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| &mut entry.field)
    }

    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<(), FieldError> {
        self.get_mut(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?
            .set_value(value)
    }

    /// First declared connection panel, if any.
    pub fn client_field(&self) -> Option<&ClientField> {
        self.entries.iter().find_map(|entry| match &entry.field {
            Field::Client(client) => Some(client),
            _ => None,
        })
    }

    pub fn client_field_mut(&mut self) -> Option<&mut ClientField> {
        self.entries.iter_mut().find_map(|entry| match &mut entry.field {
            Field::Client(client) => Some(client),
            _ => None,
        })
    }

    /// Custom field values keyed by name, for the settings file.
    ///
    /// Client and masked fields are not included.
    pub fn stored_values(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.name.clone(), entry.field.stored_value()?)))
            .collect()
    }

    /// Applies stored values; returns the names that could not be restored.
    pub fn restore(&mut self, values: &BTreeMap<String, String>) -> Vec<String> {
        let mut rejected = Vec::new();
        for (name, value) in values {
            let restored = match self.get_mut(name) {
                Some(Field::Client(_)) | None => false,
                Some(field) => field.set_value(FieldValue::Text(value.clone())).is_ok(),
            };
            if !restored {
                rejected.push(name.clone());
            }
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_text_is_hidden_in_debug_output() {
        let mut field = TextField::masked("Password:");
        field.set_text("secret");
        assert_eq!(field.display_text(), "******");
        assert!(!format!("{field:?}").contains("secret"));
    }

    #[test]
    fn declared_kind_survives_construction() {
        let kinds = [
            FieldKind::Text,
            FieldKind::MaskedText,
            FieldKind::FilePath,
            FieldKind::DirectoryPath,
            FieldKind::Client,
        ];
        for kind in kinds {
            let field = Field::from_spec(&FieldSpec::new("f", "F:", kind)).unwrap();
            assert_eq!(field.kind(), kind);
        }
        let choice = FieldSpec::new("c", "C:", FieldKind::Choice).with_options(["x"]);
        assert_eq!(Field::from_spec(&choice).unwrap().kind(), FieldKind::Choice);
    }
}

use std::fmt;

use crate::ClientHandle;

/// Conventional name of the connected-client entry.
pub const CLIENT_KEY: &str = "client";

/// Value captured for one field when a job starts.
#[derive(Clone)]
pub enum ParamValue {
    Text(String),
    Choice { index: usize, option: String },
    /// Opaque connected client, forwarded to the script untouched.
    Client(ClientHandle),
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ParamValue::Choice { index, option } => f
                .debug_struct("Choice")
                .field("index", index)
                .field("option", option)
                .finish(),
            ParamValue::Client(client) => f.debug_tuple("Client").field(&client.base_url()).finish(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Choice { option, .. } => f.write_str(option),
            ParamValue::Client(client) => write!(f, "client for {}", client.base_url()),
        }
    }
}

/// Named parameters of one job, in field declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParameterSnapshot {
    values: Vec<(String, ParamValue)>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the value stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn choice(&self, name: &str) -> Option<(usize, &str)> {
        match self.get(name)? {
            ParamValue::Choice { index, option } => Some((*index, option)),
            _ => None,
        }
    }

    pub fn client(&self, name: &str) -> Option<&ClientHandle> {
        match self.get(name)? {
            ParamValue::Client(client) => Some(client),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let snapshot = ParameterSnapshot::new()
            .with("a", ParamValue::Text("1".into()))
            .with("b", ParamValue::Text("2".into()))
            .with("a", ParamValue::Text("3".into()));

        let names: Vec<_> = snapshot.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(snapshot.text("a"), Some("3"));
        assert_eq!(snapshot.choice("a"), None);
    }
}

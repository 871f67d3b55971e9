use thiserror::Error;

/// Rejected field declaration or value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("expected a {expected} value, got {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("choice index {index} is out of range ({len} options)")]
    ChoiceOutOfRange { index: usize, len: usize },
    #[error("`{0}` is not one of the available options")]
    UnknownOption(String),
    #[error("a choice field needs at least one option")]
    NoOptions,
    #[error("field name `{0}` is declared twice")]
    DuplicateName(String),
    #[error("no field named `{0}`")]
    UnknownField(String),
}

/// Failure reported by the remote client collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server rejected the credentials (status {0})")]
    Unauthorized(u16),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors raised while building a parameter snapshot, before any worker exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("invalid value for `{field}`: {reason}")]
    ParameterValidation { field: String, reason: String },
    #[error("unable to connect, please check the client settings: {0}")]
    ConnectionValidation(#[from] ClientError),
}

impl CollectError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ParameterValidation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, CollectError::ConnectionValidation(_))
    }
}

//! Launcher core: form model, parameter collection and the pure state machine
//! driving the interactive surface.
mod auth;
mod client;
mod collector;
mod effect;
mod endpoint;
mod error;
mod fields;
mod msg;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use auth::{AuthMode, CredentialLabels};
pub use client::{ClientFactory, ClientHandle, ConnectionSettings, Credentials, RemoteClient};
pub use collector::ParameterCollector;
pub use effect::Effect;
pub use endpoint::{normalize_endpoint, validate_endpoint, DEFAULT_SCHEME};
pub use error::{ClientError, CollectError, FieldError};
pub use fields::{
    ChoiceField, ClientField, Field, FieldCapability, FieldEntry, FieldKind, FieldSet, FieldSpec,
    FieldValue, PathField, PathMode, TextField,
};
pub use msg::Msg;
pub use snapshot::{ParamValue, ParameterSnapshot, CLIENT_KEY};
pub use state::{AppState, JobId, READY_STATUS, RUNNING_STATUS};
pub use update::update;
pub use view_model::{AppViewModel, FieldRowView};

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::{AuthMode, ClientError};

/// Connected, authenticated handle on the remote API.
///
/// The engine never looks inside; it forwards the handle to the script.
pub trait RemoteClient: Send + Sync + fmt::Debug {
    /// Normalized base address the client talks to.
    fn base_url(&self) -> &str;

    /// Lightweight capability-discovery call used to verify a connection.
    fn available_endpoints(&self) -> Result<Vec<String>, ClientError>;

    /// Fetches every item of a paged collection resource, e.g. `projects`.
    fn get_all(&self, resource: &str) -> Result<Vec<Value>, ClientError>;
}

pub type ClientHandle = Arc<dyn RemoteClient>;

/// Builds connected clients from the connection panel's settings.
pub trait ClientFactory {
    fn connect(&self, settings: &ConnectionSettings) -> Result<ClientHandle, ClientError>;
}

/// Values of the connection panel.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionSettings {
    pub url: String,
    pub auth_mode: AuthMode,
    pub user_id: String,
    pub secret: String,
}

/// Credential pair interpreted according to the auth mode.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    OAuth { client_id: String, client_secret: String },
}

impl ConnectionSettings {
    pub fn credentials(&self) -> Credentials {
        match self.auth_mode {
            AuthMode::Basic => Credentials::Basic {
                username: self.user_id.clone(),
                password: self.secret.clone(),
            },
            AuthMode::OAuth => Credentials::OAuth {
                client_id: self.user_id.clone(),
                client_secret: self.secret.clone(),
            },
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("auth_mode", &self.auth_mode)
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Credentials::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

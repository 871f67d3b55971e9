use serde::{Deserialize, Serialize};

/// How the credential pair of a connection is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AuthMode {
    /// Username and password sent as basic credentials.
    #[default]
    Basic,
    /// Client id and secret exchanged for a bearer token.
    OAuth,
}

/// Display labels of the two credential entries for an auth mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialLabels {
    pub user_id: &'static str,
    pub secret: &'static str,
}

impl AuthMode {
    pub const ALL: [AuthMode; 2] = [AuthMode::Basic, AuthMode::OAuth];

    /// Position of the mode in the selector.
    pub fn index(self) -> usize {
        match self {
            AuthMode::Basic => 0,
            AuthMode::OAuth => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthMode::Basic => "Basic",
            AuthMode::OAuth => "OAuth",
        }
    }

    pub fn credential_labels(self) -> CredentialLabels {
        match self {
            AuthMode::Basic => CredentialLabels {
                user_id: "Username:",
                secret: "Password:",
            },
            AuthMode::OAuth => CredentialLabels {
                user_id: "Client ID:",
                secret: "Client Secret:",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_selector_position() {
        for mode in AuthMode::ALL {
            assert_eq!(AuthMode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(AuthMode::from_index(2), None);
    }
}

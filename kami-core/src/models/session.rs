use serde::{Deserialize, Serialize};

/// The persisted login state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// Phone number or email used to log in.
    #[serde(alias = "phone", alias = "email")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, alias = "isLoggedIn")]
    pub logged_in: bool,
}

impl SessionData {
    pub fn new(identity: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            token: Some(token.into()),
            logged_in: true,
        }
    }

    /// Token to send with gated requests, if this session may make them.
    pub fn bearer(&self) -> Option<&str> {
        if self.logged_in {
            self.token.as_deref().filter(|t| !t.is_empty())
        } else {
            None
        }
    }
}

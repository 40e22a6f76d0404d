//! Transaction data structure

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// State of one authorization flow, written before the redirect and read
/// back when the identity provider returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: String,
    pub code_verifier: String,
    pub scope: String,
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Opaque caller state echoed back after the redirect
    #[serde(
        rename = "appState",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub app_state: Option<Value>,
    /// CSRF correlation value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A present key is `Some`, even when its value is `null`
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Transaction {
    pub fn new(
        nonce: impl Into<String>,
        code_verifier: impl Into<String>,
        scope: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            nonce: nonce.into(),
            code_verifier: code_verifier.into(),
            scope: scope.into(),
            audience: audience.into(),
            ..Default::default()
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_app_state(mut self, app_state: Value) -> Self {
        self.app_state = Some(app_state);
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

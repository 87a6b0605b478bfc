//! Tagging configuration and credential access.
//!
//! # Responsibility
//! - Define the settings contract consumed by the tag facade.
//! - Provide a serde-backed settings value with the application defaults.
//!
//! # Invariants
//! - A credential is valid only when it is non-blank after trimming.
//! - AI tagging is configured only when AI mode is on and the credential is valid.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_AUTO_TAG_LIMIT: usize = 3;
pub const DEFAULT_MODEL_KEY: &str = "gpt-4o-mini";
/// Model selector that asks the provider for its model list.
pub const AUTO_MODEL_KEY: &str = "auto";

/// Settings contract read by the facade on the owning context.
pub trait TagSettings {
    fn is_ai_mode_enabled(&self) -> bool;
    fn auto_tag_limit(&self) -> usize;
    fn is_ai_confirmation_enabled(&self) -> bool;
    fn selected_model_key(&self) -> String;
    fn credential(&self) -> Option<String>;
    /// Stores the credential; a blank value clears it.
    fn set_credential(&mut self, credential: &str);

    fn has_valid_credential(&self) -> bool {
        self.credential()
            .is_some_and(|credential| !credential.trim().is_empty())
    }

    fn is_ai_configured(&self) -> bool {
        self.is_ai_mode_enabled() && self.has_valid_credential()
    }
}

/// Settings parse failure.
#[derive(Debug)]
pub struct SettingsError(serde_json::Error);

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid tagging settings: {}", self.0)
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Plain settings value; hosts mirror their preference screen into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingSettings {
    pub ai_mode: bool,
    pub auto_tag_limit: usize,
    pub ai_confirmation: bool,
    pub model_key: String,
    pub credential: Option<String>,
}

impl Default for TaggingSettings {
    fn default() -> Self {
        Self {
            ai_mode: false,
            auto_tag_limit: DEFAULT_AUTO_TAG_LIMIT,
            ai_confirmation: false,
            model_key: DEFAULT_MODEL_KEY.to_string(),
            credential: None,
        }
    }
}

impl TaggingSettings {
    /// Parses settings JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError)
    }
}

impl TagSettings for TaggingSettings {
    fn is_ai_mode_enabled(&self) -> bool {
        self.ai_mode
    }

    fn auto_tag_limit(&self) -> usize {
        self.auto_tag_limit
    }

    fn is_ai_confirmation_enabled(&self) -> bool {
        self.ai_confirmation
    }

    fn selected_model_key(&self) -> String {
        let key = self.model_key.trim();
        if key.is_empty() {
            DEFAULT_MODEL_KEY.to_string()
        } else {
            key.to_string()
        }
    }

    fn credential(&self) -> Option<String> {
        self.credential.clone()
    }

    fn set_credential(&mut self, credential: &str) {
        let trimmed = credential.trim();
        self.credential = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{TagSettings, TaggingSettings, DEFAULT_AUTO_TAG_LIMIT, DEFAULT_MODEL_KEY};

    #[test]
    fn missing_fields_use_defaults() {
        let settings = TaggingSettings::from_json_str(r#"{"ai_mode": true}"#).unwrap();
        assert!(settings.is_ai_mode_enabled());
        assert_eq!(settings.auto_tag_limit(), DEFAULT_AUTO_TAG_LIMIT);
        assert_eq!(settings.selected_model_key(), DEFAULT_MODEL_KEY);
        assert!(!settings.is_ai_configured());
    }

    #[test]
    fn blank_credential_is_not_valid() {
        let mut settings = TaggingSettings {
            ai_mode: true,
            ..TaggingSettings::default()
        };
        settings.set_credential("   ");
        assert!(!settings.has_valid_credential());
        settings.set_credential(" sk-test ");
        assert_eq!(settings.credential().as_deref(), Some("sk-test"));
        assert!(settings.is_ai_configured());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(TaggingSettings::from_json_str("{").is_err());
    }
}

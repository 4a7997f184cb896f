//! User-adjustable request settings and display theme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EclipseError, Result};

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 8000;

/// Completion models the front end offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelId {
    #[default]
    #[serde(rename = "claude-3-sonnet-20240229")]
    Claude3Sonnet,
    #[serde(rename = "claude-3-haiku-20240307")]
    Claude3Haiku,
    #[serde(rename = "claude-2.1")]
    Claude21,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [
        ModelId::Claude3Sonnet,
        ModelId::Claude3Haiku,
        ModelId::Claude21,
    ];

    /// Identifier sent to the completion endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Claude3Sonnet => "claude-3-sonnet-20240229",
            ModelId::Claude3Haiku => "claude-3-haiku-20240307",
            ModelId::Claude21 => "claude-2.1",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Claude3Sonnet => "Claude 3 Sonnet",
            ModelId::Claude3Haiku => "Claude 3 Haiku",
            ModelId::Claude21 => "Claude 2.1",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = EclipseError;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| EclipseError::validation(format!("Unsupported model: '{s}'")))
    }
}

/// Global request settings. Changes only affect future requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: ModelId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4000,
            model: ModelId::default(),
        }
    }
}

impl Settings {
    /// Checks the numeric ranges the endpoint accepts from this front end.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(EclipseError::validation(format!(
                "temperature must be within [{MIN_TEMPERATURE}, {MAX_TEMPERATURE}], got {}",
                self.temperature
            )));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(EclipseError::validation(format!(
                "max tokens must be within [{MIN_MAX_TOKENS}, {MAX_MAX_TOKENS}], got {}",
                self.max_tokens
            )));
        }
        Ok(())
    }
}

/// Display theme, persisted alongside chats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = EclipseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(EclipseError::validation(format!("Unknown theme: '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.model, ModelId::Claude3Sonnet);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let hot = Settings {
            temperature: 1.5,
            ..Settings::default()
        };
        assert!(hot.validate().unwrap_err().is_validation());

        let tiny = Settings {
            max_tokens: 50,
            ..Settings::default()
        };
        assert!(tiny.validate().is_err());

        let edge = Settings {
            temperature: 1.0,
            max_tokens: 8000,
            model: ModelId::Claude21,
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_settings_wire_format() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"maxTokens\":4000"));
        assert!(json.contains("\"model\":\"claude-3-sonnet-20240229\""));
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!(
            "claude-3-haiku-20240307".parse::<ModelId>().unwrap(),
            ModelId::Claude3Haiku
        );
        assert!("gpt-4".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
    }
}

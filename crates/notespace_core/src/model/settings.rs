//! User preferences persisted next to the workspace.
//!
//! # Invariants
//! - Each field decodes on its own: a bad value falls back to that field's
//!   default without touching the others.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Assistant model selected when nothing is persisted.
pub const DEFAULT_MODEL: &str = "Gemini";

/// Assistant models offered by the settings screen.
pub const AVAILABLE_MODELS: &[&str] = &["Gemini", "GPT-4", "Claude", "Other"];

/// UI color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Parses a theme name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted settings. Missing fields are filled with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default assistant model identifier.
    #[serde(deserialize_with = "model_or_default")]
    pub model: String,
    #[serde(deserialize_with = "theme_or_default")]
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            theme: Theme::default(),
        }
    }
}

fn model_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .unwrap_or(DEFAULT_MODEL)
        .to_string())
}

fn theme_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Theme, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(Theme::parse).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{Settings, Theme, DEFAULT_MODEL};

    #[test]
    fn missing_fields_are_default_filled() {
        let settings: Settings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn bad_theme_only_resets_the_theme() {
        let settings: Settings =
            serde_json::from_str(r#"{"model":"Claude","theme":"solarized"}"#).unwrap();
        assert_eq!(settings.model, "Claude");
        assert_eq!(settings.theme, Theme::Light);

        let settings: Settings = serde_json::from_str(r#"{"model":7,"theme":"Dark"}"#).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn theme_serializes_lowercase() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(json, r#"{"model":"Gemini","theme":"light"}"#);
    }

    #[test]
    fn toggle_flips_between_themes() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }
}

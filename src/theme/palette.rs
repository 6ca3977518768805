//! Palette types: builtin variants, sparse overrides, and the merge rule.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three predefined palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeVariant {
    Light,
    Dark,
    HighContrast,
}

impl ThemeVariant {
    pub const ALL: [ThemeVariant; 3] = [Self::Light, Self::Dark, Self::HighContrast];

    /// Persisted name, also what `Display` prints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::HighContrast => "highContrast",
        }
    }

    /// Whether the background is dark, i.e. the status bar should use light content.
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark | Self::HighContrast)
    }

    /// The builtin palette for this variant.
    pub fn palette(&self) -> ThemePalette {
        match self {
            Self::Light => ThemePalette::from_hex([
                "#0066cc", "#2ecc71", "#f5f5f5", "#ffffff", "#333333", "#666666", "#e5e5e5",
                "#ff3b30", "#2ecc71", "#f1c40f", "#dc3545",
            ]),
            Self::Dark => ThemePalette::from_hex([
                "#0080ff", "#2ecc71", "#121212", "#1e1e1e", "#f5f5f5", "#a0a0a0", "#333333",
                "#ff453a", "#32d74b", "#ffd60a", "#ff453a",
            ]),
            Self::HighContrast => ThemePalette::from_hex([
                "#ffff00", "#00ff00", "#000000", "#121212", "#ffffff", "#cccccc", "#ffffff",
                "#ff0000", "#00ff00", "#ffff00", "#ff0000",
            ]),
        }
    }
}

impl Default for ThemeVariant {
    fn default() -> Self {
        Self::Light
    }
}

impl std::fmt::Display for ThemeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown theme variant: {s}"))
    }
}

/// A fully populated set of color roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub card: String,
    pub text: String,
    pub text_secondary: String,
    pub border: String,
    pub notification: String,
    pub success: String,
    pub warning: String,
    pub error: String,
}

impl ThemePalette {
    /// Build from role values in declaration order.
    fn from_hex(roles: [&str; 11]) -> Self {
        let [
            primary,
            secondary,
            background,
            card,
            text,
            text_secondary,
            border,
            notification,
            success,
            warning,
            error,
        ] = roles.map(String::from);
        Self {
            primary,
            secondary,
            background,
            card,
            text,
            text_secondary,
            border,
            notification,
            success,
            warning,
            error,
        }
    }

    /// Overlay `overrides` on this palette. Override wins per role.
    pub fn merged_with(mut self, overrides: &ColorOverrides) -> Self {
        if let Some(ref primary) = overrides.primary {
            self.primary = primary.clone();
        }
        if let Some(ref secondary) = overrides.secondary {
            self.secondary = secondary.clone();
        }
        if let Some(ref text_secondary) = overrides.text_secondary {
            self.text_secondary = text_secondary.clone();
        }
        self
    }

    /// Role name/value pairs, in declaration order.
    pub fn roles(&self) -> [(&'static str, &str); 11] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("background", &self.background),
            ("card", &self.card),
            ("text", &self.text),
            ("textSecondary", &self.text_secondary),
            ("border", &self.border),
            ("notification", &self.notification),
            ("success", &self.success),
            ("warning", &self.warning),
            ("error", &self.error),
        ]
    }
}

impl Default for ThemePalette {
    fn default() -> Self {
        ThemeVariant::Light.palette()
    }
}

/// User-chosen colors layered over the builtin palette.
///
/// Stored as JSON under `custom_colors`. Absent roles are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_secondary: Option<String>,
}

impl ColorOverrides {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none() && self.text_secondary.is_none()
    }

    /// Shallow merge: roles set in `newer` replace ours, the rest are kept.
    pub fn merge(&mut self, newer: ColorOverrides) {
        if newer.primary.is_some() {
            self.primary = newer.primary;
        }
        if newer.secondary.is_some() {
            self.secondary = newer.secondary;
        }
        if newer.text_secondary.is_some() {
            self.text_secondary = newer.text_secondary;
        }
    }

    pub fn with_primary(mut self, color: impl Into<String>) -> Self {
        self.primary = Some(color.into());
        self
    }

    pub fn with_secondary(mut self, color: impl Into<String>) -> Self {
        self.secondary = Some(color.into());
        self
    }

    pub fn with_text_secondary(mut self, color: impl Into<String>) -> Self {
        self.text_secondary = Some(color.into());
        self
    }
}

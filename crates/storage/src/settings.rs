//! Persisted settings schema
//!
//! This module defines the display-mode and role enums that the preference
//! store persists, together with their derived display mappings. Both enums
//! serialize in lowercase, so the stored strings are exactly `"light"`,
//! `"dark"`, `"student"`, `"faculty"`, `"admin"`.

use serde::{Deserialize, Serialize};

/// Storage key for the persisted theme mode
pub const KEY_THEME: &str = "theme";

/// Storage key for the persisted user role
pub const KEY_USER_ROLE: &str = "userRole";

/// Display mode preference
///
/// The active mode is always a concrete light or dark; the system color
/// scheme is consulted only when nothing has been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Light mode
    #[default]
    Light,
    /// Dark mode
    Dark,
}

impl ThemeMode {
    /// The opposite mode
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Value for the document-level `color-scheme` marker
    pub fn color_scheme(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Check if this is the dark mode
    pub fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.color_scheme())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(format!("Unknown theme mode: {}", s)),
        }
    }
}

/// User role driving role-based styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Student view
    #[default]
    Student,
    /// Faculty view
    Faculty,
    /// Administrator view
    Admin,
}

impl UserRole {
    /// Accent color associated with the role
    ///
    /// This mapping is total: there is no unrecognized variant at the type
    /// level, and [`UserRole::parse_lenient`] folds unknown strings into
    /// `Student` before they get here.
    pub fn accent_color(self) -> &'static str {
        match self {
            UserRole::Student => "#f39c12",
            UserRole::Faculty => "#8311f2",
            UserRole::Admin => "#f21311",
        }
    }

    /// CSS class applied at the document root for role-based styling
    pub fn css_class(self) -> &'static str {
        match self {
            UserRole::Student => "role-student",
            UserRole::Faculty => "role-faculty",
            UserRole::Admin => "role-admin",
        }
    }

    /// Lowercase wire/storage name of the role
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Faculty => "faculty",
            UserRole::Admin => "admin",
        }
    }

    /// Parse a stored role string, falling back to `Student` for anything
    /// unrecognized
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "faculty" => Ok(UserRole::Faculty),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

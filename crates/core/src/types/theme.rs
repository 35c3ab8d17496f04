//! Display theme and theme preference.
//!
//! A [`ThemePreference`] is what the user chose (or `Unset` if they never
//! chose); a [`Theme`] is what actually gets applied. The two meet in
//! [`resolve_effective`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// An effective display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The persisted/attribute value (`"light"` or `"dark"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse the exact persisted form. Anything else is `None`.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Returns `true` for [`Theme::Dark`].
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Label for a toggle control while this theme is applied.
    ///
    /// Names the action the toggle will perform, not the current state.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark mode",
            Self::Dark => "Light mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's stored theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemePreference {
    Dark,
    Light,
    /// No explicit choice: follow the system preference.
    #[default]
    Unset,
}

impl ThemePreference {
    /// Interpret a stored value. Absent or unrecognised values are `Unset`.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(Theme::from_stored)
            .map_or(Self::Unset, Self::from)
    }

    /// The explicit theme, if one was chosen.
    #[must_use]
    pub const fn theme(self) -> Option<Theme> {
        match self {
            Self::Dark => Some(Theme::Dark),
            Self::Light => Some(Theme::Light),
            Self::Unset => None,
        }
    }

    /// Returns `true` when no explicit choice exists.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl From<Theme> for ThemePreference {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::Dark,
            Theme::Light => Self::Light,
        }
    }
}

/// Resolve the theme to apply: an explicit preference wins over the system.
///
/// ```
/// use backoffice_core::{Theme, ThemePreference, resolve_effective};
///
/// assert_eq!(resolve_effective(ThemePreference::Unset, Theme::Dark), Theme::Dark);
/// assert_eq!(resolve_effective(ThemePreference::Light, Theme::Dark), Theme::Light);
/// ```
#[must_use]
pub fn resolve_effective(stored: ThemePreference, system: Theme) -> Theme {
    stored.theme().unwrap_or(system)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_follows_system() {
        assert_eq!(resolve_effective(ThemePreference::Unset, Theme::Dark), Theme::Dark);
        assert_eq!(resolve_effective(ThemePreference::Unset, Theme::Light), Theme::Light);
    }

    #[test]
    fn test_stored_overrides_system() {
        assert_eq!(resolve_effective(ThemePreference::Light, Theme::Dark), Theme::Light);
        assert_eq!(resolve_effective(ThemePreference::Dark, Theme::Light), Theme::Dark);
    }

    #[test]
    fn test_from_stored_accepts_only_exact_values() {
        assert_eq!(ThemePreference::from_stored(Some("dark")), ThemePreference::Dark);
        assert_eq!(ThemePreference::from_stored(Some("light")), ThemePreference::Light);
        assert_eq!(ThemePreference::from_stored(Some("Dark")), ThemePreference::Unset);
        assert_eq!(ThemePreference::from_stored(Some("")), ThemePreference::Unset);
        assert_eq!(ThemePreference::from_stored(None), ThemePreference::Unset);
    }

    #[test]
    fn test_toggle_label_names_next_action() {
        assert_eq!(Theme::Light.toggle_label(), "Dark mode");
        assert_eq!(Theme::Dark.toggle_label(), "Light mode");
    }

    #[test]
    fn test_flip() {
        assert_eq!(Theme::Light.flip(), Theme::Dark);
        assert_eq!(Theme::Dark.flip().flip(), Theme::Dark);
    }
}

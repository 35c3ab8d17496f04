//! Light/dark theme state.
//!
//! The effective theme is the stored preference when there is one, otherwise
//! the system's colour scheme. [`ThemeController`] is the only code that
//! reads or writes the stored preference; everything else asks it.
//!
//! The controller is written against two small seams so it can run anywhere:
//!
//! - [`PreferenceStore`] holds the persisted `"dark"` / `"light"` string
//!   (the `theme` cookie in the web app)
//! - [`ThemeSurface`] is whatever displays the theme (the rendered page's
//!   `data-theme` attribute and toggle button)
//!
//! Either may be missing. A missing store reads as no preference and
//! ignores writes; a surface without a toggle control ignores toggle
//! updates.

mod http;

pub use http::{
    CookieStore, RenderedSurface, SYSTEM_HINT_HEADER, THEME_COOKIE, ThemeContext, ThemeView,
    system_preference,
};

use backoffice_core::{Theme, ThemePreference, resolve_effective};
use thiserror::Error;
use tracing::debug;

/// Failure reading or writing the stored preference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("stored theme preference is unreadable: {0}")]
    Unreadable(String),

    #[error("theme preference could not be saved: {0}")]
    Unwritable(String),
}

/// Persistent storage for the theme preference.
pub trait PreferenceStore {
    /// The raw stored value, `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unreadable`] if the storage cannot be read.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Persist a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unwritable`] if the storage rejects the write.
    fn save(&mut self, value: &str) -> Result<(), StoreError>;
}

/// Visual state of the theme toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    /// Names the action a click performs, not the current theme.
    pub label: &'static str,
    /// Pressed while the dark theme is applied.
    pub pressed: bool,
}

impl ToggleState {
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        Self {
            label: theme.toggle_label(),
            pressed: theme.is_dark(),
        }
    }
}

/// Something that displays a theme.
pub trait ThemeSurface {
    /// Set the display attribute. Applying the same theme twice must leave
    /// the surface as applying it once.
    fn apply_theme(&mut self, theme: Theme);

    /// Reflect the applied theme on the toggle control. Surfaces without a
    /// toggle keep the default no-op.
    fn update_toggle(&mut self, _state: ToggleState) {}
}

/// Resolves, applies and persists the theme.
pub struct ThemeController<S, V> {
    store: Option<S>,
    surface: V,
    applied: Option<Theme>,
}

impl<S: PreferenceStore, V: ThemeSurface> ThemeController<S, V> {
    /// Controller over an optional store and a surface. Nothing is applied
    /// until [`initialize`](Self::initialize) runs.
    pub const fn new(store: Option<S>, surface: V) -> Self {
        Self {
            store,
            surface,
            applied: None,
        }
    }

    /// The persisted preference. Missing or unreadable storage reads as
    /// [`ThemePreference::Unset`].
    pub fn stored_preference(&self) -> ThemePreference {
        let Some(store) = &self.store else {
            return ThemePreference::Unset;
        };

        match store.load() {
            Ok(value) => ThemePreference::from_stored(value.as_deref()),
            Err(e) => {
                debug!(error = %e, "Ignoring unreadable theme preference");
                ThemePreference::Unset
            }
        }
    }

    /// Set the display attribute only.
    pub fn apply(&mut self, theme: Theme) {
        self.surface.apply_theme(theme);
        self.applied = Some(theme);
    }

    /// Apply `theme`, sync the toggle control, and optionally persist it.
    ///
    /// A failed write is logged and otherwise ignored.
    pub fn set_theme(&mut self, theme: Theme, persist: bool) {
        self.apply(theme);
        self.surface.update_toggle(ToggleState::for_theme(theme));

        if !persist {
            return;
        }
        if let Some(store) = &mut self.store
            && let Err(e) = store.save(theme.as_str())
        {
            debug!(error = %e, "Theme preference not saved");
        }
    }

    /// Resolve stored preference against the system theme and apply the
    /// result without persisting it.
    pub fn initialize(&mut self, system: Theme) -> Theme {
        let theme = resolve_effective(self.stored_preference(), system);
        self.set_theme(theme, false);
        theme
    }

    /// Flip the currently applied theme and persist the flip.
    pub fn toggle(&mut self) -> Theme {
        let next = self.current().flip();
        self.set_theme(next, true);
        next
    }

    /// React to a change of the system colour scheme.
    ///
    /// Only follows the system while no preference is stored. Returns the
    /// applied theme when it was re-resolved.
    pub fn on_system_change(&mut self, system: Theme) -> Option<Theme> {
        if !self.stored_preference().is_unset() {
            return None;
        }
        let theme = resolve_effective(ThemePreference::Unset, system);
        self.set_theme(theme, false);
        Some(theme)
    }

    /// The applied theme; light before anything was applied.
    pub fn current(&self) -> Theme {
        self.applied.unwrap_or_default()
    }

    pub const fn surface(&self) -> &V {
        &self.surface
    }

    pub const fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }
}

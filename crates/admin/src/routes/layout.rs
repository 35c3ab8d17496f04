//! Shared page frame: navigation and theme.

use crate::theme::{ThemeContext, ThemeView};

/// Navigation entries, in display order.
const NAV: [(&str, &str); 2] = [("/products", "Products"), ("/users", "Users")];

/// One navigation link.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Everything `base.html` needs besides the page body.
#[derive(Debug, Clone)]
pub struct ShellView {
    pub title: String,
    pub current_path: String,
    pub nav: Vec<NavItem>,
    pub theme: ThemeView,
    /// No stored preference: the head script may switch to the OS scheme
    /// before first paint.
    pub follows_system: bool,
}

impl ShellView {
    #[must_use]
    pub fn new(title: &str, current_path: &str, theme: &ThemeContext) -> Self {
        let nav = NAV
            .iter()
            .map(|&(href, label)| NavItem {
                href,
                label,
                active: current_path == href || current_path.starts_with(&format!("{href}/")),
            })
            .collect();

        Self {
            title: title.to_string(),
            current_path: current_path.to_string(),
            nav,
            theme: theme.view(),
            follows_system: theme.follows_system(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_nav_marks_current_section() {
        let theme = ThemeContext::from_headers(&HeaderMap::new(), false);
        let shell = ShellView::new("Users", "/users", &theme);

        let active: Vec<_> = shell.nav.iter().filter(|n| n.active).map(|n| n.href).collect();
        assert_eq!(active, vec!["/users"]);
        assert_eq!(shell.theme.data_theme, "light");
        assert!(shell.follows_system);
    }

    #[test]
    fn test_unknown_path_marks_nothing() {
        let theme = ThemeContext::from_headers(&HeaderMap::new(), false);
        let shell = ShellView::new("Not found", "/orders", &theme);
        assert!(shell.nav.iter().all(|n| !n.active));
    }
}

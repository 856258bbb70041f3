//! Navigation shell: sidebar entries, identity and sign-out

use common::storage::SessionStorage;

use crate::session::{Profile, SessionStore};

/// Route of the login page
pub const LOGIN_ROUTE: &str = "/login";

/// Static sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub url: &'static str,
    pub tooltip: &'static str,
}

/// Tools available in the sidebar
pub const NAV_ITEMS: [NavItem; 1] = [NavItem {
    title: "Agente ITFolks",
    url: "/agente",
    tooltip: "Configure e execute buscas personalizadas",
}];

/// Sidebar entry as rendered for the current route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub title: &'static str,
    pub url: &'static str,
    pub tooltip: &'static str,
    pub active: bool,
}

/// Data needed to render the sidebar around a protected page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub profile: Profile,
    pub entries: Vec<NavEntry>,
}

impl Shell {
    /// Build the shell for `current_path` from the stored session
    pub fn load<S: SessionStorage>(store: &SessionStore<S>, current_path: &str) -> Self {
        let entries = NAV_ITEMS
            .iter()
            .map(|item| NavEntry {
                title: item.title,
                url: item.url,
                tooltip: item.tooltip,
                active: item.url == current_path,
            })
            .collect();

        Self {
            profile: store.profile(),
            entries,
        }
    }
}

/// Clear every stored session value; returns the route to go to next
pub fn sign_out<S: SessionStorage>(store: &SessionStore<S>) -> &'static str {
    store.clear();
    LOGIN_ROUTE
}

//! View-level authorization.
//!
//! Reachability is derived from the role of the current principal on every
//! request; nothing here is cached or persisted.

use serde::{Deserialize, Serialize};

use crate::model::{Role, User};

/// Named views of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Credential entry
    Login,
    Dashboard,
    Schedules,
    /// User management
    Users,
    Reports,
    NotFound,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Login,
        View::Dashboard,
        View::Schedules,
        View::Users,
        View::Reports,
        View::NotFound,
    ];

    pub fn path(self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Dashboard => "/",
            View::Schedules => "/schedules",
            View::Users => "/users",
            View::Reports => "/reports",
            View::NotFound => "/404",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Dashboard => "Dashboard",
            View::Schedules => "Agendamentos",
            View::Users => "Usuários",
            View::Reports => "Relatórios",
            View::NotFound => "Página não encontrada",
        }
    }

    /// Role required beyond being authenticated
    fn required_role(self) -> Option<Role> {
        match self {
            View::Users => Some(Role::Admin),
            View::Login | View::Dashboard | View::Schedules | View::Reports | View::NotFound => {
                None
            }
        }
    }

    fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        [View::Dashboard, View::Schedules, View::Users, View::Reports, View::Login]
            .into_iter()
            .find(|view| view.path() == normalized)
    }
}

/// Whether `principal` may reach `view`
pub fn can_access(principal: Option<&User>, view: View) -> bool {
    match principal {
        None => view == View::Login,
        Some(user) => match view.required_role() {
            Some(role) => user.role == role,
            None => true,
        },
    }
}

/// Resolve a navigation request to the view that will be shown.
///
/// Anonymous principals always land on the login view. Paths that are unknown,
/// or not reachable by the principal, fall through to `NotFound`.
pub fn resolve(principal: Option<&User>, path: &str) -> View {
    if principal.is_none() {
        return View::Login;
    }
    match View::from_path(path) {
        Some(view) if can_access(principal, view) => view,
        _ => View::NotFound,
    }
}

/// Menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub view: View,
    pub label: String,
    pub path: String,
}

/// Menu items reachable by the principal, in menu order
pub fn navigation(principal: Option<&User>) -> Vec<NavItem> {
    [View::Dashboard, View::Schedules, View::Users, View::Reports]
        .into_iter()
        .filter(|view| principal.is_some() && can_access(principal, *view))
        .map(|view| NavItem {
            view,
            label: view.label().to_string(),
            path: view.path().to_string(),
        })
        .collect()
}

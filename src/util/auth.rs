//! Shared auth routing helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes and the login page must agree on how the original
//! location travels through `/login?from=...` and where a user lands after
//! signing in.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::config::AuthConfig;
use crate::state::auth::AuthState;

pub const SUPERADMIN_ROLE: &str = "ROLE_SUPERADMIN";
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Login URL carrying `from` (path + query) for the post-login return.
#[must_use]
pub fn login_redirect_url(config: &AuthConfig, from: &str) -> String {
    let from = from.trim();
    if from.is_empty() || from == "/" || is_login_path(config, from) {
        return config.login_path.clone();
    }
    format!("{}?{}={}", config.login_path, config.redirect_param, urlencoding::encode(from))
}

/// Default dashboard for a role list; the first role decides.
#[must_use]
pub fn landing_path_for(roles: &[String]) -> &'static str {
    match roles.first().map(String::as_str) {
        Some(SUPERADMIN_ROLE) => "/superadmin/dashboard",
        Some(ADMIN_ROLE) => "/admin/dashboard",
        _ => "/user/dashboard",
    }
}

/// Where to send a user after login, given the login page's query string.
///
/// Only same-origin relative paths are honored; anything else falls back to
/// the role landing path.
#[must_use]
pub fn return_target(config: &AuthConfig, query: &str, roles: &[String]) -> String {
    let requested = query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == config.redirect_param)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned());
    match requested {
        Some(path) if is_safe_return_path(config, &path) => path,
        _ => landing_path_for(roles).to_owned(),
    }
}

fn is_safe_return_path(config: &AuthConfig, path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') && !is_login_path(config, path)
}

fn is_login_path(config: &AuthConfig, path: &str) -> bool {
    let bare = path.split(['?', '#']).next().unwrap_or(path);
    bare == config.login_path
}

/// True once hydration finished and the session ended.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && state.redirect_pending
}

/// Navigate to the login page whenever the session ends (logout or rejection).
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, login_path: String, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = auth.get();
        if should_redirect_unauth(&state) {
            auth.update(|s| s.redirect_pending = false);
            navigate(&login_path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

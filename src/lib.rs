//! # rwandabill-auth
//!
//! Client-resident authentication layer for the RwandaBill Leptos frontend.
//!
//! This crate owns the browser session (bearer token + user profile), the
//! authorized HTTP pipeline that attaches and revokes it, the error taxonomy
//! surfaced to forms, and the role-based route guard used by protected pages.
//!
//! ARCHITECTURE
//! ============
//! `state::session` persists the session, `net::transport` reads it on the way
//! out and tears it down on credential rejection, `net::api` exposes the domain
//! calls, and `state::guard` + `components::protected_route` decide whether a
//! protected view may mount.

pub mod components;
pub mod config;
pub mod net;
pub mod state;
pub mod util;

pub use config::AuthConfig;
pub use net::api::AuthService;
pub use net::error::NormalizedError;
pub use net::types::{LoginCredentials, Session, SignupData, User};
pub use state::guard::AccessDecision;
pub use state::session::CredentialStore;

/// Install the panic hook and console logger for the browser build.
#[cfg(feature = "hydrate")]
pub fn init_client() {
    console_error_panic_hook::set_once();
    // A second call returns an error because the logger is already set.
    let _ = console_log::init_with_level(log::Level::Debug);
}

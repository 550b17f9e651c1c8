//! Reactive auth state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provided as `RwSignal<AuthState>` context by `AuthProvider`. Session events
//! from the transport are folded in here; the redirect effect in
//! `util::auth` reacts to `redirect_pending`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::transport::SessionEvent;
use crate::net::types::User;

/// Authentication state tracking the current user and hydration status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True until the stored session has been read on the client.
    pub loading: bool,
    /// Set when the session ended and the app should go to the login page.
    pub redirect_pending: bool,
}

impl AuthState {
    /// State before the browser store has been read.
    #[must_use]
    pub fn hydrating() -> Self {
        Self { loading: true, ..Self::default() }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Fold a session event in. `stored_user` is the store's profile after the event.
    pub fn apply(&mut self, event: &SessionEvent, stored_user: Option<User>) {
        self.loading = false;
        match event {
            SessionEvent::Established { .. } => {
                self.user = stored_user;
                self.redirect_pending = false;
            }
            SessionEvent::Invalidated { .. } | SessionEvent::LoggedOut => {
                self.user = None;
                self.redirect_pending = true;
            }
        }
    }
}

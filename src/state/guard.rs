//! Role-based access decision for protected views.
//!
//! DESIGN
//! ======
//! The decision itself is the pure `evaluate`. `AccessGuard` wraps it in the
//! `Pending -> {Granted, Denied}` lifecycle a mounted view goes through: it
//! starts pending, resolves once against the store, and only returns to
//! pending when its required-role policy changes. A session change while
//! mounted is not observed until the next check.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::Session;
use crate::state::session::{CredentialStore, StorageBackend};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessDecision {
    /// Not evaluated yet; render a neutral loading state.
    #[default]
    Pending,
    Granted,
    /// Redirect to the login entry point. A normal outcome, not an error.
    Denied,
}

/// Granted iff a session exists and either no roles are required or the
/// session holds at least one of them.
#[must_use]
pub fn evaluate(session: Option<&Session>, required_roles: &[String]) -> AccessDecision {
    let Some(session) = session else {
        return AccessDecision::Denied;
    };
    if required_roles.is_empty() || session.user.has_any_role(required_roles) {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessGuard {
    required_roles: Vec<String>,
    decision: AccessDecision,
}

impl AccessGuard {
    #[must_use]
    pub fn new(required_roles: Vec<String>) -> Self {
        Self { required_roles, decision: AccessDecision::Pending }
    }

    #[must_use]
    pub fn decision(&self) -> AccessDecision {
        self.decision
    }

    #[must_use]
    pub fn required_roles(&self) -> &[String] {
        &self.required_roles
    }

    /// Swap the policy. Returns `true` (and goes back to `Pending`) if it changed.
    pub fn set_required_roles(&mut self, required_roles: Vec<String>) -> bool {
        if self.required_roles == required_roles {
            return false;
        }
        self.required_roles = required_roles;
        self.decision = AccessDecision::Pending;
        true
    }

    /// Resolve a pending guard against `session`. A resolved guard keeps its decision.
    pub fn resolve(&mut self, session: Option<&Session>) -> AccessDecision {
        if self.decision == AccessDecision::Pending {
            self.decision = evaluate(session, &self.required_roles);
        }
        self.decision
    }

    pub fn check<B: StorageBackend>(&mut self, store: &CredentialStore<B>) -> AccessDecision {
        if self.decision != AccessDecision::Pending {
            return self.decision;
        }
        let session = store.read();
        self.resolve(session.as_ref())
    }
}

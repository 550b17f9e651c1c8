//! Auth UI components.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthProvider` wires the browser session into context near the router root;
//! `ProtectedRoute` wraps any view that needs a signed-in (or role-holding) user.

pub mod auth_provider;
pub mod protected_route;

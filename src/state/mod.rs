//! Client-side auth state modules.
//!
//! DESIGN
//! ======
//! `session` owns persistence, `guard` owns access decisions, and `auth` is
//! the reactive mirror components read for identity-dependent rendering.

pub mod auth;
pub mod guard;
pub mod session;

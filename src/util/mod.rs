//! Utility helpers shared across auth components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Routing glue lives here so the guard and provider components stay thin and
//! the URL rules can be tested without a browser.

pub mod auth;

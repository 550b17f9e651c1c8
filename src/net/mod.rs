//! Networking modules for the identity service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` abstracts the raw client, `transport` layers the credential policies
//! on top of it, `api` exposes the domain calls, `error` owns the failure
//! taxonomy, and `types` defines the wire schema.

pub mod api;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

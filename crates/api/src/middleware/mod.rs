//! Identity and authorization extractors.
//!
//! - [`auth::Caller`] -- soft identity: a missing or bad token is anonymous.
//! - [`auth::AuthUser`] -- requires a verified identity (401 otherwise).
//! - [`rbac::RequireStaff`] -- requires a staff identity (401/403).

pub mod auth;
pub mod rbac;

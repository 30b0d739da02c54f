//! Work that runs outside a request.
//!
//! [`announce`] posts Discord announcements after a handler has answered.
//! [`reconcile::run`] rebuilds the work indexes on a timer and exits when
//! its [`CancellationToken`] fires during shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod announce;
pub mod reconcile;

//! Object storage and remote-fetch integrations.
//!
//! - [`upload`] -- presigned `PUT` URLs for direct browser uploads to an
//!   S3-compatible bucket.
//! - [`preview`] -- best-effort `og:image` lookup for link-only work items.

pub mod preview;
pub mod upload;

pub use preview::PreviewFetcher;
pub use upload::{S3Config, UploadError, UploadSigner, UploadTicket};

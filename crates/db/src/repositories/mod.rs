//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&Store` as the first argument.

pub mod artist_repo;
pub mod week_repo;
pub mod work_repo;

pub use artist_repo::{ArtistRepo, ArtistSave};
pub use week_repo::WeekRepo;
pub use work_repo::{ReindexReport, WorkRepo};

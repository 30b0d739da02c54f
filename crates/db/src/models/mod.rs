//! Stored records and request DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` + `Deserialize` record struct as stored in the KV store
//! - `Deserialize` + `Validate` request DTOs for the write endpoints
//! - `Deserialize` query-parameter structs for the read endpoints

pub mod artist;
pub mod week;
pub mod work;

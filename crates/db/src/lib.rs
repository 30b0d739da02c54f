//! Persistence for the art-challenge API: the KV store abstraction and its
//! backends, the key layout, stored records, and the repositories that
//! maintain the denormalized work indexes.

pub mod keys;
pub mod kv;
pub mod models;
pub mod repositories;
pub mod store;

pub use store::{connect, Store, StoreConfig};

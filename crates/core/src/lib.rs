//! Domain primitives shared by every artweeks crate: the error type, id
//! derivation, bearer-subject parsing, challenge-week rules, and validation
//! rendering.

pub mod error;
pub mod identity;
pub mod short_id;
pub mod types;
pub mod validation;
pub mod weeks;

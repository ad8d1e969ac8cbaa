//! Database entities.
//!
//! Note that these may have to be updated by hand when the schema changes.

pub mod task;
pub mod user;

//! Sessions: the materialized, time-bounded result of evaluating a vault path.
//!
//! This module provides:
//! - The `Session` entity (`model`)
//! - Recursive session construction over a vault tree (`builder`)
//! - Projection of a session into shell variable mutations (`variables`)

pub mod builder;
pub mod model;
pub mod variables;

pub use builder::{build_session, construct_session, DEFAULT_SESSION_DURATION};
pub use model::Session;
pub use variables::Variables;

//! Core domain types, errors, and constants for `dyntool`.
//!
//! This crate establishes the foundational building blocks used by the
//! working-set manager and anything layered on top of it.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing all possible failure modes for predictable error handling.
//! - **`constants`**: Shared defaults such as the initial cache capacity and
//!   the low-usage threshold used by cache optimization.

pub mod constants;
pub mod errors;

pub use self::{
    constants::*,
    errors::{BoxedError, Error, Result},
};

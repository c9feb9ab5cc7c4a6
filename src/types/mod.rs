//! Shared types

pub mod error;

pub use error::{AppError, Result};

//! Content access layer
//!
//! Typed CRUD per entity over a [`RowStore`], plus the filtered reads the
//! public pages use. One store round trip per call; nothing is cached here.
//! Store errors propagate unchanged; turning them into user-facing results
//! is the action layer's job.

pub mod clock;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use repository::ContentRepository;

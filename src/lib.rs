//! CommonGround - content service for a community nonprofit site
//!
//! Staff manage three kinds of content from the admin dashboard:
//! service directory **resources**, **announcements**, and **events**.
//! Public pages read the active subset of each.
//!
//! ## Layers
//!
//! - [`db`] - row store contract with MongoDB and in-memory adapters
//! - [`content`] - typed CRUD and filtered reads per entity
//! - [`actions`] - the only mutation entry point: demo-mode gate,
//!   payload normalization, error normalization, view invalidation
//! - [`auth`] - session tokens, demo-mode resolution, hosted auth client
//! - [`cache`] - rendered dashboard surfaces and their invalidation
//! - [`routes`] / [`server`] - HTTP JSON surface

pub mod actions;
pub mod auth;
pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod models;
pub mod routes;
pub mod server;
pub mod types;

pub use actions::{ActionResult, AuthActions, ContentActions};
pub use config::Args;
pub use content::ContentRepository;
pub use types::{AppError, Result};

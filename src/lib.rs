//! catalog-rs: a client for a music catalog service
//!
//! - `model`: entities, per-collection clients, session and UI state
//! - `controller`: routing, account flows and shell commands
//! - `view`: text rendering of the current screen
//! - `auth`: credential checks and the HTTP auth service

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod seed;
pub mod view;

pub use error::{CatalogError, ErrorKind, Result};

//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`browse`] - Interactive paging with debounced reloads
//! - [`config`] - Configuration management (get, set, list, path, init)
//! - [`describe`] - Dataset metadata
//! - [`page`] - Fetch a single page

pub mod browse;
pub mod common;
pub mod config;
pub mod describe;
pub mod page;

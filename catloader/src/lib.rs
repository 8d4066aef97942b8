//! catloader - Paged catalog access for interactive table viewers
//!
//! This library fetches tabular catalogs from a remote server, decodes them,
//! and keeps a committed first page per dataset so repeated views are served
//! without another round trip.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade,
//! and the [`reload`] module debounces interactive requests on top of it:
//!
//! ```ignore
//! use catloader::config::ConfigFile;
//! use catloader::query::PageRequest;
//! use catloader::reload::{ReloadScheduler, TracingNotifier};
//! use catloader::remote::RemoteCatalog;
//! use catloader::service::CatalogService;
//!
//! let config = ConfigFile::load()?;
//! let service = CatalogService::new(RemoteCatalog::from_config(&config.remote_config())?);
//!
//! // Prime (or reuse) the committed entry
//! let entry = service.ensure_loaded("gaia_dr3.fits").await?;
//!
//! // Debounced loads driven by UI state changes
//! let scheduler = ReloadScheduler::new(service, TracingNotifier, config.reload_config());
//! scheduler.schedule("gaia_dr3.fits", PageRequest::new(2, 50));
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod local;
pub mod logging;
pub mod query;
pub mod reload;
pub mod remote;
pub mod service;

/// Version of the catloader library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

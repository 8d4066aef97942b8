//! High-level service facade.
//!
//! [`CatalogService`] wires the local override, the committed cache and a
//! [`CatalogSource`](crate::remote::CatalogSource) together and produces
//! [`CatalogView`]s. It is the [`ViewLoader`](crate::reload::ViewLoader) the
//! reload scheduler drives.

mod facade;
mod view;

pub use facade::CatalogService;
pub use view::{CatalogView, ViewSource};

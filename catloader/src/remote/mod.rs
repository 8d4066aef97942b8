//! Remote catalog access.
//!
//! Two logical endpoints are used: a JSON metadata endpoint returning a
//! [`DatasetDescriptor`](crate::dataset::DatasetDescriptor), and a binary page
//! endpoint returning rows decoded through a [`PageDecoder`].
//!
//! Everything above this module talks to a [`CatalogSource`];
//! [`RemoteCatalog`] is the HTTP implementation.
//!
//! Failures are surfaced as [`FetchError`] immediately. Nothing here retries.

mod catalog;
mod config;
mod decode;
mod descriptor;
mod endpoints;
mod http;
mod page;
mod types;

pub use catalog::RemoteCatalog;
pub use config::RemoteConfig;
pub use decode::{CborPageDecoder, DecodedPage, PageDecoder};
pub use descriptor::{parse_descriptor, DescriptorFetcher};
pub use endpoints::Endpoints;
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use page::PageFetcher;
pub use types::{CatalogSource, FetchError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
#[cfg(test)]
pub use types::tests::MockCatalogSource;

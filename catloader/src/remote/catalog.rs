//! HTTP-backed catalog source.

use super::config::RemoteConfig;
use super::decode::{CborPageDecoder, PageDecoder};
use super::descriptor::DescriptorFetcher;
use super::endpoints::Endpoints;
use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::page::PageFetcher;
use super::types::{CatalogSource, FetchError};
use crate::dataset::{DatasetDescriptor, DatasetId};
use crate::query::{PageRequest, PageResult};
use tokio_util::sync::CancellationToken;

/// [`CatalogSource`] talking to the remote metadata and page endpoints.
///
/// # Example
///
/// ```ignore
/// use catloader::remote::RemoteCatalog;
///
/// let source = RemoteCatalog::connect("http://localhost:8000", 30)?;
/// ```
pub struct RemoteCatalog<C, D = CborPageDecoder> {
    descriptors: DescriptorFetcher<C>,
    pages: PageFetcher<C, D>,
}

impl<C, D> RemoteCatalog<C, D>
where
    C: AsyncHttpClient + Clone,
    D: PageDecoder,
{
    /// Creates a source from an HTTP client, endpoints and page decoder.
    pub fn new(http: C, endpoints: Endpoints, decoder: D) -> Self {
        Self {
            descriptors: DescriptorFetcher::new(http.clone(), endpoints.clone()),
            pages: PageFetcher::new(http, endpoints, decoder),
        }
    }
}

impl RemoteCatalog<AsyncReqwestClient, CborPageDecoder> {
    /// Creates a reqwest-backed source for `base_url` with the CBOR decoder.
    pub fn connect(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let endpoints = Endpoints::new(base_url)?;
        let http = AsyncReqwestClient::with_timeout(timeout_secs)?;
        Ok(Self::new(http, endpoints, CborPageDecoder))
    }

    /// Creates a reqwest-backed source from runtime configuration.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, FetchError> {
        Self::connect(config.base_url(), config.timeout_secs())
    }
}

impl<C, D> CatalogSource for RemoteCatalog<C, D>
where
    C: AsyncHttpClient + Clone,
    D: PageDecoder,
{
    async fn fetch_descriptor(&self, id: &DatasetId) -> Result<DatasetDescriptor, FetchError> {
        self.descriptors.fetch(id).await
    }

    async fn fetch_page(
        &self,
        id: &DatasetId,
        request: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult, FetchError> {
        self.pages.fetch(id, request, cancel).await
    }
}

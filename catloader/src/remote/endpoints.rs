//! URL construction for the metadata and page endpoints.

use super::types::FetchError;
use crate::dataset::DatasetId;
use crate::query::PageRequest;
use reqwest::Url;

/// Builds endpoint URLs under a remote base URL.
///
/// - metadata: `{base}/api/catalogs/{id}/metadata`
/// - rows: `{base}/api/catalogs/{id}/rows?page=..&limit=..`
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parses and validates the base URL.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{}: cannot be used as a base URL",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn dataset_url(&self, id: &DatasetId, leaf: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        // Validated in new(), so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "catalogs", id.as_str(), leaf]);
        }
        url
    }

    /// URL of the JSON descriptor for a dataset.
    pub fn metadata_url(&self, id: &DatasetId) -> Url {
        self.dataset_url(id, "metadata")
    }

    /// URL of one binary page, with the request encoded as query parameters.
    pub fn rows_url(&self, id: &DatasetId, request: &PageRequest) -> Url {
        let mut url = self.dataset_url(id, "rows");
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        url
    }
}

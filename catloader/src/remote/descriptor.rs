//! Dataset descriptor fetching.

use super::endpoints::Endpoints;
use super::http::AsyncHttpClient;
use super::types::FetchError;
use crate::dataset::{ColumnMeta, DatasetDescriptor, DatasetId};
use serde::Deserialize;
use tracing::{debug, warn};

/// Column entry as served by the metadata endpoint: either a bare name or a
/// full metadata object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnWire {
    Name(String),
    Meta(ColumnMeta),
}

#[derive(Deserialize)]
struct DescriptorWire {
    #[serde(default)]
    total_rows: u64,
    #[serde(default)]
    total_columns: Option<u64>,
    #[serde(default)]
    columns: Vec<ColumnWire>,
}

impl From<DescriptorWire> for DatasetDescriptor {
    fn from(wire: DescriptorWire) -> Self {
        let columns: Vec<ColumnMeta> = wire
            .columns
            .into_iter()
            .map(|c| match c {
                ColumnWire::Name(name) => ColumnMeta::new(name, "unknown"),
                ColumnWire::Meta(meta) => meta,
            })
            .collect();
        Self {
            total_rows: wire.total_rows,
            total_columns: wire.total_columns.unwrap_or(columns.len() as u64),
            columns,
        }
    }
}

/// Parses a metadata endpoint body.
pub fn parse_descriptor(body: &[u8]) -> Result<DatasetDescriptor, FetchError> {
    serde_json::from_slice::<DescriptorWire>(body)
        .map(DatasetDescriptor::from)
        .map_err(|e| FetchError::Decode(format!("invalid descriptor: {}", e)))
}

/// Fetches dataset descriptors from the metadata endpoint.
///
/// One round-trip per call, no retries.
#[derive(Clone)]
pub struct DescriptorFetcher<C> {
    http: C,
    endpoints: Endpoints,
}

impl<C: AsyncHttpClient> DescriptorFetcher<C> {
    pub fn new(http: C, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Fetches the descriptor for a normalized dataset id.
    pub async fn fetch(&self, id: &DatasetId) -> Result<DatasetDescriptor, FetchError> {
        let url = self.endpoints.metadata_url(id);
        debug!(dataset = %id, url = %url, "Fetching dataset descriptor");

        let response = self.http.get(url.as_str()).await?;
        if !response.is_success() {
            let message = response.error_message();
            warn!(
                dataset = %id,
                status = response.status,
                message = %message,
                "Descriptor fetch failed"
            );
            return Err(FetchError::Descriptor {
                status: response.status,
                message,
            });
        }

        let descriptor = parse_descriptor(&response.body)?;
        debug!(
            dataset = %id,
            total_rows = descriptor.total_rows,
            columns = descriptor.columns.len(),
            "Descriptor received"
        );
        Ok(descriptor)
    }
}

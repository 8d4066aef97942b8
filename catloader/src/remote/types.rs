//! Remote fetch errors and the catalog source trait.

use crate::dataset::{DatasetDescriptor, DatasetId};
use crate::query::{PageRequest, PageResult};
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while fetching or decoding catalog data.
///
/// `Clone` so that a single failure of a shared priming fetch can be handed
/// to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Metadata endpoint returned a non-success status
    #[error("{message}")]
    Descriptor { status: u16, message: String },

    /// Page endpoint returned a non-success status
    #[error("{message}")]
    Page { status: u16, message: String },

    /// Payload could not be decoded into rows or a descriptor
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    /// Connection-level failure, no HTTP status available
    #[error("Request failed: {0}")]
    Transport(String),

    /// Remote base URL could not be used to build endpoints
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Load superseded before completion
    #[error("Request cancelled")]
    Cancelled,

    /// The shared fetch ended without reporting a result
    #[error("Load interrupted before completion")]
    Interrupted,
}

impl FetchError {
    /// True for [`FetchError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// HTTP status for status-derived errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Descriptor { status, .. } | FetchError::Page { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Source of catalog descriptors and pages.
///
/// [`RemoteCatalog`](super::RemoteCatalog) is the HTTP implementation;
/// tests substitute in-memory sources.
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetches dataset-level metadata.
    fn fetch_descriptor(
        &self,
        id: &DatasetId,
    ) -> impl Future<Output = Result<DatasetDescriptor, FetchError>> + Send;

    /// Fetches and decodes one page.
    ///
    /// If `cancel` fires before the page is returned the call yields
    /// [`FetchError::Cancelled`] instead of a result.
    fn fetch_page(
        &self,
        id: &DatasetId,
        request: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> impl Future<Output = Result<PageResult, FetchError>> + Send;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::dataset::Record;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// In-memory catalog source for testing.
    ///
    /// Serves a fixed descriptor and slices pages out of a fixed record set.
    /// Every call is counted, every page request recorded.
    #[derive(Clone, Default)]
    pub struct MockCatalogSource {
        descriptor: Arc<Mutex<DatasetDescriptor>>,
        records: Arc<Mutex<Vec<Record>>>,
        descriptor_error: Arc<Mutex<Option<FetchError>>>,
        page_error: Arc<Mutex<Option<FetchError>>>,
        delay: Option<Duration>,
        descriptor_calls: Arc<AtomicUsize>,
        page_requests: Arc<Mutex<Vec<(DatasetId, PageRequest)>>>,
    }

    impl MockCatalogSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// `n` records with `id` and `mag` columns, described by the descriptor.
        pub fn with_rows(n: i64) -> Self {
            let records: Vec<Record> = (0..n)
                .map(|i| Record::new().with("id", i).with("mag", 10.0 + i as f64))
                .collect();
            let descriptor = DatasetDescriptor::from_records(&records);
            Self::new().with_descriptor(descriptor).with_records(records)
        }

        pub fn with_descriptor(self, descriptor: DatasetDescriptor) -> Self {
            *self.descriptor.lock() = descriptor;
            self
        }

        pub fn with_records(self, records: Vec<Record>) -> Self {
            *self.records.lock() = records;
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn fail_descriptor(&self, error: Option<FetchError>) {
            *self.descriptor_error.lock() = error;
        }

        pub fn fail_pages(&self, error: Option<FetchError>) {
            *self.page_error.lock() = error;
        }

        pub fn descriptor_calls(&self) -> usize {
            self.descriptor_calls.load(Ordering::SeqCst)
        }

        pub fn page_calls(&self) -> usize {
            self.page_requests.lock().len()
        }

        pub fn page_requests(&self) -> Vec<(DatasetId, PageRequest)> {
            self.page_requests.lock().clone()
        }
    }

    impl CatalogSource for MockCatalogSource {
        async fn fetch_descriptor(&self, _id: &DatasetId) -> Result<DatasetDescriptor, FetchError> {
            self.descriptor_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(error) = self.descriptor_error.lock().clone() {
                return Err(error);
            }
            Ok(self.descriptor.lock().clone())
        }

        async fn fetch_page(
            &self,
            id: &DatasetId,
            request: &PageRequest,
            cancel: Option<&CancellationToken>,
        ) -> Result<PageResult, FetchError> {
            self.page_requests.lock().push((id.clone(), request.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(FetchError::Cancelled);
            }
            if let Some(error) = self.page_error.lock().clone() {
                return Err(error);
            }
            let records = self.records.lock();
            Ok(PageResult::slice(
                &records,
                request.page,
                request.effective_limit(),
            ))
        }
    }

    #[test]
    fn test_status_errors_display_message_verbatim() {
        let err = FetchError::Page {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_cancelled_is_distinguished() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Decode("x".into()).is_cancelled());
        assert_eq!(FetchError::Cancelled.status(), None);
    }
}

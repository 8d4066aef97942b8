//! Catalog service facade.

use super::view::{CatalogView, ViewSource};
use crate::cache::{CatalogCache, CoordinatorStats, PrimingResult};
use crate::dataset::{CommittedEntry, DatasetId, Record};
use crate::local::{ActiveDatasetSource, LocalOverride, SharedActiveDataset};
use crate::query::{PageRequest, PageResult, Pagination};
use crate::reload::ViewLoader;
use crate::remote::{CatalogSource, FetchError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Composes the committed cache, the local override and the catalog source.
///
/// This is the single entry point a viewer needs. Cloning is cheap; clones
/// share the cache.
///
/// # Example
///
/// ```ignore
/// use catloader::remote::RemoteCatalog;
/// use catloader::service::CatalogService;
/// use catloader::query::PageRequest;
/// use tokio_util::sync::CancellationToken;
///
/// let source = RemoteCatalog::connect("http://localhost:8000", 30)?;
/// let service = CatalogService::new(source);
///
/// let view = service
///     .load_view("catalogs/gaia.fits", &PageRequest::new(2, 100), &CancellationToken::new())
///     .await?;
/// ```
pub struct CatalogService<S, A = SharedActiveDataset> {
    cache: CatalogCache<S>,
    local: Arc<LocalOverride<A>>,
}

impl<S, A> Clone for CatalogService<S, A> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            local: Arc::clone(&self.local),
        }
    }
}

impl<S: CatalogSource> CatalogService<S, SharedActiveDataset> {
    /// Creates a service with an empty active-dataset slot.
    pub fn new(source: S) -> Self {
        Self::with_active(source, SharedActiveDataset::new())
    }
}

impl<S: CatalogSource, A: ActiveDatasetSource> CatalogService<S, A> {
    /// Creates a service that consults `active` before the network.
    pub fn with_active(source: S, active: A) -> Self {
        Self {
            cache: CatalogCache::new(Arc::new(source)),
            local: Arc::new(LocalOverride::new(active)),
        }
    }

    pub fn cache(&self) -> &CatalogCache<S> {
        &self.cache
    }

    /// Committed entry for `id`, priming it on first use.
    pub async fn ensure_loaded(&self, id: &str) -> PrimingResult {
        self.cache.ensure_loaded(id).await
    }

    /// Fetches an arbitrary page straight from the source.
    pub async fn fetch_page(
        &self,
        id: &str,
        request: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult, FetchError> {
        self.cache
            .source()
            .fetch_page(&DatasetId::new(id), request, cancel)
            .await
    }

    /// Drops the committed entry for `id`.
    pub fn invalidate(&self, id: &str) -> bool {
        self.cache.invalidate(id)
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.cache.stats()
    }

    /// Builds the view for one page of `id`.
    ///
    /// The base entry comes from the local override when it applies, else
    /// from the committed cache. The page itself is served without a network
    /// round-trip when it is the priming page, or when the entry is local and
    /// the request needs no filtering, searching or sorting. Anything else is
    /// fetched from the source under `cancel`.
    pub async fn load_view(
        &self,
        id: &str,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<CatalogView, FetchError> {
        let key = DatasetId::new(id);

        let (entry, local) = match self.local.try_resolve(id) {
            Some(entry) => (Arc::new(entry), true),
            None => (self.cache.ensure_loaded(id).await?, false),
        };
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let (page, source) = if request.is_priming() {
            let total = if local {
                entry.records.len() as u64
            } else {
                entry.total_rows
            };
            let source = if local {
                ViewSource::LocalOverride
            } else {
                ViewSource::Cache
            };
            (first_page(&entry, request.limit, total), source)
        } else if local && !request.has_client_ops() {
            (
                PageResult::slice(&entry.records, request.page, request.limit),
                ViewSource::LocalOverride,
            )
        } else {
            let page = self
                .cache
                .source()
                .fetch_page(&key, request, Some(cancel))
                .await?;
            (page, ViewSource::Remote)
        };

        let page = match &request.columns {
            Some(columns) if source != ViewSource::Remote => project(page, columns),
            _ => page,
        };
        let columns = request
            .columns
            .clone()
            .unwrap_or_else(|| entry.columns.clone());

        debug!(
            dataset = %key,
            page = request.page,
            rows = page.rows.len(),
            source = %source,
            "View loaded"
        );

        Ok(CatalogView {
            dataset: key,
            columns,
            descriptor: entry.descriptor.clone(),
            total_rows: entry.total_rows,
            page_number: request.page,
            page,
            source,
        })
    }
}

impl<S: CatalogSource, A: ActiveDatasetSource> ViewLoader for CatalogService<S, A> {
    async fn load_view(
        &self,
        id: &str,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<CatalogView, FetchError> {
        CatalogService::load_view(self, id, request, cancel).await
    }
}

fn first_page(entry: &CommittedEntry, limit: u32, total: u64) -> PageResult {
    let rows: Vec<Record> = entry.records.iter().take(limit as usize).cloned().collect();
    let pagination = Pagination::from_totals(1, limit, total, rows.len());
    PageResult { rows, pagination }
}

fn project(page: PageResult, columns: &[String]) -> PageResult {
    let rows = page
        .rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .filter_map(|c| record.get(c).map(|v| (c.clone(), v.clone())))
                .collect::<Record>()
        })
        .collect();
    PageResult {
        rows,
        pagination: page.pagination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::ActiveDataset;
    use crate::query::SortOrder;
    use crate::remote::MockCatalogSource;

    fn service(source: &MockCatalogSource) -> CatalogService<MockCatalogSource> {
        CatalogService::new(source.clone())
    }

    #[tokio::test]
    async fn test_priming_view_served_from_cache() {
        let source = MockCatalogSource::with_rows(30);
        let service = service(&source);

        let view = service
            .load_view("catalogs/x", &PageRequest::priming(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(view.source, ViewSource::Cache);
        assert_eq!(view.rows().len(), 30);
        assert_eq!(view.columns, vec!["id", "mag"]);
        assert_eq!(view.dataset.as_str(), "x");
        // Only the priming page was fetched.
        assert_eq!(source.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_other_pages_go_to_remote() {
        let source = MockCatalogSource::with_rows(30);
        let service = service(&source);

        let view = service
            .load_view("x", &PageRequest::new(2, 10), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(view.source, ViewSource::Remote);
        assert_eq!(view.page_number, 2);
        assert_eq!(view.page.pagination.showing_start, 11);
        assert_eq!(source.page_calls(), 2);
        assert_eq!(source.descriptor_calls(), 1);
    }

    #[tokio::test]
    async fn test_local_override_slices_in_memory() {
        let source = MockCatalogSource::with_rows(30);
        let active = SharedActiveDataset::new();
        let records: Vec<Record> = (0..25)
            .map(|i| Record::new().with("id", i as i64).with("flagged", true))
            .collect();
        active.set(ActiveDataset::new("x", records));
        let service = CatalogService::with_active(source.clone(), active);

        let view = service
            .load_view(
                "catalogs/x",
                &PageRequest::new(3, 10).with_columns(["id"]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(view.source, ViewSource::LocalOverride);
        assert_eq!(view.page_number, 3);
        assert_eq!(view.rows().len(), 5);
        assert_eq!(view.rows()[0].keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(view.columns, vec!["id"]);
        assert_eq!(source.descriptor_calls(), 0);
        assert_eq!(source.page_calls(), 0);
        // Never promoted to the committed cache.
        assert!(service.cache().cached("x").is_none());
    }

    #[tokio::test]
    async fn test_local_override_with_sort_goes_to_remote() {
        let source = MockCatalogSource::with_rows(30);
        let active = SharedActiveDataset::new();
        active.set(ActiveDataset::new("x", vec![Record::new().with("id", 1i64)]));
        let service = CatalogService::with_active(source.clone(), active);

        let request = PageRequest::new(1, 10).with_sort("mag", SortOrder::Desc);
        let view = service
            .load_view("x", &request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(view.source, ViewSource::Remote);
        assert_eq!(source.descriptor_calls(), 0);
        assert_eq!(source.page_calls(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_yields_cancelled() {
        let source = MockCatalogSource::with_rows(30);
        let service = service(&source);
        let token = CancellationToken::new();
        token.cancel();

        let err = service
            .load_view("x", &PageRequest::new(2, 10), &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        // The shared entry is still committed for other callers.
        assert!(service.cache().cached("x").is_some());
    }

    #[tokio::test]
    async fn test_fetch_page_normalizes_id() {
        let source = MockCatalogSource::with_rows(3);
        let service = service(&source);

        service
            .fetch_page("catalogs/x", &PageRequest::new(1, 2), None)
            .await
            .unwrap();

        assert_eq!(source.page_requests()[0].0.as_str(), "x");
    }
}

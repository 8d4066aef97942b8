//! Page fetching and decoding.

use super::decode::PageDecoder;
use super::endpoints::Endpoints;
use super::http::AsyncHttpClient;
use super::types::FetchError;
use crate::dataset::DatasetId;
use crate::query::{PageRequest, PageResult, Pagination};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

/// Fetches one page of binary-encoded rows and decodes it.
#[derive(Clone)]
pub struct PageFetcher<C, D> {
    http: C,
    endpoints: Endpoints,
    decoder: D,
}

impl<C: AsyncHttpClient, D: PageDecoder> PageFetcher<C, D> {
    pub fn new(http: C, endpoints: Endpoints, decoder: D) -> Self {
        Self {
            http,
            endpoints,
            decoder,
        }
    }

    /// Fetches and decodes one page.
    ///
    /// The cancellation token is observed before the request is sent and
    /// again once the response arrives. A cancelled fetch returns
    /// [`FetchError::Cancelled`]; the bytes already in flight are discarded,
    /// the transport is not aborted.
    pub async fn fetch(
        &self,
        id: &DatasetId,
        request: &PageRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<PageResult, FetchError> {
        if is_cancelled(cancel) {
            return Err(FetchError::Cancelled);
        }

        let url = self.endpoints.rows_url(id, request);
        let effective_limit = request.effective_limit();
        if effective_limit != request.limit {
            debug!(
                dataset = %id,
                requested = request.limit,
                effective = effective_limit,
                "Page size clamped for filtered/searched/sorted request"
            );
        }
        debug!(dataset = %id, page = request.page, url = %url, "Fetching page");

        let result = self.http.get(url.as_str()).await;

        if is_cancelled(cancel) {
            debug!(dataset = %id, page = request.page, "Page fetch superseded, discarding result");
            return Err(FetchError::Cancelled);
        }

        let response = result?;
        if !response.is_success() {
            let message = response.error_message();
            warn!(
                dataset = %id,
                page = request.page,
                status = response.status,
                message = %message,
                "Page fetch failed"
            );
            return Err(FetchError::Page {
                status: response.status,
                message,
            });
        }

        let decoded = self
            .decoder
            .decode(&response.body)?
            .ok_or_else(|| FetchError::Decode("payload contains no row data".to_string()))?;

        let pagination = decoded.pagination.unwrap_or_else(|| {
            let seen = u64::from(request.page.saturating_sub(1)) * u64::from(effective_limit)
                + decoded.rows.len() as u64;
            Pagination::from_totals(
                request.page,
                effective_limit,
                decoded.total_items.unwrap_or(seen),
                decoded.rows.len(),
            )
        });

        debug!(
            dataset = %id,
            page = request.page,
            rows = decoded.rows.len(),
            total_items = pagination.total_items,
            "Page decoded"
        );

        Ok(PageResult {
            rows: decoded.rows,
            pagination,
        })
    }
}

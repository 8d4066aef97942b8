//! Page request parameters and the page-size clamp policy.

use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Upper bound on the page size when the request carries any filter,
/// search or sort. Not negotiable by the caller.
pub const CLIENT_EVAL_LIMIT: u32 = 500;

/// Page size used for the one-off priming fetch of a dataset.
pub const PRIMING_LIMIT: u32 = 500;

/// Structured filter predicates, sent to the remote as JSON.
pub type Filters = Map<String, JsonValue>;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}': expected asc or desc", other)),
        }
    }
}

/// Parameters for fetching one page of a dataset.
///
/// # Example
///
/// ```
/// use catloader::query::{PageRequest, SortOrder};
///
/// let request = PageRequest::new(2, 5000)
///     .with_search("M31")
///     .with_sort("mag", SortOrder::Desc);
///
/// // Search and sort are evaluated less efficiently by the remote,
/// // so the page size sent is capped.
/// assert_eq!(request.effective_limit(), 500);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Requested rows per page
    pub limit: u32,
    /// Optional column subset, in display order
    pub columns: Option<Vec<String>>,
    /// Optional server-side predicates
    pub filters: Option<Filters>,
    /// Optional free-text search
    pub search: Option<String>,
    /// Optional sort column
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl PageRequest {
    /// Creates a request for `page` with `limit` rows. Both are raised to 1
    /// if given as 0.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            columns: None,
            filters: None,
            search: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }

    /// The fixed request used to prime the committed cache.
    pub fn priming() -> Self {
        Self::new(1, PRIMING_LIMIT)
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds one filter predicate.
    pub fn with_filter(mut self, column: impl Into<String>, predicate: JsonValue) -> Self {
        self.filters
            .get_or_insert_with(Map::new)
            .insert(column.into(), predicate);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(column.into());
        self.sort_order = order;
        self
    }

    fn active_filters(&self) -> Option<&Filters> {
        self.filters.as_ref().filter(|f| !f.is_empty())
    }

    fn active_search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn active_sort(&self) -> Option<&str> {
        self.sort_by.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// True if the request implies filtering, searching or sorting.
    pub fn has_client_ops(&self) -> bool {
        self.active_filters().is_some()
            || self.active_search().is_some()
            || self.active_sort().is_some()
    }

    /// True if this is exactly the priming request.
    pub fn is_priming(&self) -> bool {
        self.page == 1
            && self.limit == PRIMING_LIMIT
            && self.columns.is_none()
            && !self.has_client_ops()
    }

    /// The page size actually sent to the remote.
    pub fn effective_limit(&self) -> u32 {
        if self.has_client_ops() {
            self.limit.min(CLIENT_EVAL_LIMIT)
        } else {
            self.limit
        }
    }

    /// Encodes the request as query parameters.
    ///
    /// Absent or empty optional fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.effective_limit().to_string()),
        ];

        if let Some(columns) = self.columns.as_ref().filter(|c| !c.is_empty()) {
            pairs.push(("columns", columns.join(",")));
        }
        if let Some(filters) = self.active_filters() {
            pairs.push(("filters", JsonValue::Object(filters.clone()).to_string()));
        }
        if let Some(search) = self.active_search() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(sort_by) = self.active_sort() {
            pairs.push(("sort_by", sort_by.to_string()));
        }
        pairs.push(("sort_order", self.sort_order.to_string()));

        pairs
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::priming()
    }
}

//! Page requests and page results.
//!
//! A [`PageRequest`] describes one page of a dataset (paging, column subset,
//! filters, search and sort); a [`PageResult`] is the decoded rows plus
//! [`Pagination`] metadata.

mod page;
mod request;

pub use page::{PageResult, Pagination};
pub use request::{Filters, PageRequest, SortOrder, CLIENT_EVAL_LIMIT, PRIMING_LIMIT};

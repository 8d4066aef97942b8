//! Common types and utilities shared across CLI commands.

use clap::Args;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

use catloader::dataset::{Record, Value};
use catloader::local::ActiveDataset;
use catloader::query::{PageRequest, SortOrder};
use catloader::service::CatalogView;

use crate::error::CliError;

/// Page selection arguments shared by `page` and `browse`.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Rows per page (capped at 500 when filtering, searching or sorting)
    #[arg(long, default_value = "50")]
    pub limit: u32,

    /// Comma-separated column subset
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Sort column
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Filter predicate as column=json (e.g. mag='{"lt": 12}'); repeatable
    #[arg(long = "filter")]
    pub filters: Vec<String>,
}

impl RequestArgs {
    /// Build the page request these arguments describe.
    pub fn to_request(&self) -> Result<PageRequest, CliError> {
        let mut request = PageRequest::new(self.page, self.limit);

        if let Some(columns) = &self.columns {
            request = request.with_columns(columns.iter().map(|c| c.trim()));
        }
        if let Some(search) = &self.search {
            request = request.with_search(search.as_str());
        }
        if let Some(sort) = &self.sort {
            let order = if self.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            request = request.with_sort(sort.as_str(), order);
        }
        for filter in &self.filters {
            let (column, predicate) = parse_filter(filter)?;
            request = request.with_filter(column, predicate);
        }

        Ok(request)
    }
}

/// Parse a `column=value` filter. The value is read as JSON, falling back
/// to a plain string.
pub fn parse_filter(raw: &str) -> Result<(String, JsonValue), CliError> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::Input(format!("filter '{}' is not column=value", raw)))?;

    let column = column.trim();
    if column.is_empty() {
        return Err(CliError::Input(format!("filter '{}' has no column", raw)));
    }

    let value = value.trim();
    let predicate =
        serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((column.to_string(), predicate))
}

/// Load a JSON array of flat objects as the locally held dataset `id`.
pub fn load_local_dataset(path: &Path, id: &str) -> Result<ActiveDataset, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::FileRead {
        path: path.display().to_string(),
        error: e,
    })?;
    let records = parse_records(&content)?;
    Ok(ActiveDataset::new(id, records))
}

/// Parse a JSON array of flat objects into records.
pub fn parse_records(content: &str) -> Result<Vec<Record>, CliError> {
    let rows: Vec<Map<String, JsonValue>> = serde_json::from_str(content)
        .map_err(|e| CliError::Input(format!("expected a JSON array of objects: {}", e)))?;

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.into_iter()
                .map(|(column, value)| {
                    serde_json::from_value::<Value>(value)
                        .map(|v| (column.clone(), v))
                        .map_err(|_| {
                            CliError::Input(format!(
                                "row {}: column '{}' is not a scalar value",
                                index + 1,
                                column
                            ))
                        })
                })
                .collect::<Result<Record, CliError>>()
        })
        .collect()
}

/// Print a view as JSON or as a plain text table.
pub fn print_view(view: &CatalogView, json: bool) -> Result<(), CliError> {
    if json {
        let out = serde_json::to_string_pretty(view)
            .map_err(|e| CliError::Input(format!("failed to encode view: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", view_header(view));
    println!();
    println!("{}", view.columns.join("\t"));
    for record in view.rows() {
        let cells: Vec<String> = view
            .columns
            .iter()
            .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("{}", cells.join("\t"));
    }

    Ok(())
}

/// Summary line naming the page the view's rows belong to.
fn view_header(view: &CatalogView) -> String {
    let pagination = &view.page.pagination;
    format!(
        "{} ({}): rows {}-{} of {}, page {} of {}",
        view.dataset,
        view.source,
        pagination.showing_start,
        pagination.showing_end,
        pagination.total_items,
        view.page_number,
        pagination.total_pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use catloader::dataset::{DatasetDescriptor, DatasetId};
    use catloader::query::PageResult;
    use catloader::service::ViewSource;

    #[test]
    fn test_parse_filter_json_and_plain() {
        let (column, predicate) = parse_filter(r#"mag={"lt": 12}"#).unwrap();
        assert_eq!(column, "mag");
        assert_eq!(predicate["lt"], 12);

        let (column, predicate) = parse_filter("type = galaxy").unwrap();
        assert_eq!(column, "type");
        assert_eq!(predicate, JsonValue::String("galaxy".to_string()));
    }

    #[test]
    fn test_parse_filter_rejects_malformed() {
        assert!(parse_filter("mag").is_err());
        assert!(parse_filter("=3").is_err());
    }

    #[test]
    fn test_parse_records() {
        let records = parse_records(r#"[{"id": 1, "name": "M31", "mag": 3.4, "x": null}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(records[0].get("name"), Some(&Value::Text("M31".to_string())));
        assert!(records[0].get("x").unwrap().is_null());
    }

    #[test]
    fn test_view_header_uses_page_of_view() {
        let records: Vec<Record> = (0..25i64).map(|i| Record::new().with("id", i)).collect();
        let view = CatalogView {
            dataset: DatasetId::new("catalogs/a.fits"),
            columns: vec!["id".to_string()],
            descriptor: DatasetDescriptor::default(),
            total_rows: 25,
            page_number: 2,
            page: PageResult::slice(&records, 2, 10),
            source: ViewSource::LocalOverride,
        };

        assert_eq!(
            view_header(&view),
            "a.fits (local override): rows 11-20 of 25, page 2 of 3"
        );
    }

    #[test]
    fn test_parse_records_rejects_nested_values() {
        assert!(parse_records(r#"[{"id": [1, 2]}]"#).is_err());
        assert!(parse_records(r#"{"id": 1}"#).is_err());
    }

    #[test]
    fn test_request_args_build_request() {
        let args = RequestArgs {
            page: 3,
            limit: 1000,
            columns: Some(vec!["ra".to_string(), " dec".to_string()]),
            search: None,
            sort: Some("mag".to_string()),
            desc: true,
            filters: vec!["mag=12".to_string()],
        };

        let request = args.to_request().unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.effective_limit(), 500);
        assert_eq!(request.sort_order, SortOrder::Desc);
        assert_eq!(
            request.columns,
            Some(vec!["ra".to_string(), "dec".to_string()])
        );
    }
}

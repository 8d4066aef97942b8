//! Binary page payload decoding.
//!
//! The page endpoint returns an opaque binary payload. Decoding is behind the
//! [`PageDecoder`] trait; [`CborPageDecoder`] handles the CBOR layout served
//! by the catalog backend, in either orientation:
//!
//! ```text
//! row-oriented                      column-oriented
//! {                                 {
//!   "rows": [ {"ra": 1.0, ..}, .. ],  "columns": ["ra", "dec", ..],
//!   "total_items": 120000,            "data": [[1.0, 2.0, ..], ..],
//!   "pagination": { .. }              "total_items": 120000
//! }                                 }
//! ```
//!
//! `total_items` and `pagination` are optional.

use super::types::FetchError;
use crate::dataset::{Record, Value};
use crate::query::Pagination;
use ciborium::value::Value as Cbor;

/// Rows and optional totals extracted from one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPage {
    pub rows: Vec<Record>,
    pub total_items: Option<u64>,
    pub pagination: Option<Pagination>,
}

/// Decodes a binary page payload.
pub trait PageDecoder: Send + Sync + 'static {
    /// Returns `Ok(None)` when the payload is well-formed but carries no
    /// usable row structure; malformed payloads are errors.
    fn decode(&self, payload: &[u8]) -> Result<Option<DecodedPage>, FetchError>;
}

/// Decoder for CBOR page payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborPageDecoder;

impl PageDecoder for CborPageDecoder {
    fn decode(&self, payload: &[u8]) -> Result<Option<DecodedPage>, FetchError> {
        let root: Cbor =
            ciborium::from_reader(payload).map_err(|e| FetchError::Decode(e.to_string()))?;

        let Cbor::Map(entries) = root else {
            return Ok(None);
        };

        let rows = match field(&entries, "rows") {
            Some(Cbor::Array(rows)) => row_oriented(rows),
            _ => match (field(&entries, "columns"), field(&entries, "data")) {
                (Some(Cbor::Array(columns)), Some(Cbor::Array(data))) => {
                    column_oriented(columns, data)
                }
                _ => None,
            },
        };
        let Some(rows) = rows else {
            return Ok(None);
        };

        let total_items = field(&entries, "total_items")
            .or_else(|| field(&entries, "total"))
            .and_then(as_u64);
        let pagination = match field(&entries, "pagination") {
            Some(Cbor::Map(p)) => Some(pagination(p)),
            _ => None,
        };

        Ok(Some(DecodedPage {
            rows,
            total_items,
            pagination,
        }))
    }
}

fn field<'a>(entries: &'a [(Cbor, Cbor)], name: &str) -> Option<&'a Cbor> {
    entries.iter().find_map(|(k, v)| match k {
        Cbor::Text(key) if key == name => Some(v),
        _ => None,
    })
}

fn row_oriented(rows: &[Cbor]) -> Option<Vec<Record>> {
    rows.iter()
        .map(|row| match row {
            Cbor::Map(cells) => Some(
                cells
                    .iter()
                    .filter_map(|(k, v)| match k {
                        Cbor::Text(name) => Some((name.clone(), scalar(v))),
                        _ => None,
                    })
                    .collect::<Record>(),
            ),
            _ => None,
        })
        .collect()
}

fn column_oriented(columns: &[Cbor], data: &[Cbor]) -> Option<Vec<Record>> {
    let names: Vec<&str> = columns
        .iter()
        .map(|c| match c {
            Cbor::Text(name) => Some(name.as_str()),
            _ => None,
        })
        .collect::<Option<_>>()?;

    data.iter()
        .map(|row| match row {
            Cbor::Array(cells) => Some(
                names
                    .iter()
                    .zip(cells.iter().map(Some).chain(std::iter::repeat(None)))
                    .map(|(name, cell)| {
                        (name.to_string(), cell.map(scalar).unwrap_or(Value::Null))
                    })
                    .collect::<Record>(),
            ),
            _ => None,
        })
        .collect()
}

fn scalar(value: &Cbor) -> Value {
    match value {
        Cbor::Null => Value::Null,
        Cbor::Bool(b) => Value::Bool(*b),
        Cbor::Integer(i) => match i64::try_from(*i) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Float(i128::from(*i) as f64),
        },
        Cbor::Float(f) if f.is_nan() => Value::Null,
        Cbor::Float(f) => Value::Float(*f),
        Cbor::Text(s) => Value::Text(s.clone()),
        Cbor::Tag(_, inner) => scalar(inner),
        _ => Value::Null,
    }
}

fn as_u64(value: &Cbor) -> Option<u64> {
    match value {
        Cbor::Integer(i) => u64::try_from(*i).ok(),
        Cbor::Float(f) if *f >= 0.0 => Some(*f as u64),
        _ => None,
    }
}

fn as_bool(value: &Cbor) -> Option<bool> {
    match value {
        Cbor::Bool(b) => Some(*b),
        _ => None,
    }
}

fn pagination(entries: &[(Cbor, Cbor)]) -> Pagination {
    let num = |name: &str| field(entries, name).and_then(as_u64).unwrap_or(0);
    let flag = |name: &str| field(entries, name).and_then(as_bool).unwrap_or(false);
    Pagination {
        total_items: num("total_items"),
        total_pages: num("total_pages"),
        showing_start: num("showing_start"),
        showing_end: num("showing_end"),
        has_prev: flag("has_prev"),
        has_next: flag("has_next"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Encodes a JSON document as CBOR, the way the backend would.
    pub(crate) fn cbor(doc: serde_json::Value) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(&doc, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_row_oriented_payload() {
        let payload = cbor(json!({
            "rows": [
                {"source_id": 1, "mag": 12.5, "name": "a", "variable": true},
                {"source_id": 2, "mag": null, "name": "b", "variable": false}
            ],
            "total_items": 1200
        }));

        let page = CborPageDecoder.decode(&payload).unwrap().unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].get("mag"), Some(&Value::Float(12.5)));
        assert_eq!(page.rows[0].get("variable"), Some(&Value::Bool(true)));
        assert!(page.rows[1].get("mag").unwrap().is_null());
        assert_eq!(page.total_items, Some(1200));
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_column_oriented_payload() {
        let payload = cbor(json!({
            "columns": ["ra", "dec", "name"],
            "data": [[10.5, -3.25, "x"], [11.0, 4.0]]
        }));

        let page = CborPageDecoder.decode(&payload).unwrap().unwrap();
        assert_eq!(page.rows.len(), 2);
        let keys: Vec<_> = page.rows[0].keys().collect();
        assert_eq!(keys, vec!["ra", "dec", "name"]);
        // Short rows are padded with nulls.
        assert!(page.rows[1].get("name").unwrap().is_null());
    }

    #[test]
    fn test_pagination_block() {
        let payload = cbor(json!({
            "rows": [],
            "pagination": {
                "total_items": 40, "total_pages": 4,
                "showing_start": 11, "showing_end": 20,
                "has_prev": true, "has_next": true
            }
        }));

        let page = CborPageDecoder.decode(&payload).unwrap().unwrap();
        let p = page.pagination.unwrap();
        assert_eq!(p.total_pages, 4);
        assert_eq!((p.showing_start, p.showing_end), (11, 20));
        assert!(p.has_prev && p.has_next);
    }

    #[test]
    fn test_payload_without_rows_is_unusable() {
        let payload = cbor(json!({"status": "ok"}));
        assert_eq!(CborPageDecoder.decode(&payload).unwrap(), None);

        let payload = cbor(json!([1, 2, 3]));
        assert_eq!(CborPageDecoder.decode(&payload).unwrap(), None);

        let payload = cbor(json!({"rows": [1, 2]}));
        assert_eq!(CborPageDecoder.decode(&payload).unwrap(), None);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = CborPageDecoder.decode(&[0xff, 0x00, 0x13]);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}

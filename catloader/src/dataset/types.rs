//! Decoded catalog data: scalar values, records and column metadata.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the dtype this value implies when no descriptor is available.
    fn inferred_dtype(&self) -> Option<&'static str> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some("bool"),
            Value::Integer(_) => Some("int64"),
            Value::Float(_) => Some("float64"),
            Value::Text(_) => Some("str"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(""),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One decoded row: column name to value.
///
/// Lookup is by name. Fields keep the order they were decoded in, which is
/// what the column fallback in [`CommittedEntry::from_fetch`] relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value for the same column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Builder-style [`Record::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the value for a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Column names in decoded order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(column, value)` pairs in decoded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Metadata for a single column.
///
/// When a payload omits `is_numeric` or `is_boolean`, they are inferred from
/// `dtype` the same way [`ColumnMeta::new`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColumnMetaWire")]
pub struct ColumnMeta {
    pub name: String,
    pub dtype: String,
    pub unit: Option<String>,
    pub is_numeric: bool,
    pub is_boolean: bool,
}

#[derive(Deserialize)]
struct ColumnMetaWire {
    name: String,
    #[serde(default = "unknown_dtype")]
    dtype: String,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    is_numeric: Option<bool>,
    #[serde(default)]
    is_boolean: Option<bool>,
}

impl From<ColumnMetaWire> for ColumnMeta {
    fn from(wire: ColumnMetaWire) -> Self {
        let inferred = ColumnMeta::new(wire.name, wire.dtype);
        Self {
            unit: wire.unit,
            is_numeric: wire.is_numeric.unwrap_or(inferred.is_numeric),
            is_boolean: wire.is_boolean.unwrap_or(inferred.is_boolean),
            ..inferred
        }
    }
}

fn unknown_dtype() -> String {
    "unknown".to_string()
}

impl ColumnMeta {
    /// Creates column metadata with the given dtype and no unit.
    pub fn new(name: impl Into<String>, dtype: impl Into<String>) -> Self {
        let dtype = dtype.into();
        let is_boolean = dtype == "bool";
        let is_numeric = dtype.starts_with("int")
            || dtype.starts_with("uint")
            || dtype.starts_with("float");
        Self {
            name: name.into(),
            dtype,
            unit: None,
            is_numeric,
            is_boolean,
        }
    }

    /// Sets the physical unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Dataset-level metadata.
///
/// Immutable once built. A later fetch replaces it, it is never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetDescriptor {
    pub total_rows: u64,
    pub total_columns: u64,
    pub columns: Vec<ColumnMeta>,
}

impl DatasetDescriptor {
    /// Creates a descriptor. `total_columns` follows the column list.
    pub fn new(total_rows: u64, columns: Vec<ColumnMeta>) -> Self {
        Self {
            total_rows,
            total_columns: columns.len() as u64,
            columns,
        }
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Derives a descriptor from already-decoded records.
    ///
    /// Column names come from the first record; each dtype is inferred from
    /// the first non-null value in that column.
    pub fn from_records(records: &[Record]) -> Self {
        let columns = records
            .first()
            .map(|first| {
                first
                    .keys()
                    .map(|name| {
                        let dtype = records
                            .iter()
                            .filter_map(|r| r.get(name))
                            .find_map(Value::inferred_dtype)
                            .unwrap_or("unknown");
                        ColumnMeta::new(name, dtype)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self::new(records.len() as u64, columns)
    }
}

/// The unit stored in the committed cache and handed to callers.
///
/// Records are shared, so an entry built from an in-memory dataset does not
/// copy its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEntry {
    pub descriptor: DatasetDescriptor,
    pub records: Arc<Vec<Record>>,
    pub columns: Vec<String>,
    pub total_rows: u64,
    pub total_columns: u64,
}

impl CommittedEntry {
    /// Builds an entry from a descriptor and the decoded priming rows.
    ///
    /// Columns come from the descriptor when it lists any, otherwise from the
    /// keys of the first record. `total_rows_hint` is used when the
    /// descriptor reports no rows (e.g. a page-level total).
    pub fn from_fetch(
        descriptor: DatasetDescriptor,
        records: impl Into<Arc<Vec<Record>>>,
        total_rows_hint: u64,
    ) -> Self {
        let records = records.into();
        let columns = if descriptor.columns.is_empty() {
            records
                .first()
                .map(|r| r.keys().map(str::to_string).collect())
                .unwrap_or_default()
        } else {
            descriptor.column_names()
        };

        let total_rows = if descriptor.total_rows > 0 {
            descriptor.total_rows
        } else {
            total_rows_hint.max(records.len() as u64)
        };
        let total_columns = if descriptor.total_columns > 0 {
            descriptor.total_columns
        } else {
            columns.len() as u64
        };

        Self {
            descriptor,
            records,
            columns,
            total_rows,
            total_columns,
        }
    }
}

//! Dataset identifier normalization.
//!
//! Callers refer to the same catalog with or without its storage-location
//! prefix (`catalogs/foo.fits` and `foo.fits`). Every cache key is built from
//! the normalized form so both spellings share one entry.

use serde::Serialize;
use std::fmt;

/// Storage-location prefix stripped during normalization.
pub const STORAGE_PREFIX: &str = "catalogs/";

/// Canonicalizes a dataset identifier.
///
/// Strips a leading [`STORAGE_PREFIX`] if present and returns the rest
/// unchanged. A repeated prefix is stripped as a whole so the result is
/// always a fixed point. Never fails.
///
/// # Example
///
/// ```
/// use catloader::dataset::normalize;
///
/// assert_eq!(normalize("catalogs/foo.fits"), "foo.fits");
/// assert_eq!(normalize("foo.fits"), "foo.fits");
/// ```
pub fn normalize(id: &str) -> &str {
    id.trim_start_matches(STORAGE_PREFIX)
}

/// Returns true if both identifiers refer to the same dataset.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// A normalized dataset identifier, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    /// Creates a dataset id from any caller-supplied spelling.
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw).to_string())
    }

    /// Returns the normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for DatasetId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_storage_prefix() {
        assert_eq!(normalize("catalogs/foo.fits"), "foo.fits");
        assert_eq!(normalize("foo.fits"), "foo.fits");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "catalogs/foo.fits",
            "foo.fits",
            "catalogs/catalogs/nested.fits",
            "",
            "catalogs/",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_repeated_prefix_collapses() {
        assert_eq!(normalize("catalogs/catalogs/nested.fits"), "nested.fits");
        assert_eq!(normalize("catalogs/"), "");
    }

    #[test]
    fn test_prefix_must_be_leading() {
        assert_eq!(normalize("data/catalogs/foo.fits"), "data/catalogs/foo.fits");
        assert_eq!(normalize("catalogsfoo"), "catalogsfoo");
    }

    #[test]
    fn test_equivalent_spellings() {
        assert!(equivalent("catalogs/a", "a"));
        assert!(equivalent("a", "a"));
        assert!(!equivalent("a", "b"));
    }

    #[test]
    fn test_dataset_id_uses_normalized_form() {
        let a = DatasetId::new("catalogs/gaia.fits");
        let b = DatasetId::from("gaia.fits");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "gaia.fits");
        assert_eq!(a.to_string(), "gaia.fits");
    }
}

//! Validation limits
//!
//! Every bound the validator enforces lives here. The `DEFAULT_*` constants
//! are the engine's fixed limits and the only ones the library uses on its
//! own. [`QueryLimits::from_env`] is an explicit opt-in for a binary that
//! wants `CAT_SEARCH_*` overrides; nothing in this crate calls it.

use serde::{Deserialize, Serialize};

/// Maximum number of coordinate pairs in a geometry
pub const DEFAULT_COORDINATES_SIZE: usize = 10;
/// Maximum digits after the decimal point in a coordinate
pub const DEFAULT_COORDINATES_PRECISION: u32 = 6;
/// Maximum `maxDistance` in metres for a Point search
pub const DEFAULT_MAXDISTANCE_LIMIT: i64 = 10_000;
/// Maximum length of the free-text `q` value
pub const DEFAULT_STRING_SIZE: usize = 100;
/// Maximum number of `property` entries
pub const DEFAULT_PROPERTY_SIZE: usize = 4;
/// Maximum number of `value` groups, and of values within one group
pub const DEFAULT_VALUE_SIZE: usize = 4;
/// Maximum number of `filter` fields
pub const DEFAULT_FILTER_VALUE_SIZE: usize = 10;
/// Maximum length of the `instance` value
pub const DEFAULT_INSTANCE_SIZE: usize = 100;
/// Maximum `limit + offset`
pub const DEFAULT_MAX_RESULT_WINDOW: i64 = 10_000;

pub const COORDINATES_SIZE_ENV: &str = "CAT_SEARCH_COORDINATES_SIZE";
pub const COORDINATES_PRECISION_ENV: &str = "CAT_SEARCH_COORDINATES_PRECISION";
pub const MAXDISTANCE_LIMIT_ENV: &str = "CAT_SEARCH_MAXDISTANCE_LIMIT";
pub const STRING_SIZE_ENV: &str = "CAT_SEARCH_STRING_SIZE";
pub const PROPERTY_SIZE_ENV: &str = "CAT_SEARCH_PROPERTY_SIZE";
pub const VALUE_SIZE_ENV: &str = "CAT_SEARCH_VALUE_SIZE";
pub const FILTER_VALUE_SIZE_ENV: &str = "CAT_SEARCH_FILTER_VALUE_SIZE";
pub const INSTANCE_SIZE_ENV: &str = "CAT_SEARCH_INSTANCE_SIZE";
pub const MAX_RESULT_WINDOW_ENV: &str = "CAT_SEARCH_MAX_RESULT_WINDOW";

/// Bounds applied by [`crate::validator::QueryValidator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub coordinates_size: usize,
    pub coordinates_precision: u32,
    pub max_distance_limit: i64,
    pub string_size: usize,
    pub property_size: usize,
    pub value_size: usize,
    pub filter_value_size: usize,
    pub instance_size: usize,
    pub max_result_window: i64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            coordinates_size: DEFAULT_COORDINATES_SIZE,
            coordinates_precision: DEFAULT_COORDINATES_PRECISION,
            max_distance_limit: DEFAULT_MAXDISTANCE_LIMIT,
            string_size: DEFAULT_STRING_SIZE,
            property_size: DEFAULT_PROPERTY_SIZE,
            value_size: DEFAULT_VALUE_SIZE,
            filter_value_size: DEFAULT_FILTER_VALUE_SIZE,
            instance_size: DEFAULT_INSTANCE_SIZE,
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
        }
    }
}

impl QueryLimits {
    /// Defaults overlaid with any `CAT_SEARCH_*` environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading values through `lookup`.
    ///
    /// Missing, blank, or unparsable values keep the default.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            coordinates_size: parsed(&lookup, COORDINATES_SIZE_ENV, d.coordinates_size),
            coordinates_precision: parsed(
                &lookup,
                COORDINATES_PRECISION_ENV,
                d.coordinates_precision,
            ),
            max_distance_limit: parsed(&lookup, MAXDISTANCE_LIMIT_ENV, d.max_distance_limit),
            string_size: parsed(&lookup, STRING_SIZE_ENV, d.string_size),
            property_size: parsed(&lookup, PROPERTY_SIZE_ENV, d.property_size),
            value_size: parsed(&lookup, VALUE_SIZE_ENV, d.value_size),
            filter_value_size: parsed(&lookup, FILTER_VALUE_SIZE_ENV, d.filter_value_size),
            instance_size: parsed(&lookup, INSTANCE_SIZE_ENV, d.instance_size),
            max_result_window: parsed(&lookup, MAX_RESULT_WINDOW_ENV, d.max_result_window),
        }
    }

    /// Set the result window
    #[must_use]
    pub const fn with_max_result_window(mut self, window: i64) -> Self {
        self.max_result_window = window;
        self
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        })
        .unwrap_or(default)
}

//! Structured query model
//!
//! [`StructuredQuery`] is what the mapper builds from raw request parameters,
//! the classifier annotates with facets, and the validator reads. It is
//! handed downstream as JSON via [`StructuredQuery::to_json`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::facets::{Facet, FacetSet};
use crate::value::ParamValue;

/// Well-known request parameter names
pub mod keys {
    pub const COORDINATES: &str = "coordinates";
    pub const OFFSET: &str = "offset";
    pub const LIMIT: &str = "limit";
    pub const MAX_DISTANCE: &str = "maxDistance";
    pub const Q: &str = "q";
    pub const GEOMETRY: &str = "geometry";
    pub const TIME_REL: &str = "timeRel";
    pub const TIME: &str = "time";
    pub const END_TIME: &str = "endTime";
    pub const RANGE_REL: &str = "rangeRel";
    pub const RANGE: &str = "range";
    pub const END_RANGE: &str = "endRange";
    pub const ATTRIBUTE: &str = "attribute";
    pub const PROPERTY: &str = "property";
    pub const VALUE: &str = "value";
    pub const FILTER: &str = "filter";
    pub const INSTANCE: &str = "instance";
    /// Field carrying the facet tags in the downstream JSON
    pub const SEARCH_TYPE: &str = "searchType";

    /// Keys whose values are never token-quoted; all but `q` coerce to integer
    /// when given as a plain scalar.
    pub const EXCEPTION_KEYS: &[&str] = &[COORDINATES, OFFSET, LIMIT, MAX_DISTANCE, Q];

    #[must_use]
    pub fn is_exception(key: &str) -> bool {
        EXCEPTION_KEYS.contains(&key)
    }
}

/// Declared geometry of a geo search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geometry {
    Point,
    Polygon,
    LineString,
    Bbox,
}

impl Geometry {
    /// `Point`, `Polygon`, `LineString` match case-insensitively; `bbox` is exact.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("Point") {
            Some(Self::Point)
        } else if raw.eq_ignore_ascii_case("Polygon") {
            Some(Self::Polygon)
        } else if raw.eq_ignore_ascii_case("LineString") {
            Some(Self::LineString)
        } else if raw == "bbox" {
            Some(Self::Bbox)
        } else {
            None
        }
    }

    /// Bracket depth a coordinate array for this geometry must have
    #[must_use]
    pub const fn coordinate_depth(self) -> usize {
        match self {
            Self::Point => 1,
            Self::LineString | Self::Bbox => 2,
            Self::Polygon => 3,
        }
    }
}

/// Value of `timeRel` / `rangeRel`, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    During,
    Between,
    Before,
    After,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    /// Anything else; carried through without further checks
    Other,
}

impl Relation {
    const NAMES: [(&'static str, Self); 8] = [
        ("during", Self::During),
        ("between", Self::Between),
        ("before", Self::Before),
        ("after", Self::After),
        ("lessThan", Self::LessThan),
        ("greaterThan", Self::GreaterThan),
        ("lessThanEquals", Self::LessThanEquals),
        ("greaterThanEquals", Self::GreaterThanEquals),
    ];

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::NAMES
            .iter()
            .find(|(name, _)| raw.eq_ignore_ascii_case(name))
            .map_or(Self::Other, |(_, rel)| *rel)
    }

    /// `during` or `between`: needs both a start and an end bound
    #[must_use]
    pub const fn is_interval(self) -> bool {
        matches!(self, Self::During | Self::Between)
    }
}

/// The typed form of one request's parameters plus its facets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    params: IndexMap<String, ParamValue>,
    #[serde(default)]
    facets: FacetSet,
}

impl StructuredQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Set a parameter, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Scalar value of `key`, if present and a scalar
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Parameters in insertion order
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub const fn facets(&self) -> &FacetSet {
        &self.facets
    }

    pub const fn facets_mut(&mut self) -> &mut FacetSet {
        &mut self.facets
    }

    #[must_use]
    pub fn has_facet(&self, facet: Facet) -> bool {
        self.facets.contains(facet)
    }

    /// The object handed to the index query builder: every parameter plus
    /// `searchType` when any facet applies.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.params.len() + 1);
        for (key, value) in &self.params {
            map.insert(key.clone(), value.to_json());
        }
        if !self.facets.is_empty() {
            map.insert(
                keys::SEARCH_TYPE.to_string(),
                serde_json::Value::String(self.facets.search_type()),
            );
        }
        serde_json::Value::Object(map)
    }
}

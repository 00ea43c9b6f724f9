//! Search facets and the classifier
//!
//! A query may belong to several facets at once. [`classify`] looks only at
//! which parameter keys are present; it never fails and never duplicates a
//! facet, so classifying twice is harmless.

use serde::{Deserialize, Serialize};

use crate::query::{StructuredQuery, keys};

/// One search dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Temporal,
    Range,
    Geo,
    Text,
    Attribute,
    ResponseFilter,
}

impl Facet {
    /// Classification order
    pub const ALL: [Self; 6] = [
        Self::Temporal,
        Self::Range,
        Self::Geo,
        Self::Text,
        Self::Attribute,
        Self::ResponseFilter,
    ];

    /// Tag fragment used in the downstream `searchType` string
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Temporal => "temporalSearch_",
            Self::Range => "rangeSearch_",
            Self::Geo => "geoSearch_",
            Self::Text => "textSearch_",
            Self::Attribute => "attributeSearch_",
            Self::ResponseFilter => "responseFilter_",
        }
    }

    /// Parameter whose presence puts a query in this facet
    #[must_use]
    pub const fn trigger_key(self) -> &'static str {
        match self {
            Self::Temporal => keys::TIME_REL,
            Self::Range => keys::RANGE_REL,
            Self::Geo => keys::GEOMETRY,
            Self::Text => keys::Q,
            // tag/value searches are attribute searches keyed by `property`
            Self::Attribute => keys::PROPERTY,
            Self::ResponseFilter => keys::FILTER,
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag().trim_end_matches('_'))
    }
}

/// Insertion-ordered set of facets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSet(Vec<Facet>);

impl FacetSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a facet; returns `false` if it was already present.
    pub fn insert(&mut self, facet: Facet) -> bool {
        if self.contains(facet) {
            return false;
        }
        self.0.push(facet);
        true
    }

    #[must_use]
    pub fn contains(&self, facet: Facet) -> bool {
        self.0.contains(&facet)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Facet> + '_ {
        self.0.iter().copied()
    }

    /// Concatenated tags, e.g. `temporalSearch_geoSearch_`
    #[must_use]
    pub fn search_type(&self) -> String {
        self.0.iter().map(|f| f.tag()).collect()
    }
}

impl FromIterator<Facet> for FacetSet {
    fn from_iter<I: IntoIterator<Item = Facet>>(iter: I) -> Self {
        let mut set = Self::new();
        for facet in iter {
            set.insert(facet);
        }
        set
    }
}

/// Record every facet whose trigger parameter is present.
pub fn classify(query: &mut StructuredQuery) {
    for facet in Facet::ALL {
        if query.contains(facet.trigger_key()) {
            query.facets_mut().insert(facet);
        }
    }
    tracing::debug!(search_type = %query.facets().search_type(), "query classified");
}

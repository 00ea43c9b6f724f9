//! Engine facade and the downstream hand-off seam
//!
//! [`QueryEngine`] runs the whole request pipeline: map raw parameters,
//! classify facets, validate. A query that passes is handed to a
//! [`QueryBuilder`], the trait the search-index query builder implements.

use crate::error::MappingResult;
use crate::limits::QueryLimits;
use crate::mapper::map_params;
use crate::query::StructuredQuery;
use crate::validator::QueryValidator;
use crate::verdict::{Failure, Verdict};

/// Builds a backend query from a validated [`StructuredQuery`].
///
/// The engine never calls a builder with a query that failed validation.
pub trait QueryBuilder {
    type Output;
    type Error: std::error::Error;

    /// Build the index query.
    ///
    /// # Errors
    /// Whatever the backend considers unbuildable.
    fn build(&self, query: &StructuredQuery) -> Result<Self::Output, Self::Error>;
}

/// Why [`QueryEngine::dispatch`] produced no backend query
#[derive(Debug, thiserror::Error)]
pub enum DispatchError<E: std::error::Error + 'static> {
    /// Mapping or validation rejected the request
    #[error("request rejected: {0}")]
    Rejected(Failure),

    /// The builder failed on a valid query
    #[error("query builder failed: {0}")]
    Builder(#[source] E),
}

impl<E: std::error::Error + 'static> DispatchError<E> {
    /// The client-facing failure, if the request itself was at fault
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Rejected(f) => Some(f),
            Self::Builder(_) => None,
        }
    }
}

/// Map, classify, and validate request parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    validator: QueryValidator,
}

impl QueryEngine {
    #[must_use]
    pub const fn new(limits: QueryLimits) -> Self {
        Self {
            validator: QueryValidator::new(limits),
        }
    }

    #[must_use]
    pub const fn limits(&self) -> &QueryLimits {
        self.validator.limits()
    }

    /// Assemble and classify.
    ///
    /// # Errors
    /// The first parameter that does not map.
    pub fn map<I, K, V>(&self, params: I) -> MappingResult<StructuredQuery>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        map_params(params)
    }

    /// Validate an already classified query.
    #[must_use]
    pub fn check(&self, query: &StructuredQuery) -> Verdict {
        self.validator.validate(query)
    }

    /// Run the full pipeline. Mapping errors surface as
    /// Invalid-Property-Value failures.
    ///
    /// # Errors
    /// The failure to return to the client.
    pub fn process<I, K, V>(&self, params: I) -> Result<StructuredQuery, Failure>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = self.map(params).map_err(|err| err.to_failure())?;
        self.check(&query).into_result()?;
        Ok(query)
    }

    /// Process the request and hand a valid query to `builder`.
    ///
    /// # Errors
    /// [`DispatchError::Rejected`] when the request is invalid,
    /// [`DispatchError::Builder`] when the builder fails.
    pub fn dispatch<I, K, V, B>(
        &self,
        params: I,
        builder: &B,
    ) -> Result<B::Output, DispatchError<B::Error>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        B: QueryBuilder,
        B::Error: 'static,
    {
        let query = self.process(params).map_err(DispatchError::Rejected)?;
        builder.build(&query).map_err(DispatchError::Builder)
    }
}

//! Query mapping and validation for catalogue search
//!
//! This crate turns the raw `key → string` parameters of a catalogue search
//! request into a typed, facet-annotated query and decides whether it may be
//! sent to the search index:
//! - [`mapper`]: trims, unquotes, decodes arrays, coerces integers
//! - [`facets`]: tags the query with every search facet it triggers
//! - [`validator`]: per-facet size, format, and consistency checks
//! - [`engine::QueryEngine`]: the whole pipeline plus the [`QueryBuilder`]
//!   hand-off seam
//! - [`response`]: decoding of the index's answer into a result envelope

#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod facets;
pub mod limits;
pub mod mapper;
pub mod query;
pub mod response;
pub mod tokenizer;
pub mod validator;
pub mod value;
pub mod verdict;

pub use engine::{DispatchError, QueryBuilder, QueryEngine};
pub use error::{MappingError, MappingResult, ResponseError, ResponseResult};
pub use facets::{Facet, FacetSet, classify};
pub use limits::QueryLimits;
pub use mapper::{assemble, map_param, map_params};
pub use query::{Geometry, Relation, StructuredQuery};
pub use response::{SearchHit, SearchResponse};
pub use validator::{QueryValidator, validate};
pub use value::ParamValue;
pub use verdict::{ErrorKind, ErrorResponse, Failure, Verdict};

//! Search-index response model
//!
//! Decodes the body an index returns for a search (`hits.total`,
//! `hits.hits[]`, `aggregations`) into a [`SearchResponse`] owned by the
//! request that issued it.

use serde::{Deserialize, Serialize};

use crate::error::{ResponseError, ResponseResult};

/// `type` of a successful result envelope
pub const SUCCESS_URN: &str = "urn:dx:cat:Success";
/// `title` of a successful result envelope
pub const SUCCESS_TITLE: &str = "Success";

/// A single matched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index document id (`_id`)
    pub doc_id: String,
    /// Stored document (`_source`); `null` when the index omitted it
    pub source: serde_json::Value,
}

/// Decoded index response for one search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_hits: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aggregations: Option<serde_json::Value>,
    pub hits: Vec<SearchHit>,
}

impl SearchResponse {
    /// Parse a raw response body.
    ///
    /// # Errors
    /// [`ResponseError::Serialization`] when `body` is not JSON, otherwise as
    /// [`Self::from_index_body`].
    pub fn from_slice(body: &[u8]) -> ResponseResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        Self::from_index_body(&value)
    }

    /// Read an already decoded response body.
    ///
    /// `hits.total` may be an object with a `value` field or a bare number.
    /// A missing total falls back to the number of returned hits.
    ///
    /// # Errors
    /// [`ResponseError::MissingField`] when `hits` is absent or malformed.
    pub fn from_index_body(body: &serde_json::Value) -> ResponseResult<Self> {
        let hits_section = body
            .get("hits")
            .and_then(serde_json::Value::as_object)
            .ok_or(ResponseError::MissingField("hits"))?;

        let hits = match hits_section.get("hits") {
            None => Vec::new(),
            Some(list) => list
                .as_array()
                .ok_or(ResponseError::MissingField("hits.hits"))?
                .iter()
                .map(decode_hit)
                .collect::<ResponseResult<Vec<_>>>()?,
        };

        let total_hits = match hits_section.get("total") {
            None => hits.len() as u64,
            Some(total) => total
                .get("value")
                .unwrap_or(total)
                .as_u64()
                .ok_or(ResponseError::MissingField("hits.total"))?,
        };

        let aggregations = body.get("aggregations").cloned();

        tracing::debug!(
            total_hits,
            returned = hits.len(),
            has_aggregations = aggregations.is_some(),
            "decoded index response"
        );
        Ok(Self {
            total_hits,
            aggregations,
            hits,
        })
    }

    /// The client success body: `type`, `title`, `totalHits`, `results`.
    #[must_use]
    pub fn to_result_envelope(&self) -> serde_json::Value {
        let results: Vec<serde_json::Value> =
            self.hits.iter().map(|hit| hit.source.clone()).collect();
        serde_json::json!({
            "type": SUCCESS_URN,
            "title": SUCCESS_TITLE,
            "totalHits": self.total_hits,
            "results": results,
        })
    }
}

fn decode_hit(raw: &serde_json::Value) -> ResponseResult<SearchHit> {
    let doc_id = raw
        .get("_id")
        .and_then(serde_json::Value::as_str)
        .ok_or(ResponseError::MissingField("hits.hits._id"))?;
    Ok(SearchHit {
        doc_id: doc_id.to_string(),
        source: raw.get("_source").cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> serde_json::Value {
        json!({
            "took": 3,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [
                    { "_id": "a1", "_source": { "name": "aqm-sensor-1" } },
                    { "_id": "a2", "_source": { "name": "aqm-sensor-2" } }
                ]
            },
            "aggregations": { "by_type": { "buckets": [] } }
        })
    }

    #[test]
    fn decodes_hits_total_and_aggregations() {
        let resp = SearchResponse::from_index_body(&body()).unwrap();
        assert_eq!(resp.total_hits, 42);
        assert_eq!(resp.hits.len(), 2);
        assert_eq!(resp.hits[0].doc_id, "a1");
        assert_eq!(resp.hits[1].source["name"], "aqm-sensor-2");
        assert!(resp.aggregations.is_some());
    }

    #[test]
    fn numeric_total_is_accepted() {
        let resp = SearchResponse::from_index_body(&json!({
            "hits": { "total": 7, "hits": [] }
        }))
        .unwrap();
        assert_eq!(resp.total_hits, 7);
        assert!(resp.aggregations.is_none());
    }

    #[test]
    fn missing_total_counts_hits() {
        let resp = SearchResponse::from_index_body(&json!({
            "hits": { "hits": [{ "_id": "x" }] }
        }))
        .unwrap();
        assert_eq!(resp.total_hits, 1);
        assert_eq!(resp.hits[0].source, serde_json::Value::Null);
    }

    #[test]
    fn responses_are_independent() {
        let first = SearchResponse::from_index_body(&body()).unwrap();
        let second = SearchResponse::from_index_body(&json!({
            "hits": { "total": { "value": 0 }, "hits": [] }
        }))
        .unwrap();
        assert_eq!(first.total_hits, 42);
        assert!(first.aggregations.is_some());
        assert_eq!(second.total_hits, 0);
        assert!(second.aggregations.is_none());
    }

    #[test]
    fn missing_hits_is_an_error() {
        let err = SearchResponse::from_index_body(&json!({ "took": 1 })).unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("hits")));
        let err = SearchResponse::from_index_body(&json!({
            "hits": { "hits": [{ "_source": {} }] }
        }))
        .unwrap_err();
        assert!(matches!(err, ResponseError::MissingField("hits.hits._id")));
    }

    #[test]
    fn from_slice_rejects_non_json() {
        let err = SearchResponse::from_slice(b"<html>").unwrap_err();
        assert!(matches!(err, ResponseError::Serialization(_)));
    }

    #[test]
    fn result_envelope_shape() {
        let resp = SearchResponse::from_index_body(&body()).unwrap();
        assert_eq!(
            resp.to_result_envelope(),
            json!({
                "type": "urn:dx:cat:Success",
                "title": "Success",
                "totalHits": 42,
                "results": [
                    { "name": "aqm-sensor-1" },
                    { "name": "aqm-sensor-2" }
                ]
            })
        );
    }
}

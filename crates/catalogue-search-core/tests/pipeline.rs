//! End-to-end tests for the request pipeline.
//!
//! Every case goes through the public API only: raw `key → string`
//! parameters in, a structured query or a client-facing failure out.

use catalogue_search_core::{
    ErrorKind, Facet, Failure, ParamValue, QueryBuilder, QueryEngine, QueryLimits,
    StructuredQuery, map_param, map_params,
};
use serde_json::json;

fn process(params: &[(&str, &str)]) -> Result<StructuredQuery, Failure> {
    QueryEngine::default().process(params.iter().copied())
}

fn failure(params: &[(&str, &str)]) -> Failure {
    match process(params) {
        Ok(query) => panic!("expected a failure, got {}", query.to_json()),
        Err(f) => f,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Mapping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn bare_token_arrays_round_trip_in_order() {
    let value = map_param("tags", "[Delhi,Mumbai,Pune,Kolkata]").unwrap();
    assert_eq!(value.to_json(), json!(["Delhi", "Mumbai", "Pune", "Kolkata"]));
}

#[test]
fn exception_key_arrays_decode_without_rewriting() {
    let value = map_param("coordinates", "[[77.1,28.2],[77.3,28.4]]").unwrap();
    assert_eq!(
        value,
        ParamValue::Sequence(vec![
            ParamValue::strings(["77.1", "28.2"]),
            ParamValue::strings(["77.3", "28.4"]),
        ])
    );
    // quoting would have made this valid; exception keys are decoded as-is
    assert!(map_param("coordinates", "[east,north]").is_err());
}

#[test]
fn integer_keys_truncate() {
    let query = map_params([("offset", "12.9"), ("limit", "12.9"), ("maxDistance", "12.9")])
        .unwrap();
    for key in ["offset", "limit", "maxDistance"] {
        assert_eq!(query.get(key), Some(&ParamValue::Integer(12)), "{key}");
    }
}

#[test]
fn free_text_grammar() {
    assert!(process(&[("q", "*solar*")]).is_ok());
    let f = failure(&[("q", "solar%")]);
    assert_eq!(f.kind, ErrorKind::InvalidPropertyValue);
    assert!(failure(&[("q", "solar;drop")]).description.contains("'q'"));
}

#[test]
fn one_bad_parameter_rejects_the_request() {
    let f = failure(&[("id", "abc"), ("limit", ""), ("q", "solar")]);
    assert_eq!(f.kind, ErrorKind::InvalidPropertyValue);
    assert!(f.description.contains("'limit'"));
}

// ═══════════════════════════════════════════════════════════════════════
// Geo
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn point_search_validates() {
    let query = process(&[
        ("geometry", "Point"),
        ("coordinates", "[77.1,28.2]"),
        ("maxDistance", "500"),
    ])
    .unwrap();
    assert!(query.has_facet(Facet::Geo));
}

#[test]
fn point_rejects_nested_coordinates() {
    let f = failure(&[
        ("geometry", "Point"),
        ("coordinates", "[[77.1,28.2]]"),
        ("maxDistance", "500"),
    ]);
    assert_eq!(f.description, "Invalid coordinate format");
}

#[test]
fn polygon_depth_mismatch_fails() {
    let f = failure(&[("geometry", "Polygon"), ("coordinates", "[[77.1,28.2]]")]);
    assert_eq!(f.kind, ErrorKind::InvalidPropertyValue);
    assert_eq!(f.description, "Invalid coordinate format");
}

#[test]
fn depth_follows_the_rendered_bracket_prefix() {
    let point = failure(&[
        ("geometry", "Point"),
        ("coordinates", "[7,[8]]"),
        ("maxDistance", "10"),
    ]);
    assert_eq!(point.description, "Invalid coordinate format");
    assert!(process(&[("geometry", "LineString"), ("coordinates", "[7,[8]]")]).is_ok());
}

#[test]
fn empty_or_short_coordinate_arrays_fail() {
    for (geometry, coordinates) in [
        ("Point", "[]"),
        ("Point", "[5]"),
        ("LineString", "[[]]"),
        ("Polygon", "[[[]]]"),
    ] {
        let f = failure(&[
            ("geometry", geometry),
            ("coordinates", coordinates),
            ("maxDistance", "10"),
        ]);
        assert_eq!(
            f.description, "Invalid coordinate format",
            "{geometry} {coordinates}"
        );
    }
}

#[test]
fn polygon_validates() {
    assert!(
        process(&[
            ("geometry", "Polygon"),
            ("coordinates", "[[[77.1,28.2],[77.3,28.4],[77.5,28.1],[77.1,28.2]]]"),
        ])
        .is_ok()
    );
}

#[test]
fn point_without_distance_is_syntax_error() {
    let f = failure(&[("geometry", "point"), ("coordinates", "[77.1,28.2]")]);
    assert_eq!(f.kind, ErrorKind::InvalidSyntax);
    assert_eq!(f.to_response().error_type, "urn:dx:cat:InvalidSyntax");
}

// ═══════════════════════════════════════════════════════════════════════
// Temporal, range, attribute
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn between_requires_start_before_end() {
    let f = failure(&[
        ("timeRel", "between"),
        ("time", "2024-01-01T00:00:00Z"),
        ("endTime", "2023-01-01T00:00:00Z"),
    ]);
    assert_eq!(f.kind, ErrorKind::InvalidPropertyValue);

    assert!(
        process(&[
            ("timeRel", "between"),
            ("time", "2023-01-01T00:00:00Z"),
            ("endTime", "2024-01-01T00:00:00Z"),
        ])
        .is_ok()
    );
}

#[test]
fn unknown_relations_pass_through_unchecked() {
    assert!(process(&[("timeRel", "around"), ("time", "soon")]).is_ok());
    assert!(process(&[("rangeRel", "near"), ("attribute", "capacity")]).is_ok());
}

#[test]
fn range_search() {
    assert!(
        process(&[
            ("rangeRel", "between"),
            ("attribute", "capacity"),
            ("range", "10"),
            ("endRange", "20"),
        ])
        .is_ok()
    );
    let f = failure(&[("rangeRel", "lessThan"), ("range", "10")]);
    assert_eq!(
        f.description,
        "'attribute' must be provided to search on for range relation"
    );
}

#[test]
fn attribute_value_punctuation() {
    let f = failure(&[("property", r#"["color"]"#), ("value", r#"[["red","red!!"]]"#)]);
    assert_eq!(f.kind, ErrorKind::InvalidPropertyValue);
    assert_eq!(f.description, "Invalid 'value' format");

    assert!(process(&[("property", r#"["color"]"#), ("value", r#"[["red","red-1_2"]]"#)]).is_ok());
    assert!(process(&[("property", "[color]"), ("value", "[[red,blue]]")]).is_ok());
}

// ═══════════════════════════════════════════════════════════════════════
// Pagination, filter, ordering
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn result_window_boundary() {
    let engine = QueryEngine::new(QueryLimits::default().with_max_result_window(1_000_000));
    assert!(engine.process([("limit", "999995"), ("offset", "5")]).is_ok());
    let f = engine
        .process([("limit", "999996"), ("offset", "5")])
        .unwrap_err();
    assert_eq!(f.description, "The limit + offset should be between 1 to 1000000");
    assert!(engine.process([("limit", "999999"), ("offset", "5")]).is_err());
}

#[test]
fn filter_overflow_is_bad_filter() {
    let f = failure(&[("filter", "[a,b,c,d,e,f,g,h,i,j,k]")]);
    assert_eq!(f.kind, ErrorKind::BadFilter);
    assert_eq!(f.to_response().error_type, "urn:dx:cat:BadFilter");
}

#[test]
fn geo_failure_surfaces_before_text_failure() {
    let long_text = "a".repeat(200);
    let f = failure(&[
        ("q", long_text.as_str()),
        ("geometry", "Polygon"),
        ("coordinates", "[[77.1,28.2]]"),
    ]);
    assert_eq!(f.description, "Invalid coordinate format");
}

// ═══════════════════════════════════════════════════════════════════════
// Hand-off
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn search_type_lists_every_facet_once() {
    let mut query = process(&[
        ("filter", "[id,name]"),
        ("q", "solar"),
        ("timeRel", "before"),
        ("time", "2023-01-01T00:00:00Z"),
    ])
    .unwrap();
    catalogue_search_core::classify(&mut query);
    assert_eq!(
        query.to_json()["searchType"],
        "temporalSearch_textSearch_responseFilter_"
    );
}

#[test]
fn error_envelope_shape() {
    let f = failure(&[("q", "a".repeat(101).as_str())]);
    let body = serde_json::to_value(f.to_response()).unwrap();
    assert_eq!(
        body,
        json!({
            "type": "urn:dx:cat:InvalidPropertyValue",
            "title": "Invalid Property Value",
            "description": "The max string(q) size supported is 100",
            "status": "failed"
        })
    );
}

struct Echo;

impl QueryBuilder for Echo {
    type Output = serde_json::Value;
    type Error = std::convert::Infallible;

    fn build(&self, query: &StructuredQuery) -> Result<Self::Output, Self::Error> {
        Ok(query.to_json())
    }
}

#[test]
fn dispatch_hands_off_structured_json() {
    let out = QueryEngine::default()
        .dispatch(
            [
                ("geometry", "bbox"),
                ("coordinates", "[[77.1,28.2],[77.3,28.4]]"),
                ("limit", "10"),
            ],
            &Echo,
        )
        .unwrap();
    assert_eq!(
        out,
        json!({
            "geometry": "bbox",
            "coordinates": [["77.1", "28.2"], ["77.3", "28.4"]],
            "limit": 10,
            "searchType": "geoSearch_"
        })
    );
}

//! Facet validation
//!
//! [`QueryValidator::validate`] runs one checker per facet present on the
//! query, then the unconditional instance and pagination checks. The order is
//! fixed (geo, text, attribute, temporal, range, response filter, instance,
//! pagination) and the first failure wins, so a query that is wrong in
//! several ways always reports the same error.

use std::sync::LazyLock;

use regex::Regex;

use crate::facets::Facet;
use crate::limits::QueryLimits;
use crate::query::{Geometry, Relation, StructuredQuery, keys};
use crate::value::ParamValue;
use crate::verdict::{ErrorKind, Failure, Verdict};

/// Attribute values: alphanumeric at both ends, restricted punctuation inside
static VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([A-Za-z0-9_\-._:/() ]*[a-zA-Z0-9])?$").expect("value pattern regex")
});

/// `YYYY-MM-DDThh:mm:ssZ`
static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$")
        .expect("timestamp pattern regex")
});

/// Leading characters of the rendered coordinates whose `[` count must
/// equal the geometry's nesting depth
const DEPTH_PREFIX_CHARS: usize = 5;

type CheckResult = Result<(), Failure>;

/// Validates classified queries against a fixed set of [`QueryLimits`]
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValidator {
    limits: QueryLimits,
}

impl QueryValidator {
    #[must_use]
    pub const fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Check every applicable facet; returns the first violation.
    #[must_use]
    pub fn validate(&self, query: &StructuredQuery) -> Verdict {
        let verdict = Verdict::from(self.run_checks(query));
        if let Some(failure) = verdict.failure() {
            tracing::debug!(
                error_type = failure.kind.urn(),
                description = %failure.description,
                "query failed validation"
            );
        }
        verdict
    }

    fn run_checks(&self, query: &StructuredQuery) -> CheckResult {
        if query.has_facet(Facet::Geo) {
            self.check_geo(query)?;
        }
        if query.has_facet(Facet::Text) {
            self.check_text(query)?;
        }
        if query.has_facet(Facet::Attribute) {
            self.check_attribute(query)?;
        }
        if query.has_facet(Facet::Temporal) {
            check_temporal(query)?;
        }
        if query.has_facet(Facet::Range) {
            check_range(query)?;
        }
        if query.has_facet(Facet::ResponseFilter) {
            self.check_filter(query)?;
        }
        self.check_instance(query)?;
        self.check_pagination(query)
    }

    // ── geo ────────────────────────────────────────────────────────────────

    fn check_geo(&self, query: &StructuredQuery) -> CheckResult {
        let geometry = query.get_str(keys::GEOMETRY).and_then(Geometry::parse);

        if let Some(coordinates) = query.get(keys::COORDINATES) {
            self.check_coordinate_values(coordinates)?;
            let depth = coordinates.bracket_depth(DEPTH_PREFIX_CHARS);
            if coordinates.leaves().is_empty()
                || depth.is_none()
                || geometry.map(Geometry::coordinate_depth) != depth
            {
                return Err(Failure::invalid_value("Invalid coordinate format"));
            }
        }

        if geometry == Some(Geometry::Point) {
            let limit = self.limits.max_distance_limit;
            let Some(max_distance) = query.get(keys::MAX_DISTANCE) else {
                return Err(Failure::new(
                    ErrorKind::InvalidSyntax,
                    "'maxDistance' must be provided for a Point geometry",
                ));
            };
            if !max_distance
                .as_integer()
                .is_some_and(|d| (0..=limit).contains(&d))
            {
                return Err(Failure::invalid_value(format!(
                    "The 'maxDistance' should range between 0-{limit}m"
                )));
            }
        }
        Ok(())
    }

    fn check_coordinate_values(&self, coordinates: &ParamValue) -> CheckResult {
        let leaves = coordinates.leaves();
        let max_points = self.limits.coordinates_size;
        if leaves.len() > max_points.saturating_mul(2) {
            return Err(Failure::invalid_value(format!(
                "The max number of 'coordinates' value is {max_points}"
            )));
        }

        let precision = i64::from(self.limits.coordinates_precision);
        for leaf in leaves {
            let text = leaf.leaf_text().unwrap_or_default();
            let Some(scale) = decimal_scale(&text) else {
                return Err(Failure::invalid_value(format!(
                    "Unable to parse 'coordinates'; value is {text}"
                )));
            };
            if !(0..=precision).contains(&scale) {
                return Err(Failure::invalid_value(format!(
                    "The max point of 'coordinates' precision is {precision}"
                )));
            }
        }
        Ok(())
    }

    // ── text ───────────────────────────────────────────────────────────────

    fn check_text(&self, query: &StructuredQuery) -> CheckResult {
        let Some(text) = query.get_str(keys::Q) else {
            return Err(Failure::invalid_value("'q' must be a text string"));
        };
        let max = self.limits.string_size;
        if text.chars().count() > max {
            return Err(Failure::invalid_value(format!(
                "The max string(q) size supported is {max}"
            )));
        }
        Ok(())
    }

    // ── attribute ──────────────────────────────────────────────────────────

    fn check_attribute(&self, query: &StructuredQuery) -> CheckResult {
        let max_properties = self.limits.property_size;
        let properties = query.get(keys::PROPERTY).map_or(0, ParamValue::list_len);
        if properties > max_properties {
            return Err(Failure::invalid_value(format!(
                "The max number of 'property' should be {max_properties}"
            )));
        }

        let Some(values) = query.get(keys::VALUE) else {
            return Err(Failure::new(
                ErrorKind::InvalidSyntax,
                "'value' must be provided with 'property'",
            ));
        };
        let max_values = self.limits.value_size;
        let too_many_values = || {
            Failure::invalid_value(format!("The max number of 'value' should be {max_values}"))
        };
        if values.list_len() > max_values {
            return Err(too_many_values());
        }

        let groups: Vec<&ParamValue> = match values {
            ParamValue::Sequence(items) => items.iter().collect(),
            single => vec![single],
        };
        for group in groups {
            for leaf in group.leaves() {
                let valid = leaf
                    .leaf_text()
                    .is_some_and(|text| VALUE_PATTERN.is_match(&text));
                if !valid {
                    return Err(Failure::invalid_value("Invalid 'value' format"));
                }
            }
            if group.list_len() > max_values {
                return Err(too_many_values());
            }
        }
        Ok(())
    }

    // ── response filter / instance / pagination ────────────────────────────

    fn check_filter(&self, query: &StructuredQuery) -> CheckResult {
        let max = self.limits.filter_value_size;
        if query.get(keys::FILTER).map_or(0, ParamValue::list_len) > max {
            return Err(Failure::new(
                ErrorKind::BadFilter,
                format!("The max number of 'filter' should be {max}"),
            ));
        }
        Ok(())
    }

    fn check_instance(&self, query: &StructuredQuery) -> CheckResult {
        let Some(instance) = query.get(keys::INSTANCE) else {
            return Ok(());
        };
        let max = self.limits.instance_size;
        if instance.to_string().chars().count() > max {
            return Err(Failure::invalid_value(format!(
                "The max length of 'instance' should be {max}"
            )));
        }
        Ok(())
    }

    fn check_pagination(&self, query: &StructuredQuery) -> CheckResult {
        if !query.contains(keys::LIMIT) && !query.contains(keys::OFFSET) {
            return Ok(());
        }
        let limit = integer_or_zero(query, keys::LIMIT)?;
        let offset = integer_or_zero(query, keys::OFFSET)?;
        let window = self.limits.max_result_window;
        let total = limit.saturating_add(offset);
        if total <= 0 || total > window {
            return Err(Failure::invalid_value(format!(
                "The limit + offset should be between 1 to {window}"
            )));
        }
        Ok(())
    }
}

/// Validate with the default limits.
#[must_use]
pub fn validate(query: &StructuredQuery) -> Verdict {
    QueryValidator::default().validate(query)
}

// ── temporal / range (no limits involved) ──────────────────────────────────

fn check_temporal(query: &StructuredQuery) -> CheckResult {
    let relation = Relation::parse(query.get_str(keys::TIME_REL).unwrap_or_default());
    match relation {
        Relation::During | Relation::Between => {
            let (Some(start), Some(end)) =
                (query.get_str(keys::TIME), query.get_str(keys::END_TIME))
            else {
                return Err(Failure::invalid_value(
                    "Both time and endTime must be provided for temporal relation",
                ));
            };
            if !is_timestamp(start) || !is_timestamp(end) {
                return Err(Failure::invalid_value(
                    "Invalid time format for temporal relation",
                ));
            }
            // same fixed-width UTC format, so lexical order is chronological
            if relation == Relation::Between && start >= end {
                return Err(Failure::invalid_value(
                    "startTime must be before endTime for BETWEEN relation",
                ));
            }
        }
        Relation::Before | Relation::After => {
            let Some(time) = query.get_str(keys::TIME) else {
                return Err(Failure::invalid_value(
                    "'time' must be provided for 'before' or 'after' temporal relation",
                ));
            };
            if !is_timestamp(time) {
                return Err(Failure::invalid_value(
                    "Invalid time format for 'before' or 'after' relation",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_range(query: &StructuredQuery) -> CheckResult {
    if !query.contains(keys::ATTRIBUTE) {
        return Err(Failure::invalid_value(
            "'attribute' must be provided to search on for range relation",
        ));
    }

    match Relation::parse(query.get_str(keys::RANGE_REL).unwrap_or_default()) {
        Relation::Other => {}
        relation if relation.is_interval() => {
            let (Some(start), Some(end)) = (query.get(keys::RANGE), query.get(keys::END_RANGE))
            else {
                return Err(Failure::invalid_value(
                    "Both range and endRange must be provided for range relation during/between",
                ));
            };
            let (Some(start), Some(end)) = (integer_value(start), integer_value(end)) else {
                return Err(Failure::invalid_value(
                    "Range and endRange must be valid numbers",
                ));
            };
            if start > end {
                return Err(Failure::invalid_value(
                    "startRange must be before endRange for BETWEEN relation",
                ));
            }
        }
        _ => {
            let Some(range) = query.get(keys::RANGE) else {
                return Err(Failure::invalid_value(
                    "'range' must be provided for 'before' or 'after' relation",
                ));
            };
            if integer_value(range).is_none() {
                return Err(Failure::invalid_value("Range must be valid numbers"));
            }
        }
    }
    Ok(())
}

// ── helpers ────────────────────────────────────────────────────────────────

fn is_timestamp(value: &str) -> bool {
    TIMESTAMP_PATTERN.is_match(value)
}

fn integer_value(value: &ParamValue) -> Option<i64> {
    match value {
        ParamValue::Integer(n) => Some(*n),
        ParamValue::Scalar(s) => s.parse().ok(),
        ParamValue::Sequence(_) => None,
    }
}

fn integer_or_zero(query: &StructuredQuery, key: &str) -> Result<i64, Failure> {
    query.get(key).map_or(Ok(0), |value| {
        value
            .as_integer()
            .ok_or_else(|| Failure::invalid_value(format!("'{key}' must be an integer")))
    })
}

/// Digits after the decimal point, adjusted by any exponent.
///
/// `77.125` is 3, `1.5e-3` is 4, `2e3` is -3. `None` when the text is not a
/// finite number.
fn decimal_scale(text: &str) -> Option<i64> {
    let number: f64 = text.parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    let unsigned = text.trim_start_matches(['+', '-']);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let fraction_digits = mantissa.split_once('.').map_or(0, |(_, frac)| frac.len());
    Some(i64::try_from(fraction_digits).ok()? - exponent)
}

//! Section order validation
//!
//! A lesson's section `order` values must form exactly `{1, 2, ..., N}` for N
//! sections. Validation never stops at the first defect: every problem found
//! in one pass is reported.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Outcome of validating one section list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl OrderReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate the `order` fields of a raw `sections` value
///
/// **Algorithm:**
/// 1. Empty or non-array input → single error
/// 2. Each section needs an integral numeric `order` (reported per section, continues)
/// 3. Every repetition of an order value beyond the first is reported
/// 4. Minimum must be 1
/// 5. Every value in `1..=max` must be present. Gaps above the section count
///    are reported as one range each.
/// 6. `max` must not exceed the section count
pub fn validate_section_order(sections: &Value) -> OrderReport {
    let sections = match sections.as_array() {
        Some(sections) if !sections.is_empty() => sections,
        _ => {
            return OrderReport::from_errors(vec![
                "Sections must be a non-empty list".to_string(),
            ])
        }
    };

    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();

    for (index, section) in sections.iter().enumerate() {
        let Some(order) = section.get("order").and_then(integral_order) else {
            let label = section
                .get("id")
                .and_then(Value::as_str)
                .map(|id| format!("'{}'", id))
                .unwrap_or_else(|| format!("at index {}", index));
            errors.push(format!("Section {} has a missing or non-numeric order", label));
            continue;
        };

        if !seen.insert(order) {
            errors.push(format!("Duplicate order value: {}", order));
        }
    }

    if let (Some(&min), Some(&max)) = (seen.first(), seen.last()) {
        if min != 1 {
            errors.push(format!("Minimum order must be 1, found {}", min));
        }

        let count = sections.len() as i64;
        for expected in 1..=max.min(count) {
            if !seen.contains(&expected) {
                errors.push(format!("Missing order value: {}", expected));
            }
        }

        // Above the section count only present values bound the gaps
        let mut previous = count;
        for &order in seen.range(count + 1..) {
            match order - previous {
                1 => {}
                2 => errors.push(format!("Missing order value: {}", previous + 1)),
                _ => errors.push(format!(
                    "Missing order values: {}..={}",
                    previous + 1,
                    order - 1
                )),
            }
            previous = order;
        }

        if max > count {
            errors.push(format!(
                "Maximum order {} exceeds section count {}",
                max, count
            ));
        }
    }

    OrderReport::from_errors(errors)
}

/// JSON integers, or floats with no fractional part such as `2.0`
fn integral_order(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sections(orders: &[Value]) -> Value {
        Value::Array(
            orders
                .iter()
                .enumerate()
                .map(|(i, order)| json!({ "id": format!("s{}", i + 1), "order": order }))
                .collect(),
        )
    }

    #[test]
    fn test_valid_in_any_array_order() {
        let report = validate_section_order(&sections(&[json!(2), json!(3), json!(1)]));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_gap_reports_missing_value() {
        let report = validate_section_order(&sections(&[json!(1), json!(3)]));
        assert!(!report.valid);
        assert!(report.errors.contains(&"Missing order value: 2".to_string()));
        assert!(report
            .errors
            .contains(&"Maximum order 3 exceeds section count 2".to_string()));
    }

    #[test]
    fn test_duplicate_reported_once_per_repetition() {
        let report = validate_section_order(&sections(&[json!(1), json!(1), json!(2)]));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Duplicate order value: 1".to_string()]);

        let report = validate_section_order(&sections(&[json!(1), json!(1), json!(1)]));
        let duplicates = report
            .errors
            .iter()
            .filter(|e| e.starts_with("Duplicate order value: 1"))
            .count();
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn test_bad_minimum() {
        let report = validate_section_order(&sections(&[json!(2), json!(3), json!(4)]));
        assert!(!report.valid);
        assert!(report
            .errors
            .contains(&"Minimum order must be 1, found 2".to_string()));
        assert!(report.errors.contains(&"Missing order value: 1".to_string()));
    }

    #[test]
    fn test_empty_or_non_list_is_single_error() {
        for input in [json!([]), json!(null), json!({ "order": 1 })] {
            let report = validate_section_order(&input);
            assert!(!report.valid);
            assert_eq!(report.errors.len(), 1);
        }
    }

    #[test]
    fn test_non_numeric_order_continues() {
        let input = json!([
            { "id": "intro", "order": "1" },
            { "id": "theory", "order": 1.5 },
            { "order": 1 },
            { "title": "no order" }
        ]);
        let report = validate_section_order(&input);
        assert!(!report.valid);
        assert!(report.errors[0].contains("'intro'"));
        assert!(report.errors[1].contains("'theory'"));
        assert!(report.errors[2].contains("index 3"));
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_integral_float_order_is_accepted() {
        let report = validate_section_order(&sections(&[json!(1.0), json!(2)]));
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_huge_order_collapses_missing_range() {
        let report = validate_section_order(&sections(&[json!(1), json!(20_000_000)]));
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Missing order value: 2".to_string(),
                "Missing order values: 3..=19999999".to_string(),
                "Maximum order 20000000 exceeds section count 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_gaps_above_section_count_split_at_present_values() {
        let report = validate_section_order(&sections(&[json!(1), json!(5), json!(7)]));
        assert_eq!(
            report.errors,
            vec![
                "Missing order value: 2".to_string(),
                "Missing order value: 3".to_string(),
                "Missing order value: 4".to_string(),
                "Missing order value: 6".to_string(),
                "Maximum order 7 exceeds section count 3".to_string(),
            ]
        );
    }
}

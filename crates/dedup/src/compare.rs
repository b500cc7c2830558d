//! Field comparator library. Every comparator is a pure function from a
//! value pair to a similarity in [0, 1], or `None` when the comparison is
//! undefined (unparseable or disallowed-missing input). Undefined is a
//! local outcome, never an error: one bad field must not abort the pair.

use crate::config::{ComparatorSpec, FieldSpec};
use crate::model::FieldValue;

/// Score one field of a candidate pair.
pub fn score_field(spec: &FieldSpec, a: &FieldValue, b: &FieldValue) -> Option<f64> {
    // The weather comparator owns its missing-value rule.
    if let ComparatorSpec::WeatherCode {
        equivalent_codes,
        pct_max,
    } = &spec.comparator
    {
        return weather_code(a, b, equivalent_codes, *pct_max);
    }

    if a.is_missing() || b.is_missing() {
        return if spec.missing_allowed {
            Some(spec.missing_score)
        } else {
            None
        };
    }

    match &spec.comparator {
        ComparatorSpec::Exact => Some(exact(a, b)),
        ComparatorSpec::NumericLinear { offset, scale } => numeric_linear(a, b, *offset, *scale),
        ComparatorSpec::NumericPercent { pct_max } => numeric_percent(a, b, *pct_max),
        ComparatorSpec::JaroWinkler { threshold } => jaro_winkler(a, b, *threshold),
        ComparatorSpec::WeatherCode { .. } => unreachable!("handled above"),
    }
}

/// 1.0 on canonical-text equality, else 0.0. Values reach the engine
/// already normalized, so equality is plain.
fn exact(a: &FieldValue, b: &FieldValue) -> f64 {
    match (a.canonical_text(), b.canonical_text()) {
        (Some(ta), Some(tb)) if ta == tb => 1.0,
        _ => 0.0,
    }
}

/// Linear decay in absolute difference: 1.0 up to `offset`, 0.0 from
/// `offset + scale`. A zero scale degrades to exact numeric comparison.
fn numeric_linear(a: &FieldValue, b: &FieldValue, offset: f64, scale: f64) -> Option<f64> {
    let d = (a.as_number()? - b.as_number()?).abs();
    // "nan" and "inf" parse as numbers; a non-finite difference can never
    // fall within tolerance.
    if !d.is_finite() {
        return Some(0.0);
    }
    if scale == 0.0 {
        return Some(if d <= offset { 1.0 } else { 0.0 });
    }
    if d <= offset {
        Some(1.0)
    } else if d >= offset + scale {
        Some(0.0)
    } else {
        Some(1.0 - (d - offset) / scale)
    }
}

/// Linear decay in relative difference, as a percentage against `pct_max`.
fn numeric_percent(a: &FieldValue, b: &FieldValue, pct_max: f64) -> Option<f64> {
    let fa = a.as_number()?;
    let fb = b.as_number()?;
    let denom = fa.abs().max(fb.abs());
    if denom == 0.0 {
        // Both exactly zero.
        return Some(1.0);
    }
    let pc = (fa - fb).abs() / denom * 100.0;
    if pc < pct_max {
        Some(1.0 - pc / pct_max)
    } else {
        Some(0.0)
    }
}

/// Jaro-Winkler similarity, optionally collapsed to a binary accept /
/// reject at `threshold`.
fn jaro_winkler(a: &FieldValue, b: &FieldValue, threshold: Option<f64>) -> Option<f64> {
    let ta = a.canonical_text()?;
    let tb = b.canonical_text()?;
    let sim = strsim::jaro_winkler(&ta, &tb);
    match threshold {
        Some(t) => Some(if sim >= t { 1.0 } else { 0.0 }),
        None => Some(sim),
    }
}

/// Weather-code rule: a missing side or a designated "not observed" code
/// is equivalent to any value; otherwise relative numeric comparison.
fn weather_code(
    a: &FieldValue,
    b: &FieldValue,
    equivalent_codes: &[String],
    pct_max: f64,
) -> Option<f64> {
    if a.is_missing() || b.is_missing() {
        return Some(1.0);
    }
    let is_code = |v: &FieldValue| {
        v.canonical_text()
            .map(|t| equivalent_codes.iter().any(|c| *c == t))
            .unwrap_or(false)
    };
    if is_code(a) || is_code(b) {
        return Some(1.0);
    }
    numeric_percent(a, b, pct_max)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    fn spec(comparator: ComparatorSpec) -> FieldSpec {
        FieldSpec {
            field: "f".into(),
            comparator,
            missing_allowed: false,
            missing_score: 0.0,
        }
    }

    #[test]
    fn exact_matches_and_mismatches() {
        let s = spec(ComparatorSpec::Exact);
        assert_eq!(score_field(&s, &text("A"), &text("A")), Some(1.0));
        assert_eq!(score_field(&s, &text("A"), &text("B")), Some(0.0));
    }

    #[test]
    fn exact_missing_disallowed_is_undefined() {
        let s = spec(ComparatorSpec::Exact);
        assert_eq!(score_field(&s, &text("A"), &FieldValue::Missing), None);
    }

    #[test]
    fn exact_missing_allowed_uses_fallback() {
        let mut s = spec(ComparatorSpec::Exact);
        s.missing_allowed = true;
        s.missing_score = 1.0;
        assert_eq!(score_field(&s, &text("A"), &FieldValue::Missing), Some(1.0));
    }

    #[test]
    fn numeric_linear_identity_and_cutoff() {
        let s = spec(ComparatorSpec::NumericLinear {
            offset: 0.0,
            scale: 1.0,
        });
        assert_eq!(score_field(&s, &text("53.5"), &text("53.5")), Some(1.0));
        assert_eq!(score_field(&s, &text("0.5"), &text("0.0")), Some(0.5));
        assert_eq!(score_field(&s, &text("2.0"), &text("0.0")), Some(0.0));
        assert_eq!(score_field(&s, &text("1.0"), &text("0.0")), Some(0.0));
    }

    #[test]
    fn numeric_linear_offset_plateau() {
        let s = spec(ComparatorSpec::NumericLinear {
            offset: 10.0,
            scale: 1.0,
        });
        assert_eq!(score_field(&s, &text("20"), &text("12")), Some(1.0));
        assert_eq!(score_field(&s, &text("20"), &text("9.5")), Some(0.5));
        assert_eq!(score_field(&s, &text("20"), &text("5")), Some(0.0));
    }

    #[test]
    fn numeric_linear_zero_scale_is_exact_numeric() {
        let s = spec(ComparatorSpec::NumericLinear {
            offset: 0.0,
            scale: 0.0,
        });
        assert_eq!(score_field(&s, &text("3"), &text("3.0")), Some(1.0));
        assert_eq!(score_field(&s, &text("3"), &text("3.0001")), Some(0.0));
    }

    #[test]
    fn numeric_linear_unparseable_is_undefined() {
        let s = spec(ComparatorSpec::NumericLinear {
            offset: 0.0,
            scale: 1.0,
        });
        assert_eq!(score_field(&s, &text("nord"), &text("1.0")), None);
    }

    #[test]
    fn numeric_linear_non_finite_input_scores_zero() {
        // "nan" and "inf" parse as f64, so they reach the comparator as
        // numbers rather than undefined input. They can never be within
        // tolerance of anything, including themselves.
        let s = spec(ComparatorSpec::NumericLinear {
            offset: 0.0,
            scale: 1.0,
        });
        assert_eq!(score_field(&s, &text("nan"), &text("5.0")), Some(0.0));
        assert_eq!(score_field(&s, &text("nan"), &text("nan")), Some(0.0));
        assert_eq!(score_field(&s, &text("inf"), &text("5.0")), Some(0.0));
        assert_eq!(score_field(&s, &text("inf"), &text("inf")), Some(0.0));
        assert_eq!(score_field(&s, &text("-inf"), &text("inf")), Some(0.0));
    }

    #[test]
    fn numeric_percent_non_finite_input_scores_zero() {
        let s = spec(ComparatorSpec::NumericPercent { pct_max: 98.0 });
        assert_eq!(score_field(&s, &text("nan"), &text("400")), Some(0.0));
        assert_eq!(score_field(&s, &text("inf"), &text("400")), Some(0.0));
        assert_eq!(score_field(&s, &text("inf"), &text("inf")), Some(0.0));
    }

    #[test]
    fn numeric_percent_decay_and_cutoff() {
        let s = spec(ComparatorSpec::NumericPercent { pct_max: 98.0 });
        // |400 - 401| / 401 * 100 ≈ 0.2494 %
        let sim = score_field(&s, &text("400"), &text("401")).unwrap();
        let expected = 1.0 - (1.0 / 401.0 * 100.0) / 98.0;
        assert!((sim - expected).abs() < 1e-12);
        // Far beyond tolerance
        assert_eq!(score_field(&s, &text("1"), &text("1000")), Some(0.0));
    }

    #[test]
    fn numeric_percent_both_zero() {
        let s = spec(ComparatorSpec::NumericPercent { pct_max: 98.0 });
        assert_eq!(score_field(&s, &text("0"), &text("0.0")), Some(1.0));
    }

    #[test]
    fn numeric_percent_unparseable_is_undefined() {
        let s = spec(ComparatorSpec::NumericPercent { pct_max: 98.0 });
        assert_eq!(score_field(&s, &text("dunst"), &text("400")), None);
    }

    #[test]
    fn jaro_winkler_binary_threshold() {
        let s = spec(ComparatorSpec::JaroWinkler {
            threshold: Some(0.85),
        });
        assert_eq!(score_field(&s, &text("dbbh"), &text("dbbh")), Some(1.0));
        assert_eq!(score_field(&s, &text("dbbh"), &text("wxyz")), Some(0.0));
    }

    #[test]
    fn jaro_winkler_raw_without_threshold() {
        let s = spec(ComparatorSpec::JaroWinkler { threshold: None });
        let sim = score_field(&s, &text("dbbh"), &text("dbbj")).unwrap();
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn weather_sentinel_codes_match_anything() {
        let s = spec(ComparatorSpec::WeatherCode {
            equivalent_codes: vec!["509".into(), "510".into()],
            pct_max: 98.0,
        });
        assert_eq!(
            score_field(&s, &FieldValue::Missing, &text("509")),
            Some(1.0)
        );
        assert_eq!(score_field(&s, &FieldValue::Missing, &text("42")), Some(1.0));
        assert_eq!(score_field(&s, &text("400"), &text("509")), Some(1.0));
        assert_eq!(score_field(&s, &text("510"), &text("77")), Some(1.0));
    }

    #[test]
    fn weather_falls_back_to_percentage() {
        let s = spec(ComparatorSpec::WeatherCode {
            equivalent_codes: vec!["509".into(), "510".into()],
            pct_max: 98.0,
        });
        let pct = spec(ComparatorSpec::NumericPercent { pct_max: 98.0 });
        assert_eq!(
            score_field(&s, &text("400"), &text("401")),
            score_field(&pct, &text("400"), &text("401"))
        );
    }

    #[test]
    fn comparators_are_symmetric() {
        let specs = vec![
            spec(ComparatorSpec::Exact),
            spec(ComparatorSpec::NumericLinear {
                offset: 0.0,
                scale: 1.0,
            }),
            spec(ComparatorSpec::NumericPercent { pct_max: 98.0 }),
            spec(ComparatorSpec::JaroWinkler { threshold: None }),
            spec(ComparatorSpec::WeatherCode {
                equivalent_codes: vec!["509".into()],
                pct_max: 98.0,
            }),
        ];
        let values = [text("400"), text("401"), text("509"), FieldValue::Missing];
        for s in &specs {
            for a in &values {
                for b in &values {
                    assert_eq!(score_field(s, a, b), score_field(s, b, a));
                }
            }
        }
    }
}

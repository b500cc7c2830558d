use crate::compare::score_field;
use crate::config::{FieldSpec, UndefinedPolicy};
use crate::model::{CandidatePair, ComparisonVector, Record};

/// Compare one candidate pair across the ordered field specs.
///
/// The aggregate is `1 − |Σscores − N| / N` where N counts the fields that
/// produced a score. Under `UndefinedPolicy::Exclude` undefined fields are
/// dropped from N; under `ScoreZero` they count as 0.0. A pair where every
/// field is undefined has no aggregate under either policy and is excluded
/// from classification.
pub fn compare_pair(
    records: &[Record],
    pair: CandidatePair,
    fields: &[FieldSpec],
    policy: UndefinedPolicy,
) -> ComparisonVector {
    let left = &records[pair.a];
    let right = &records[pair.b];

    let scores: Vec<(String, Option<f64>)> = fields
        .iter()
        .map(|spec| {
            let score = score_field(spec, left.value(&spec.field), right.value(&spec.field));
            (spec.field.clone(), score)
        })
        .collect();

    let aggregate = aggregate_score(&scores, policy);

    ComparisonVector {
        pair,
        scores,
        aggregate,
    }
}

fn aggregate_score(scores: &[(String, Option<f64>)], policy: UndefinedPolicy) -> Option<f64> {
    let defined = scores.iter().filter_map(|(_, s)| *s);
    let (sum, n) = match policy {
        UndefinedPolicy::Exclude => defined.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1)),
        UndefinedPolicy::ScoreZero => {
            if scores.iter().all(|(_, s)| s.is_none()) {
                (0.0, 0)
            } else {
                (defined.sum(), scores.len())
            }
        }
    };
    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some(1.0 - (sum - n).abs() / n)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::config::ClassifierConfig;
use crate::model::{ClassifiedPair, ComparisonVector, MatchLabel};

/// Classify one comparison vector. Stateless; classification order does not
/// matter. Returns `None` for vectors with no aggregate (every field
/// undefined) — such pairs are non-matches by omission, not by score.
pub fn classify(vector: &ComparisonVector, policy: &ClassifierConfig) -> Option<ClassifiedPair> {
    let aggregate = vector.aggregate?;

    let is_match = match policy {
        ClassifierConfig::ScoreThreshold { threshold } => aggregate >= *threshold,
        ClassifierConfig::KeyFieldOverride { field, threshold } => {
            vector.score_for(field) == Some(1.0) || aggregate >= *threshold
        }
    };

    Some(ClassifiedPair {
        pair: vector.pair,
        label: if is_match {
            MatchLabel::Match
        } else {
            MatchLabel::NonMatch
        },
        confidence: aggregate,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

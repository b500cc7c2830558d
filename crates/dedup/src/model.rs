use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single normalized field value. `Missing` is an explicit marker,
/// distinguishable from an empty string or NaN.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view: `Number` as-is, `Text` if it parses, otherwise `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse::<f64>().ok(),
            Self::Missing => None,
        }
    }

    /// Canonical text used for exact comparison and blocking keys.
    /// `None` for missing values.
    pub fn canonical_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(format!("{n}")),
            Self::Missing => None,
        }
    }
}

/// A single record from the external source, read-only after load.
#[derive(Debug, Clone)]
pub struct Record {
    pub record_id: String,
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn value(&self, field: &str) -> &FieldValue {
        static MISSING: FieldValue = FieldValue::Missing;
        self.fields.get(field).unwrap_or(&MISSING)
    }
}

/// Pre-loaded records in input order. Input order is the tie-break for all
/// deterministic ordering downstream (cluster ids, singleton numbering).
pub struct DedupInput {
    pub records: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Candidate pairs
// ---------------------------------------------------------------------------

/// Unordered pair of record indices, normalized so `a < b`. `Ord` gives
/// blocking a stable, deduplicated iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidatePair {
    pub a: usize,
    pub b: usize,
}

impl CandidatePair {
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { a: i, b: j }
        } else {
            Self { a: j, b: i }
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Per-field similarity scores for one candidate pair, in field-spec order.
/// `None` means the comparison was undefined for that field.
#[derive(Debug, Clone)]
pub struct ComparisonVector {
    pub pair: CandidatePair,
    pub scores: Vec<(String, Option<f64>)>,
    /// `1 − |Σscores − N| / N` over the N fields actually scored.
    /// `None` when every field was undefined; such pairs are excluded from
    /// classification.
    pub aggregate: Option<f64>,
}

impl ComparisonVector {
    pub fn score_for(&self, field: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, s)| *s)
    }

    pub fn undefined_count(&self) -> usize {
        self.scores.iter().filter(|(_, s)| s.is_none()).count()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLabel {
    Match,
    NonMatch,
}

#[derive(Debug, Clone)]
pub struct ClassifiedPair {
    pub pair: CandidatePair,
    pub label: MatchLabel,
    /// The aggregate score that produced the label.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ClusterMember {
    pub record_id: String,
    /// Max confidence over the MATCH edges connecting this record in.
    pub confidence: f64,
}

/// A duplicate group: two or more records transitively connected by MATCH
/// edges.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub cluster_id: usize,
    pub members: Vec<ClusterMember>,
}

/// One row per input record. Singleton cluster ids continue the numbering
/// after the highest duplicate-cluster id; their confidence is absent.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAssignment {
    pub record_id: String,
    pub cluster_id: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub candidate_pairs: usize,
    /// Pairs whose comparison vector was entirely undefined; excluded from
    /// classification.
    pub pairs_skipped_empty: usize,
    /// Count of per-field comparisons that resolved to undefined.
    pub undefined_comparisons: usize,
    pub matches: usize,
    pub non_matches: usize,
    pub clusters: usize,
    pub singletons: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub blocking: String,
    pub classifier: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupResult {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub clusters: Vec<Cluster>,
    pub assignments: Vec<ClusterAssignment>,
}

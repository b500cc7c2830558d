use crate::blocking::candidate_pairs;
use crate::classify::classify;
use crate::cluster::build_clusters;
use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::model::{
    DedupInput, DedupResult, FieldValue, MatchLabel, Record, RunMeta, RunSummary,
};
use crate::score::compare_pair;

/// Run deduplication per config. Returns clusters + per-record assignments.
///
/// Configuration errors surface before any record is processed; per-field
/// data problems are absorbed into the scoring logic and reported through
/// the summary counters.
pub fn run(config: &DedupConfig, input: &DedupInput) -> Result<DedupResult, DedupError> {
    config.validate()?;

    let records = &input.records;
    let pairs = candidate_pairs(records, &config.blocking);

    let mut undefined_comparisons = 0;
    let mut pairs_skipped_empty = 0;
    let mut matches = 0;
    let mut non_matches = 0;
    let mut classified = Vec::with_capacity(pairs.len());

    for &pair in &pairs {
        let vector = compare_pair(records, pair, &config.fields, config.undefined_policy);
        undefined_comparisons += vector.undefined_count();
        match classify(&vector, &config.classifier) {
            None => pairs_skipped_empty += 1,
            Some(c) => {
                match c.label {
                    MatchLabel::Match => matches += 1,
                    MatchLabel::NonMatch => non_matches += 1,
                }
                classified.push(c);
            }
        }
    }

    let (clusters, assignments) = build_clusters(records, &classified)?;
    let clustered_records: usize = clusters.iter().map(|c| c.members.len()).sum();

    Ok(DedupResult {
        meta: RunMeta {
            config_name: config.name.clone(),
            blocking: config.blocking.label().into(),
            classifier: config.classifier.label().into(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: RunSummary {
            records: records.len(),
            candidate_pairs: pairs.len(),
            pairs_skipped_empty,
            undefined_comparisons,
            matches,
            non_matches,
            clusters: clusters.len(),
            singletons: records.len() - clustered_records,
        },
        clusters,
        assignments,
    })
}

/// Load CSV rows into Records, keyed by `id_column`.
///
/// Values get the light cleaning the engine expects as a precondition:
/// whitespace collapse, quote stripping, lowercasing, empty → missing.
pub fn load_csv_records(csv_data: &str, id_column: &str) -> Result<Vec<Record>, DedupError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DedupError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let id_idx = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| DedupError::MissingColumn {
            column: id_column.into(),
        })?;

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| DedupError::Io(e.to_string()))?;
        let record_id = row.get(id_idx).unwrap_or("").trim().to_string();

        let mut fields = std::collections::HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if i == id_idx {
                continue;
            }
            let value = row.get(i).map(normalize_value).unwrap_or(FieldValue::Missing);
            fields.insert(header.clone(), value);
        }

        records.push(Record { record_id, fields });
    }

    Ok(records)
}

/// Casing, extra spaces, quotes and new lines can be ignored; a cleaned-out
/// empty value becomes the explicit missing marker.
fn normalize_value(raw: &str) -> FieldValue {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_lowercase();
    if cleaned.is_empty() {
        FieldValue::Missing
    } else {
        FieldValue::Text(cleaned)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

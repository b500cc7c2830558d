//! Candidate-pair generation. Blocking cuts the all-pairs comparison down
//! to records sharing a cheap signature; the output is a deduplicated,
//! deterministically ordered set of candidate pairs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::BlockingConfig;
use crate::model::{CandidatePair, Record};

/// Generate candidate pairs for the configured strategy.
///
/// Records with a missing blocking, partition, or sort key are excluded
/// from the pass that needs it — never matched against everything.
pub fn candidate_pairs(records: &[Record], config: &BlockingConfig) -> Vec<CandidatePair> {
    let mut pairs: BTreeSet<CandidatePair> = BTreeSet::new();

    match config {
        BlockingConfig::ExactKey { keys } => {
            for key_set in keys {
                exact_key_pass(records, key_set, &mut pairs);
            }
        }
        BlockingConfig::SortedNeighbourhood {
            sort_key,
            block_on,
            window,
        } => {
            sorted_neighbourhood_pass(records, sort_key, block_on, *window, &mut pairs);
        }
    }

    pairs.into_iter().collect()
}

/// One exact-key pass: group by the key set's canonical values, pair all
/// records within a group.
fn exact_key_pass(records: &[Record], key_set: &[String], pairs: &mut BTreeSet<CandidatePair>) {
    let mut groups: BTreeMap<Vec<String>, Vec<usize>> = BTreeMap::new();

    'records: for (idx, record) in records.iter().enumerate() {
        let mut key = Vec::with_capacity(key_set.len());
        for field in key_set {
            match record.value(field).canonical_text() {
                Some(text) => key.push(text),
                None => continue 'records,
            }
        }
        groups.entry(key).or_default().push(idx);
    }

    for members in groups.values() {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                pairs.insert(CandidatePair::new(a, b));
            }
        }
    }
}

/// Sorted-neighbourhood pass: partition by `block_on`, sort each partition
/// by `sort_key`, pair each record with its `(window - 1) / 2` nearest
/// following neighbours. Windows never span partitions.
fn sorted_neighbourhood_pass(
    records: &[Record],
    sort_key: &str,
    block_on: &[String],
    window: usize,
    pairs: &mut BTreeSet<CandidatePair>,
) {
    let mut partitions: BTreeMap<Vec<String>, Vec<usize>> = BTreeMap::new();

    'records: for (idx, record) in records.iter().enumerate() {
        if record.value(sort_key).is_missing() {
            continue;
        }
        let mut key = Vec::with_capacity(block_on.len());
        for field in block_on {
            match record.value(field).canonical_text() {
                Some(text) => key.push(text),
                None => continue 'records,
            }
        }
        partitions.entry(key).or_default().push(idx);
    }

    let reach = (window - 1) / 2;

    for members in partitions.values_mut() {
        // Stable sort; ties keep input order.
        members.sort_by(|&a, &b| compare_sort_keys(&records[a], &records[b], sort_key));

        for (i, &a) in members.iter().enumerate() {
            for &b in members.iter().skip(i + 1).take(reach) {
                pairs.insert(CandidatePair::new(a, b));
            }
        }
    }
}

/// Total order over sort-key values: finite numerics first in numeric
/// order, everything else after in lexical order. Deciding numeric-vs-
/// lexical per value (not per pair) keeps the order total when a partition
/// mixes parseable and unparseable keys.
fn compare_sort_keys(a: &Record, b: &Record, sort_key: &str) -> Ordering {
    let va = a.value(sort_key);
    let vb = b.value(sort_key);
    let na = va.as_number().filter(|n| n.is_finite());
    let nb = vb.as_number().filter(|n| n.is_finite());
    match (na, nb) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => va.canonical_text().cmp(&vb.canonical_text()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

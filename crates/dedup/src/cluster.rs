//! Transitive clustering of MATCH pairs. Connected components over the
//! match graph become duplicate clusters; everything else becomes a
//! singleton with an id continuing after the last real cluster id.

use crate::error::DedupError;
use crate::model::{
    ClassifiedPair, Cluster, ClusterAssignment, ClusterMember, MatchLabel, Record,
};

/// Union-find with path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Compress the walked path.
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Build the clustering from MATCH edges.
///
/// Per-record confidence is the maximum over the record's incident MATCH
/// edges; any sufficiently strong link is evidence of duplication. Cluster
/// ids are assigned in input order of each component's first record, so the
/// output is reproducible for identical input and classifications.
pub fn build_clusters(
    records: &[Record],
    classified: &[ClassifiedPair],
) -> Result<(Vec<Cluster>, Vec<ClusterAssignment>), DedupError> {
    let n = records.len();
    let mut uf = UnionFind::new(n);
    let mut confidence: Vec<Option<f64>> = vec![None; n];

    for c in classified {
        if c.label != MatchLabel::Match {
            continue;
        }
        uf.union(c.pair.a, c.pair.b);
        for idx in [c.pair.a, c.pair.b] {
            let best = confidence[idx].get_or_insert(c.confidence);
            if c.confidence > *best {
                *best = c.confidence;
            }
        }
    }

    // Components in input order of their first member.
    let mut component_of_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<usize>> = Vec::new();
    for idx in 0..n {
        let root = uf.find(idx);
        match component_of_root[root] {
            Some(ci) => components[ci].push(idx),
            None => {
                component_of_root[root] = Some(components.len());
                components.push(vec![idx]);
            }
        }
    }

    // Real clusters first, then singletons continue the numbering.
    let mut clusters = Vec::new();
    let mut assignment_of: Vec<Option<(usize, Option<f64>)>> = vec![None; n];
    for component in components.iter().filter(|c| c.len() >= 2) {
        let cluster_id = clusters.len();
        let mut members = Vec::with_capacity(component.len());
        for &idx in component {
            if assignment_of[idx].is_some() {
                return Err(DedupError::ClusterInvariant(format!(
                    "record '{}' assigned to more than one cluster",
                    records[idx].record_id
                )));
            }
            let conf = confidence[idx].unwrap_or(0.0);
            assignment_of[idx] = Some((cluster_id, Some(conf)));
            members.push(ClusterMember {
                record_id: records[idx].record_id.clone(),
                confidence: conf,
            });
        }
        clusters.push(Cluster {
            cluster_id,
            members,
        });
    }

    let mut next_id = clusters.len();
    for component in components.iter().filter(|c| c.len() == 1) {
        let idx = component[0];
        if assignment_of[idx].is_some() {
            return Err(DedupError::ClusterInvariant(format!(
                "record '{}' assigned to more than one cluster",
                records[idx].record_id
            )));
        }
        assignment_of[idx] = Some((next_id, None));
        next_id += 1;
    }

    let mut assignments = Vec::with_capacity(n);
    for (idx, slot) in assignment_of.into_iter().enumerate() {
        let (cluster_id, conf) = slot.ok_or_else(|| {
            DedupError::ClusterInvariant(format!(
                "record '{}' dropped from cluster assignment",
                records[idx].record_id
            ))
        })?;
        assignments.push(ClusterAssignment {
            record_id: records[idx].record_id.clone(),
            cluster_id,
            confidence: conf,
        });
    }

    Ok((clusters, assignments))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

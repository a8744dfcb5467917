//! Weighted problem graph and its cost function.
//!
//! Nodes are sites, edges are interactions carrying a weight in `[-1, 1]`.
//! Sites are enumerated in order of first appearance in the edge list; the
//! circuit builder measures site `i` of that enumeration into `ro[i]`, which
//! is what lets [`WeightedGraph::score_bits`] read a register row back.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use qfence_ir::{QubitId, QubitPair};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{LandscapeError, LandscapeResult};

/// One binary value per site.
pub type Assignment = FxHashMap<QubitId, u8>;

/// An immutable weighted interaction graph.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    graph: UnGraph<QubitId, f64>,
    nodes: FxHashMap<QubitId, NodeIndex>,
}

impl WeightedGraph {
    /// Build a graph with one uniform draw from `[-1, 1]` per edge, taken in
    /// edge order from a generator seeded with `seed`.
    pub fn build(edges: impl IntoIterator<Item = QubitPair>, seed: u64) -> LandscapeResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let weighted: Vec<_> = edges
            .into_iter()
            .map(|pair| (pair, rng.gen_range(-1.0..=1.0)))
            .collect();
        let graph = Self::with_weights(weighted)?;
        debug!(
            seed,
            sites = graph.num_sites(),
            edges = graph.num_edges(),
            "built weighted graph"
        );
        Ok(graph)
    }

    /// Build a graph with explicit weights.
    pub fn with_weights(edges: impl IntoIterator<Item = (QubitPair, f64)>) -> LandscapeResult<Self> {
        let mut graph = UnGraph::default();
        let mut nodes: FxHashMap<QubitId, NodeIndex> = FxHashMap::default();

        for (pair, weight) in edges {
            if !(-1.0..=1.0).contains(&weight) {
                return Err(LandscapeError::InvalidWeight { pair, weight });
            }
            let [a, b] = pair.sites();
            let na = *nodes.entry(a).or_insert_with(|| graph.add_node(a));
            let nb = *nodes.entry(b).or_insert_with(|| graph.add_node(b));
            if graph.find_edge(na, nb).is_some() {
                return Err(LandscapeError::DuplicateEdge(pair));
            }
            graph.add_edge(na, nb, weight);
        }
        Ok(Self { graph, nodes })
    }

    /// Sites in enumeration order.
    pub fn sites(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.graph.node_indices().map(|n| self.graph[n])
    }

    pub fn num_sites(&self) -> usize {
        self.graph.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges as `(u, v, w)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (QubitId, QubitId, f64)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()], *e.weight()))
    }

    /// Sites sharing an edge with `site`.
    pub fn neighbors(&self, site: QubitId) -> Vec<QubitId> {
        self.nodes
            .get(&site)
            .map(|&n| self.graph.neighbors(n).map(|m| self.graph[m]).collect())
            .unwrap_or_default()
    }

    /// Position of `site` in the enumeration.
    pub fn index_of(&self, site: QubitId) -> Option<usize> {
        self.nodes.get(&site).map(|n| n.index())
    }

    /// Sum over edges of `w` when both endpoints agree and `-w` otherwise.
    pub fn score(&self, assignment: &Assignment) -> LandscapeResult<f64> {
        self.score_with(|site| assignment.get(&site).copied())
    }

    /// Score a register row where entry `i` is the value of site `i`.
    pub fn score_bits(&self, bits: &[u8]) -> LandscapeResult<f64> {
        self.score_with(|site| self.index_of(site).and_then(|i| bits.get(i).copied()))
    }

    fn score_with(&self, value: impl Fn(QubitId) -> Option<u8>) -> LandscapeResult<f64> {
        let lookup = |site| value(site).ok_or(LandscapeError::MissingAssignment { site });
        self.edges().try_fold(0.0, |acc, (u, v, w)| {
            let same = lookup(u)? == lookup(v)?;
            Ok(acc + if same { w } else { -w })
        })
    }
}

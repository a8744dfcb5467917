//! Properties of the weighted-graph model.

use proptest::prelude::*;
use qfence_ir::{QubitId, QubitPair};
use qfence_landscape::{Assignment, WeightedGraph};

/// A path 0 - 1 - ... - n over `n + 1` sites.
fn path(n: u32) -> Vec<QubitPair> {
    (0..n).filter_map(|i| QubitPair::new(i, i + 1).ok()).collect()
}

proptest! {
    #[test]
    fn build_is_deterministic(n in 1u32..12, seed in any::<u64>()) {
        let a = WeightedGraph::build(path(n), seed).unwrap();
        let b = WeightedGraph::build(path(n), seed).unwrap();
        let wa: Vec<_> = a.edges().collect();
        let wb: Vec<_> = b.edges().collect();
        prop_assert_eq!(wa, wb);
        prop_assert!(a.edges().all(|(_, _, w)| (-1.0..=1.0).contains(&w)));
    }

    #[test]
    fn flipping_a_leaf_flips_its_edge(
        n in 1u32..10,
        seed in any::<u64>(),
        bits in prop::collection::vec(0u8..=1, 11),
    ) {
        let graph = WeightedGraph::build(path(n), seed).unwrap();
        let leaf = QubitId(0);
        prop_assert_eq!(graph.neighbors(leaf).len(), 1);

        let mut assignment: Assignment =
            graph.sites().map(|s| (s, bits[s.0 as usize])).collect();
        let before = graph.score(&assignment).unwrap();
        let (_, _, w) = graph.edges().next().unwrap();
        let agreed = assignment[&QubitId(0)] == assignment[&QubitId(1)];

        assignment.insert(leaf, 1 - assignment[&leaf]);
        let after = graph.score(&assignment).unwrap();

        let contribution = if agreed { w } else { -w };
        prop_assert!((before - after - 2.0 * contribution).abs() < 1e-9);
    }

    #[test]
    fn score_bits_agrees_with_score(
        n in 1u32..10,
        seed in any::<u64>(),
        bits in prop::collection::vec(0u8..=1, 11),
    ) {
        let graph = WeightedGraph::build(path(n), seed).unwrap();
        let row = &bits[..graph.num_sites()];
        let assignment: Assignment = graph
            .sites()
            .enumerate()
            .map(|(i, s)| (s, row[i]))
            .collect();
        let a = graph.score_bits(row).unwrap();
        let b = graph.score(&assignment).unwrap();
        prop_assert!((a - b).abs() < 1e-12);
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::snapshot::{ConceptEdge, ConceptNode, GraphSnapshot};

pub const NODE_COUNT: usize = 50;
pub const GROUP_COUNT: u8 = 5;
const EDGE_ATTEMPTS: usize = 100;

/// Builds the mock knowledge graph a real backend would extract from the
/// uploaded document. Deterministic for a given seed; self-loops are skipped
/// so every emitted edge connects two distinct existing nodes.
pub fn generate_snapshot(seed: u64) -> GraphSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);

    let nodes = (0..NODE_COUNT as u32)
        .map(|id| ConceptNode {
            id,
            name: format!("Concept {}", id + 1),
            group: rng.random_range(0..GROUP_COUNT),
        })
        .collect::<Vec<_>>();

    let mut edges = Vec::with_capacity(EDGE_ATTEMPTS);
    for _ in 0..EDGE_ATTEMPTS {
        let source = rng.random_range(0..NODE_COUNT as u32);
        let target = rng.random_range(0..NODE_COUNT as u32);
        if source == target {
            continue;
        }

        edges.push(ConceptEdge {
            source,
            target,
            weight: rng.random::<f32>(),
        });
    }

    GraphSnapshot { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_snapshot_satisfies_invariants() {
        for seed in [0, 1, 7, 1234, u64::MAX] {
            let snapshot = generate_snapshot(seed);
            assert_eq!(snapshot.node_count(), NODE_COUNT);
            snapshot
                .validate()
                .unwrap_or_else(|error| panic!("seed {seed}: {error}"));
        }
    }

    #[test]
    fn generated_edges_have_no_self_loops() {
        let snapshot = generate_snapshot(99);
        assert!(snapshot.edges.iter().all(|edge| edge.source != edge.target));
    }

    #[test]
    fn generated_names_are_one_based() {
        let snapshot = generate_snapshot(3);
        assert_eq!(snapshot.nodes[0].name, "Concept 1");
        assert_eq!(snapshot.nodes[49].name, "Concept 50");
    }

    #[test]
    fn same_seed_means_same_snapshot() {
        assert_eq!(generate_snapshot(42), generate_snapshot(42));
    }

    #[test]
    fn groups_stay_inside_palette_domain() {
        let snapshot = generate_snapshot(17);
        assert!(snapshot.nodes.iter().all(|node| node.group < GROUP_COUNT));
    }
}

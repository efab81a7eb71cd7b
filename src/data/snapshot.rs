use std::collections::HashSet;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// A single concept extracted from the uploaded document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: u32,
    pub name: String,
    pub group: u8,
}

/// A relation between two concepts. `weight` in [0, 1] only scales the
/// rendered stroke width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source: u32,
    pub target: u32,
    pub weight: f32,
}

/// The graph as fetched for one view session. Immutable once loaded;
/// reloading replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<ConceptEdge>,
}

impl GraphSnapshot {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: u32) -> Option<&ConceptNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Count of edges where `id` appears as source or target.
    pub fn degree(&self, id: u32) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.source == id || edge.target == id)
            .count()
    }

    /// Checks the structural invariants a snapshot must satisfy before the
    /// view layer is allowed to see it: unique node ids, every edge endpoint
    /// present, weights in [0, 1].
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(anyhow!("duplicate node id {}", node.id));
            }
        }

        for edge in &self.edges {
            if !ids.contains(&edge.source) {
                return Err(anyhow!("edge source {} is not a known node", edge.source));
            }
            if !ids.contains(&edge.target) {
                return Err(anyhow!("edge target {} is not a known node", edge.target));
            }
            if !(0.0..=1.0).contains(&edge.weight) {
                return Err(anyhow!(
                    "edge {} -> {} has weight {} outside [0, 1]",
                    edge.source,
                    edge.target,
                    edge.weight
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_snapshot() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![
                ConceptNode {
                    id: 0,
                    name: "Concept 1".to_owned(),
                    group: 0,
                },
                ConceptNode {
                    id: 1,
                    name: "Concept 2".to_owned(),
                    group: 3,
                },
                ConceptNode {
                    id: 2,
                    name: "Concept 3".to_owned(),
                    group: 1,
                },
            ],
            edges: vec![
                ConceptEdge {
                    source: 0,
                    target: 1,
                    weight: 0.5,
                },
                ConceptEdge {
                    source: 2,
                    target: 0,
                    weight: 1.0,
                },
            ],
        }
    }

    #[test]
    fn degree_counts_both_directions() {
        let snapshot = small_snapshot();
        assert_eq!(snapshot.degree(0), 2);
        assert_eq!(snapshot.degree(1), 1);
        assert_eq!(snapshot.degree(2), 1);
        assert_eq!(snapshot.degree(99), 0);
    }

    #[test]
    fn validate_accepts_well_formed_snapshot() {
        assert!(small_snapshot().validate().is_ok());
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let mut snapshot = small_snapshot();
        snapshot.edges.push(ConceptEdge {
            source: 0,
            target: 42,
            weight: 0.2,
        });
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut snapshot = small_snapshot();
        snapshot.nodes.push(ConceptNode {
            id: 1,
            name: "Concept 2 again".to_owned(),
            group: 0,
        });
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn decodes_backend_wire_shape() {
        let body = r#"{
            "nodes": [
                {"id": 0, "name": "Concept 1", "group": 2},
                {"id": 1, "name": "Concept 2", "group": 4}
            ],
            "edges": [
                {"source": 0, "target": 1, "weight": 0.75}
            ]
        }"#;

        let snapshot: GraphSnapshot = serde_json::from_str(body).expect("wire shape decodes");
        assert_eq!(snapshot.node_count(), 2);
        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.nodes[1].group, 4);
        assert!(snapshot.validate().is_ok());
    }
}

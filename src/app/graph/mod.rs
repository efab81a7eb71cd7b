use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui::{Ui, Vec2};

use crate::data::{FetchConfig, GraphSnapshot, spawn_fetch};

use super::physics::Simulation;

mod interaction;
mod view;

pub(super) const ZOOM_MIN: f32 = 0.1;
pub(super) const ZOOM_MAX: f32 = 4.0;
pub(super) const ZOOM_STEP_IN: f32 = 1.2;
pub(super) const ZOOM_STEP_OUT: f32 = 0.8;
const DIM_OPACITY: f32 = 0.1;
const EDGE_BASE_OPACITY: f32 = 0.6;

/// Owner of the graph tab: drives the Loading -> Ready | Error machine and,
/// once Ready, hands every frame to the [`ViewModel`].
pub struct GraphView {
    config: FetchConfig,
    state: GraphState,
}

enum GraphState {
    Loading {
        rx: Receiver<Result<GraphSnapshot, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Interactive state for a loaded snapshot: layout simulation, zoom/pan
/// transform, selection and the active search string. All concurrently
/// usable; none of it survives a reload.
pub(in crate::app) struct ViewModel {
    snapshot: GraphSnapshot,
    sim: Simulation,
    search: String,
    selected: Option<u32>,
    pan: Vec2,
    zoom: f32,
    drag: Option<usize>,
}

impl GraphView {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            state: GraphState::Loading {
                rx: spawn_fetch(config),
            },
        }
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let mut transition = None;

        match &mut self.state {
            GraphState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(snapshot)) => {
                        log::info!(
                            "knowledge graph loaded: {} nodes / {} edges",
                            snapshot.node_count(),
                            snapshot.edge_count()
                        );
                        transition = Some(GraphState::Ready(Box::new(ViewModel::new(snapshot))));
                    }
                    Ok(Err(error)) => {
                        log::warn!("knowledge graph load failed: {error}");
                        transition = Some(GraphState::Error(error));
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(GraphState::Error(
                            "Graph load worker disconnected".to_owned(),
                        ));
                    }
                }

                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading knowledge graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
                ui.ctx().request_repaint_after(Duration::from_millis(100));
            }
            GraphState::Error(error) => {
                ui.add_space(24.0);
                ui.heading("Knowledge graph unavailable");
                ui.add_space(6.0);
                ui.label(error.as_str());
                ui.add_space(10.0);
                if ui.button("Retry").clicked() {
                    transition = Some(GraphState::Loading {
                        rx: spawn_fetch(self.config),
                    });
                }
            }
            GraphState::Ready(model) => {
                model.show(ui);
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn new(snapshot: GraphSnapshot) -> Self {
        let sim = Simulation::new(&snapshot);
        Self {
            snapshot,
            sim,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            drag: None,
        }
    }

    /// Per-node match mask for the active search, or None when the query is
    /// blank. Matching is a case-insensitive substring test over names.
    fn search_matches(&self) -> Option<Vec<bool>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let query = query.to_lowercase();
        Some(
            self.snapshot
                .nodes
                .iter()
                .map(|node| node.name.to_lowercase().contains(&query))
                .collect(),
        )
    }

    fn node_opacity(matches: Option<&[bool]>, index: usize) -> f32 {
        match matches {
            Some(mask) if !mask.get(index).copied().unwrap_or(false) => DIM_OPACITY,
            _ => 1.0,
        }
    }

    /// Edges keep their base opacity only while at least one endpoint
    /// matches the active search.
    fn edge_opacity(matches: Option<&[bool]>, source: usize, target: usize) -> f32 {
        match matches {
            Some(mask) => {
                let source_hit = mask.get(source).copied().unwrap_or(false);
                let target_hit = mask.get(target).copied().unwrap_or(false);
                if source_hit || target_hit {
                    EDGE_BASE_OPACITY
                } else {
                    DIM_OPACITY
                }
            }
            None => EDGE_BASE_OPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConceptEdge, ConceptNode};

    fn model_with_names(names: &[&str]) -> ViewModel {
        let nodes = names
            .iter()
            .enumerate()
            .map(|(index, name)| ConceptNode {
                id: index as u32,
                name: (*name).to_owned(),
                group: (index % 5) as u8,
            })
            .collect::<Vec<_>>();
        let edges = vec![
            ConceptEdge {
                source: 0,
                target: 1,
                weight: 0.4,
            },
            ConceptEdge {
                source: 1,
                target: 2,
                weight: 0.9,
            },
        ];
        ViewModel::new(GraphSnapshot { nodes, edges })
    }

    #[test]
    fn blank_search_restores_full_opacity() {
        let mut model = model_with_names(&["Concept 1", "Concept 2", "Concept 3"]);
        model.search = "   ".to_owned();

        let matches = model.search_matches();
        assert!(matches.is_none());
        assert_eq!(ViewModel::node_opacity(matches.as_deref(), 0), 1.0);
        assert_eq!(
            ViewModel::edge_opacity(matches.as_deref(), 0, 1),
            EDGE_BASE_OPACITY
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut model = model_with_names(&["Concept 1", "Concept 12", "Other"]);
        model.search = "cePt 1".to_owned();

        let mask = model.search_matches().expect("query is non-empty");
        assert_eq!(mask, vec![true, true, false]);
    }

    #[test]
    fn zero_match_search_dims_everything() {
        let mut model = model_with_names(&["Concept 1", "Concept 2", "Concept 3"]);
        model.search = "no such node".to_owned();

        let mask = model.search_matches().expect("query is non-empty");
        assert!(mask.iter().all(|hit| !hit));
        for index in 0..3 {
            assert_eq!(ViewModel::node_opacity(Some(&mask), index), DIM_OPACITY);
        }
        assert_eq!(ViewModel::edge_opacity(Some(&mask), 0, 1), DIM_OPACITY);
        assert_eq!(ViewModel::edge_opacity(Some(&mask), 1, 2), DIM_OPACITY);
    }

    #[test]
    fn edge_is_opaque_when_one_endpoint_matches() {
        let mut model = model_with_names(&["Alpha", "Beta", "Gamma"]);
        model.search = "beta".to_owned();

        let mask = model.search_matches().expect("query is non-empty");
        assert_eq!(
            ViewModel::edge_opacity(Some(&mask), 0, 1),
            EDGE_BASE_OPACITY
        );
        assert_eq!(
            ViewModel::edge_opacity(Some(&mask), 1, 2),
            EDGE_BASE_OPACITY
        );
        assert_eq!(ViewModel::node_opacity(Some(&mask), 0), DIM_OPACITY);
        assert_eq!(ViewModel::node_opacity(Some(&mask), 1), 1.0);
    }
}

mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::data::GraphSnapshot;
use quadtree::{QuadNode, accumulate_repulsion_for_node};

const BARNES_HUT_THETA: f32 = 0.72;
const LINK_DISTANCE: f32 = 100.0;
const LINK_STRENGTH: f32 = 0.07;
const REPULSION_STRENGTH: f32 = 52_000.0;
const REPULSION_SOFTENING: f32 = 580.0;
const CENTER_PULL: f32 = 0.04;
const FORCE_SCALE: f32 = 0.055;
const MAX_SPEED: f32 = 14.0;
const VELOCITY_KEEP: f32 = 0.6;
const ALPHA_DECAY: f32 = 0.028;
const ALPHA_MIN: f32 = 0.003;
const REHEAT_ALPHA: f32 = 0.3;

/// One simulated node. `pinned` is the drag override: while set, integration
/// skips the node and it sits exactly at the override position, though its
/// repulsion and links still act on everyone else.
pub(in crate::app) struct SimNode {
    pub world_pos: Vec2,
    pub velocity: Vec2,
    pub pinned: Option<Vec2>,
}

struct Scratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

/// Iterative force layout: link attraction, Barnes-Hut many-body repulsion
/// and a centering pull, all scaled by a cooling factor `alpha` that relaxes
/// toward `alpha_target`. The layout is asleep once alpha drops under
/// `ALPHA_MIN` with no reheat pending.
pub(in crate::app) struct Simulation {
    pub nodes: Vec<SimNode>,
    edges: Vec<(usize, usize)>,
    alpha: f32,
    alpha_target: f32,
    scratch: Scratch,
}

impl Simulation {
    /// Seeds node positions on a phyllotaxis spiral so the first frames do
    /// not start from a degenerate single point. Edges with unknown
    /// endpoints are dropped rather than allowed to crash the solver.
    pub fn new(snapshot: &GraphSnapshot) -> Self {
        let nodes = (0..snapshot.node_count())
            .map(|index| {
                let radius = 14.0 * (index as f32).sqrt();
                let angle = (index as f32) * 0.618_034 * std::f32::consts::TAU;
                SimNode {
                    world_pos: vec2(angle.cos(), angle.sin()) * radius,
                    velocity: Vec2::ZERO,
                    pinned: None,
                }
            })
            .collect::<Vec<_>>();

        let edges = snapshot
            .edges
            .iter()
            .filter_map(|edge| {
                let source = snapshot
                    .nodes
                    .iter()
                    .position(|node| node.id == edge.source)?;
                let target = snapshot
                    .nodes
                    .iter()
                    .position(|node| node.id == edge.target)?;
                (source != target).then_some((source, target))
            })
            .collect::<Vec<_>>();

        Self {
            nodes,
            edges,
            alpha: 1.0,
            alpha_target: 0.0,
            scratch: Scratch {
                forces: Vec::new(),
                positions: Vec::new(),
            },
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
    }

    /// Bumps the energy back up so the layout resettles, e.g. around a node
    /// that was just grabbed or released.
    pub fn reheat(&mut self) {
        self.alpha_target = REHEAT_ALPHA;
        self.alpha = self.alpha.max(REHEAT_ALPHA);
    }

    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Full energy reset. Positions are kept so the layout resettles in
    /// place rather than rebuilding from the seed spiral.
    pub fn restart(&mut self) {
        self.alpha = 1.0;
        self.alpha_target = 0.0;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(position);
            node.world_pos = position;
            node.velocity = Vec2::ZERO;
        }
    }

    pub fn move_pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index)
            && node.pinned.is_some()
        {
            node.pinned = Some(position);
            node.world_pos = position;
        }
    }

    /// Clears the pin; the node stays where it was released and is free to
    /// move on subsequent steps.
    pub fn release_pin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
    }

    /// Advances the layout by one tick. Returns false once the simulation is
    /// asleep and nothing moved.
    pub fn step(&mut self) -> bool {
        if self.is_asleep() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        let node_count = self.nodes.len();
        if node_count < 2 {
            return false;
        }

        let scratch = &mut self.scratch;
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.forces.fill(Vec2::ZERO);
        scratch.positions.clear();
        for node in &self.nodes {
            scratch.positions.push(node.world_pos);
        }

        let forces = &mut scratch.forces;
        let positions = &scratch.positions;

        if let Some(quadtree) = QuadNode::build(positions) {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_repulsion_for_node(
                    &quadtree,
                    index,
                    positions,
                    REPULSION_STRENGTH,
                    REPULSION_SOFTENING,
                    BARNES_HUT_THETA,
                    force,
                );
            }
        }

        for &(source, target) in &self.edges {
            let delta = positions[source] - positions[target];
            let distance_sq = delta.length_sq();
            if distance_sq <= 0.0001 * 0.0001 {
                continue;
            }

            let distance = distance_sq.sqrt();
            let direction = delta / distance;
            let correction = direction * ((distance - LINK_DISTANCE) * LINK_STRENGTH);
            forces[source] -= correction;
            forces[target] += correction;
        }

        let mut centroid = Vec2::ZERO;
        for position in positions {
            centroid += *position;
        }
        centroid /= node_count as f32;
        for force in forces.iter_mut() {
            *force -= centroid * CENTER_PULL;
        }

        let mut any_motion = false;
        for (index, force) in forces.iter().enumerate() {
            let node = &mut self.nodes[index];
            if let Some(pin) = node.pinned {
                node.world_pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force * (self.alpha * FORCE_SCALE)) * VELOCITY_KEEP;
            let speed_sq = node.velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                node.velocity *= MAX_SPEED / speed_sq.sqrt();
            }
            node.world_pos += node.velocity;
            if node.velocity.length_sq() > 0.000_001 {
                any_motion = true;
            }
        }

        any_motion || !self.is_asleep()
    }
}

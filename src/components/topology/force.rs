//! Force-directed layout strategy.
//!
//! Every node becomes a free-standing box in a `force_graph` simulation.
//! Springs follow both call edges and containment links, so APIs cluster
//! around their system and endpoints around their API. The simulation runs a
//! few iterations per animation frame up to a fixed cap; whatever positions
//! it has reached by then are kept.

use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::Deserialize;

use crate::graph::{NodeType, Point, Rect, TopologyGraph};

/// Which geometry the renderer draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
	/// Nested boxes from the graph builder.
	#[default]
	Containment,
	/// Free boxes positioned by a force simulation.
	Force,
}

/// Tuning of the force layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceSettings {
	/// Simulation steps before the layout is frozen.
	pub max_iterations: u32,
	/// Simulation steps run per animation frame.
	pub iterations_per_frame: u32,
	/// Seconds advanced per step.
	pub time_step: f32,
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Attraction along edges and containment links.
	pub force_spring: f32,
	/// Upper bound of the force on one node.
	pub force_max: f32,
	/// Upper bound of node velocity.
	pub node_speed: f32,
	/// Velocity kept after each step.
	pub damping_factor: f32,
	/// Radius of the ring systems are seeded on.
	pub ring_radius: f64,
	/// Width and height of a system box.
	pub system_size: (f64, f64),
	/// Width and height of an API box.
	pub api_size: (f64, f64),
	/// Side of an endpoint square.
	pub endpoint_size: f64,
	/// Minimum gap the collision pass keeps between boxes.
	pub collision_padding: f64,
}

impl Default for ForceSettings {
	fn default() -> Self {
		Self {
			max_iterations: 600,
			iterations_per_frame: 10,
			time_step: 0.016,
			force_charge: 250.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			ring_radius: 300.0,
			system_size: (160.0, 56.0),
			api_size: (130.0, 40.0),
			endpoint_size: 24.0,
			collision_padding: 8.0,
		}
	}
}

impl ForceSettings {
	/// Box dimensions of a node type.
	pub fn box_size(&self, node_type: NodeType) -> (f64, f64) {
		match node_type {
			NodeType::System => self.system_size,
			NodeType::Api => self.api_size,
			NodeType::Endpoint => (self.endpoint_size, self.endpoint_size),
		}
	}

	fn mass(node_type: NodeType) -> f32 {
		match node_type {
			NodeType::System => 20.0,
			NodeType::Api => 10.0,
			NodeType::Endpoint => 5.0,
		}
	}
}

/// A running force simulation over one [`TopologyGraph`].
pub struct ForceLayout {
	sim: ForceGraph<usize, ()>,
	/// Simulation handle of each graph node, by node index.
	handles: Vec<DefaultNodeIdx>,
	sizes: Vec<(f64, f64)>,
	iterations: u32,
	settings: ForceSettings,
}

impl ForceLayout {
	/// Seeds the simulation around `center`.
	///
	/// Systems sit on a ring, except the focus system which is anchored at
	/// the exact centre. APIs and endpoints start on small rings around
	/// their parent.
	pub fn new(graph: &TopologyGraph, settings: &ForceSettings, center: Point) -> Self {
		let mut sim = ForceGraph::new(SimulationParameters {
			force_charge: settings.force_charge,
			force_spring: settings.force_spring,
			force_max: settings.force_max,
			node_speed: settings.node_speed,
			damping_factor: settings.damping_factor,
		});

		let focus = graph
			.focus
			.as_deref()
			.and_then(|f| graph.position_of(NodeType::System, f));
		let seeds = seed_positions(graph, focus, center, settings.ring_radius);

		let mut handles = Vec::with_capacity(graph.nodes.len());
		let mut sizes = Vec::with_capacity(graph.nodes.len());
		for (idx, (node, seed)) in graph.nodes.iter().zip(&seeds).enumerate() {
			let node_type = node.node_type();
			handles.push(sim.add_node(NodeData {
				x: seed.x as f32,
				y: seed.y as f32,
				mass: ForceSettings::mass(node_type),
				is_anchor: Some(idx) == focus,
				user_data: idx,
			}));
			sizes.push(settings.box_size(node_type));
		}

		for (parent, child) in graph.hierarchy_links() {
			sim.add_edge(handles[parent], handles[child], EdgeData::default());
		}
		for edge in &graph.edges {
			sim.add_edge(handles[edge.source], handles[edge.target], EdgeData::default());
		}

		Self {
			sim,
			handles,
			sizes,
			iterations: 0,
			settings: settings.clone(),
		}
	}

	pub fn is_settled(&self) -> bool {
		self.iterations >= self.settings.max_iterations
	}

	/// Advances one frame's worth of iterations. Returns whether the layout
	/// is still moving.
	pub fn step(&mut self) -> bool {
		if self.is_settled() {
			return false;
		}
		let remaining = self.settings.max_iterations - self.iterations;
		let n = self.settings.iterations_per_frame.max(1).min(remaining);
		for _ in 0..n {
			self.sim.update(self.settings.time_step);
		}
		self.iterations += n;
		self.resolve_collisions();

		if self.is_settled() {
			debug!(
				"topology: force layout stopped after {} iterations",
				self.iterations
			);
		}
		!self.is_settled()
	}

	/// Centre of every node, by node index.
	pub fn centers(&self) -> Vec<Point> {
		let mut centers = vec![Point::default(); self.handles.len()];
		self.sim.visit_nodes(|node| {
			if let Some(slot) = centers.get_mut(node.data.user_data) {
				*slot = Point::new(node.x() as f64, node.y() as f64);
			}
		});
		centers
	}

	/// Boxes of every node, by node index.
	pub fn rects(&self) -> Vec<Rect> {
		self.centers()
			.into_iter()
			.zip(&self.sizes)
			.map(|(c, &(w, h))| Rect::new(c.x - w / 2.0, c.y - h / 2.0, w, h))
			.collect()
	}

	/// Fixes node `idx` at `center`; the simulation no longer moves it.
	pub fn pin(&mut self, idx: usize, center: Point) {
		let Some(&handle) = self.handles.get(idx) else {
			return;
		};
		self.sim.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.x = center.x as f32;
				node.data.y = center.y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	fn resolve_collisions(&mut self) {
		let mut rects = self.rects();
		let mut fixed = vec![false; rects.len()];
		self.sim.visit_nodes(|node| {
			if let Some(slot) = fixed.get_mut(node.data.user_data) {
				*slot = node.data.is_anchor;
			}
		});
		if !separate_boxes(&mut rects, &fixed, self.settings.collision_padding) {
			return;
		}
		self.sim.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(r) = rects.get(node.data.user_data) {
				let c = r.center();
				node.data.x = c.x as f32;
				node.data.y = c.y as f32;
			}
		});
	}
}

/// Initial positions: systems on a ring, children on smaller rings around
/// their parent. The focus system (if any) takes the centre.
fn seed_positions(
	graph: &TopologyGraph,
	focus: Option<usize>,
	center: Point,
	radius: f64,
) -> Vec<Point> {
	let mut seeds = vec![center; graph.nodes.len()];

	let ringed: Vec<usize> = graph
		.nodes
		.iter()
		.enumerate()
		.filter(|(i, n)| n.parent.is_none() && Some(*i) != focus)
		.map(|(i, _)| i)
		.collect();
	for (k, &idx) in ringed.iter().enumerate() {
		seeds[idx] = on_ring(center, radius, k, ringed.len());
	}

	// Parents precede children, so each parent's seed is already final.
	for idx in 0..graph.nodes.len() {
		let Some(parent) = graph.nodes[idx].parent else {
			continue;
		};
		let siblings: Vec<usize> = graph.children(parent).collect();
		let k = siblings.iter().position(|&s| s == idx).unwrap_or(0);
		let child_radius = match graph.nodes[idx].node_type() {
			NodeType::Api => radius * 0.4,
			_ => radius * 0.15,
		};
		seeds[idx] = on_ring(seeds[parent], child_radius, k, siblings.len());
	}
	seeds
}

fn on_ring(center: Point, radius: f64, k: usize, n: usize) -> Point {
	let angle = k as f64 * 2.0 * PI / n.max(1) as f64;
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// One pass pushing overlapping boxes apart along their axis of least
/// penetration, keeping `padding` between them. Fixed boxes never move.
/// Returns whether anything moved.
pub fn separate_boxes(rects: &mut [Rect], fixed: &[bool], padding: f64) -> bool {
	let mut moved = false;
	for i in 0..rects.len() {
		for j in (i + 1)..rects.len() {
			let (a, b) = (rects[i], rects[j]);
			let (ca, cb) = (a.center(), b.center());
			let overlap_x = (a.width + b.width) / 2.0 + padding - (cb.x - ca.x).abs();
			let overlap_y = (a.height + b.height) / 2.0 + padding - (cb.y - ca.y).abs();
			if overlap_x <= 0.0 || overlap_y <= 0.0 {
				continue;
			}

			let (fixed_a, fixed_b) = (
				fixed.get(i).copied().unwrap_or(false),
				fixed.get(j).copied().unwrap_or(false),
			);
			let (share_a, share_b) = match (fixed_a, fixed_b) {
				(true, true) => continue,
				(true, false) => (0.0, 1.0),
				(false, true) => (1.0, 0.0),
				(false, false) => (0.5, 0.5),
			};

			let (dx, dy) = if overlap_x < overlap_y {
				let sign = if cb.x >= ca.x { 1.0 } else { -1.0 };
				(overlap_x * sign, 0.0)
			} else {
				let sign = if cb.y >= ca.y { 1.0 } else { -1.0 };
				(0.0, overlap_y * sign)
			};
			rects[i] = a.translate(-dx * share_a, -dy * share_a);
			rects[j] = b.translate(dx * share_b, dy * share_b);
			moved = true;
		}
	}
	moved
}

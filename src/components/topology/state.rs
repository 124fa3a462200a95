//! View state and interaction tracking for the topology canvas.
//!
//! Holds the current graph together with the absolute box of every node,
//! the pan/zoom transform, pointer interaction and highlight state. Only
//! view state lives here; entity data is never modified.

use std::collections::{HashMap, HashSet};

use crate::config::ZoomRange;
use crate::graph::{EdgeRoute, NodeType, Point, Rect, TopologyGraph, route_edge};

use super::force::{ForceLayout, ForceSettings, LayoutStrategy};

/// Pointer travel (screen pixels) below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl ViewTransform {
	pub const fn identity() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::identity()
	}
}

/// What the pointer is currently doing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
	Idle,
	/// Moving `node` (a system box in containment layout).
	Dragging {
		node: usize,
		/// Node under the pointer when the press started.
		pressed: usize,
		start: Point,
		origin: Point,
		moved: bool,
	},
	Panning {
		start: Point,
		transform_start: Point,
		moved: bool,
	},
}

/// Outcome of releasing the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerUp {
	/// Press and release without movement; `None` for the background.
	Click(Option<usize>),
	Moved,
	Ignored,
}

/// Manages smooth highlight transitions with per-node intensity tracking.
///
/// Each node has its own intensity (0.0 to 1.0) that eases towards 1 while
/// it is in the target set and decays towards 0 afterwards, using
/// exponential smoothing. A short hold time keeps highlights from flashing
/// when the pointer skims a node.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	hovered: Option<usize>,
	target_set: HashSet<usize>,
	node_intensity: HashMap<usize, f64>,
	hold_timer: HashMap<usize, f64>,
	cached_max: f64,
}

/// Minimum time (seconds) a highlight is held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;
const FADE_IN_SPEED: f64 = 6.0;
const FADE_OUT_SPEED: f64 = 4.0;

impl HighlightState {
	/// Highlights `node` plus every node it shares a call edge with.
	pub fn set_hover(&mut self, node: Option<usize>, links: &[(usize, usize)]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.target_set.clear();

		if let Some(idx) = node {
			self.target_set.insert(idx);
			for &(src, tgt) in links {
				if src == idx {
					self.target_set.insert(tgt);
				} else if tgt == idx {
					self.target_set.insert(src);
				}
			}
			for &idx in &self.target_set {
				self.hold_timer.insert(idx, MIN_HOLD_TIME);
			}
		}
	}

	/// Eases every intensity towards its target: `v += (target - v) * (1 - e^(-speed * dt))`.
	pub fn tick(&mut self, dt: f64) {
		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &idx in &self.target_set {
			let v = self.node_intensity.entry(idx).or_insert(0.0);
			*v += (1.0 - *v) * fade_in;
		}

		self.hold_timer.retain(|idx, timer| {
			if self.target_set.contains(idx) {
				return true;
			}
			*timer -= dt;
			*timer > 0.0
		});

		let mut max: f64 = 0.0;
		self.node_intensity.retain(|idx, v| {
			if !self.target_set.contains(idx) && !self.hold_timer.contains_key(idx) {
				*v *= fade_out;
			}
			let keep = *v > 0.005;
			if keep {
				max = max.max(*v);
			}
			keep
		});
		self.cached_max = max;
	}

	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	pub fn node_intensity(&self, idx: usize) -> f64 {
		self.node_intensity.get(&idx).copied().unwrap_or(0.0)
	}

	/// Geometric mean of both ends, so edges track their nodes smoothly.
	pub fn edge_intensity(&self, a: usize, b: usize) -> f64 {
		(self.node_intensity(a) * self.node_intensity(b)).sqrt()
	}

	/// Highest intensity of any node, used to dim everything else.
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Everything the renderer needs for one graph.
///
/// Replaced wholesale when a new graph is loaded, then mutated each frame
/// by the animation loop and by pointer handlers.
pub struct TopologyState {
	pub graph: TopologyGraph,
	pub layout: LayoutStrategy,
	pub force: Option<ForceLayout>,
	pub transform: ViewTransform,
	pub interaction: Interaction,
	pub selected: Option<usize>,
	pub highlight: HighlightState,
	pub zoom: ZoomRange,
	pub width: f64,
	pub height: f64,
	force_settings: ForceSettings,
	/// Absolute box of every node, by node index.
	rects: Vec<Rect>,
	links: Vec<(usize, usize)>,
}

impl TopologyState {
	pub fn new(
		graph: TopologyGraph,
		layout: LayoutStrategy,
		force_settings: ForceSettings,
		zoom: ZoomRange,
		width: f64,
		height: f64,
	) -> Self {
		let mut state = Self {
			graph: TopologyGraph::default(),
			layout,
			force: None,
			transform: ViewTransform::identity(),
			interaction: Interaction::Idle,
			selected: None,
			highlight: HighlightState::default(),
			zoom,
			width,
			height,
			force_settings,
			rects: Vec::new(),
			links: Vec::new(),
		};
		state.replace_graph(graph);
		state
	}

	/// Swaps in a freshly built graph and resets all view state.
	pub fn replace_graph(&mut self, graph: TopologyGraph) {
		self.links = graph.edges.iter().map(|e| (e.source, e.target)).collect();
		self.interaction = Interaction::Idle;
		self.selected = None;
		self.highlight = HighlightState::default();

		match self.layout {
			LayoutStrategy::Containment => {
				self.force = None;
				self.rects = (0..graph.nodes.len()).map(|i| graph.absolute_rect(i)).collect();
				self.transform = ViewTransform::identity();
			}
			LayoutStrategy::Force => {
				let layout = ForceLayout::new(&graph, &self.force_settings, Point::default());
				self.rects = layout.rects();
				self.force = Some(layout);
				self.transform = ViewTransform {
					x: self.width / 2.0,
					y: self.height / 2.0,
					k: 1.0,
				};
			}
		}
		self.graph = graph;
	}

	pub fn rect(&self, idx: usize) -> Option<Rect> {
		self.rects.get(idx).copied()
	}

	pub fn screen_to_graph(&self, p: Point) -> Point {
		Point::new(
			(p.x - self.transform.x) / self.transform.k,
			(p.y - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position. Later nodes are drawn on top,
	/// so the search runs in reverse draw order.
	pub fn node_at_position(&self, screen: Point, slop: f64) -> Option<usize> {
		let p = self.screen_to_graph(screen);
		self.rects
			.iter()
			.enumerate()
			.rev()
			.find(|(i, r)| {
				let slop = match self.graph.nodes[*i].node_type() {
					NodeType::Endpoint => slop,
					_ => 0.0,
				};
				Rect::new(r.x - slop, r.y - slop, r.width + 2.0 * slop, r.height + 2.0 * slop)
					.contains(p)
			})
			.map(|(i, _)| i)
	}

	/// Node that moves when `idx` is dragged.
	fn drag_target(&self, idx: usize) -> usize {
		match self.layout {
			LayoutStrategy::Containment => self.graph.root_of(idx),
			LayoutStrategy::Force => idx,
		}
	}

	pub fn pointer_down(&mut self, screen: Point, slop: f64) {
		self.interaction = match self.node_at_position(screen, slop) {
			Some(pressed) => {
				let node = self.drag_target(pressed);
				Interaction::Dragging {
					node,
					pressed,
					start: screen,
					origin: self.rects[node].origin(),
					moved: false,
				}
			}
			None => Interaction::Panning {
				start: screen,
				transform_start: Point::new(self.transform.x, self.transform.y),
				moved: false,
			},
		};
	}

	/// Updates hover, drag or pan for a pointer move.
	pub fn pointer_move(&mut self, screen: Point, slop: f64) {
		match self.interaction {
			Interaction::Idle => {
				let hovered = self.node_at_position(screen, slop);
				self.highlight.set_hover(hovered, &self.links);
			}
			Interaction::Dragging {
				node,
				pressed,
				start,
				origin,
				moved,
			} => {
				let moved = moved || start.distance(screen) > CLICK_SLOP;
				if moved {
					let k = self.transform.k;
					let to = Point::new(
						origin.x + (screen.x - start.x) / k,
						origin.y + (screen.y - start.y) / k,
					);
					self.move_node(node, to);
				}
				self.interaction = Interaction::Dragging {
					node,
					pressed,
					start,
					origin,
					moved,
				};
			}
			Interaction::Panning {
				start,
				transform_start,
				moved,
			} => {
				self.transform.x = transform_start.x + (screen.x - start.x);
				self.transform.y = transform_start.y + (screen.y - start.y);
				self.interaction = Interaction::Panning {
					start,
					transform_start,
					moved: moved || start.distance(screen) > CLICK_SLOP,
				};
			}
		}
	}

	/// Ends the current interaction. A press without movement selects the
	/// pressed node, or clears the selection on the background.
	pub fn pointer_up(&mut self) -> PointerUp {
		let outcome = match self.interaction {
			Interaction::Idle => PointerUp::Ignored,
			Interaction::Dragging { moved: true, .. } | Interaction::Panning { moved: true, .. } => {
				PointerUp::Moved
			}
			Interaction::Dragging { pressed, .. } => {
				self.selected = Some(pressed);
				PointerUp::Click(Some(pressed))
			}
			Interaction::Panning { .. } => {
				self.selected = None;
				PointerUp::Click(None)
			}
		};
		self.interaction = Interaction::Idle;
		outcome
	}

	pub fn pointer_leave(&mut self) {
		self.interaction = Interaction::Idle;
		self.highlight.set_hover(None, &self.links);
	}

	/// Zooms by one wheel notch about a screen position, which stays fixed.
	/// A purely horizontal scroll leaves the zoom alone.
	pub fn zoom_at(&mut self, screen: Point, delta_y: f64) {
		if delta_y == 0.0 {
			return;
		}
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = self.zoom.clamp(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = screen.x - (screen.x - self.transform.x) * ratio;
		self.transform.y = screen.y - (screen.y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Moves node `idx` so its top-left corner is at `to`. In containment
	/// layout the node's whole subtree moves with it.
	pub fn move_node(&mut self, idx: usize, to: Point) {
		let Some(current) = self.rect(idx) else {
			return;
		};
		let (dx, dy) = (to.x - current.x, to.y - current.y);
		match self.layout {
			LayoutStrategy::Containment => {
				for i in self.subtree(idx) {
					self.rects[i] = self.rects[i].translate(dx, dy);
				}
			}
			LayoutStrategy::Force => {
				let moved = current.translate(dx, dy);
				self.rects[idx] = moved;
				if let Some(force) = &mut self.force {
					force.pin(idx, moved.center());
				}
			}
		}
	}

	/// `idx` followed by all of its descendants. Nodes are stored depth
	/// first, so a subtree is contiguous.
	fn subtree(&self, idx: usize) -> std::ops::Range<usize> {
		let depth = |mut i: usize| {
			let mut d = 0;
			while let Some(p) = self.graph.nodes[i].parent {
				i = p;
				d += 1;
			}
			d
		};
		let base = depth(idx);
		let end = (idx + 1..self.graph.nodes.len())
			.find(|&i| depth(i) <= base)
			.unwrap_or(self.graph.nodes.len());
		idx..end
	}

	/// Advances the force layout and highlight animations.
	pub fn tick(&mut self, dt: f64) {
		if let Some(force) = &mut self.force {
			if !force.is_settled() {
				force.step();
				self.rects = force.rects();
			}
		}
		self.highlight.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Routed geometry of every call edge, in edge order.
	pub fn edge_routes(&self, curve_offset: f64) -> Vec<EdgeRoute> {
		self.graph
			.edges
			.iter()
			.map(|e| route_edge(&self.rects[e.source], &self.rects[e.target], curve_offset))
			.collect()
	}
}

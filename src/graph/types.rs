//! Node and edge types produced by the graph builder.

use std::collections::HashMap;

use crate::model::{EntityId, PartyKind};

use super::geometry::Rect;

/// Which level of the containment hierarchy a node sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
	/// A top-level system.
	System,
	/// An API inside a system.
	Api,
	/// An endpoint inside an API.
	Endpoint,
}

/// Type-specific data of a [`GraphNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// A top-level system.
	System {
		/// Free-text description from the catalog.
		description: Option<String>,
		/// Short system code, if any.
		system_code: Option<String>,
		/// Call edges with this system on either end.
		connection_count: usize,
	},
	/// An API inside a system.
	Api {
		/// The owning system.
		system_id: EntityId,
	},
	/// An endpoint inside an API.
	Endpoint {
		/// The owning API.
		api_id: EntityId,
		/// HTTP verb, `?` when unknown.
		http_method: String,
		/// Request path.
		path: String,
		/// Synthesized to anchor an edge whose endpoint is not in the catalog.
		placeholder: bool,
	},
}

/// A box in the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Catalog id (or synthesized id for placeholders).
	pub id: EntityId,
	/// Display name.
	pub name: String,
	/// Type-specific data.
	pub kind: NodeKind,
	/// Index of the containing node; `None` for systems.
	pub parent: Option<usize>,
	/// Containment layout box, relative to the parent's top-left corner.
	pub rect: Rect,
}

impl GraphNode {
	/// The hierarchy level of this node.
	pub fn node_type(&self) -> NodeType {
		match self.kind {
			NodeKind::System { .. } => NodeType::System,
			NodeKind::Api { .. } => NodeType::Api,
			NodeKind::Endpoint { .. } => NodeType::Endpoint,
		}
	}
}

/// How a call edge is classified for styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
	/// A system calls another system.
	SystemCall,
	/// A system calls an API.
	SystemToApi,
	/// An API calls another API.
	ApiCall,
	/// An API calls a system.
	ApiToSystem,
}

impl CallKind {
	/// Classifies a call by the kinds of both parties.
	pub fn new(caller: PartyKind, callee: PartyKind) -> Self {
		match (caller, callee) {
			(PartyKind::System, PartyKind::System) => CallKind::SystemCall,
			(PartyKind::System, PartyKind::Api) => CallKind::SystemToApi,
			(PartyKind::Api, PartyKind::Api) => CallKind::ApiCall,
			(PartyKind::Api, PartyKind::System) => CallKind::ApiToSystem,
		}
	}
}

/// A call edge derived from one relationship. Always ends at an endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	/// Id of the relationship this edge was derived from.
	pub id: EntityId,
	/// Id of the calling system or API.
	pub source_node_id: EntityId,
	/// System or API; never an endpoint.
	pub source_type: NodeType,
	/// Id of the target endpoint.
	pub target_node_id: EntityId,
	/// Always [`NodeType::Endpoint`].
	pub target_type: NodeType,
	/// Node indices of both ends.
	pub source: usize,
	/// Node index of the target endpoint.
	pub target: usize,
	/// Styling class of the call.
	pub call_kind: CallKind,
}

/// Output of the builder: nodes in draw order (each system followed by its
/// APIs, each API followed by its endpoints) plus call edges.
#[derive(Clone, Debug, Default)]
pub struct TopologyGraph {
	/// Nodes in draw order.
	pub nodes: Vec<GraphNode>,
	/// Call edges.
	pub edges: Vec<GraphEdge>,
	/// The focus system this graph was resolved for.
	pub focus: Option<EntityId>,
	/// True for the placeholder graph shown when no real data is available.
	pub sample: bool,
	index: HashMap<(NodeType, EntityId), usize>,
}

impl PartialEq for TopologyGraph {
	fn eq(&self, other: &Self) -> bool {
		self.nodes == other.nodes
			&& self.edges == other.edges
			&& self.focus == other.focus
			&& self.sample == other.sample
	}
}

impl TopologyGraph {
	/// Builds a graph and its id index.
	pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>, focus: Option<EntityId>) -> Self {
		let index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| ((n.node_type(), n.id.clone()), i))
			.collect();
		Self {
			nodes,
			edges,
			focus,
			sample: false,
			index,
		}
	}

	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Index of the node with the given type and id.
	pub fn position_of(&self, node_type: NodeType, id: &str) -> Option<usize> {
		self.index.get(&(node_type, id.to_string())).copied()
	}

	/// The node with the given type and id.
	pub fn node(&self, node_type: NodeType, id: &str) -> Option<&GraphNode> {
		self.position_of(node_type, id).map(|i| &self.nodes[i])
	}

	/// Indices of the direct children of `idx`.
	pub fn children(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.nodes
			.iter()
			.enumerate()
			.filter(move |(_, n)| n.parent == Some(idx))
			.map(|(i, _)| i)
	}

	/// Topmost ancestor of `idx` (the node itself for systems).
	pub fn root_of(&self, mut idx: usize) -> usize {
		while let Some(parent) = self.nodes[idx].parent {
			idx = parent;
		}
		idx
	}

	/// Parent→child pairs of the containment hierarchy.
	pub fn hierarchy_links(&self) -> Vec<(usize, usize)> {
		self.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, n)| n.parent.map(|p| (p, i)))
			.collect()
	}

	/// Absolute containment box of `idx`, summing parent offsets.
	pub fn absolute_rect(&self, idx: usize) -> Rect {
		let node = &self.nodes[idx];
		match node.parent {
			Some(parent) => {
				let origin = self.absolute_rect(parent).origin();
				node.rect.translate(origin.x, origin.y)
			}
			None => node.rect,
		}
	}

	/// Number of nodes of one type.
	pub fn count(&self, node_type: NodeType) -> usize {
		self.nodes.iter().filter(|n| n.node_type() == node_type).count()
	}

	/// Name of the nearest ancestor of the given type.
	pub fn ancestor_name(&self, idx: usize, node_type: NodeType) -> Option<&str> {
		let mut current = self.nodes[idx].parent;
		while let Some(i) = current {
			if self.nodes[i].node_type() == node_type {
				return Some(&self.nodes[i].name);
			}
			current = self.nodes[i].parent;
		}
		None
	}
}

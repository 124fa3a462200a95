//! Hierarchy and graph builder: relevant entities → laid-out nodes and edges.
//!
//! The output is a pure function of its inputs. Nodes are emitted depth
//! first (system, its APIs, each API's endpoints) so that drawing them in
//! order paints parents beneath children.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::model::{Api, CatalogIndex, Endpoint, Entities, Party, Relationship, System};
use crate::resolve::RelevantIds;

use super::containment::ContainmentMetrics;
use super::geometry::Rect;
use super::types::{CallKind, GraphEdge, GraphNode, NodeKind, NodeType, TopologyGraph};

const UNKNOWN_METHOD: &str = "?";
const UNKNOWN_PATH: &str = "(unlisted endpoint)";

/// Builds the graph with the default containment metrics.
pub fn build(entities: &Entities, relevant: &RelevantIds) -> TopologyGraph {
	build_with(entities, relevant, &ContainmentMetrics::default())
}

/// One endpoint cell of an API, real or synthesized.
#[derive(Debug)]
struct EndpointSlot {
	id: String,
	http_method: String,
	path: String,
	placeholder: bool,
}

impl EndpointSlot {
	fn real(endpoint: &Endpoint) -> Self {
		Self {
			id: endpoint.id.clone(),
			http_method: endpoint.http_method.clone(),
			path: endpoint.path.clone(),
			placeholder: false,
		}
	}

	fn placeholder(id: String, rel: &Relationship) -> Self {
		Self {
			id,
			http_method: rel
				.labels
				.endpoint_method
				.clone()
				.unwrap_or_else(|| UNKNOWN_METHOD.to_string()),
			path: rel
				.labels
				.endpoint_path
				.clone()
				.unwrap_or_else(|| UNKNOWN_PATH.to_string()),
			placeholder: true,
		}
	}
}

/// A call edge whose ends are known but not yet indexed.
struct PendingEdge<'a> {
	rel: &'a Relationship,
	source_type: NodeType,
	target_id: String,
}

/// Synthesized endpoints, keyed by `(api id, wanted endpoint id)`.
#[derive(Default)]
struct Placeholders {
	by_api: HashMap<(String, String), String>,
	ids: HashSet<String>,
}

/// Kept entities, after the containment invariants have been applied.
struct Kept<'a> {
	systems: Vec<&'a System>,
	apis: Vec<&'a Api>,
	system_ids: HashSet<&'a str>,
	api_ids: HashSet<&'a str>,
	endpoint_ids: HashSet<&'a str>,
	slots: HashMap<&'a str, Vec<EndpointSlot>>,
}

impl<'a> Kept<'a> {
	fn select(entities: &'a Entities, relevant: &RelevantIds) -> Self {
		let mut system_ids = HashSet::new();
		let systems: Vec<&System> = entities
			.systems
			.iter()
			.filter(|s| relevant.system_ids.contains(&s.id) && system_ids.insert(s.id.as_str()))
			.collect();

		let mut api_ids = HashSet::new();
		let apis: Vec<&Api> = entities
			.apis
			.iter()
			.filter(|a| {
				relevant.api_ids.contains(&a.id)
					&& system_ids.contains(a.system_id.as_str())
					&& api_ids.insert(a.id.as_str())
			})
			.collect();

		let mut endpoint_ids = HashSet::new();
		let mut slots: HashMap<&str, Vec<EndpointSlot>> = HashMap::new();
		for endpoint in &entities.endpoints {
			if relevant.endpoint_ids.contains(&endpoint.id)
				&& api_ids.contains(endpoint.api_id.as_str())
				&& endpoint_ids.insert(endpoint.id.as_str())
			{
				slots
					.entry(endpoint.api_id.as_str())
					.or_default()
					.push(EndpointSlot::real(endpoint));
			}
		}

		Self {
			systems,
			apis,
			system_ids,
			api_ids,
			endpoint_ids,
			slots,
		}
	}

	fn has_party(&self, party: &Party) -> bool {
		match party {
			Party::System(id) => self.system_ids.contains(id.as_str()),
			Party::Api(id) => self.api_ids.contains(id.as_str()),
		}
	}

	/// Resolves the ends of `rel`, synthesizing a placeholder target under
	/// the callee API when the invoked endpoint is not in the diagram.
	fn resolve_edge<'r>(
		&mut self,
		rel: &'r Relationship,
		index: &CatalogIndex<'_>,
		placeholders: &mut Placeholders,
	) -> Option<PendingEdge<'r>>
	where
		'r: 'a,
	{
		if !self.has_party(&rel.caller) {
			debug!("topology: relationship {} caller is not in the diagram", rel.id);
			return None;
		}
		if !index.contains(&rel.callee) {
			debug!("topology: relationship {} has a dangling callee", rel.id);
			return None;
		}

		let source_type = match rel.caller {
			Party::System(_) => NodeType::System,
			Party::Api(_) => NodeType::Api,
		};

		let target_id = match (&rel.endpoint_id, &rel.callee) {
			(Some(id), _) if self.endpoint_ids.contains(id.as_str()) => id.clone(),
			(endpoint_id, Party::Api(api_id)) if self.api_ids.contains(api_id.as_str()) => {
				let wanted = endpoint_id
					.clone()
					.unwrap_or_else(|| format!("{}:endpoint", rel.id));
				let key = (api_id.clone(), wanted.clone());
				if let Some(id) = placeholders.by_api.get(&key) {
					id.clone()
				} else {
					// The same missing id under another API gets its own cell.
					let id = if placeholders.ids.contains(&wanted) {
						format!("{api_id}:{wanted}")
					} else {
						wanted
					};
					debug!("topology: placeholder endpoint {} under api {}", id, api_id);
					placeholders.ids.insert(id.clone());
					placeholders.by_api.insert(key, id.clone());
					self.slots
						.entry(api_id.as_str())
						.or_default()
						.push(EndpointSlot::placeholder(id.clone(), rel));
					id
				}
			}
			_ => {
				debug!("topology: relationship {} has no endpoint to anchor on", rel.id);
				return None;
			}
		};

		Some(PendingEdge {
			rel,
			source_type,
			target_id,
		})
	}
}

/// Builds the graph for `relevant` using the given containment metrics.
///
/// Containment invariants: an API is kept only under a kept system and an
/// endpoint only under a kept API. Every emitted edge starts at a kept
/// system or API and ends at an endpoint node.
pub fn build_with(
	entities: &Entities,
	relevant: &RelevantIds,
	metrics: &ContainmentMetrics,
) -> TopologyGraph {
	let index = CatalogIndex::new(entities);
	let mut kept = Kept::select(entities, relevant);

	let mut placeholders = Placeholders::default();
	let mut seen_rels = HashSet::new();
	let pending: Vec<PendingEdge> = entities
		.relationships
		.iter()
		.filter(|r| relevant.relationship_ids.contains(&r.id) && seen_rels.insert(r.id.as_str()))
		.filter_map(|r| kept.resolve_edge(r, &index, &mut placeholders))
		.collect();

	let mut connections: HashMap<&str, usize> = HashMap::new();
	for edge in &pending {
		let touched: HashSet<&str> = [&edge.rel.caller, &edge.rel.callee]
			.into_iter()
			.filter_map(|p| index.system_of(p))
			.collect();
		for system in touched {
			*connections.entry(system).or_default() += 1;
		}
	}

	let mut ranked: Vec<(&System, usize)> = kept
		.systems
		.iter()
		.map(|s| (*s, connections.get(s.id.as_str()).copied().unwrap_or(0)))
		.collect();
	ranked.sort_by(|a, b| b.1.cmp(&a.1));

	let no_slots = Vec::new();
	let plans: Vec<Vec<(&Api, &Vec<EndpointSlot>, f64)>> = ranked
		.iter()
		.map(|(system, _)| {
			kept.apis
				.iter()
				.filter(|a| a.system_id == system.id)
				.map(|a| {
					let slots = kept.slots.get(a.id.as_str()).unwrap_or(&no_slots);
					(*a, slots, metrics.api_height(slots.len()))
				})
				.collect()
		})
		.collect();

	let heights: Vec<f64> = plans
		.iter()
		.map(|apis| {
			let api_heights: Vec<f64> = apis.iter().map(|(_, _, h)| *h).collect();
			metrics.system_height(&api_heights)
		})
		.collect();
	let spots = metrics.place_systems(&heights);

	let mut nodes = Vec::new();
	for (((system, connection_count), apis), (&(x, y), &height)) in ranked
		.iter()
		.zip(&plans)
		.zip(spots.iter().zip(&heights))
	{
		let system_idx = nodes.len();
		nodes.push(GraphNode {
			id: system.id.clone(),
			name: system.name.clone(),
			kind: NodeKind::System {
				description: system.description.clone(),
				system_code: system.system_code.clone(),
				connection_count: *connection_count,
			},
			parent: None,
			rect: Rect::new(x, y, metrics.system_box_width(), height),
		});

		let mut api_y = metrics.system_header;
		for (api, slots, api_height) in apis {
			let api_idx = nodes.len();
			nodes.push(GraphNode {
				id: api.id.clone(),
				name: api.name.clone(),
				kind: NodeKind::Api {
					system_id: api.system_id.clone(),
				},
				parent: Some(system_idx),
				rect: Rect::new(metrics.api_inset, api_y, metrics.api_box_width(), *api_height),
			});

			for (i, slot) in slots.iter().enumerate() {
				nodes.push(GraphNode {
					id: slot.id.clone(),
					name: slot.path.clone(),
					kind: NodeKind::Endpoint {
						api_id: api.id.clone(),
						http_method: slot.http_method.clone(),
						path: slot.path.clone(),
						placeholder: slot.placeholder,
					},
					parent: Some(api_idx),
					rect: metrics.endpoint_rect(i),
				});
			}
			api_y += api_height + metrics.api_spacing;
		}
	}

	let mut graph = TopologyGraph::new(nodes, Vec::new(), relevant.focus.clone());
	let edges: Vec<GraphEdge> = pending
		.iter()
		.filter_map(|edge| {
			let source = graph.position_of(edge.source_type, edge.rel.caller.id())?;
			let target = graph.position_of(NodeType::Endpoint, &edge.target_id)?;
			Some(GraphEdge {
				id: edge.rel.id.clone(),
				source_node_id: edge.rel.caller.id().to_string(),
				source_type: edge.source_type,
				target_node_id: edge.target_id.clone(),
				target_type: NodeType::Endpoint,
				source,
				target,
				call_kind: CallKind::new(edge.rel.caller.kind(), edge.rel.callee.kind()),
			})
		})
		.collect();
	graph.edges = edges;

	info!(
		"topology: built {} systems, {} apis, {} endpoints, {} edges",
		graph.count(NodeType::System),
		graph.count(NodeType::Api),
		graph.count(NodeType::Endpoint),
		graph.edges.len()
	);
	graph
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::RelationshipLabels;
	use crate::resolve::resolve;

	fn system(id: &str) -> System {
		System {
			id: id.into(),
			name: id.to_uppercase(),
			description: None,
			system_code: None,
		}
	}

	fn api(id: &str, system_id: &str) -> Api {
		Api {
			id: id.into(),
			system_id: system_id.into(),
			name: id.to_uppercase(),
		}
	}

	fn endpoint(id: &str, api_id: &str) -> Endpoint {
		Endpoint {
			id: id.into(),
			api_id: api_id.into(),
			path: format!("/{id}"),
			http_method: "GET".into(),
		}
	}

	fn rel(id: &str, caller: Party, callee: Party, endpoint_id: Option<&str>) -> Relationship {
		Relationship {
			id: id.into(),
			caller,
			callee,
			endpoint_id: endpoint_id.map(String::from),
			auth_type: None,
			description: None,
			labels: RelationshipLabels::default(),
		}
	}

	fn build_all(entities: &Entities) -> TopologyGraph {
		build(entities, &RelevantIds::everything(entities))
	}

	#[test]
	fn single_system_scenario() {
		let entities = Entities {
			systems: vec![system("s1")],
			apis: vec![api("a1", "s1")],
			endpoints: vec![endpoint("e1", "a1")],
			relationships: vec![rel(
				"r1",
				Party::System("s1".into()),
				Party::Api("a1".into()),
				Some("e1"),
			)],
		};
		let graph = build(&entities, &resolve(&entities, Some("s1")));

		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.edges.len(), 1);
		let edge = &graph.edges[0];
		assert_eq!(edge.source_type, NodeType::System);
		assert_eq!(edge.source_node_id, "s1");
		assert_eq!(edge.target_node_id, "e1");
		assert_eq!(edge.call_kind, CallKind::SystemToApi);
		assert_eq!(graph.focus.as_deref(), Some("s1"));
	}

	#[test]
	fn system_calling_a_foreign_endpoint_yields_one_edge() {
		let entities = Entities {
			systems: vec![system("S1"), system("S2")],
			apis: vec![api("A2", "S2")],
			endpoints: vec![endpoint("E5", "A2")],
			relationships: vec![rel(
				"r1",
				Party::System("S1".into()),
				Party::Api("A2".into()),
				Some("E5"),
			)],
		};
		let graph = build_all(&entities);
		assert_eq!(graph.edges.len(), 1);
		let edge = &graph.edges[0];
		assert_eq!(graph.nodes[edge.source].id, "S1");
		assert_eq!(graph.nodes[edge.target].id, "E5");
		assert_eq!(graph.nodes[edge.target].node_type(), NodeType::Endpoint);
	}

	#[test]
	fn dangling_callee_is_excluded() {
		let entities = Entities {
			systems: vec![system("s1")],
			apis: vec![api("a1", "s1")],
			endpoints: vec![endpoint("e1", "a1")],
			relationships: vec![rel(
				"r1",
				Party::System("s1".into()),
				Party::Api("ghost".into()),
				Some("e1"),
			)],
		};
		let graph = build_all(&entities);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn missing_endpoint_is_synthesized_under_the_callee() {
		let mut r = rel("r7", Party::System("s1".into()), Party::Api("a2".into()), None);
		r.labels.endpoint_method = Some("POST".into());
		r.labels.endpoint_path = Some("/orders".into());
		let entities = Entities {
			systems: vec![system("s1"), system("s2")],
			apis: vec![api("a2", "s2")],
			endpoints: vec![],
			relationships: vec![r],
		};
		let graph = build_all(&entities);

		assert_eq!(graph.edges.len(), 1);
		let target = &graph.nodes[graph.edges[0].target];
		assert_eq!(target.id, "r7:endpoint");
		assert_eq!(target.parent, graph.position_of(NodeType::Api, "a2"));
		match &target.kind {
			NodeKind::Endpoint {
				http_method,
				path,
				placeholder,
				..
			} => {
				assert_eq!(http_method, "POST");
				assert_eq!(path, "/orders");
				assert!(placeholder);
			}
			other => panic!("expected endpoint, got {other:?}"),
		}
	}

	#[test]
	fn shared_missing_endpoint_is_synthesized_once() {
		let entities = Entities {
			systems: vec![system("s1"), system("s2")],
			apis: vec![api("a1", "s1"), api("a2", "s2")],
			endpoints: vec![],
			relationships: vec![
				rel("r1", Party::System("s1".into()), Party::Api("a2".into()), Some("e9")),
				rel("r2", Party::Api("a1".into()), Party::Api("a2".into()), Some("e9")),
			],
		};
		let graph = build_all(&entities);
		assert_eq!(graph.count(NodeType::Endpoint), 1);
		assert_eq!(graph.edges.len(), 2);
		assert_eq!(graph.edges[0].target, graph.edges[1].target);
	}

	#[test]
	fn missing_endpoint_shared_by_two_apis_gets_a_cell_under_each() {
		let entities = Entities {
			systems: vec![system("s1"), system("s2"), system("s3")],
			apis: vec![api("a1", "s1"), api("a2", "s2"), api("a3", "s3")],
			endpoints: vec![],
			relationships: vec![
				rel("r1", Party::System("s1".into()), Party::Api("a2".into()), Some("e9")),
				rel("r2", Party::System("s1".into()), Party::Api("a3".into()), Some("e9")),
			],
		};
		let graph = build_all(&entities);
		assert_eq!(graph.count(NodeType::Endpoint), 2);
		assert_eq!(graph.edges.len(), 2);
		for (edge, api_id) in graph.edges.iter().zip(["a2", "a3"]) {
			let target = &graph.nodes[edge.target];
			let parent = target.parent.map(|p| graph.nodes[p].id.as_str());
			assert_eq!(parent, Some(api_id));
		}
		assert_eq!(graph.edges[0].target_node_id, "e9");
		assert_eq!(graph.edges[1].target_node_id, "a3:e9");
	}

	#[test]
	fn system_callee_without_endpoint_is_dropped() {
		let entities = Entities {
			systems: vec![system("s1"), system("s2")],
			relationships: vec![rel(
				"r1",
				Party::System("s1".into()),
				Party::System("s2".into()),
				None,
			)],
			..Default::default()
		};
		assert!(build_all(&entities).edges.is_empty());
	}

	#[test]
	fn orphaned_apis_and_endpoints_are_dropped() {
		let entities = Entities {
			systems: vec![system("s1")],
			apis: vec![api("a1", "s1"), api("a9", "nowhere")],
			endpoints: vec![endpoint("e1", "a1"), endpoint("e9", "a9")],
			relationships: vec![],
		};
		let graph = build_all(&entities);
		assert!(graph.node(NodeType::Api, "a9").is_none());
		assert!(graph.node(NodeType::Endpoint, "e9").is_none());
		assert_eq!(graph.nodes.len(), 3);
	}

	#[test]
	fn containers_are_large_enough_for_their_children() {
		let entities = Entities {
			systems: vec![system("s1")],
			apis: vec![api("a1", "s1"), api("a2", "s1")],
			endpoints: (0..9).map(|i| endpoint(&format!("e{i}"), "a1")).collect(),
			relationships: vec![],
		};
		let graph = build_all(&entities);
		let m = ContainmentMetrics::default();

		for (parent, child) in graph.hierarchy_links() {
			let p = graph.absolute_rect(parent);
			let c = graph.absolute_rect(child);
			assert!(c.x >= p.x && c.right() <= p.right(), "{child} escapes {parent}");
			assert!(c.y >= p.y && c.bottom() <= p.bottom(), "{child} escapes {parent}");
		}

		let s1 = graph.node(NodeType::System, "s1").map(|n| n.rect.height);
		let a1 = graph.node(NodeType::Api, "a1").map(|n| n.rect.height);
		assert_eq!(a1, Some(m.api_height(9)));
		assert_eq!(
			s1,
			Some(m.system_height(&[m.api_height(9), m.api_height(0)]))
		);
	}

	#[test]
	fn most_connected_system_is_centred_and_boxes_never_overlap() {
		let entities = Entities {
			systems: (1..=5).map(|i| system(&format!("s{i}"))).collect(),
			apis: vec![api("hub-api", "s4")],
			endpoints: vec![endpoint("hub-e", "hub-api")],
			relationships: (1..=3)
				.map(|i| {
					rel(
						&format!("r{i}"),
						Party::System(format!("s{i}")),
						Party::Api("hub-api".into()),
						Some("hub-e"),
					)
				})
				.collect(),
		};
		let graph = build_all(&entities);
		let m = ContainmentMetrics::default();

		let hub = &graph.nodes[0];
		assert_eq!(hub.id, "s4");
		assert_eq!(hub.rect.x, m.origin_x + m.system_width + m.system_spacing);
		assert!(matches!(
			hub.kind,
			NodeKind::System {
				connection_count: 3,
				..
			}
		));

		let systems: Vec<Rect> = graph
			.nodes
			.iter()
			.filter(|n| n.parent.is_none())
			.map(|n| n.rect)
			.collect();
		for (i, a) in systems.iter().enumerate() {
			for b in &systems[i + 1..] {
				assert!(!a.intersects(b));
			}
		}
	}

	#[test]
	fn build_is_deterministic() {
		let entities = Entities {
			systems: vec![system("s1"), system("s2")],
			apis: vec![api("a1", "s1"), api("a2", "s2")],
			endpoints: vec![endpoint("e1", "a1"), endpoint("e2", "a2")],
			relationships: vec![rel(
				"r1",
				Party::Api("a1".into()),
				Party::Api("a2".into()),
				Some("e2"),
			)],
		};
		assert_eq!(build_all(&entities), build_all(&entities));
	}

	#[test]
	fn unknown_focus_yields_no_nodes() {
		let entities = Entities {
			systems: vec![system("s1")],
			apis: vec![api("a1", "s1")],
			..Default::default()
		};
		let graph = build(&entities, &resolve(&entities, Some("missing")));
		assert!(graph.is_empty());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn nodes_are_emitted_parent_before_child() {
		let entities = Entities {
			systems: vec![system("s1"), system("s2")],
			apis: vec![api("a2", "s2"), api("a1", "s1")],
			endpoints: vec![endpoint("e1", "a1"), endpoint("e2", "a2")],
			relationships: vec![],
		};
		let graph = build_all(&entities);
		for (i, node) in graph.nodes.iter().enumerate() {
			if let Some(parent) = node.parent {
				assert!(parent < i);
			}
		}
	}
}

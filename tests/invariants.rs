//! Properties of the resolve → build pipeline over random catalogs.

use std::collections::BTreeSet;

use proptest::prelude::*;

use service_topology::graph::{ContainmentMetrics, NodeType, TopologyGraph, build, build_with};
use service_topology::model::{
	Api, CatalogIndex, Endpoint, Entities, Party, Relationship, RelationshipLabels, System,
};
use service_topology::resolve::{RelevantIds, resolve};

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

fn relationship(id: &str, caller: Party, callee: Party, endpoint_id: Option<&str>) -> Relationship {
	Relationship {
		id: id.into(),
		caller,
		callee,
		endpoint_id: endpoint_id.map(Into::into),
		auth_type: None,
		description: None,
		labels: RelationshipLabels::default(),
	}
}

/// `(is_api, index)`; indexes past the generated range dangle on purpose.
fn party(is_api: bool, i: usize) -> Party {
	if is_api {
		Party::Api(format!("a{i}"))
	} else {
		Party::System(format!("s{i}"))
	}
}

fn catalog() -> impl Strategy<Value = Entities> {
	(1usize..6, 0usize..8, 0usize..14, 0usize..10)
		.prop_flat_map(|(ns, na, ne, nr)| {
			let end = (any::<bool>(), 0..ns.max(na) + 1);
			(
				Just(ns),
				prop::collection::vec(0..ns + 1, na),
				prop::collection::vec(0..na + 1, ne),
				prop::collection::vec((end.clone(), end, prop::option::of(0..ne + 1)), nr),
			)
		})
		.prop_map(|(systems, api_owners, endpoint_apis, rels)| Entities {
			systems: (0..systems).map(|i| system(&format!("s{i}"))).collect(),
			apis: api_owners
				.iter()
				.enumerate()
				.map(|(i, owner)| api(&format!("a{i}"), &format!("s{owner}")))
				.collect(),
			endpoints: endpoint_apis
				.iter()
				.enumerate()
				.map(|(i, owner)| endpoint(&format!("e{i}"), &format!("a{owner}")))
				.collect(),
			relationships: rels
				.iter()
				.enumerate()
				.map(|(i, ((ca, ci), (ka, ki), target))| {
					let target = target.map(|t| format!("e{t}"));
					relationship(
						&format!("r{i}"),
						party(*ca, *ci),
						party(*ka, *ki),
						target.as_deref(),
					)
				})
				.collect(),
		})
}

/// Layout metrics as a host page might override them.
fn layout_metrics() -> impl Strategy<Value = ContainmentMetrics> {
	(
		(1usize..5, 50.0..600.0f64, 50.0..600.0f64, 0.0..40.0f64),
		(1usize..12, 5.0..30.0f64, 0.0..30.0f64, 0.0..40.0f64),
	)
		.prop_map(|((columns, system_width, api_width, api_inset), (per_row, size, gap, inset))| {
			ContainmentMetrics {
				columns,
				system_width,
				api_width,
				api_inset,
				endpoints_per_row: per_row,
				endpoint_size: size,
				endpoint_pitch: size + gap,
				endpoint_inset: inset,
				..Default::default()
			}
		})
}

fn catalog_with_focus() -> impl Strategy<Value = (Entities, String)> {
	catalog().prop_flat_map(|entities| {
		let n = entities.systems.len();
		(Just(entities), (0..n).prop_map(|i| format!("s{i}")))
	})
}

/// Systems reachable from `focus` through a single relationship.
fn one_hop(entities: &Entities, focus: &str) -> BTreeSet<String> {
	let index = CatalogIndex::new(entities);
	let mut reachable = BTreeSet::from([focus.to_string()]);
	for rel in &entities.relationships {
		let ends = [index.system_of(&rel.caller), index.system_of(&rel.callee)];
		if !ends.contains(&Some(focus)) {
			continue;
		}
		reachable.extend(ends.into_iter().flatten().map(String::from));
		let owner = rel
			.endpoint_id
			.as_deref()
			.and_then(|e| index.endpoint(e))
			.and_then(|e| index.api(&e.api_id))
			.map(|a| a.system_id.clone());
		reachable.extend(owner);
	}
	reachable
}

fn child_count(graph: &TopologyGraph, idx: usize) -> usize {
	graph.children(idx).count()
}

proptest! {
	#[test]
	fn no_focus_selects_every_id(entities in catalog()) {
		prop_assert_eq!(resolve(&entities, None), RelevantIds::everything(&entities));
	}

	#[test]
	fn focus_reaches_at_most_one_hop((entities, focus) in catalog_with_focus()) {
		let relevant = resolve(&entities, Some(&focus));
		prop_assert!(relevant.system_ids.contains(&focus));
		let reachable = one_hop(&entities, &focus);
		for id in &relevant.system_ids {
			prop_assert!(reachable.contains(id), "{} is more than one hop from {}", id, focus);
		}
	}

	#[test]
	fn edges_connect_existing_callers_to_endpoints(
		(entities, focus) in catalog_with_focus(),
		focused in any::<bool>(),
	) {
		let relevant = resolve(&entities, focused.then_some(focus.as_str()));
		let graph = build(&entities, &relevant);
		for edge in &graph.edges {
			let target = &graph.nodes[edge.target];
			prop_assert_eq!(target.node_type(), NodeType::Endpoint);
			prop_assert_eq!(&target.id, &edge.target_node_id);

			let source = &graph.nodes[edge.source];
			prop_assert_eq!(source.node_type(), edge.source_type);
			prop_assert_ne!(edge.source_type, NodeType::Endpoint);
			prop_assert_eq!(&source.id, &edge.source_node_id);
			prop_assert!(relevant.relationship_ids.contains(&edge.id));
		}
	}

	#[test]
	fn containers_hold_their_children(entities in catalog(), metrics in layout_metrics()) {
		let graph = build_with(&entities, &RelevantIds::everything(&entities), &metrics);
		for (idx, node) in graph.nodes.iter().enumerate() {
			match node.node_type() {
				NodeType::System => {
					prop_assert!(node.rect.height >= metrics.system_min_height);
				}
				NodeType::Api => {
					let expected = metrics.api_height(child_count(&graph, idx));
					prop_assert_eq!(node.rect.height, expected);
				}
				NodeType::Endpoint => {}
			}
			if let Some(parent) = node.parent {
				let outer = graph.nodes[parent].rect;
				prop_assert!(node.rect.x >= 0.0 && node.rect.y >= 0.0);
				prop_assert!(node.rect.right() <= outer.width);
				prop_assert!(node.rect.bottom() <= outer.height);
			}
		}
	}

	#[test]
	fn system_boxes_never_overlap(entities in catalog(), metrics in layout_metrics()) {
		let graph = build_with(&entities, &RelevantIds::everything(&entities), &metrics);
		let boxes: Vec<_> = graph
			.nodes
			.iter()
			.filter(|n| n.parent.is_none())
			.map(|n| n.rect)
			.collect();
		for (i, a) in boxes.iter().enumerate() {
			for b in &boxes[i + 1..] {
				prop_assert!(!a.intersects(b));
			}
		}
	}

	#[test]
	fn build_is_deterministic((entities, focus) in catalog_with_focus()) {
		let relevant = resolve(&entities, Some(&focus));
		prop_assert_eq!(build(&entities, &relevant), build(&entities, &relevant));
	}
}

#[test]
fn system_call_to_a_foreign_endpoint_targets_that_endpoint() {
	let entities = Entities {
		systems: vec![system("S1"), system("S2")],
		apis: vec![api("A2", "S2")],
		endpoints: vec![endpoint("E5", "A2")],
		relationships: vec![relationship(
			"R1",
			Party::System("S1".into()),
			Party::Api("A2".into()),
			Some("E5"),
		)],
	};
	let graph = build(&entities, &RelevantIds::everything(&entities));
	assert_eq!(graph.edges.len(), 1);
	let edge = &graph.edges[0];
	assert_eq!(edge.source_node_id, "S1");
	assert_eq!(edge.source_type, NodeType::System);
	assert_eq!(edge.target_node_id, "E5");
}

#[test]
fn single_service_calling_itself() {
	let entities = Entities {
		systems: vec![system("s1")],
		apis: vec![api("a1", "s1")],
		endpoints: vec![endpoint("e1", "a1")],
		relationships: vec![relationship(
			"r1",
			Party::System("s1".into()),
			Party::Api("a1".into()),
			Some("e1"),
		)],
	};
	let relevant = resolve(&entities, Some("s1"));
	assert_eq!(relevant.system_ids, BTreeSet::from(["s1".to_string()]));
	assert_eq!(relevant.api_ids, BTreeSet::from(["a1".to_string()]));
	assert_eq!(relevant.endpoint_ids, BTreeSet::from(["e1".to_string()]));

	let graph = build(&entities, &relevant);
	assert_eq!(graph.nodes.len(), 3);
	assert_eq!(graph.edges.len(), 1);
	assert_eq!(graph.edges[0].source_node_id, "s1");
	assert_eq!(graph.edges[0].target_node_id, "e1");
}

#[test]
fn unknown_callee_is_left_out() {
	let entities = Entities {
		systems: vec![system("s1")],
		apis: vec![api("a1", "s1")],
		endpoints: vec![endpoint("e1", "a1")],
		relationships: vec![relationship(
			"r1",
			Party::System("s1".into()),
			Party::Api("missing".into()),
			None,
		)],
	};
	let graph = build(&entities, &resolve(&entities, None));
	assert!(graph.edges.is_empty());
	assert_eq!(graph.nodes.len(), 3);
}

#[test]
fn unknown_focus_draws_nothing() {
	let entities = Entities {
		systems: vec![system("s1")],
		apis: vec![api("a1", "s1")],
		..Default::default()
	};
	let relevant = resolve(&entities, Some("ghost"));
	assert_eq!(relevant.system_ids, BTreeSet::from(["ghost".to_string()]));
	assert!(relevant.api_ids.is_empty());
	assert!(relevant.endpoint_ids.is_empty());

	let graph = build(&entities, &relevant);
	assert!(graph.nodes.is_empty());
	assert!(graph.edges.is_empty());
}

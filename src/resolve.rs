//! Relevance resolution: which entities belong in the diagram.
//!
//! Without a focus everything is relevant. With a focus system, the diagram
//! shows that system, every system one relationship hop away, and the APIs
//! and endpoints they contain.

use std::collections::BTreeSet;

use log::debug;

use crate::model::{CatalogIndex, Entities, EntityId, Party};

/// Ids selected for display, one set per entity type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelevantIds {
	/// The focus system the ids were resolved for, if any.
	pub focus: Option<EntityId>,
	/// Systems to draw, the focus included.
	pub system_ids: BTreeSet<EntityId>,
	/// APIs of the selected systems.
	pub api_ids: BTreeSet<EntityId>,
	/// Endpoints of the selected APIs.
	pub endpoint_ids: BTreeSet<EntityId>,
	/// Relationships that become edges.
	pub relationship_ids: BTreeSet<EntityId>,
}

impl RelevantIds {
	/// Every id of every collection.
	pub fn everything(entities: &Entities) -> Self {
		Self {
			focus: None,
			system_ids: entities.systems.iter().map(|s| s.id.clone()).collect(),
			api_ids: entities.apis.iter().map(|a| a.id.clone()).collect(),
			endpoint_ids: entities.endpoints.iter().map(|e| e.id.clone()).collect(),
			relationship_ids: entities.relationships.iter().map(|r| r.id.clone()).collect(),
		}
	}
}

/// Computes the relevant subset for an optional focus system.
///
/// Pure and order-independent. Relationships whose API ends cannot be
/// resolved are skipped.
pub fn resolve(entities: &Entities, focus: Option<&str>) -> RelevantIds {
	let Some(focus) = focus else {
		return RelevantIds::everything(entities);
	};

	let index = CatalogIndex::new(entities);
	let mut ids = RelevantIds {
		focus: Some(focus.to_string()),
		..RelevantIds::default()
	};
	ids.system_ids.insert(focus.to_string());

	for api in entities.apis.iter().filter(|a| a.system_id == focus) {
		ids.api_ids.insert(api.id.clone());
	}

	for rel in &entities.relationships {
		let (Some(caller_system), Some(callee_system)) =
			(index.system_of(&rel.caller), index.system_of(&rel.callee))
		else {
			debug!("topology: relationship {} has an unresolved end, skipped", rel.id);
			continue;
		};
		if caller_system != focus && callee_system != focus {
			continue;
		}

		ids.relationship_ids.insert(rel.id.clone());
		ids.system_ids.insert(caller_system.to_string());
		ids.system_ids.insert(callee_system.to_string());
		for party in [&rel.caller, &rel.callee] {
			match party {
				Party::Api(id) => {
					ids.api_ids.insert(id.clone());
				}
				Party::System(_) => {}
			}
		}

		if let Some(endpoint_id) = &rel.endpoint_id {
			ids.endpoint_ids.insert(endpoint_id.clone());
			// Keep the target's owners so the endpoint survives containment.
			if let Some(endpoint) = index.endpoint(endpoint_id) {
				ids.api_ids.insert(endpoint.api_id.clone());
				if let Some(api) = index.api(&endpoint.api_id) {
					ids.system_ids.insert(api.system_id.clone());
				}
			}
		}
	}

	for api in &entities.apis {
		if ids.system_ids.contains(&api.system_id) {
			ids.api_ids.insert(api.id.clone());
		}
	}
	for endpoint in &entities.endpoints {
		if ids.api_ids.contains(&endpoint.api_id) {
			ids.endpoint_ids.insert(endpoint.id.clone());
		}
	}

	ids
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Api, Endpoint, Relationship, RelationshipLabels, System};

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

	fn set(items: &[&str]) -> BTreeSet<EntityId> {
		items.iter().map(|s| s.to_string()).collect()
	}

	/// s1 (a1: e1, e2) calls s2 (a2: e3); s3 (a3: e4) is unrelated to s1.
	fn catalog() -> Entities {
		Entities {
			systems: vec![system("s1"), system("s2"), system("s3")],
			apis: vec![api("a1", "s1"), api("a2", "s2"), api("a3", "s3")],
			endpoints: vec![
				endpoint("e1", "a1"),
				endpoint("e2", "a1"),
				endpoint("e3", "a2"),
				endpoint("e4", "a3"),
			],
			relationships: vec![
				rel("r1", Party::Api("a1".into()), Party::Api("a2".into()), Some("e3")),
				rel("r2", Party::System("s3".into()), Party::Api("a2".into()), Some("e3")),
			],
		}
	}

	#[test]
	fn no_focus_selects_everything() {
		let entities = catalog();
		let ids = resolve(&entities, None);
		assert_eq!(ids, RelevantIds::everything(&entities));
		assert_eq!(ids.relationship_ids, set(&["r1", "r2"]));
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
		let ids = resolve(&entities, Some("s1"));
		assert_eq!(ids.system_ids, set(&["s1"]));
		assert_eq!(ids.api_ids, set(&["a1"]));
		assert_eq!(ids.endpoint_ids, set(&["e1"]));
		assert_eq!(ids.relationship_ids, set(&["r1"]));
	}

	#[test]
	fn focus_pulls_in_one_hop_neighbours_only() {
		let ids = resolve(&catalog(), Some("s1"));
		assert_eq!(ids.system_ids, set(&["s1", "s2"]));
		assert_eq!(ids.api_ids, set(&["a1", "a2"]));
		assert_eq!(ids.endpoint_ids, set(&["e1", "e2", "e3"]));
		assert_eq!(ids.relationship_ids, set(&["r1"]));
	}

	#[test]
	fn focus_on_callee_includes_every_caller() {
		let ids = resolve(&catalog(), Some("s2"));
		assert_eq!(ids.system_ids, set(&["s1", "s2", "s3"]));
		assert_eq!(ids.relationship_ids, set(&["r1", "r2"]));
		assert!(ids.endpoint_ids.contains("e4"));
	}

	#[test]
	fn unknown_focus_has_empty_expansions() {
		let ids = resolve(&catalog(), Some("nope"));
		assert_eq!(ids.system_ids, set(&["nope"]));
		assert!(ids.api_ids.is_empty());
		assert!(ids.endpoint_ids.is_empty());
		assert!(ids.relationship_ids.is_empty());
	}

	#[test]
	fn dangling_api_party_is_excluded() {
		let mut entities = catalog();
		entities.relationships.push(rel(
			"r3",
			Party::System("s1".into()),
			Party::Api("ghost".into()),
			None,
		));
		let ids = resolve(&entities, Some("s1"));
		assert!(!ids.relationship_ids.contains("r3"));
		assert!(!ids.api_ids.contains("ghost"));
	}

	#[test]
	fn endpoint_owner_is_kept_when_callee_disagrees() {
		// Callee names a2, but the invoked endpoint actually lives under a3.
		let mut entities = catalog();
		entities.relationships = vec![rel(
			"r9",
			Party::System("s1".into()),
			Party::Api("a2".into()),
			Some("e4"),
		)];
		let ids = resolve(&entities, Some("s1"));
		assert!(ids.endpoint_ids.contains("e4"));
		assert!(ids.api_ids.contains("a3"));
		assert!(ids.system_ids.contains("s3"));
	}

	#[test]
	fn result_is_independent_of_input_order() {
		let entities = catalog();
		let mut reversed = entities.clone();
		reversed.systems.reverse();
		reversed.apis.reverse();
		reversed.endpoints.reverse();
		reversed.relationships.reverse();
		assert_eq!(resolve(&entities, Some("s2")), resolve(&reversed, Some("s2")));
	}
}

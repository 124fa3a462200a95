//! Built-in sample catalog, shown when the backend has no systems to offer.

use crate::model::{Api, Endpoint, Entities, Party, Relationship, RelationshipLabels, System};
use crate::resolve::RelevantIds;

use super::builder::build_with;
use super::containment::ContainmentMetrics;
use super::types::TopologyGraph;

fn system(id: &str, name: &str, description: &str) -> System {
	System {
		id: id.into(),
		name: name.into(),
		description: Some(description.into()),
		system_code: None,
	}
}

fn api(id: &str, system_id: &str, name: &str) -> Api {
	Api {
		id: id.into(),
		system_id: system_id.into(),
		name: name.into(),
	}
}

fn endpoint(id: &str, api_id: &str, method: &str, path: &str) -> Endpoint {
	Endpoint {
		id: id.into(),
		api_id: api_id.into(),
		path: path.into(),
		http_method: method.into(),
	}
}

fn call(
	id: &str,
	caller: Party,
	callee_api: &str,
	target: &Endpoint,
	names: (&str, &str),
) -> Relationship {
	Relationship {
		id: id.into(),
		caller,
		callee: Party::Api(callee_api.into()),
		endpoint_id: Some(target.id.clone()),
		auth_type: None,
		description: None,
		labels: RelationshipLabels {
			caller_name: Some(names.0.into()),
			callee_name: Some(names.1.into()),
			endpoint_method: Some(target.http_method.clone()),
			endpoint_path: Some(target.path.clone()),
		},
	}
}

/// Two services: the order service calls the user service, once as a system
/// and once through its own API.
pub fn sample_entities() -> Entities {
	let endpoints = vec![
		endpoint("1-1-1", "1-1", "GET", "/api/v1/users"),
		endpoint("1-1-2", "1-1", "POST", "/api/v1/users"),
		endpoint("1-1-3", "1-1", "POST", "/api/v1/login"),
		endpoint("2-1-1", "2-1", "GET", "/api/v1/orders"),
		endpoint("2-1-2", "2-1", "POST", "/api/v1/orders"),
	];
	let relationships = vec![
		call(
			"1",
			Party::System("2".into()),
			"1-1",
			&endpoints[0],
			("Order Service", "User API"),
		),
		call(
			"2",
			Party::Api("2-1".into()),
			"1-1",
			&endpoints[2],
			("Order API", "User API"),
		),
	];

	Entities {
		systems: vec![
			system("1", "User Service", "Handles user authentication and management"),
			system("2", "Order Service", "Handles order business logic"),
		],
		apis: vec![api("1-1", "1", "User API"), api("2-1", "2", "Order API")],
		endpoints,
		relationships,
	}
}

/// The sample catalog laid out like real data, flagged as a sample.
pub fn sample_graph(metrics: &ContainmentMetrics) -> TopologyGraph {
	let entities = sample_entities();
	let mut graph = build_with(&entities, &RelevantIds::everything(&entities), metrics);
	graph.sample = true;
	graph
}

//! Text shown for hovered and inspected nodes.

use crate::graph::{NodeKind, NodeType, TopologyGraph};
use crate::model::{Api, Endpoint, System};

/// Hover tooltip contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub title: String,
	pub kind: &'static str,
	pub rows: Vec<(&'static str, String)>,
}

/// Builds the tooltip for node `idx`.
pub fn tooltip_for(graph: &TopologyGraph, idx: usize) -> Tooltip {
	let node = &graph.nodes[idx];
	let children = graph.children(idx).count();
	let mut rows = Vec::new();

	let kind = match &node.kind {
		NodeKind::System {
			description,
			system_code,
			connection_count,
		} => {
			if let Some(d) = description {
				rows.push(("Description", d.clone()));
			}
			if let Some(code) = system_code {
				rows.push(("Code", code.clone()));
			}
			rows.push(("Connections", connection_count.to_string()));
			rows.push(("APIs", children.to_string()));
			"System"
		}
		NodeKind::Api { .. } => {
			if let Some(system) = graph.ancestor_name(idx, NodeType::System) {
				rows.push(("System", system.to_string()));
			}
			rows.push(("Endpoints", children.to_string()));
			"API"
		}
		NodeKind::Endpoint {
			http_method,
			path,
			placeholder,
			..
		} => {
			rows.push(("Method", http_method.clone()));
			rows.push(("Path", path.clone()));
			if let Some(api) = graph.ancestor_name(idx, NodeType::Api) {
				rows.push(("API", api.to_string()));
			}
			if let Some(system) = graph.ancestor_name(idx, NodeType::System) {
				rows.push(("System", system.to_string()));
			}
			if *placeholder {
				rows.push(("Note", "not listed in the catalog".to_string()));
			}
			"Endpoint"
		}
	};

	Tooltip {
		title: node.name.clone(),
		kind,
		rows,
	}
}

/// A record loaded for the inspection panel.
#[derive(Clone, Debug, PartialEq)]
pub enum Inspected {
	System(System),
	Api(Api),
	Endpoint(Endpoint),
}

impl Inspected {
	/// Every field of the record, labelled.
	pub fn rows(&self) -> Vec<(&'static str, String)> {
		let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
		match self {
			Inspected::System(s) => vec![
				("Id", s.id.clone()),
				("Name", s.name.clone()),
				("Code", optional(&s.system_code)),
				("Description", optional(&s.description)),
			],
			Inspected::Api(a) => vec![
				("Id", a.id.clone()),
				("Name", a.name.clone()),
				("System id", a.system_id.clone()),
			],
			Inspected::Endpoint(e) => vec![
				("Id", e.id.clone()),
				("Method", e.http_method.clone()),
				("Path", e.path.clone()),
				("API id", e.api_id.clone()),
			],
		}
	}
}

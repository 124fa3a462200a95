//! Catalog entities as consumed by the topology view.
//!
//! The backend speaks snake_case JSON and encodes the caller and callee of a
//! relationship as flat `caller_type`/`caller_id` pairs. [`RelationshipRecord`]
//! mirrors that wire shape exactly; [`Relationship`] carries the polymorphic
//! ends as a [`Party`] and converts through the record in both directions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of any catalog entity. Numeric ids are normalized to strings.
pub type EntityId = String;

/// A top-level system owning zero or more APIs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
	/// Catalog id.
	#[serde(deserialize_with = "id")]
	pub id: EntityId,
	/// Display name.
	pub name: String,
	/// Free-text description.
	#[serde(default)]
	pub description: Option<String>,
	/// Short code some catalogs attach to systems.
	#[serde(default)]
	pub system_code: Option<String>,
}

/// An API surface belonging to exactly one system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
	/// Catalog id.
	#[serde(deserialize_with = "id")]
	pub id: EntityId,
	/// The owning system.
	#[serde(deserialize_with = "id")]
	pub system_id: EntityId,
	/// Display name.
	pub name: String,
}

/// One HTTP method + path pair belonging to exactly one API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
	/// Catalog id.
	#[serde(deserialize_with = "id")]
	pub id: EntityId,
	/// The owning API.
	#[serde(deserialize_with = "id")]
	pub api_id: EntityId,
	/// Request path, e.g. `/orders/{id}`.
	pub path: String,
	/// HTTP verb; `method` on some backends.
	#[serde(alias = "method", default)]
	pub http_method: String,
}

/// Discriminator of a relationship end on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyKind {
	/// `SYSTEM` on the wire.
	System,
	/// `API` on the wire.
	Api,
}

impl fmt::Display for PartyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PartyKind::System => f.write_str("SYSTEM"),
			PartyKind::Api => f.write_str("API"),
		}
	}
}

/// The caller or callee of a relationship.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Party {
	/// A system, by id.
	System(EntityId),
	/// An API, by id.
	Api(EntityId),
}

impl Party {
	/// Party of the given kind.
	pub fn new(kind: PartyKind, id: EntityId) -> Self {
		match kind {
			PartyKind::System => Party::System(id),
			PartyKind::Api => Party::Api(id),
		}
	}

	/// Wire discriminator of this party.
	pub fn kind(&self) -> PartyKind {
		match self {
			Party::System(_) => PartyKind::System,
			Party::Api(_) => PartyKind::Api,
		}
	}

	/// Id of the referenced entity.
	pub fn id(&self) -> &str {
		match self {
			Party::System(id) | Party::Api(id) => id,
		}
	}
}

/// A directed call dependency, optionally pinned to a concrete endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RelationshipRecord", into = "RelationshipRecord")]
pub struct Relationship {
	/// Catalog id.
	pub id: EntityId,
	/// Who makes the call.
	pub caller: Party,
	/// Who is called.
	pub callee: Party,
	/// The endpoint actually invoked. Authoritative for edge targeting;
	/// `callee` stays authoritative for system membership.
	pub endpoint_id: Option<EntityId>,
	/// Authentication scheme, as served.
	pub auth_type: Option<String>,
	/// Free-text description.
	pub description: Option<String>,
	/// Denormalized labels some backends attach to relationship listings.
	pub labels: RelationshipLabels,
}

/// Display hints served alongside a relationship. All optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationshipLabels {
	/// Display name of the caller.
	pub caller_name: Option<String>,
	/// Display name of the callee.
	pub callee_name: Option<String>,
	/// HTTP verb of the invoked endpoint.
	pub endpoint_method: Option<String>,
	/// Path of the invoked endpoint.
	pub endpoint_path: Option<String>,
}

/// Wire form of a [`Relationship`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RelationshipRecord {
	#[serde(deserialize_with = "id")]
	id: EntityId,
	caller_type: PartyKind,
	#[serde(deserialize_with = "id")]
	caller_id: EntityId,
	callee_type: PartyKind,
	#[serde(deserialize_with = "id")]
	callee_id: EntityId,
	#[serde(default, deserialize_with = "optional_id", skip_serializing_if = "Option::is_none")]
	endpoint_id: Option<EntityId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	auth_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	caller_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	callee_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	endpoint_method: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	endpoint_path: Option<String>,
}

impl From<RelationshipRecord> for Relationship {
	fn from(record: RelationshipRecord) -> Self {
		Self {
			id: record.id,
			caller: Party::new(record.caller_type, record.caller_id),
			callee: Party::new(record.callee_type, record.callee_id),
			endpoint_id: record.endpoint_id,
			auth_type: record.auth_type,
			description: record.description,
			labels: RelationshipLabels {
				caller_name: record.caller_name,
				callee_name: record.callee_name,
				endpoint_method: record.endpoint_method,
				endpoint_path: record.endpoint_path,
			},
		}
	}
}

impl From<Relationship> for RelationshipRecord {
	fn from(rel: Relationship) -> Self {
		let caller_type = rel.caller.kind();
		let callee_type = rel.callee.kind();
		let caller_id = match rel.caller {
			Party::System(id) | Party::Api(id) => id,
		};
		let callee_id = match rel.callee {
			Party::System(id) | Party::Api(id) => id,
		};
		Self {
			id: rel.id,
			caller_type,
			caller_id,
			callee_type,
			callee_id,
			endpoint_id: rel.endpoint_id,
			auth_type: rel.auth_type,
			description: rel.description,
			caller_name: rel.labels.caller_name,
			callee_name: rel.labels.callee_name,
			endpoint_method: rel.labels.endpoint_method,
			endpoint_path: rel.labels.endpoint_path,
		}
	}
}

/// Anything addressable by an [`EntityId`].
pub trait Identified {
	/// The entity id.
	fn id(&self) -> &str;
}

impl Identified for System {
	fn id(&self) -> &str {
		&self.id
	}
}

impl Identified for Api {
	fn id(&self) -> &str {
		&self.id
	}
}

impl Identified for Endpoint {
	fn id(&self) -> &str {
		&self.id
	}
}

impl Identified for Relationship {
	fn id(&self) -> &str {
		&self.id
	}
}

/// The four raw collections fetched from the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entities {
	/// `/systems`.
	pub systems: Vec<System>,
	/// `/apis`.
	pub apis: Vec<Api>,
	/// `/endpoints`.
	pub endpoints: Vec<Endpoint>,
	/// `/relationships`.
	pub relationships: Vec<Relationship>,
}

impl Entities {
	/// True when every collection is empty.
	pub fn is_empty(&self) -> bool {
		self.systems.is_empty()
			&& self.apis.is_empty()
			&& self.endpoints.is_empty()
			&& self.relationships.is_empty()
	}
}

/// Id lookups over borrowed [`Entities`]. First occurrence of an id wins.
pub struct CatalogIndex<'a> {
	systems: HashMap<&'a str, &'a System>,
	apis: HashMap<&'a str, &'a Api>,
	endpoints: HashMap<&'a str, &'a Endpoint>,
}

impl<'a> CatalogIndex<'a> {
	/// Indexes `entities`.
	pub fn new(entities: &'a Entities) -> Self {
		let mut systems = HashMap::with_capacity(entities.systems.len());
		for s in &entities.systems {
			systems.entry(s.id.as_str()).or_insert(s);
		}
		let mut apis = HashMap::with_capacity(entities.apis.len());
		for a in &entities.apis {
			apis.entry(a.id.as_str()).or_insert(a);
		}
		let mut endpoints = HashMap::with_capacity(entities.endpoints.len());
		for e in &entities.endpoints {
			endpoints.entry(e.id.as_str()).or_insert(e);
		}
		Self {
			systems,
			apis,
			endpoints,
		}
	}

	/// System by id.
	pub fn system(&self, id: &str) -> Option<&'a System> {
		self.systems.get(id).copied()
	}

	/// API by id.
	pub fn api(&self, id: &str) -> Option<&'a Api> {
		self.apis.get(id).copied()
	}

	/// Endpoint by id.
	pub fn endpoint(&self, id: &str) -> Option<&'a Endpoint> {
		self.endpoints.get(id).copied()
	}

	/// Resolves a relationship end to the id of the system it belongs to.
	///
	/// A system party resolves to its own id without an existence check; an
	/// API party resolves through the API's `system_id` and yields `None` when
	/// the API is unknown.
	pub fn system_of<'p>(&self, party: &'p Party) -> Option<&'p str>
	where
		'a: 'p,
	{
		match party {
			Party::System(id) => Some(id.as_str()),
			Party::Api(id) => self.api(id).map(|api| api.system_id.as_str()),
		}
	}

	/// Whether the party names an entity present in the catalog.
	pub fn contains(&self, party: &Party) -> bool {
		match party {
			Party::System(id) => self.systems.contains_key(id.as_str()),
			Party::Api(id) => self.apis.contains_key(id.as_str()),
		}
	}
}

fn id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Text(String),
		Int(i64),
		Unsigned(u64),
	}

	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(s) => s,
		RawId::Int(n) => n.to_string(),
		RawId::Unsigned(n) => n.to_string(),
	})
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	struct Wrapped(#[serde(deserialize_with = "id")] EntityId);

	Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

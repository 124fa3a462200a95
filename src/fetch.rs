//! Entity fetcher: pulls the four catalog collections from the backend.
//!
//! Each collection is requested independently and concurrently. A failing
//! collection is logged and replaced by an empty one so the rest of the
//! pipeline still runs; nothing is retried.

use std::cell::RefCell;
use std::fmt;

use futures::join;
use log::{debug, error, info};
use serde::de::DeserializeOwned;

use crate::cache::{CatalogCache, EntityCache};
use crate::error::FetchError;
use crate::http::HttpClient;
use crate::model::{Api, Endpoint, Entities, Identified, System};

/// The REST collections the topology reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
	/// `/systems`
	Systems,
	/// `/apis`
	Apis,
	/// `/endpoints`
	Endpoints,
	/// `/relationships`
	Relationships,
}

impl Collection {
	/// Every collection, in fetch order.
	pub const ALL: [Collection; 4] = [
		Collection::Systems,
		Collection::Apis,
		Collection::Endpoints,
		Collection::Relationships,
	];

	/// Path segment of the collection below the backend base URL.
	pub fn segment(self) -> &'static str {
		match self {
			Collection::Systems => "systems",
			Collection::Apis => "apis",
			Collection::Endpoints => "endpoints",
			Collection::Relationships => "relationships",
		}
	}
}

impl fmt::Display for Collection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.segment())
	}
}

/// Result of [`Fetcher::fetch_all`]: whatever could be loaded, plus what failed.
#[derive(Debug, Default)]
pub struct FetchReport {
	/// What was loaded. Failed collections are empty.
	pub entities: Entities,
	/// Failed collections with their errors.
	pub failures: Vec<(Collection, FetchError)>,
}

impl FetchReport {
	/// True when every collection request failed.
	pub fn total_failure(&self) -> bool {
		self.failures.len() == Collection::ALL.len()
	}

	/// True when any request was rejected as unauthenticated.
	pub fn unauthorized(&self) -> bool {
		self.failures.iter().any(|(_, e)| e.is_unauthorized())
	}

	/// One-line, user-facing summary of the failures, if any.
	pub fn failure_summary(&self) -> Option<String> {
		if self.failures.is_empty() {
			return None;
		}
		let names: Vec<String> = self.failures.iter().map(|(c, _)| c.to_string()).collect();
		Some(format!("Could not load {}", names.join(", ")))
	}
}

/// Entity types that can be looked up one at a time through a [`CatalogCache`].
pub trait CachedRecord: Identified + Clone + DeserializeOwned {
	/// Collection the record type lives in.
	const COLLECTION: Collection;
	/// This type's cache.
	fn slot(cache: &CatalogCache) -> &EntityCache<Self>;
	/// None
	fn slot_mut(cache: &mut CatalogCache) -> &mut EntityCache<Self>;
}

impl CachedRecord for System {
	const COLLECTION: Collection = Collection::Systems;
	fn slot(cache: &CatalogCache) -> &EntityCache<Self> {
		&cache.systems
	}
	fn slot_mut(cache: &mut CatalogCache) -> &mut EntityCache<Self> {
		&mut cache.systems
	}
}

impl CachedRecord for Api {
	const COLLECTION: Collection = Collection::Apis;
	fn slot(cache: &CatalogCache) -> &EntityCache<Self> {
		&cache.apis
	}
	fn slot_mut(cache: &mut CatalogCache) -> &mut EntityCache<Self> {
		&mut cache.apis
	}
}

impl CachedRecord for Endpoint {
	const COLLECTION: Collection = Collection::Endpoints;
	fn slot(cache: &CatalogCache) -> &EntityCache<Self> {
		&cache.endpoints
	}
	fn slot_mut(cache: &mut CatalogCache) -> &mut EntityCache<Self> {
		&mut cache.endpoints
	}
}

/// Reads catalog data through an injected [`HttpClient`].
pub struct Fetcher<C> {
	client: C,
}

impl<C: HttpClient> Fetcher<C> {
	/// Fetcher reading through `client`.
	pub fn new(client: C) -> Self {
		Self { client }
	}

	/// Fetches all four collections concurrently, degrading failed ones to empty.
	pub async fn fetch_all(&self) -> FetchReport {
		let (systems, apis, endpoints, relationships) = join!(
			self.collection(Collection::Systems),
			self.collection(Collection::Apis),
			self.collection(Collection::Endpoints),
			self.collection(Collection::Relationships),
		);

		let mut failures = Vec::new();
		let entities = Entities {
			systems: settle(Collection::Systems, systems, &mut failures),
			apis: settle(Collection::Apis, apis, &mut failures),
			endpoints: settle(Collection::Endpoints, endpoints, &mut failures),
			relationships: settle(Collection::Relationships, relationships, &mut failures),
		};

		info!(
			"topology: fetched {} systems, {} apis, {} endpoints, {} relationships",
			entities.systems.len(),
			entities.apis.len(),
			entities.endpoints.len(),
			entities.relationships.len()
		);

		FetchReport { entities, failures }
	}

	/// Fetches one collection as a typed vector.
	pub async fn collection<T: DeserializeOwned>(
		&self,
		collection: Collection,
	) -> Result<Vec<T>, FetchError> {
		self.client.get_json(&[collection.segment()]).await
	}

	/// Fetches a single record by id.
	pub async fn record<T: DeserializeOwned>(
		&self,
		collection: Collection,
		id: &str,
	) -> Result<T, FetchError> {
		self.client.get_json(&[collection.segment(), id]).await
	}

	/// Read-through lookup: serves a fresh cached record, otherwise fetches it
	/// and stores it at `now`. The cache is never borrowed across the request.
	pub async fn lookup<T: CachedRecord>(
		&self,
		cache: &RefCell<CatalogCache>,
		id: &str,
		now: f64,
	) -> Result<T, FetchError> {
		if let Some(hit) = T::slot(&cache.borrow()).get(id, now).cloned() {
			return Ok(hit);
		}

		debug!("topology: cache miss for {} {}", T::COLLECTION, id);
		let record: T = self.record(T::COLLECTION, id).await?;
		T::slot_mut(&mut cache.borrow_mut()).insert(record.clone(), now);
		Ok(record)
	}
}

fn settle<T>(
	collection: Collection,
	result: Result<Vec<T>, FetchError>,
	failures: &mut Vec<(Collection, FetchError)>,
) -> Vec<T> {
	match result {
		Ok(items) => items,
		Err(e) => {
			error!("topology: failed to fetch {}: {}", collection, e);
			failures.push((collection, e));
			Vec::new()
		}
	}
}

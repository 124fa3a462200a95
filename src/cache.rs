//! Read-through entity caches keyed by id.
//!
//! Entries remember when they were fetched; a lookup older than the TTL is
//! treated as a miss. Time is passed in explicitly (milliseconds since an
//! arbitrary epoch) so the cache works the same in the browser and in tests.

use std::collections::HashMap;

use crate::model::{Api, Endpoint, Entities, EntityId, Identified, System};

#[derive(Clone, Debug)]
struct CacheEntry<T> {
	value: T,
	fetched_at: f64,
}

/// Cache of one entity type.
#[derive(Clone, Debug)]
pub struct EntityCache<T> {
	ttl_ms: f64,
	entries: HashMap<EntityId, CacheEntry<T>>,
}

impl<T: Identified + Clone> EntityCache<T> {
	/// Empty cache whose entries stay fresh for `ttl_ms`.
	pub fn new(ttl_ms: f64) -> Self {
		Self {
			ttl_ms,
			entries: HashMap::new(),
		}
	}

	/// Returns the entry for `id` if it is still fresh at `now`.
	pub fn get(&self, id: &str, now: f64) -> Option<&T> {
		self.entries
			.get(id)
			.filter(|entry| now - entry.fetched_at < self.ttl_ms)
			.map(|entry| &entry.value)
	}

	/// Stores one entity, replacing any previous entry with the same id.
	pub fn insert(&mut self, value: T, now: f64) {
		self.entries.insert(
			value.id().to_string(),
			CacheEntry {
				value,
				fetched_at: now,
			},
		);
	}

	/// Stores a batch of entities fetched at `now`.
	pub fn prime<'a, I>(&mut self, values: I, now: f64)
	where
		I: IntoIterator<Item = &'a T>,
		T: 'a,
	{
		for value in values {
			self.insert(value.clone(), now);
		}
	}

	/// Drops entries that are no longer fresh at `now`.
	pub fn evict_expired(&mut self, now: f64) {
		let ttl = self.ttl_ms;
		self.entries.retain(|_, entry| now - entry.fetched_at < ttl);
	}

	/// Number of stored entries, fresh or not.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Lookup caches for the three record types the inspector can open.
#[derive(Clone, Debug)]
pub struct CatalogCache {
	/// Cached systems.
	pub systems: EntityCache<System>,
	/// Cached APIs.
	pub apis: EntityCache<Api>,
	/// Cached endpoints.
	pub endpoints: EntityCache<Endpoint>,
}

impl CatalogCache {
	/// Empty caches sharing one TTL.
	pub fn new(ttl_ms: f64) -> Self {
		Self {
			systems: EntityCache::new(ttl_ms),
			apis: EntityCache::new(ttl_ms),
			endpoints: EntityCache::new(ttl_ms),
		}
	}

	/// Seeds all caches from a full fetch.
	pub fn prime(&mut self, entities: &Entities, now: f64) {
		self.systems.prime(&entities.systems, now);
		self.apis.prime(&entities.apis, now);
		self.endpoints.prime(&entities.endpoints, now);
	}

	/// Drops stale entries from every cache.
	pub fn evict_expired(&mut self, now: f64) {
		self.systems.evict_expired(now);
		self.apis.evict_expired(now);
		self.endpoints.evict_expired(now);
	}
}

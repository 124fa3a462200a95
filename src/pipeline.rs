//! Resolve → build assembly and load bookkeeping.

use std::cell::Cell;

use log::{debug, warn};

use crate::graph::{ContainmentMetrics, TopologyGraph, build_with, sample_graph};
use crate::model::Entities;
use crate::resolve::resolve;

/// Turns fetched entities into the graph to draw.
///
/// With no systems at all there is nothing to anchor a diagram on, so the
/// built-in sample graph is returned instead (flagged via `sample`).
pub fn assemble(
	entities: &Entities,
	focus: Option<&str>,
	metrics: &ContainmentMetrics,
) -> TopologyGraph {
	if entities.systems.is_empty() {
		warn!("topology: no systems available, showing sample data");
		return sample_graph(metrics);
	}
	let relevant = resolve(entities, focus);
	build_with(entities, &relevant, metrics)
}

/// Identifies one load; only the latest one may publish its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Issues monotonically increasing [`RequestToken`]s.
#[derive(Debug, Default)]
pub struct RequestTokens {
	latest: Cell<u64>,
}

impl RequestTokens {
	/// Tracker that has not issued a token yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a new load, superseding every earlier token.
	pub fn issue(&self) -> RequestToken {
		let next = self.latest.get() + 1;
		self.latest.set(next);
		RequestToken(next)
	}

	/// True when `token` was the last one issued.
	pub fn is_current(&self, token: RequestToken) -> bool {
		let current = token.0 == self.latest.get();
		if !current {
			debug!("topology: discarding stale load {}", token.0);
		}
		current
	}
}

//! Runtime configuration for the topology view.
//!
//! The host page may embed a JSON document in
//! `<script id="topology-config" type="application/json">`. Every field is
//! optional; missing fields take their defaults and a malformed document is
//! logged and ignored.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::components::topology::{ForceSettings, LayoutStrategy, ThemeName};
use crate::graph::ContainmentMetrics;

/// Element id of the embedded configuration document.
pub const CONFIG_ELEMENT_ID: &str = "topology-config";

/// Where and how to reach the catalog backend.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
	/// Base URL the collection paths (`systems`, `apis`, ...) are joined onto.
	pub base_url: String,
	/// Per-request timeout. Only honoured by native builds.
	pub timeout_ms: u64,
	/// Bearer token sent with every request, if any.
	pub auth_token: Option<String>,
}

impl Default for BackendConfig {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:8080/api/v1".into(),
			timeout_ms: 15_000,
			auth_token: None,
		}
	}
}

/// Allowed zoom factors.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomRange {
	/// Smallest zoom factor.
	pub min: f64,
	/// Largest zoom factor.
	pub max: f64,
}

impl Default for ZoomRange {
	fn default() -> Self {
		Self { min: 0.1, max: 3.0 }
	}
}

impl ZoomRange {
	/// `k` limited to the range.
	pub fn clamp(&self, k: f64) -> f64 {
		k.clamp(self.min, self.max.max(self.min))
	}
}

/// Complete configuration of the topology view.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
	/// Where catalog data comes from.
	pub backend: BackendConfig,
	/// Containment boxes or force layout.
	pub layout: LayoutStrategy,
	/// Color theme of the canvas.
	pub theme: ThemeName,
	/// Overrides of the containment layout.
	pub containment: ContainmentMetrics,
	/// Tuning of the force layout.
	pub force: ForceSettings,
	/// Allowed zoom factors.
	pub zoom: ZoomRange,
	/// How long fetched records stay fresh in the lookup cache.
	pub cache_ttl_ms: f64,
}

impl Default for TopologyConfig {
	fn default() -> Self {
		Self {
			backend: BackendConfig::default(),
			layout: LayoutStrategy::default(),
			theme: ThemeName::default(),
			containment: ContainmentMetrics::default(),
			force: ForceSettings::default(),
			zoom: ZoomRange::default(),
			cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
		}
	}
}

impl TopologyConfig {
	/// Parses a configuration document.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Reads the configuration embedded in the current document, falling back
	/// to defaults when it is absent or malformed.
	pub fn load_from_document() -> Self {
		let Some(json_text) = config_text() else {
			info!("topology: no #{CONFIG_ELEMENT_ID} element, using defaults");
			return Self::default();
		};

		match Self::from_json(&json_text) {
			Ok(config) => {
				info!(
					"topology: loaded config (backend {}, {:?} layout)",
					config.backend.base_url, config.layout
				);
				config
			}
			Err(e) => {
				warn!("topology: failed to parse config: {}", e);
				Self::default()
			}
		}
	}
}

/// Five minutes.
pub const DEFAULT_CACHE_TTL_MS: f64 = 5.0 * 60.0 * 1000.0;

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = TopologyConfig::from_json("{}").unwrap();
		assert_eq!(config.backend, BackendConfig::default());
		assert_eq!(config.layout, LayoutStrategy::Containment);
		assert_eq!(config.cache_ttl_ms, DEFAULT_CACHE_TTL_MS);
		assert_eq!(config.zoom, ZoomRange::default());
	}

	#[test]
	fn partial_sections_keep_remaining_defaults() {
		let config = TopologyConfig::from_json(
			r#"{
				"backend": { "base_url": "https://catalog.internal/api/v1" },
				"layout": "force",
				"theme": "midnight",
				"containment": { "endpoints_per_row": 6 },
				"zoom": { "max": 5.0 }
			}"#,
		)
		.unwrap();
		assert_eq!(config.backend.base_url, "https://catalog.internal/api/v1");
		assert_eq!(config.backend.timeout_ms, 15_000);
		assert_eq!(config.layout, LayoutStrategy::Force);
		assert_eq!(config.theme, ThemeName::Midnight);
		assert_eq!(config.containment.endpoints_per_row, 6);
		assert_eq!(
			config.containment.system_width,
			ContainmentMetrics::default().system_width
		);
		assert_eq!(config.zoom.min, 0.1);
		assert_eq!(config.zoom.max, 5.0);
	}

	#[test]
	fn unknown_layout_is_an_error() {
		assert!(TopologyConfig::from_json(r#"{"layout":"radial"}"#).is_err());
	}

	#[test]
	fn zoom_clamp_handles_inverted_bounds() {
		let range = ZoomRange { min: 0.5, max: 0.2 };
		assert_eq!(range.clamp(3.0), 0.5);
	}
}

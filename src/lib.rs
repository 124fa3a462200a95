//! service-topology: interactive map of systems, APIs, endpoints and the
//! calls between them.
//!
//! Catalog data is fetched from a REST backend, narrowed to what is relevant
//! to an optional focus system, laid out as nested boxes and drawn on a WASM
//! canvas with pan, zoom, dragging, tooltips and click inspection.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod cache;
pub mod components;
pub mod config;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod http;
pub mod model;
pub mod pipeline;
pub mod resolve;

pub use components::topology::TopologyCanvas;
pub use config::TopologyConfig;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("topology: logging initialized");
}

/// Main application component.
/// Reads the configuration from the DOM and renders the topology view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = TopologyConfig::load_from_document();
	let theme = match config.theme {
		components::topology::ThemeName::Light => "light",
		components::topology::ThemeName::Midnight => "dark",
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=theme />
		<Title text="Service Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<div class="graph-overlay">
				<h1>"Service Topology"</h1>
				<p class="subtitle">
					"Drag systems to rearrange. Scroll to zoom. Drag the background to pan. Click a box for details."
				</p>
			</div>
			<TopologyCanvas config=config />
		</div>
	}
}

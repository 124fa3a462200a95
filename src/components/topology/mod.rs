//! Interactive topology view.
//!
//! Draws the built graph on an HTML canvas with:
//! - Nested system / API / endpoint boxes, or a force-directed alternative
//! - Bezier call edges coloured by call kind, with arrowheads
//! - Pan, zoom and dragging of system boxes
//! - Hover tooltips with smooth highlight transitions
//! - Click inspection of the full record behind a node
//!
//! # Example
//!
//! ```ignore
//! use service_topology::components::topology::TopologyCanvas;
//! use service_topology::config::TopologyConfig;
//!
//! view! { <TopologyCanvas config=TopologyConfig::default() /> }
//! ```

mod component;
mod force;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod tooltip;

pub use component::TopologyCanvas;
pub use force::{ForceSettings, LayoutStrategy};
pub use theme::{Theme, ThemeName};

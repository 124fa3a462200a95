//! Containment hierarchy and call graph, laid out for drawing.

mod builder;
mod containment;
mod geometry;
mod sample;
mod types;

pub use builder::{build, build_with};
pub use containment::ContainmentMetrics;
pub use geometry::{EdgeRoute, Point, Rect, arrowhead, route_edge};
pub use sample::{sample_entities, sample_graph};
pub use types::{CallKind, GraphEdge, GraphNode, NodeKind, NodeType, TopologyGraph};

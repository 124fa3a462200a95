//! Visual theming for the topology canvas.
//!
//! Provides colors for containers, endpoints and the call-kind edge palette.

use serde::Deserialize;

use crate::graph::CallKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Opacity in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// CSS `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Selectable themes, by configuration name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
	/// Pale boxes on a light background.
	#[default]
	Light,
	/// Dark boxes on a deep blue background.
	Midnight,
}

/// Fill, outline and text colors of one container level.
#[derive(Clone, Debug)]
pub struct BoxStyle {
	/// Box background.
	pub fill: Color,
	/// Box outline.
	pub stroke: Color,
	/// Box title text.
	pub title: Color,
	/// Corner radius.
	pub corner_radius: f64,
}

/// Edge colors, one per call kind.
#[derive(Clone, Debug)]
pub struct EdgePalette {
	/// System calling a system.
	pub system_call: Color,
	/// API calling an API.
	pub api_call: Color,
	/// System calling an API.
	pub system_to_api: Color,
	/// API calling a system.
	pub api_to_system: Color,
	/// Containment links, only drawn by the force layout.
	pub hierarchy: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// The name this theme is selected by.
	pub name: ThemeName,
	/// Canvas clear color.
	pub background: Color,
	/// Secondary text (descriptions, counts).
	pub muted_text: Color,
	/// System boxes.
	pub system: BoxStyle,
	/// API boxes.
	pub api: BoxStyle,
	/// Endpoint squares.
	pub endpoint_fill: Color,
	/// Endpoint outline.
	pub endpoint_stroke: Color,
	/// Method text inside endpoint squares.
	pub endpoint_method: Color,
	/// Ring around the focus system.
	pub focus_ring: Color,
	/// Ring around the hovered box.
	pub hover_ring: Color,
	/// Call edge colors.
	pub edges: EdgePalette,
	/// Cubic edges with horizontal tangents; straight lines when false.
	pub curved_edges: bool,
	/// Horizontal control point offset of curved edges.
	pub curve_offset: f64,
	/// "Sample data" banner fill.
	pub banner: Color,
}

impl Theme {
	/// Light console theme (default)
	pub fn light() -> Self {
		Self {
			name: ThemeName::Light,
			background: Color::rgb(250, 250, 250),
			muted_text: Color::rgb(102, 102, 102),
			system: BoxStyle {
				fill: Color::rgba(24, 144, 255, 0.15),
				stroke: Color::rgb(24, 144, 255),
				title: Color::rgb(24, 144, 255),
				corner_radius: 6.0,
			},
			api: BoxStyle {
				fill: Color::rgba(82, 196, 26, 0.15),
				stroke: Color::rgb(82, 196, 26),
				title: Color::rgb(82, 196, 26),
				corner_radius: 4.0,
			},
			endpoint_fill: Color::rgb(245, 245, 245),
			endpoint_stroke: Color::rgb(217, 217, 217),
			endpoint_method: Color::rgb(250, 140, 22),
			focus_ring: Color::rgb(24, 144, 255),
			hover_ring: Color::rgba(0, 0, 0, 0.6),
			edges: EdgePalette {
				system_call: Color::rgb(24, 144, 255),
				api_call: Color::rgb(82, 196, 26),
				system_to_api: Color::rgb(250, 140, 22),
				api_to_system: Color::rgb(24, 144, 255),
				hierarchy: Color::rgba(140, 140, 140, 0.5),
			},
			curved_edges: true,
			curve_offset: 50.0,
			banner: Color::rgba(250, 140, 22, 0.9),
		}
	}

	/// Dark theme with muted containers
	pub fn midnight() -> Self {
		Self {
			name: ThemeName::Midnight,
			background: Color::rgb(18, 20, 28),
			muted_text: Color::rgb(143, 163, 180),
			system: BoxStyle {
				fill: Color::rgba(94, 129, 172, 0.18),
				stroke: Color::rgb(129, 161, 193),
				title: Color::rgb(180, 195, 205),
				corner_radius: 6.0,
			},
			api: BoxStyle {
				fill: Color::rgba(100, 145, 135, 0.18),
				stroke: Color::rgb(100, 145, 135),
				title: Color::rgb(180, 200, 195),
				corner_radius: 4.0,
			},
			endpoint_fill: Color::rgb(30, 35, 42),
			endpoint_stroke: Color::rgb(90, 100, 115),
			endpoint_method: Color::rgb(185, 145, 110),
			focus_ring: Color::rgb(129, 161, 193),
			hover_ring: Color::rgba(255, 255, 255, 0.8),
			edges: EdgePalette {
				system_call: Color::rgb(108, 142, 173),
				api_call: Color::rgb(119, 158, 165),
				system_to_api: Color::rgb(180, 136, 100),
				api_to_system: Color::rgb(108, 142, 173),
				hierarchy: Color::rgba(100, 120, 150, 0.45),
			},
			curved_edges: true,
			curve_offset: 50.0,
			banner: Color::rgba(180, 136, 100, 0.9),
		}
	}

	/// Theme selected by `name`.
	pub fn for_name(name: ThemeName) -> Self {
		match name {
			ThemeName::Light => Self::light(),
			ThemeName::Midnight => Self::midnight(),
		}
	}

	/// Stroke color of a call edge.
	pub fn edge_color(&self, kind: CallKind) -> Color {
		match kind {
			CallKind::SystemCall => self.edges.system_call,
			CallKind::ApiCall => self.edges.api_call,
			CallKind::SystemToApi => self.edges.system_to_api,
			CallKind::ApiToSystem => self.edges.api_to_system,
		}
	}

	/// Effective curve offset; zero selects straight routing.
	pub fn routing_offset(&self) -> f64 {
		if self.curved_edges { self.curve_offset } else { 0.0 }
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}

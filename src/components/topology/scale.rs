//! Zoom-dependent scaling of text, strokes and hit areas.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: graph coordinates. Values scale with zoom.
//! - **Screen-space**: canvas pixels. Values stay constant regardless of zoom.
//!
//! Every value in [`ScaledValues`] is in world-space, ready to use after the
//! canvas transform has been applied.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped {
		/// Smallest on-screen size.
		min_screen: f64,
		/// Largest on-screen size.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	/// Always fully visible.
	Constant,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade {
		/// Zoom at which the value is invisible.
		zero_alpha_k: f64,
		/// Zoom at which the value is fully opaque.
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity in `0.0..=1.0` at zoom `k`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Text sizes in world units.
#[derive(Clone, Debug)]
pub struct TextScaleConfig {
	/// Box titles.
	pub title_size: f64,
	/// Box descriptions and counts.
	pub label_size: f64,
	/// Endpoint method badges.
	pub method_size: f64,
	/// How titles and labels follow the zoom.
	pub behavior: ScaleBehavior,
	/// Descriptions, counts and endpoint methods fade out when zoomed out.
	pub detail_alpha: AlphaBehavior,
}

/// Call edge and arrowhead sizes in world units.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Edge stroke width at zoom 1.
	pub line_width: f64,
	/// How the edge width follows the zoom.
	pub width_behavior: ScaleBehavior,
	/// Dash pattern (dash, gap) of hierarchy links and placeholder outlines.
	pub dash_pattern: (f64, f64),
	/// Arrowhead length along the edge.
	pub arrow_length: f64,
	/// Half the arrowhead base.
	pub arrow_half_width: f64,
	/// How arrowheads follow the zoom.
	pub arrow_behavior: ScaleBehavior,
}

/// Focus and hover rings drawn around boxes.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width.
	pub width: f64,
	/// Gap between the box and its ring.
	pub offset: f64,
	/// How rings follow the zoom.
	pub behavior: ScaleBehavior,
}

/// Complete scale configuration.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Text sizes.
	pub text: TextScaleConfig,
	/// Edge and arrowhead sizes.
	pub edge: EdgeScaleConfig,
	/// Focus and hover rings.
	pub ring: RingScaleConfig,
	/// Extra pick radius around endpoints, in screen pixels.
	pub hit_slop: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			text: TextScaleConfig {
				title_size: 12.0,
				label_size: 10.0,
				method_size: 9.0,
				behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 28.0,
				},
				detail_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 0.35,
					full_alpha_k: 0.6,
				},
			},
			edge: EdgeScaleConfig {
				line_width: 2.0,
				width_behavior: ScaleBehavior::Clamped {
					min_screen: 1.0,
					max_screen: 6.0,
				},
				dash_pattern: (4.0, 4.0),
				arrow_length: 8.0,
				arrow_half_width: 4.0,
				arrow_behavior: ScaleBehavior::World,
			},
			ring: RingScaleConfig {
				width: 2.0,
				offset: 3.0,
				behavior: ScaleBehavior::Screen,
			},
			hit_slop: 4.0,
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom factor these values were computed for.
	pub k: f64,
	/// CSS font of box titles.
	pub title_font: String,
	/// CSS font of descriptions and counts.
	pub label_font: String,
	/// CSS font of method badges.
	pub method_font: String,
	/// Opacity of detail text.
	pub detail_alpha: f64,
	/// Edge stroke width.
	pub edge_width: f64,
	/// Dash and gap lengths.
	pub dash_pattern: (f64, f64),
	/// Arrowhead length.
	pub arrow_length: f64,
	/// Half the arrowhead base.
	pub arrow_half_width: f64,
	/// Ring stroke width and gap to the box.
	pub ring_width: f64,
	/// Gap between a box and its ring.
	pub ring_offset: f64,
	/// Extra pick radius around endpoints.
	pub hit_slop: f64,
}

impl ScaledValues {
	/// Evaluates `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let text = &config.text;
		let font = |size: f64, weight: &str| {
			format!("{weight}{}px sans-serif", text.behavior.apply(size, k))
		};
		let arrow = |size: f64| config.edge.arrow_behavior.apply(size, k);

		Self {
			k,
			title_font: font(text.title_size, "bold "),
			label_font: font(text.label_size, "bold "),
			method_font: font(text.method_size, "bold "),
			detail_alpha: text.detail_alpha.apply(k),
			edge_width: config.edge.width_behavior.apply(config.edge.line_width, k),
			dash_pattern: config.edge.dash_pattern,
			arrow_length: arrow(config.edge.arrow_length),
			arrow_half_width: arrow(config.edge.arrow_half_width),
			ring_width: config.ring.behavior.apply(config.ring.width, k),
			ring_offset: config.ring.behavior.apply(config.ring.offset, k),
			hit_slop: ScaleBehavior::Screen.apply(config.hit_slop, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_keeps_screen_size_within_bounds() {
		let b = ScaleBehavior::Clamped {
			min_screen: 1.0,
			max_screen: 6.0,
		};
		assert_eq!(b.apply(2.0, 1.0), 2.0);
		// Zoomed far out, 2 world units would be 0.2px: held at 1px.
		assert_eq!(b.apply(2.0, 0.1), 10.0);
		// Zoomed in, capped at 6px.
		assert_eq!(b.apply(2.0, 3.0), 2.0);
		assert_eq!(b.apply(4.0, 3.0), 2.0);
	}

	#[test]
	fn details_fade_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 1.0).detail_alpha, 1.0);
		assert_eq!(ScaledValues::new(&config, 0.2).detail_alpha, 0.0);
		let mid = ScaledValues::new(&config, 0.475).detail_alpha;
		assert!(mid > 0.4 && mid < 0.6);
	}

	#[test]
	fn screen_space_ring_shrinks_in_world_units() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 2.0).ring_width, 1.0);
		assert_eq!(ScaledValues::new(&config, 2.0).title_font, "bold 12px sans-serif");
	}
}

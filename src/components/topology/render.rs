//! Canvas rendering for the topology view.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Containment links, force layout only (world space)
//! 3. Nodes in draw order, parents beneath children
//! 4. Call edges and arrowheads on top of every box
//! 5. Sample-data banner (screen space)

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::{NodeKind, Rect, arrowhead};

use super::force::LayoutStrategy;
use super::scale::{ScaleConfig, ScaledValues};
use super::state::TopologyState;
use super::theme::{BoxStyle, Color, Theme};

const SAMPLE_BANNER: &str = "Sample data: no systems were loaded";

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete view to the canvas.
pub fn render(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	if state.layout == LayoutStrategy::Force {
		draw_hierarchy_links(state, ctx, &scale, theme);
	}
	draw_nodes(state, ctx, &scale, theme);
	draw_edges(state, ctx, &scale, theme);

	ctx.restore();

	if state.graph.sample {
		draw_banner(ctx, theme);
	}
}

fn draw_background(state: &TopologyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.width, state.height);
	let (cx, cy) = (w / 2.0, h / 2.0);
	match ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, w.max(h) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.lighten(0.04).to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: Option<(f64, f64)>) {
	let dash = match pattern {
		Some((dash, gap)) => {
			js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap))
		}
		None => js_sys::Array::new(),
	};
	let _ = ctx.set_line_dash(&dash);
}

fn draw_hierarchy_links(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	ctx.set_stroke_style_str(&theme.edges.hierarchy.to_css());
	ctx.set_line_width(scale.edge_width * 0.5);
	set_dash(ctx, Some(scale.dash_pattern));

	ctx.begin_path();
	for (parent, child) in state.graph.hierarchy_links() {
		let (Some(p), Some(c)) = (state.rect(parent), state.rect(child)) else {
			continue;
		};
		let (from, to) = (p.center(), c.center());
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
	}
	ctx.stroke();
	set_dash(ctx, None);
}

/// Alpha and emphasis of a node given the current highlight.
fn emphasis(state: &TopologyState, idx: usize) -> (f64, f64) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let node_t = smooth_step(state.highlight.node_intensity(idx));
	let dim = 1.0 - 0.6 * max_t;
	(dim + (1.0 - dim) * node_t, node_t)
}

fn draw_nodes(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let focus = state.graph.focus.as_deref();
	for (idx, node) in state.graph.nodes.iter().enumerate() {
		let Some(rect) = state.rect(idx) else {
			continue;
		};
		let (alpha, node_t) = emphasis(state, idx);
		ctx.set_global_alpha(alpha);

		match &node.kind {
			NodeKind::System { description, .. } => {
				let children = state.graph.children(idx).count();
				draw_container(ctx, rect, &theme.system, node_t);
				draw_title(ctx, rect, &node.name, &theme.system, scale);
				draw_count(ctx, rect, &format!("APIs: {children}"), theme, scale);
				if let Some(d) = description {
					draw_detail(ctx, rect, d, theme, scale);
				}
				if focus == Some(node.id.as_str()) {
					let width = scale.ring_width * 1.5;
					draw_ring(ctx, rect, theme.focus_ring, width, scale.ring_offset);
				}
			}
			NodeKind::Api { .. } => {
				let children = state.graph.children(idx).count();
				draw_container(ctx, rect, &theme.api, node_t);
				draw_title(ctx, rect, &node.name, &theme.api, scale);
				draw_count(ctx, rect, &format!("Endpoints: {children}"), theme, scale);
			}
			NodeKind::Endpoint {
				http_method,
				placeholder,
				..
			} => draw_endpoint(ctx, rect, http_method, *placeholder, theme, scale, node_t),
		}

		if state.highlight.hovered() == Some(idx) && node_t > 0.01 {
			let ring = theme.hover_ring.with_alpha(theme.hover_ring.a * node_t);
			draw_ring(ctx, rect, ring, scale.ring_width, scale.ring_offset);
		}
		if state.selected == Some(idx) {
			draw_ring(ctx, rect, theme.focus_ring, scale.ring_width, scale.ring_offset * 2.0);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, r: Rect, radius: f64) {
	let radius = radius.min(r.width / 2.0).min(r.height / 2.0);
	ctx.begin_path();
	ctx.move_to(r.x + radius, r.y);
	let _ = ctx.arc_to(r.right(), r.y, r.right(), r.bottom(), radius);
	let _ = ctx.arc_to(r.right(), r.bottom(), r.x, r.bottom(), radius);
	let _ = ctx.arc_to(r.x, r.bottom(), r.x, r.y, radius);
	let _ = ctx.arc_to(r.x, r.y, r.right(), r.y, radius);
	ctx.close_path();
}

fn draw_container(ctx: &CanvasRenderingContext2d, rect: Rect, style: &BoxStyle, node_t: f64) {
	rounded_rect_path(ctx, rect, style.corner_radius);
	let fill = style.fill.with_alpha(style.fill.a * (1.0 + node_t));
	ctx.set_fill_style_str(&fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&style.stroke.to_css());
	ctx.set_line_width(1.5 + node_t);
	ctx.stroke();
}

/// Truncates `text` with an ellipsis so it fits `max_width`.
fn fit_text(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> String {
	let width = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
	if width(text) <= max_width {
		return text.to_string();
	}
	let mut chars: Vec<char> = text.chars().collect();
	while !chars.is_empty() {
		chars.pop();
		let candidate: String = chars.iter().collect::<String>() + "…";
		if width(&candidate) <= max_width {
			return candidate;
		}
	}
	String::new()
}

fn draw_title(
	ctx: &CanvasRenderingContext2d,
	rect: Rect,
	name: &str,
	style: &BoxStyle,
	scale: &ScaledValues,
) {
	ctx.set_font(&scale.title_font);
	ctx.set_fill_style_str(&style.title.to_css());
	ctx.set_text_align("left");
	ctx.set_text_baseline("alphabetic");
	let text = fit_text(ctx, name, rect.width * 0.65);
	let _ = ctx.fill_text(&text, rect.x + 12.0, rect.y + 20.0);
}

fn draw_count(
	ctx: &CanvasRenderingContext2d,
	rect: Rect,
	text: &str,
	theme: &Theme,
	scale: &ScaledValues,
) {
	if scale.detail_alpha < 0.01 {
		return;
	}
	ctx.set_font(&scale.label_font);
	ctx.set_fill_style_str(&theme.muted_text.with_alpha(scale.detail_alpha).to_css());
	ctx.set_text_align("right");
	let _ = ctx.fill_text(text, rect.right() - 12.0, rect.y + 20.0);
	ctx.set_text_align("left");
}

fn draw_detail(
	ctx: &CanvasRenderingContext2d,
	rect: Rect,
	text: &str,
	theme: &Theme,
	scale: &ScaledValues,
) {
	if scale.detail_alpha < 0.01 || rect.height < 50.0 {
		return;
	}
	ctx.set_font(&scale.method_font);
	ctx.set_fill_style_str(&theme.muted_text.with_alpha(scale.detail_alpha).to_css());
	let text = fit_text(ctx, text, rect.width - 24.0);
	let _ = ctx.fill_text(&text, rect.x + 12.0, rect.y + 38.0);
}

fn draw_endpoint(
	ctx: &CanvasRenderingContext2d,
	rect: Rect,
	method: &str,
	placeholder: bool,
	theme: &Theme,
	scale: &ScaledValues,
	node_t: f64,
) {
	let c = rect.center();
	let radius = rect.width.min(rect.height) / 2.0;

	ctx.begin_path();
	let _ = ctx.arc(c.x, c.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&theme.endpoint_fill.to_css());
	ctx.fill();
	let stroke = if node_t > 0.01 {
		theme.endpoint_method
	} else {
		theme.endpoint_stroke
	};
	ctx.set_stroke_style_str(&stroke.to_css());
	ctx.set_line_width(1.0 + node_t);
	if placeholder {
		set_dash(ctx, Some((scale.dash_pattern.0 / 2.0, scale.dash_pattern.1 / 2.0)));
	}
	ctx.stroke();
	set_dash(ctx, None);

	if scale.detail_alpha > 0.01 {
		ctx.set_font(&scale.method_font);
		ctx.set_fill_style_str(&theme.endpoint_method.with_alpha(scale.detail_alpha).to_css());
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let label = fit_text(ctx, method, rect.width + 6.0);
		let _ = ctx.fill_text(&label, c.x, c.y + 1.0);
		ctx.set_text_align("left");
		ctx.set_text_baseline("alphabetic");
	}
}

fn draw_ring(ctx: &CanvasRenderingContext2d, rect: Rect, color: Color, width: f64, offset: f64) {
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	let grown = Rect::new(
		rect.x - offset,
		rect.y - offset,
		rect.width + 2.0 * offset,
		rect.height + 2.0 * offset,
	);
	if rect.width == rect.height && rect.width < 40.0 {
		let c = rect.center();
		ctx.begin_path();
		let _ = ctx.arc(c.x, c.y, grown.width / 2.0, 0.0, 2.0 * PI);
	} else {
		rounded_rect_path(ctx, grown, 6.0 + offset);
	}
	ctx.stroke();
}

fn draw_edges(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let routes = state.edge_routes(theme.routing_offset());
	let max_t = smooth_step(state.highlight.max_intensity());
	ctx.set_line_cap("round");

	for (edge, route) in state.graph.edges.iter().zip(&routes) {
		let edge_t = smooth_step(state.highlight.edge_intensity(edge.source, edge.target));
		let alpha = if edge_t > 0.01 {
			0.85 + 0.15 * edge_t
		} else {
			0.85 - 0.6 * max_t
		};
		let color = theme.edge_color(edge.call_kind);
		let css = color.with_alpha(color.a * alpha).to_css();

		ctx.set_stroke_style_str(&css);
		ctx.set_line_width(scale.edge_width * (1.0 + 0.5 * edge_t));
		ctx.begin_path();
		ctx.move_to(route.start.x, route.start.y);
		ctx.bezier_curve_to(
			route.control1.x,
			route.control1.y,
			route.control2.x,
			route.control2.y,
			route.end.x,
			route.end.y,
		);
		ctx.stroke();

		let [tip, left, right] = arrowhead(
			route.end,
			route.arrow_angle,
			scale.arrow_length,
			scale.arrow_half_width,
		);
		ctx.set_fill_style_str(&css);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(left.x, left.y);
		ctx.line_to(right.x, right.y);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_banner(ctx: &CanvasRenderingContext2d, theme: &Theme) {
	ctx.set_font("bold 13px sans-serif");
	let width = ctx
		.measure_text(SAMPLE_BANNER)
		.map(|m| m.width())
		.unwrap_or(240.0)
		+ 24.0;
	rounded_rect_path(ctx, Rect::new(12.0, 12.0, width, 28.0), 4.0);
	ctx.set_fill_style_str(&theme.banner.to_css());
	ctx.fill();
	ctx.set_fill_style_str("#ffffff");
	ctx.set_text_align("left");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(SAMPLE_BANNER, 24.0, 26.0);
	ctx.set_text_baseline("alphabetic");
}


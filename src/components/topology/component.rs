//! Leptos component wrapping the topology canvas.
//!
//! The component owns the load pipeline (fetch, resolve, build), the canvas
//! with its pointer and wheel handlers, and the HTML chrome around it: focus
//! search, status bar, tooltip and inspection panel. An animation loop runs
//! via `requestAnimationFrame`, stepping the layout and redrawing each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, WheelEvent, Window,
};

use crate::cache::CatalogCache;
use crate::config::TopologyConfig;
use crate::error::FetchError;
use crate::fetch::{FetchReport, Fetcher};
use crate::graph::{NodeKind, NodeType, Point, TopologyGraph, sample_entities, sample_graph};
use crate::http::ReqwestClient;
use crate::model::{Api, Endpoint, EntityId, System};
use crate::pipeline::{RequestTokens, assemble};

use super::render;
use super::scale::{ScaleConfig, ScaledValues};
use super::state::{Interaction, PointerUp, TopologyState};
use super::theme::Theme;
use super::tooltip::{Inspected, Tooltip, tooltip_for};

/// Bundles view state with visual configuration.
struct ViewContext {
	state: TopologyState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Totals shown in the status bar.
#[derive(Clone, Debug, Default, PartialEq)]
struct Counts {
	systems: usize,
	apis: usize,
	endpoints: usize,
	connections: usize,
	/// Name of the focused system, when there is one.
	focus: Option<String>,
	sample: bool,
}

impl Counts {
	fn of(graph: &TopologyGraph) -> Self {
		Self {
			systems: graph.count(NodeType::System),
			apis: graph.count(NodeType::Api),
			endpoints: graph.count(NodeType::Endpoint),
			connections: graph.edges.len(),
			focus: graph
				.focus
				.as_deref()
				.and_then(|id| graph.node(NodeType::System, id))
				.map(|n| n.name.clone()),
			sample: graph.sample,
		}
	}
}

/// Record behind a clicked node, as the inspection panel needs it.
enum InspectTarget {
	System(EntityId),
	Api(EntityId),
	Endpoint(EntityId),
	Placeholder,
}

impl InspectTarget {
	fn of(graph: &TopologyGraph, idx: usize) -> Option<Self> {
		let node = graph.nodes.get(idx)?;
		Some(match node.kind {
			NodeKind::System { .. } => Self::System(node.id.clone()),
			NodeKind::Api { .. } => Self::Api(node.id.clone()),
			NodeKind::Endpoint {
				placeholder: true, ..
			} => Self::Placeholder,
			NodeKind::Endpoint { .. } => Self::Endpoint(node.id.clone()),
		})
	}
}

fn notice_for(report: &FetchReport) -> Option<String> {
	if report.unauthorized() {
		return Some("Not authorized to read the catalog".into());
	}
	report.failure_summary()
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Renders the service topology for the configured backend.
///
/// The component sizes itself to its parent container and follows window
/// resizes. Data is loaded once on mount and again whenever the focus
/// changes or "Refresh" is pressed; only the latest load is ever shown.
#[component]
pub fn TopologyCanvas(
	/// Backend, layout and theme settings.
	config: TopologyConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let theme = Theme::for_name(config.theme);
	let legend = [
		("System call", theme.edges.system_call.to_css()),
		("API call", theme.edges.api_call.to_css()),
		("System → API", theme.edges.system_to_api.to_css()),
		("API → System", theme.edges.api_to_system.to_css()),
	];

	let context = Rc::new(RefCell::new(ViewContext {
		state: TopologyState::new(
			TopologyGraph::default(),
			config.layout,
			config.force.clone(),
			config.zoom,
			800.0,
			600.0,
		),
		scale: ScaleConfig::default(),
		theme,
	}));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let fetcher = match ReqwestClient::new(&config.backend) {
		Ok(client) => Some(Rc::new(Fetcher::new(client))),
		Err(e) => {
			error!("topology: cannot create backend client: {}", e);
			None
		}
	};
	let cache = Rc::new(RefCell::new(CatalogCache::new(config.cache_ttl_ms)));
	let loads = Rc::new(RequestTokens::new());
	let inspections = Rc::new(RequestTokens::new());
	let metrics = config.containment.clone();

	let focus = RwSignal::new(None::<EntityId>);
	let systems = RwSignal::new(Vec::<(EntityId, String)>::new());
	let counts = RwSignal::new(Counts::default());
	let notice = RwSignal::new(None::<String>);
	let loading = RwSignal::new(false);
	let tooltip = RwSignal::new(None::<(Tooltip, f64, f64)>);
	let inspected = RwSignal::new(None::<Result<Inspected, String>>);
	let search = RwSignal::new(String::new());

	let load: Rc<dyn Fn()> = {
		let (context, cache, loads) = (context.clone(), cache.clone(), loads.clone());
		let fetcher = fetcher.clone();
		Rc::new(move || {
			tooltip.set(None);
			inspected.set(None);
			let Some(fetcher) = fetcher.clone() else {
				let graph = sample_graph(&metrics);
				cache.borrow_mut().prime(&sample_entities(), js_sys::Date::now());
				counts.set(Counts::of(&graph));
				context.borrow_mut().state.replace_graph(graph);
				notice.set(Some("Backend is not configured".into()));
				return;
			};
			let token = loads.issue();
			let focus_id = focus.get_untracked();
			let (context, cache, loads) = (context.clone(), cache.clone(), loads.clone());
			let metrics = metrics.clone();
			loading.set(true);
			spawn_local(async move {
				let report = fetcher.fetch_all().await;
				if !loads.is_current(token) {
					return;
				}
				loading.set(false);
				notice.set(notice_for(&report));

				let graph = assemble(&report.entities, focus_id.as_deref(), &metrics);
				let now = js_sys::Date::now();
				{
					let mut cache = cache.borrow_mut();
					cache.evict_expired(now);
					if graph.sample {
						cache.prime(&sample_entities(), now);
					} else {
						cache.prime(&report.entities, now);
					}
				}
				let mut names: Vec<(EntityId, String)> = report
					.entities
					.systems
					.iter()
					.map(|s| (s.id.clone(), s.name.clone()))
					.collect();
				names.sort_by(|a, b| a.1.cmp(&b.1));
				systems.set(names);
				counts.set(Counts::of(&graph));
				context.borrow_mut().state.replace_graph(graph);
			});
		})
	};

	let inspect = {
		let (cache, inspections) = (cache.clone(), inspections.clone());
		let fetcher = fetcher.clone();
		move |target: InspectTarget| {
			let token = inspections.issue();
			let Some(fetcher) = fetcher.clone() else {
				inspected.set(Some(Err("Backend is not configured".into())));
				return;
			};
			let (cache, inspections) = (cache.clone(), inspections.clone());
			spawn_local(async move {
				let now = js_sys::Date::now();
				let result: Result<Inspected, FetchError> = match target {
					InspectTarget::System(id) => fetcher
						.lookup::<System>(&cache, &id, now)
						.await
						.map(Inspected::System),
					InspectTarget::Api(id) => fetcher
						.lookup::<Api>(&cache, &id, now)
						.await
						.map(Inspected::Api),
					InspectTarget::Endpoint(id) => fetcher
						.lookup::<Endpoint>(&cache, &id, now)
						.await
						.map(Inspected::Endpoint),
					InspectTarget::Placeholder => {
						inspected.set(Some(Err(
							"This endpoint is not listed in the catalog".into()
						)));
						return;
					}
				};
				if !inspections.is_current(token) {
					return;
				}
				inspected.set(Some(result.map_err(|e| {
					warn!("topology: inspection failed: {}", e);
					e.to_string()
				})));
			});
		}
	};

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		context_init.borrow_mut().state.resize(w, h);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("topology: canvas 2d context unavailable");
				return;
			}
		};

		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			context_resize.borrow_mut().state.resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let c = &mut *context_anim.borrow_mut();
				c.state.tick(0.016);
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		let c = &mut *context_md.borrow_mut();
		let slop = ScaledValues::new(&c.scale, c.state.transform.k).hit_slop;
		c.state.pointer_down(p, slop);
		tooltip.set(None);
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		let c = &mut *context_mm.borrow_mut();
		let slop = ScaledValues::new(&c.scale, c.state.transform.k).hit_slop;
		c.state.pointer_move(p, slop);
		if c.state.interaction != Interaction::Idle {
			return;
		}
		let tip = c
			.state
			.highlight
			.hovered()
			.map(|idx| (tooltip_for(&c.state.graph, idx), p.x + 12.0, p.y + 12.0));
		tooltip.set(tip);
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let outcome = context_mu.borrow_mut().state.pointer_up();
		match outcome {
			PointerUp::Click(Some(idx)) => {
				let target = InspectTarget::of(&context_mu.borrow().state.graph, idx);
				if let Some(target) = target {
					inspect(target);
				}
			}
			PointerUp::Click(None) => inspected.set(None),
			PointerUp::Moved | PointerUp::Ignored => {}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		context_ml.borrow_mut().state.pointer_leave();
		tooltip.set(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = pointer(canvas_ref, &ev) else {
			return;
		};
		context_wh.borrow_mut().state.zoom_at(p, ev.delta_y());
	};

	let load_search = load.clone();
	let on_search = move |ev: Event| {
		let text = event_target_value(&ev);
		search.set(text.clone());
		let picked = systems
			.get_untracked()
			.into_iter()
			.find(|(_, name)| *name == text)
			.map(|(id, _)| id);
		if let Some(id) = picked {
			focus.set(Some(id));
			load_search();
		}
	};

	let load_all = load.clone();
	let on_show_all = move |_: MouseEvent| {
		focus.set(None);
		search.set(String::new());
		load_all();
	};

	let load_refresh = load.clone();
	let on_refresh = move |_: MouseEvent| load_refresh();

	load();

	view! {
		<div class="topology">
			<div class="topology-toolbar">
				<input
					type="search"
					list="topology-systems"
					placeholder="Focus on a system…"
					prop:value=move || search.get()
					on:change=on_search
				/>
				<datalist id="topology-systems">
					{move || {
						systems
							.get()
							.into_iter()
							.map(|(_, name)| view! { <option value=name /> })
							.collect_view()
					}}
				</datalist>
				<button on:click=on_show_all hidden=move || focus.get().is_none()>
					"Show all"
				</button>
				<button on:click=on_refresh disabled=move || loading.get()>
					"Refresh"
				</button>
			</div>

			<div class="topology-status">
				{move || {
					let c = counts.get();
					view! {
						<span class="tag">{format!("Systems: {}", c.systems)}</span>
						<span class="tag">{format!("APIs: {}", c.apis)}</span>
						<span class="tag">{format!("Endpoints: {}", c.endpoints)}</span>
						<span class="tag">{format!("Connections: {}", c.connections)}</span>
						{c.focus.map(|name| view! {
							<span class="tag focus">{format!("Focus: {name}")}</span>
						})}
						{c.sample.then(|| view! { <span class="tag sample">"Sample data"</span> })}
					}
				}}
				<span class="legend">
					{legend
						.into_iter()
						.map(|(label, color)| {
							view! {
								<span class="legend-item">
									<span
										class="legend-swatch"
										style=format!("background: {color};")
									/>
									{label}
								</span>
							}
						})
						.collect_view()}
				</span>
				<Show when=move || loading.get()>
					<span class="loading">"Loading…"</span>
				</Show>
			</div>

			{move || notice.get().map(|text| view! { <div class="topology-notice">{text}</div> })}

			<div class="topology-canvas">
				<canvas
					node_ref=canvas_ref
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style="display: block; cursor: grab;"
				/>
				{move || {
					tooltip
						.get()
						.map(|(tip, x, y)| {
							view! {
								<div
									class="topology-tooltip"
									style=format!("position: absolute; left: {x}px; top: {y}px;")
								>
									<strong>{tip.title}</strong>
									<span class="kind">{tip.kind}</span>
									{tip
										.rows
										.into_iter()
										.map(|(label, value)| view! {
											<div class="row">{label}": "{value}</div>
										})
										.collect_view()}
								</div>
							}
						})
				}}
			</div>

			{move || {
				inspected
					.get()
					.map(|result| {
						view! {
							<aside class="topology-inspector">
								{match result {
									Ok(record) => record
										.rows()
										.into_iter()
										.map(|(label, value)| view! {
											<div class="row">
												<span class="label">{label}</span>
												<span class="value">{value}</span>
											</div>
										})
										.collect_view()
										.into_any(),
									Err(message) => view! { <div class="error">{message}</div> }
										.into_any(),
								}}
								<button on:click=move |_| inspected.set(None)>"Close"</button>
							</aside>
						}
					})
			}}
		</div>
	}
}

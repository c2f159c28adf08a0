use std::sync::Arc;

use gloo_timers::callback::Timeout;
use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;

use super::component::KnowledgeGraphCanvas;
use super::filter::{DomainSelection, FilterMemo};
use super::interaction::{InteractionState, NodeDetails};
use super::panels::{DomainFilter, Legend, NodeDetailPanel, StatsBar, TimeRangeFilter, Toast};
use super::shell::{FilterState, GraphStats, RequestGeneration, SharedDataset};
use super::types::{DomainInfo, GraphNode, TimeSliceInfo};
use crate::api::ApiClient;
use crate::config::GraphConfig;

const FALLBACK_WIDTH: f64 = 800.0;

type DomListener = Closure<dyn FnMut()>;

/// Full graph UI: filters, stats, legend, canvas and detail panel.
///
/// `on_node_click` replaces the built-in detail panel when given; selection
/// still follows the click.
#[component]
pub fn KnowledgeGraphView(
	#[prop(optional)] on_node_click: Option<Callback<GraphNode>>,
	#[prop(default = 600.0)] height: f64,
) -> impl IntoView {
	let config = use_context::<GraphConfig>().unwrap_or_default();
	let client = StoredValue::new(ApiClient::new(&config.api_base));
	let (limit, notification_ms) = (config.fetch_limit, config.notification_ms);

	let raw = RwSignal::new(SharedDataset::default());
	let domains = RwSignal::new(Vec::<DomainInfo>::new());
	let slices = RwSignal::new(Vec::<TimeSliceInfo>::new());
	let filter = RwSignal::new(FilterState::default());
	let interaction = RwSignal::new(InteractionState::default());
	let loading = RwSignal::new(false);
	let stale = RwSignal::new(false);
	let notice = RwSignal::new(None::<String>);
	let fullscreen = RwSignal::new(false);
	let stage_width = RwSignal::new(FALLBACK_WIDTH);
	let viewport_height = RwSignal::new(height);

	let requests = StoredValue::new(RequestGeneration::default());
	let memo = StoredValue::new(FilterMemo::default());
	let notice_timer = StoredValue::new_local(None::<Timeout>);
	let listeners = StoredValue::new_local(Vec::<(&'static str, bool, DomListener)>::new());
	let root_ref = NodeRef::<Div>::new();
	let stage_ref = NodeRef::<Div>::new();

	let notify = move |message: String| {
		let _ = notice.try_set(Some(message));
		let _ = notice_timer.try_set_value(Some(Timeout::new(notification_ms, move || {
			let _ = notice.try_set(None);
		})));
	};

	let fetch_graph = move || {
		let Some(token) = requests.try_update_value(|r| r.issue()) else {
			return;
		};
		let all: DomainSelection =
			domains.with_untracked(|list| list.iter().map(|d| d.domain_id.clone()).collect());
		let query = filter.with_untracked(|f| f.query(&all, limit));
		let client = client.get_value();
		loading.set(true);

		spawn_local(async move {
			let result = client.visualize_3d(&query).await;
			if requests.try_with_value(|r| r.is_current(token)) != Some(true) {
				log::debug!("dropping superseded graph response {token:?}");
				return;
			}
			let _ = loading.try_set(false);
			match result {
				Ok(data) => {
					log::info!(
						"loaded knowledge graph: {} nodes, {} edges",
						data.nodes.len(),
						data.edges.len()
					);
					let _ = raw.try_set(SharedDataset(Arc::new(data)));
					let _ = stale.try_set(false);
				}
				Err(err) => {
					log::error!("failed to load knowledge graph: {err}");
					let has_data = raw.try_with_untracked(|d| !d.nodes.is_empty()).unwrap_or(false);
					let _ = stale.try_set(has_data);
					notify(format!("Failed to load graph data: {err}"));
				}
			}
		});
	};

	// Reference lists are fetched once; the graph is refetched on refresh.
	fetch_graph();
	spawn_local(async move {
		match client.get_value().domains().await {
			Ok(list) => {
				let _ = domains.try_set(list);
			}
			Err(err) => log::warn!("failed to load domains: {err}"),
		}
	});
	spawn_local(async move {
		match client.get_value().time_slices().await {
			Ok(list) => {
				let _ = slices.try_set(list);
			}
			Err(err) => log::warn!("failed to load time slices: {err}"),
		}
	});

	Effect::new(move |_| {
		let ids: Vec<String> = domains.with(|list| list.iter().map(|d| d.domain_id.clone()).collect());
		filter.maybe_update(|f| f.init_domains(ids));
	});

	Effect::new(move |_| {
		slices.with(|list| filter.maybe_update(|f| f.init_time_range(list)));
	});

	let filtered = Memo::new(move |_| {
		let data = raw.get();
		filter
			.with(|f| memo.try_update_value(|m| m.filter(&data, f.selected_domains(), f.time_range())))
			.map(SharedDataset)
			.unwrap_or_default()
	});
	let stats = Memo::new(move |_| filtered.with(|data| GraphStats::from_dataset(data)));
	let selected_id = Memo::new(move |_| interaction.with(|i| i.selected_id().map(str::to_owned)));
	let details = Memo::new(move |_| interaction.with(|i| i.selected().map(NodeDetails::from_node)));
	let panel_open = Memo::new(move |_| interaction.with(InteractionState::is_panel_open));
	let cursor = Memo::new(move |_| interaction.with(InteractionState::cursor));

	let handle_click = Callback::new(move |node: GraphNode| {
		interaction.update(|i| i.click(node.clone()));
		if let Some(hook) = on_node_click {
			hook.run(node);
		}
	});
	let handle_hover = Callback::new(move |node: Option<GraphNode>| {
		interaction.update(|i| i.hover(node.as_ref()));
	});
	let close_panel = Callback::new(move |()| interaction.update(InteractionState::close));

	let measure = move || {
		if let Some(stage) = stage_ref.get_untracked() {
			let w = stage.client_width() as f64;
			stage_width.set(if w > 0.0 { w } else { FALLBACK_WIDTH });
		}
		if let Some(h) = window().inner_height().ok().and_then(|h| h.as_f64()) {
			viewport_height.set(h);
		}
	};

	Effect::new(move |_| {
		if stage_ref.get().is_none() {
			return;
		}
		measure();
		if listeners.with_value(|l| !l.is_empty()) {
			return;
		}
		let on_resize: DomListener = Closure::new(move || measure());
		let on_fullscreen: DomListener = Closure::new(move || {
			fullscreen.set(document().fullscreen_element().is_some());
			measure();
		});
		if window()
			.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
			.is_ok()
		{
			listeners.update_value(|l| l.push(("resize", true, on_resize)));
		}
		if document()
			.add_event_listener_with_callback("fullscreenchange", on_fullscreen.as_ref().unchecked_ref())
			.is_ok()
		{
			listeners.update_value(|l| l.push(("fullscreenchange", false, on_fullscreen)));
		}
	});

	on_cleanup(move || {
		listeners.try_update_value(|l| {
			for (event, on_window, listener) in l.drain(..) {
				let callback = listener.as_ref().unchecked_ref();
				let _ = if on_window {
					window().remove_event_listener_with_callback(event, callback)
				} else {
					document().remove_event_listener_with_callback(event, callback)
				};
			}
		});
		notice_timer.try_update_value(|t| t.take());
	});

	let toggle_fullscreen = move |_| {
		if document().fullscreen_element().is_some() {
			document().exit_fullscreen();
		} else if let Some(root) = root_ref.get_untracked() {
			if let Err(err) = root.request_fullscreen() {
				log::warn!("fullscreen request rejected: {err:?}");
			}
		}
	};

	let canvas_height = Signal::derive(move || {
		if fullscreen.get() {
			viewport_height.get()
		} else {
			height
		}
	});

	view! {
		<div node_ref=root_ref class="kg-view" class:kg-fullscreen=move || fullscreen.get()>
			<div class="kg-toolbar">
				<StatsBar stats=stats loading=loading stale=stale />
				<button on:click=move |_| fetch_graph() disabled=move || loading.get()>
					"Refresh"
				</button>
				<button on:click=toggle_fullscreen>
					{move || if fullscreen.get() { "Exit fullscreen" } else { "Fullscreen" }}
				</button>
			</div>
			<div class="kg-body">
				<div class="kg-sidebar">
					<DomainFilter domains=domains filter=filter />
					<TimeRangeFilter slices=slices filter=filter />
					<Legend />
				</div>
				<div node_ref=stage_ref class="kg-stage" style:cursor=move || cursor.get()>
					<KnowledgeGraphCanvas
						data=Signal::derive(move || filtered.get().0)
						width=stage_width
						height=canvas_height
						selected=selected_id
						on_node_click=handle_click
						on_node_hover=handle_hover
						fit_delay_ms=config.fit_delay_ms
						fit_duration_ms=config.fit_duration_ms
					/>
				</div>
				<Show when=move || on_node_click.is_none() && panel_open.get()>
					{move || {
						details
							.get()
							.map(|details| view! { <NodeDetailPanel details=details on_close=close_panel /> })
					}}
				</Show>
			</div>
			<Toast message=notice on_dismiss=Callback::new(move |()| notice.set(None)) />
		</div>
	}
}

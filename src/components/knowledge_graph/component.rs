use std::sync::Arc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use web_sys::HtmlCanvasElement;

use super::adapter::{FitTicket, RenderAdapter, SceneCallbacks};
use super::canvas::CanvasScene;
use super::types::{GraphDataset, GraphNode};

/// Canvas bound to one renderer handle for as long as it is mounted.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] data: Signal<Arc<GraphDataset>>,
	#[prop(into)] width: Signal<f64>,
	#[prop(into)] height: Signal<f64>,
	#[prop(into, optional)] selected: Signal<Option<String>>,
	#[prop(into)] on_node_click: Callback<GraphNode>,
	#[prop(into, optional)] on_node_hover: Option<Callback<Option<GraphNode>>>,
	#[prop(default = 200)] fit_delay_ms: u32,
	#[prop(default = 800)] fit_duration_ms: u32,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let adapter = StoredValue::new_local(RenderAdapter::<CanvasScene>::new());
	let callbacks = StoredValue::new_local(SceneCallbacks::default());
	let fit_timer = StoredValue::new_local(None::<Timeout>);

	callbacks.with_value(|cb| {
		cb.click.set(move |node| on_node_click.run(node));
		if let Some(on_hover) = on_node_hover {
			cb.hover.set(move |node| on_hover.run(node));
		}
	});

	// The renderer needs a moment to settle a replaced graph before framing it.
	let schedule_fit = move |ticket: FitTicket| {
		log::debug!("fit {ticket:?} in {fit_delay_ms}ms");
		fit_timer.set_value(Some(Timeout::new(fit_delay_ms, move || {
			adapter.try_update_value(|a| a.fit(ticket, fit_duration_ms));
		})));
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if adapter.with_value(|a| a.is_mounted()) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = (width.get_untracked(), height.get_untracked());
		adapter.update_value(|a| a.resize(w, h));

		let scene_callbacks = callbacks.with_value(Clone::clone);
		match CanvasScene::create(canvas, w, h, scene_callbacks) {
			Ok(scene) => {
				if let Some(ticket) = adapter.try_update_value(|a| a.mount(scene)) {
					schedule_fit(ticket);
				}
			}
			Err(err) => log::error!("could not create knowledge graph renderer: {err}"),
		}
	});

	Effect::new(move |_| {
		let data = data.get();
		if let Some(Some(ticket)) = adapter.try_update_value(|a| a.push(data)) {
			schedule_fit(ticket);
		}
	});

	Effect::new(move |_| {
		let (w, h) = (width.get(), height.get());
		adapter.try_update_value(|a| a.resize(w, h));
	});

	Effect::new(move |_| {
		let id = selected.get();
		adapter.try_update_value(|a| a.select(id.as_deref()));
	});

	on_cleanup(move || {
		fit_timer.try_update_value(|t| t.take());
		callbacks.try_with_value(|cb| cb.clear());
		adapter.try_update_value(|a| a.unmount());
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			style="display: block;"
		/>
	}
}

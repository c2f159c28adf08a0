//! Chrome around the canvas: filters, counts, legend and node details.

use leptos::prelude::*;

use super::interaction::NodeDetails;
use super::shell::{FilterState, GraphStats};
use super::style::node_color;
use super::types::{DomainInfo, NodeType, TimeSliceInfo, YearRange};

#[component]
pub fn DomainFilter(
	#[prop(into)] domains: Signal<Vec<DomainInfo>>,
	filter: RwSignal<FilterState>,
) -> impl IntoView {
	let select_all = move |_| {
		let ids = domains.with(|list| list.iter().map(|d| d.domain_id.clone()).collect::<Vec<_>>());
		filter.update(|f| f.select_all(ids));
	};
	let clear = move |_| filter.update(FilterState::clear_domains);

	view! {
		<section class="kg-panel kg-domain-filter">
			<header>
				<h3>"Domains"</h3>
				<button on:click=select_all>"All"</button>
				<button on:click=clear>"None"</button>
			</header>
			{move || {
				let list = domains.get();
				if list.is_empty() {
					return view! { <p class="kg-muted">"No domains available"</p> }.into_any();
				}
				list.into_iter()
					.map(|domain| {
						let (id, toggle_id) = (domain.domain_id.clone(), domain.domain_id.clone());
						let swatch = format!("background-color: {}", domain.color);
						view! {
							<label class="kg-domain">
								<input
									type="checkbox"
									prop:checked=move || filter.with(|f| f.is_selected(&id))
									on:change=move |_| filter.update(|f| f.toggle_domain(&toggle_id))
								/>
								<span class="kg-swatch" style=swatch></span>
								{domain.display_name().to_owned()}
							</label>
						}
					})
					.collect_view()
					.into_any()
			}}
		</section>
	}
}

#[component]
pub fn TimeRangeFilter(
	#[prop(into)] slices: Signal<Vec<TimeSliceInfo>>,
	filter: RwSignal<FilterState>,
) -> impl IntoView {
	let span = Memo::new(move |_| slices.with(|s| YearRange::spanning(s)));
	let current = move || filter.with(|f| f.time_range()).or_else(|| span.get());

	let set_bound = move |value: String, is_start: bool| {
		let (Ok(year), Some(current)) = (value.parse::<i32>(), current()) else {
			return;
		};
		let range = if is_start {
			YearRange::new(year, current.end.max(year))
		} else {
			YearRange::new(current.start.min(year), year)
		};
		filter.update(|f| f.set_time_range(range));
	};

	view! {
		<section class="kg-panel kg-time-filter">
			<h3>"Years"</h3>
			{move || match span.get() {
				None => view! { <p class="kg-muted">"No time slices available"</p> }.into_any(),
				Some(bounds) => {
					let (min, max) = (bounds.start.to_string(), bounds.end.to_string());
					view! {
						<label>
							"From "
							<input
								type="range"
								min=min.clone()
								max=max.clone()
								prop:value=move || current().map(|r| r.start.to_string()).unwrap_or_default()
								on:change=move |ev| set_bound(event_target_value(&ev), true)
							/>
							{move || current().map(|r| r.start)}
						</label>
						<label>
							"To "
							<input
								type="range"
								min=min
								max=max
								prop:value=move || current().map(|r| r.end.to_string()).unwrap_or_default()
								on:change=move |ev| set_bound(event_target_value(&ev), false)
							/>
							{move || current().map(|r| r.end)}
						</label>
					}
						.into_any()
				}
			}}
		</section>
	}
}

#[component]
pub fn StatsBar(
	#[prop(into)] stats: Signal<GraphStats>,
	#[prop(into)] loading: Signal<bool>,
	#[prop(into)] stale: Signal<bool>,
) -> impl IntoView {
	view! {
		<div class="kg-stats">
			<span>{move || format!("{} nodes", stats.with(|s| s.nodes))}</span>
			<span>{move || format!("{} edges", stats.with(|s| s.edges))}</span>
			{move || {
				stats
					.get()
					.by_type
					.into_iter()
					.map(|(node_type, count)| {
						view! {
							<span class="kg-stat-type">{format!("{}: {count}", node_type.as_str())}</span>
						}
					})
					.collect_view()
			}}
			<Show when=move || loading.get()>
				<span class="kg-loading">"Loading..."</span>
			</Show>
			<Show when=move || stale.get()>
				<span class="kg-stale" title="The last refresh failed; showing earlier data">
					"Stale"
				</span>
			</Show>
		</div>
	}
}

#[component]
pub fn Legend() -> impl IntoView {
	view! {
		<div class="kg-legend">
			{NodeType::ALL
				.iter()
				.map(|&node_type| {
					let swatch = format!("background-color: {}", node_color(node_type));
					view! {
						<div class="kg-legend-item">
							<span class="kg-swatch" style=swatch></span>
							{node_type.as_str()}
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}

#[component]
pub fn NodeDetailPanel(details: NodeDetails, on_close: Callback<()>) -> impl IntoView {
	let NodeDetails {
		id,
		label,
		node_type,
		position,
		properties,
	} = details;

	view! {
		<aside class="kg-panel kg-details">
			<header>
				<h3>{label}</h3>
				<button class="kg-close" on:click=move |_| on_close.run(())>"x"</button>
			</header>
			<dl>
				<dt>"ID"</dt>
				<dd>{id}</dd>
				<dt>"Type"</dt>
				<dd>{node_type.as_str()}</dd>
				<dt>"Position"</dt>
				<dd>{format!("({:.1}, {:.1}, {:.1})", position.x, position.y, position.z)}</dd>
				{properties
					.into_iter()
					.map(|(key, value)| view! {
						<dt>{key}</dt>
						<dd>{value}</dd>
					})
					.collect_view()}
			</dl>
		</aside>
	}
}

#[component]
pub fn Toast(#[prop(into)] message: Signal<Option<String>>, on_dismiss: Callback<()>) -> impl IntoView {
	view! {
		{move || {
			message
				.get()
				.map(|text| {
					view! {
						<div class="kg-toast" role="alert" on:click=move |_| on_dismiss.run(())>
							{text}
						</div>
					}
				})
		}}
	}
}

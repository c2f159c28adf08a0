use leptos::prelude::*;

use crate::components::knowledge_graph::KnowledgeGraphView;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<div class="graph-overlay">
					<h1>"Standards Knowledge Graph"</h1>
					<p class="subtitle">
						"Drag to orbit. Scroll to zoom. Click a node for details."
					</p>
				</div>
				<KnowledgeGraphView height=720.0 />
			</div>
		</ErrorBoundary>
	}
}

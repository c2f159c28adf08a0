//! Domain and time-range filtering over a loaded dataset.
//!
//! Filtering never touches the input: every call yields a fresh dataset (or
//! the input itself when nothing would be removed and it is already
//! consistent). Edges survive only when both endpoints do, so the output never
//! carries a dangling edge.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use super::types::{GraphDataset, GraphMetadata, GraphNode, NodeType, YearRange};

/// Ids of the domain nodes the user has selected.
pub type DomainSelection = BTreeSet<String>;

const DOMAIN_ID_PREFIX: &str = "domain_";

/// Node id of the domain a `domain` property value refers to.
pub fn domain_node_id(domain: &str) -> String {
	format!("{DOMAIN_ID_PREFIX}{domain}")
}

/// Every domain id the dataset knows about, from its nodes and its domain list.
pub fn known_domain_ids(dataset: &GraphDataset) -> DomainSelection {
	dataset
		.nodes
		.iter()
		.filter(|node| node.node_type == NodeType::Domain)
		.map(|node| node.id.clone())
		.chain(dataset.domains.iter().map(|d| d.domain_id.clone()))
		.collect()
}

fn retains(node: &GraphNode, selected: &DomainSelection, range: Option<YearRange>) -> bool {
	match node.node_type {
		node_type if node_type.is_structural() => true,
		NodeType::Domain => selected.contains(&node.id),
		_ => {
			let in_domain = node
				.domain()
				.is_some_and(|domain| selected.contains(&domain_node_id(domain)));
			in_domain
				&& range.is_none_or(|range| node.year().is_none_or(|year| range.contains(year)))
		}
	}
}

pub fn filter_dataset(
	dataset: &Arc<GraphDataset>,
	selected: &DomainSelection,
	range: Option<YearRange>,
) -> Arc<GraphDataset> {
	let known = known_domain_ids(dataset);
	let spans_everything =
		range.is_none_or(|range| dataset.year_span().is_none_or(|span| range.covers(span)));
	if !known.is_empty() && *selected == known && spans_everything && dataset.is_consistent() {
		return Arc::clone(dataset);
	}

	let nodes: Vec<GraphNode> = dataset
		.nodes
		.iter()
		.filter(|node| retains(node, selected, range))
		.cloned()
		.collect();
	let retained: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
	let edges: Vec<_> = dataset
		.edges
		.iter()
		.filter(|edge| {
			retained.contains(edge.source.as_str()) && retained.contains(edge.target.as_str())
		})
		.cloned()
		.collect();
	let time_slices: Vec<_> = dataset
		.time_slices
		.iter()
		.filter(|slice| range.is_none_or(|range| range.contains(slice.year)))
		.cloned()
		.collect();
	let domains: Vec<_> = dataset
		.domains
		.iter()
		.filter(|domain| selected.contains(&domain.domain_id))
		.cloned()
		.collect();

	let metadata = GraphMetadata::derive(&nodes, &edges, &time_slices, &domains);
	Arc::new(GraphDataset {
		nodes,
		edges,
		time_slices,
		domains,
		metadata,
	})
}

/// Remembers the last filter result, keyed by dataset identity, selection
/// and range.
#[derive(Debug, Default)]
pub struct FilterMemo {
	last: Option<MemoEntry>,
}

#[derive(Debug)]
struct MemoEntry {
	dataset: Arc<GraphDataset>,
	selected: DomainSelection,
	range: Option<YearRange>,
	output: Arc<GraphDataset>,
}

impl FilterMemo {
	pub fn filter(
		&mut self,
		dataset: &Arc<GraphDataset>,
		selected: &DomainSelection,
		range: Option<YearRange>,
	) -> Arc<GraphDataset> {
		if let Some(entry) = &self.last {
			if Arc::ptr_eq(&entry.dataset, dataset)
				&& entry.selected == *selected
				&& entry.range == range
			{
				return Arc::clone(&entry.output);
			}
		}

		let output = filter_dataset(dataset, selected, range);
		self.last = Some(MemoEntry {
			dataset: Arc::clone(dataset),
			selected: selected.clone(),
			range,
			output: Arc::clone(&output),
		});
		output
	}
}

//! State owned by the graph view: filter selection with its one-shot
//! defaults, request sequencing, and summary counts.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use super::filter::DomainSelection;
use super::types::{GraphDataset, NodeType, TimeSliceInfo, YearRange};
use crate::api::Visualize3dQuery;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
	selected_domains: DomainSelection,
	time_range: Option<YearRange>,
	domains_initialized: bool,
	range_initialized: bool,
}

impl FilterState {
	pub fn selected_domains(&self) -> &DomainSelection {
		&self.selected_domains
	}

	pub fn time_range(&self) -> Option<YearRange> {
		self.time_range
	}

	pub fn is_selected(&self, domain_id: &str) -> bool {
		self.selected_domains.contains(domain_id)
	}

	/// Selects every domain the first time a non-empty list arrives. Later
	/// calls never touch the selection, even if the user emptied it.
	pub fn init_domains<I>(&mut self, ids: I) -> bool
	where
		I: IntoIterator<Item = String>,
	{
		if self.domains_initialized {
			return false;
		}
		let ids: DomainSelection = ids.into_iter().collect();
		if ids.is_empty() {
			return false;
		}
		self.selected_domains = ids;
		self.domains_initialized = true;
		true
	}

	/// Spans the first non-empty slice list, unless a range was already chosen.
	pub fn init_time_range(&mut self, slices: &[TimeSliceInfo]) -> bool {
		if self.range_initialized || self.time_range.is_some() {
			return false;
		}
		let Some(range) = YearRange::spanning(slices) else {
			return false;
		};
		self.time_range = Some(range);
		self.range_initialized = true;
		true
	}

	pub fn toggle_domain(&mut self, domain_id: &str) {
		if !self.selected_domains.remove(domain_id) {
			self.selected_domains.insert(domain_id.to_owned());
		}
		self.domains_initialized = true;
	}

	pub fn select_all<I>(&mut self, ids: I)
	where
		I: IntoIterator<Item = String>,
	{
		self.selected_domains = ids.into_iter().collect();
		self.domains_initialized = true;
	}

	pub fn clear_domains(&mut self) {
		self.selected_domains.clear();
		self.domains_initialized = true;
	}

	pub fn set_time_range(&mut self, range: YearRange) {
		self.time_range = Some(range);
		self.range_initialized = true;
	}

	/// Request for the current selection. Domains are sent only when they
	/// narrow the result.
	pub fn query(&self, all_domains: &DomainSelection, limit: u32) -> Visualize3dQuery {
		let narrows = !self.selected_domains.is_empty()
			&& self.selected_domains.len() < all_domains.len()
			&& self.selected_domains.is_subset(all_domains);
		Visualize3dQuery {
			start_year: self.time_range.map(|range| range.start),
			end_year: self.time_range.map(|range| range.end),
			domains: if narrows {
				self.selected_domains.iter().cloned().collect()
			} else {
				Vec::new()
			},
			limit: Some(limit),
		}
	}
}

/// Tag attached to one issued graph request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Tracks issued graph requests so only the latest response is applied.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration {
	latest: u64,
}

impl RequestGeneration {
	pub fn issue(&mut self) -> RequestToken {
		self.latest += 1;
		RequestToken(self.latest)
	}

	/// False once a newer request has been issued after `token`.
	pub fn is_current(&self, token: RequestToken) -> bool {
		token.0 == self.latest
	}
}

/// Dataset compared by identity, so signals holding it only notify on a
/// genuinely new value.
#[derive(Clone, Debug, Default)]
pub struct SharedDataset(pub Arc<GraphDataset>);

impl PartialEq for SharedDataset {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Deref for SharedDataset {
	type Target = Arc<GraphDataset>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
	pub nodes: usize,
	pub edges: usize,
	/// Non-zero counts in legend order.
	pub by_type: Vec<(NodeType, usize)>,
}

impl GraphStats {
	pub fn from_dataset(data: &GraphDataset) -> Self {
		let mut counts: BTreeMap<NodeType, usize> = BTreeMap::new();
		for node in &data.nodes {
			*counts.entry(node.node_type).or_default() += 1;
		}
		let by_type = NodeType::ALL
			.iter()
			.chain(std::iter::once(&NodeType::Unknown))
			.filter_map(|t| counts.get(t).map(|&n| (*t, n)))
			.collect();
		Self {
			nodes: data.nodes.len(),
			edges: data.edges.len(),
			by_type,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn slices(years: &[i32]) -> Vec<TimeSliceInfo> {
		years
			.iter()
			.map(|&year| TimeSliceInfo {
				year,
				z_position: 0.0,
				label: year.to_string(),
			})
			.collect()
	}

	fn ids(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn domains_initialize_once() {
		let mut state = FilterState::default();
		assert!(!state.init_domains(Vec::new()));
		assert!(state.init_domains(ids(&["domain_a", "domain_b"])));
		assert!(state.is_selected("domain_a"));

		state.clear_domains();
		assert!(!state.init_domains(ids(&["domain_a", "domain_b"])));
		assert!(state.selected_domains().is_empty());
	}

	#[test]
	fn time_range_initializes_once() {
		let mut state = FilterState::default();
		assert!(state.init_time_range(&slices(&[2018, 2024])));
		assert_eq!(state.time_range(), Some(YearRange::new(2018, 2024)));

		assert!(!state.init_time_range(&[]));
		assert!(!state.init_time_range(&slices(&[2000, 2030])));
		assert_eq!(state.time_range(), Some(YearRange::new(2018, 2024)));
	}

	#[test]
	fn chosen_range_is_not_overwritten() {
		let mut state = FilterState::default();
		state.set_time_range(YearRange::new(2020, 2021));
		assert!(!state.init_time_range(&slices(&[2018, 2024])));
		assert_eq!(state.time_range(), Some(YearRange::new(2020, 2021)));
	}

	#[test]
	fn toggle_flips_membership() {
		let mut state = FilterState::default();
		state.select_all(ids(&["domain_a", "domain_b"]));
		state.toggle_domain("domain_a");
		assert!(!state.is_selected("domain_a"));
		state.toggle_domain("domain_a");
		assert!(state.is_selected("domain_a"));
	}

	#[test]
	fn query_sends_domains_only_when_narrowing() {
		let all: DomainSelection = ids(&["domain_a", "domain_b"]).into_iter().collect();
		let mut state = FilterState::default();
		state.select_all(all.iter().cloned());
		state.set_time_range(YearRange::new(2018, 2024));

		let query = state.query(&all, 500);
		assert!(query.domains.is_empty());
		assert_eq!((query.start_year, query.end_year, query.limit), (Some(2018), Some(2024), Some(500)));

		state.toggle_domain("domain_b");
		assert_eq!(state.query(&all, 500).domains, ids(&["domain_a"]));
	}

	#[test]
	fn only_latest_request_applies() {
		let mut generation = RequestGeneration::default();
		let first = generation.issue();
		let second = generation.issue();
		assert!(!generation.is_current(first));
		assert!(generation.is_current(second));

		let third = generation.issue();
		assert!(!generation.is_current(second));
		assert!(generation.is_current(third));
	}

	#[test]
	fn stats_count_filtered_types() {
		let data: GraphDataset = serde_json::from_value(json!({
			"nodes": [
				{ "id": "domain_a", "nodeType": "Domain" },
				{ "id": "S1", "nodeType": "Standard" },
				{ "id": "S2", "nodeType": "Standard" },
				{ "id": "X", "nodeType": "Widget" }
			],
			"edges": [{ "source": "S1", "target": "domain_a", "type": "BELONGS_TO_DOMAIN" }]
		}))
		.unwrap();
		let stats = GraphStats::from_dataset(&data);
		assert_eq!((stats.nodes, stats.edges), (4, 1));
		assert_eq!(
			stats.by_type,
			vec![
				(NodeType::Domain, 1),
				(NodeType::Standard, 2),
				(NodeType::Unknown, 1),
			]
		);
	}

	#[test]
	fn shared_dataset_compares_by_identity() {
		let a = SharedDataset::default();
		let b = SharedDataset(Arc::new(GraphDataset::default()));
		assert_eq!(a, a.clone());
		assert_ne!(a, b);
	}
}

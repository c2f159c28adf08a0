//! Records exchanged with the knowledge-graph backend.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of entity a node stands for.
#[derive(
	Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
	Standard,
	Skill,
	Category,
	Domain,
	TimeSlice,
	StandardSeries,
	SkillFamily,
	/// A label this view has no mapping for.
	#[default]
	Unknown,
}

impl NodeType {
	/// Every type a legend should list, largest first.
	pub const ALL: [NodeType; 7] = [
		NodeType::Domain,
		NodeType::Standard,
		NodeType::StandardSeries,
		NodeType::Skill,
		NodeType::SkillFamily,
		NodeType::Category,
		NodeType::TimeSlice,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Standard => "Standard",
			NodeType::Skill => "Skill",
			NodeType::Category => "Category",
			NodeType::Domain => "Domain",
			NodeType::TimeSlice => "TimeSlice",
			NodeType::StandardSeries => "StandardSeries",
			NodeType::SkillFamily => "SkillFamily",
			NodeType::Unknown => "Unknown",
		}
	}

	/// Structural nodes are never removed by the domain filter.
	pub fn is_structural(self) -> bool {
		self == NodeType::TimeSlice
	}
}

impl From<String> for NodeType {
	fn from(label: String) -> Self {
		match label.as_str() {
			"Standard" => NodeType::Standard,
			"Skill" => NodeType::Skill,
			"Category" => NodeType::Category,
			"Domain" => NodeType::Domain,
			"TimeSlice" => NodeType::TimeSlice,
			"StandardSeries" => NodeType::StandardSeries,
			"SkillFamily" => NodeType::SkillFamily,
			_ => NodeType::Unknown,
		}
	}
}

impl From<NodeType> for String {
	fn from(node_type: NodeType) -> Self {
		node_type.as_str().to_owned()
	}
}

/// Server-assigned scene coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(default)]
	pub z: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
	#[serde(default)]
	pub color: String,
	#[serde(default)]
	pub size: f64,
	#[serde(default = "full_opacity")]
	pub opacity: f64,
}

fn full_opacity() -> f64 {
	1.0
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			color: String::new(),
			size: 0.0,
			opacity: full_opacity(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	pub id: String,
	pub node_type: NodeType,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub properties: BTreeMap<String, Value>,
	#[serde(default)]
	pub position: Position,
	#[serde(default)]
	pub style: NodeStyle,
}

impl GraphNode {
	/// Raw `domain` property, when the node is attributed to one.
	pub fn domain(&self) -> Option<&str> {
		self.properties
			.get("domain")
			.and_then(Value::as_str)
			.filter(|d| !d.is_empty())
	}

	/// Calendar year the node belongs to, if it carries one.
	pub fn year(&self) -> Option<i32> {
		if self.node_type == NodeType::TimeSlice {
			return self
				.properties
				.get("year")
				.and_then(year_value)
				.or_else(|| self.id.parse().ok());
		}
		self.properties.get("version_year").and_then(year_value)
	}

	pub fn display_label(&self) -> &str {
		if self.label.is_empty() {
			&self.id
		} else {
			&self.label
		}
	}
}

fn year_value(value: &Value) -> Option<i32> {
	match value {
		Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	#[serde(rename = "type", default)]
	pub edge_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<BTreeMap<String, Value>>,
}

/// One subject-matter domain and its sector of the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
	#[serde(alias = "domain_id")]
	pub domain_id: String,
	#[serde(alias = "domain_name", default)]
	pub domain_name: String,
	#[serde(default)]
	pub color: String,
	/// Degrees; assigned once when the domain is created.
	#[serde(alias = "sector_angle", default)]
	pub sector_angle: f64,
}

impl DomainInfo {
	pub fn display_name(&self) -> &str {
		if self.domain_name.is_empty() {
			&self.domain_id
		} else {
			&self.domain_name
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSliceInfo {
	pub year: i32,
	#[serde(alias = "z_position", default)]
	pub z_position: f64,
	#[serde(default)]
	pub label: String,
}

/// Sorts slices by year; returns false when depth does not follow the years.
pub fn order_time_slices(slices: &mut [TimeSliceInfo]) -> bool {
	slices.sort_by_key(|slice| slice.year);
	slices
		.windows(2)
		.all(|pair| pair[0].z_position <= pair[1].z_position)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
	pub min: Option<i32>,
	pub max: Option<i32>,
}

/// Summary counts, always derived from the node/edge sets it sits beside.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
	pub total_nodes: usize,
	pub total_edges: usize,
	#[serde(default)]
	pub time_range: TimeRange,
	#[serde(default)]
	pub domain_count: usize,
}

impl GraphMetadata {
	pub fn derive(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		time_slices: &[TimeSliceInfo],
		domains: &[DomainInfo],
	) -> Self {
		let years = || time_slices.iter().map(|slice| slice.year);
		Self {
			total_nodes: nodes.len(),
			total_edges: edges.len(),
			time_range: TimeRange {
				min: years().min(),
				max: years().max(),
			},
			domain_count: domains.len(),
		}
	}
}

/// Response of the 3D visualization endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDataset {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
	#[serde(default)]
	pub time_slices: Vec<TimeSliceInfo>,
	#[serde(default)]
	pub domains: Vec<DomainInfo>,
	#[serde(default)]
	pub metadata: GraphMetadata,
}

impl GraphDataset {
	/// Drops edges whose endpoints are missing, orders the time slices and
	/// replaces the server metadata with counts taken from the payload itself.
	pub fn normalized(mut self) -> Self {
		let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
		let before = self.edges.len();
		self.edges
			.retain(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()));
		if self.edges.len() < before {
			log::debug!("dropped {} dangling edges", before - self.edges.len());
		}
		if !order_time_slices(&mut self.time_slices) {
			log::warn!("time slice depth is not monotonic in year");
		}
		self.metadata = GraphMetadata::derive(
			&self.nodes,
			&self.edges,
			&self.time_slices,
			&self.domains,
		);
		self
	}

	/// Years covered by the dataset's time slices.
	pub fn year_span(&self) -> Option<YearRange> {
		YearRange::spanning(&self.time_slices).or_else(|| {
			let TimeRange { min, max } = self.metadata.time_range;
			Some(YearRange::new(min?, max?))
		})
	}

	/// True when every edge joins two present nodes and the metadata counts
	/// describe exactly these nodes and edges.
	pub fn is_consistent(&self) -> bool {
		let ids: HashSet<&str> = self.nodes.iter().map(|node| node.id.as_str()).collect();
		self.metadata.total_nodes == self.nodes.len()
			&& self.metadata.total_edges == self.edges.len()
			&& self
				.edges
				.iter()
				.all(|edge| ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str()))
	}
}

/// Inclusive span of calendar years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct YearRange {
	pub start: i32,
	pub end: i32,
}

impl YearRange {
	pub fn new(a: i32, b: i32) -> Self {
		Self {
			start: a.min(b),
			end: a.max(b),
		}
	}

	pub fn spanning(slices: &[TimeSliceInfo]) -> Option<Self> {
		let min = slices.iter().map(|slice| slice.year).min()?;
		let max = slices.iter().map(|slice| slice.year).max()?;
		Some(Self::new(min, max))
	}

	pub fn contains(&self, year: i32) -> bool {
		(self.start..=self.end).contains(&year)
	}

	pub fn covers(&self, other: YearRange) -> bool {
		self.start <= other.start && self.end >= other.end
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_backend_payload() {
		let payload = serde_json::json!({
			"nodes": [
				{
					"id": "GB/T 4219.1-2021",
					"nodeType": "Standard",
					"label": "PVC-U piping",
					"properties": { "domain": "pipe", "version_year": 2021, "x": 200.0 },
					"position": { "x": 200.0, "y": 0.0, "z": 300.0 },
					"style": { "color": "#00d4ff", "size": 10, "opacity": 1.0 }
				},
				{ "id": "2021", "nodeType": "TimeSlice", "properties": { "year": 2021 } },
				{ "id": "attr_1", "nodeType": "Attribute" }
			],
			"edges": [{ "source": "GB/T 4219.1-2021", "target": "2021", "type": "BELONGS_TO_TIME" }],
			"timeSlices": [{ "year": 2021, "z_position": 300, "label": "2021" }],
			"domains": [{ "domain_id": "domain_pipe", "domain_name": "Pipes", "color": "#00d4ff", "sector_angle": 0 }],
			"metadata": { "totalNodes": 99, "totalEdges": 1, "timeRange": { "min": 2021, "max": 2021 }, "domainCount": 1 }
		});
		let dataset: GraphDataset = serde_json::from_value(payload).unwrap();

		assert_eq!(dataset.nodes[0].node_type, NodeType::Standard);
		assert_eq!(dataset.nodes[0].domain(), Some("pipe"));
		assert_eq!(dataset.nodes[0].year(), Some(2021));
		assert_eq!(dataset.nodes[1].year(), Some(2021));
		assert_eq!(dataset.nodes[1].style.opacity, 1.0);
		assert_eq!(dataset.nodes[2].node_type, NodeType::Unknown);
		assert_eq!(dataset.nodes[2].display_label(), "attr_1");
		assert_eq!(dataset.edges[0].edge_type, "BELONGS_TO_TIME");
		assert_eq!(dataset.domains[0].domain_id, "domain_pipe");
		assert_eq!(dataset.time_slices[0].z_position, 300.0);
		assert!(!dataset.is_consistent());
		assert!(dataset.normalized().is_consistent());
	}

	#[test]
	fn normalizing_drops_dangling_edges() {
		let dataset: GraphDataset = serde_json::from_value(serde_json::json!({
			"nodes": [
				{ "id": "S1", "nodeType": "Standard" },
				{ "id": "domain_pipe", "nodeType": "Domain" }
			],
			"edges": [
				{ "source": "S1", "target": "domain_pipe", "type": "BELONGS_TO_DOMAIN" },
				{ "source": "S1", "target": "domain_gone", "type": "BELONGS_TO_DOMAIN" }
			]
		}))
		.unwrap();
		assert!(!dataset.is_consistent());
		let dataset = dataset.normalized();
		assert!(dataset.is_consistent());
		assert_eq!(dataset.edges.len(), 1);
		assert_eq!(dataset.metadata.total_edges, 1);
		assert_eq!(dataset.metadata.total_nodes, 2);
	}

	#[test]
	fn time_slice_year_falls_back_to_id() {
		let node: GraphNode =
			serde_json::from_value(serde_json::json!({ "id": "2019", "nodeType": "TimeSlice" }))
				.unwrap();
		assert_eq!(node.year(), Some(2019));
	}

	#[test]
	fn orders_slices_and_checks_depth() {
		let slice = |year, z_position| TimeSliceInfo {
			year,
			z_position,
			label: year.to_string(),
		};
		let mut slices = vec![slice(2024, 450.0), slice(2018, 150.0), slice(2020, 250.0)];
		assert!(order_time_slices(&mut slices));
		assert_eq!(
			slices.iter().map(|s| s.year).collect::<Vec<_>>(),
			vec![2018, 2020, 2024]
		);

		let mut skewed = vec![slice(2018, 300.0), slice(2019, 100.0)];
		assert!(!order_time_slices(&mut skewed));
	}

	#[test]
	fn year_range_normalizes_bounds() {
		let range = YearRange::new(2024, 2018);
		assert_eq!(range.start, 2018);
		assert!(range.contains(2018) && range.contains(2024));
		assert!(!range.contains(2025));
		assert!(range.covers(YearRange::new(2019, 2020)));
		assert!(!YearRange::new(2019, 2020).covers(range));
	}
}

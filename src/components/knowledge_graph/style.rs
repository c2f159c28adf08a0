//! Static visual mappings from graph records to scene styling.

use super::types::{GraphEdge, GraphNode, NodeType};

const NEUTRAL_COLOR: &str = "#9ca3af";

pub fn node_color(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::Standard => "#00d4ff",
		NodeType::Skill => "#ff6b6b",
		NodeType::Category => "#7c3aed",
		NodeType::Domain => "#f59e0b",
		NodeType::TimeSlice => "#6366f1",
		NodeType::StandardSeries => "#38bdf8",
		NodeType::SkillFamily => "#f472b6",
		NodeType::Unknown => NEUTRAL_COLOR,
	}
}

/// World-space diameter per node type.
pub fn node_size(node_type: NodeType) -> f64 {
	match node_type {
		NodeType::Domain => 16.0,
		NodeType::Standard => 10.0,
		NodeType::StandardSeries => 9.0,
		NodeType::Skill => 8.0,
		NodeType::SkillFamily => 7.0,
		NodeType::Category => 6.0,
		NodeType::Unknown => 5.0,
		NodeType::TimeSlice => 4.0,
	}
}

/// Relationship families that get a distinct edge treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
	/// Standard/skill belongs to a domain, category, series, family or year.
	Membership,
	/// One artifact produced from another.
	Derivation,
	/// Category parent/child.
	Hierarchy,
	Other,
}

impl EdgeKind {
	pub fn classify(edge_type: &str) -> Self {
		match edge_type {
			"BELONGS_TO_DOMAIN" | "BELONGS_TO_CATEGORY" | "BELONGS_TO_TIME"
			| "BELONGS_TO_SERIES" | "BELONGS_TO_FAMILY" | "MEMBER_OF" => EdgeKind::Membership,
			"COMPILES_TO" | "DERIVED_FROM" | "DERIVES" => EdgeKind::Derivation,
			"PARENT_OF" | "CHILD_OF" => EdgeKind::Hierarchy,
			_ => EdgeKind::Other,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: (u8, u8, u8),
	pub width: f64,
	/// Zero means no arrow head.
	pub arrow_length: f64,
	pub particles: u32,
	/// Fraction of the edge a particle covers per second.
	pub particle_speed: f64,
}

impl EdgeStyle {
	pub fn for_kind(kind: EdgeKind) -> Self {
		match kind {
			EdgeKind::Membership => EdgeStyle {
				color: (245, 158, 11),
				width: 0.8,
				arrow_length: 0.0,
				particles: 0,
				particle_speed: 0.0,
			},
			EdgeKind::Derivation => EdgeStyle {
				color: (255, 107, 107),
				width: 1.6,
				arrow_length: 7.0,
				particles: 2,
				particle_speed: 0.35,
			},
			EdgeKind::Hierarchy => EdgeStyle {
				color: (124, 58, 237),
				width: 1.2,
				arrow_length: 5.0,
				particles: 1,
				particle_speed: 0.2,
			},
			EdgeKind::Other => EdgeStyle {
				color: (156, 163, 175),
				width: 0.8,
				arrow_length: 4.0,
				particles: 0,
				particle_speed: 0.0,
			},
		}
	}

	pub fn rgba(&self, alpha: f64) -> String {
		let (r, g, b) = self.color;
		format!("rgba({r}, {g}, {b}, {alpha})")
	}
}

/// Per-node styling the scene draws with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeVisual {
	pub id: String,
	pub label: String,
	pub node_type: NodeType,
	pub color: String,
	pub size: f64,
	pub opacity: f64,
	/// Depth coordinate; x and y live in the pinned graph node.
	pub z: f64,
}

impl NodeVisual {
	pub fn for_node(node: &GraphNode) -> Self {
		let color = if node.style.color.is_empty() {
			node_color(node.node_type).to_owned()
		} else {
			node.style.color.clone()
		};
		Self {
			id: node.id.clone(),
			label: node.display_label().to_owned(),
			node_type: node.node_type,
			color,
			size: node_size(node.node_type),
			opacity: node.style.opacity.clamp(0.0, 1.0),
			z: node.position.z,
		}
	}

	/// Domains and years are always labelled; the rest only up close.
	pub fn always_labelled(&self) -> bool {
		matches!(self.node_type, NodeType::Domain | NodeType::TimeSlice)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub edge_type: String,
	pub style: EdgeStyle,
}

impl Default for EdgeVisual {
	fn default() -> Self {
		Self {
			edge_type: String::new(),
			style: EdgeStyle::for_kind(EdgeKind::Other),
		}
	}
}

impl EdgeVisual {
	pub fn for_edge(edge: &GraphEdge) -> Self {
		Self {
			edge_type: edge.edge_type.clone(),
			style: EdgeStyle::for_kind(EdgeKind::classify(&edge.edge_type)),
		}
	}
}

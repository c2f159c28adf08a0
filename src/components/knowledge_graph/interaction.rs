//! Selection and hover state driven by pointer events from the scene.

use super::types::{GraphNode, NodeType, Position};

/// Property keys the layout writes onto nodes; they are noise in the detail panel.
const LAYOUT_KEYS: &[&str] = &["x", "y", "z", "vx", "vy", "vz", "fx", "fy", "fz", "index"];

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
	#[default]
	Idle,
	Selected(GraphNode),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	selection: Selection,
	hovered: Option<String>,
}

impl InteractionState {
	/// Any click selects the clicked node, even if it already is selected.
	pub fn click(&mut self, node: GraphNode) {
		self.selection = Selection::Selected(node);
	}

	pub fn close(&mut self) {
		self.selection = Selection::Idle;
	}

	pub fn hover(&mut self, node: Option<&GraphNode>) {
		self.hovered = node.map(|node| node.id.clone());
	}

	pub fn selected(&self) -> Option<&GraphNode> {
		match &self.selection {
			Selection::Idle => None,
			Selection::Selected(node) => Some(node),
		}
	}

	pub fn selected_id(&self) -> Option<&str> {
		self.selected().map(|node| node.id.as_str())
	}

	/// The detail panel is shown exactly while a node is selected.
	pub fn is_panel_open(&self) -> bool {
		matches!(self.selection, Selection::Selected(_))
	}

	/// CSS cursor for the stage under the pointer.
	pub fn cursor(&self) -> &'static str {
		if self.hovered.is_some() {
			"pointer"
		} else {
			"grab"
		}
	}
}

/// Read-only view of a node for the detail panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub id: String,
	pub label: String,
	pub node_type: NodeType,
	pub position: Position,
	pub properties: Vec<(String, String)>,
}

impl NodeDetails {
	pub fn from_node(node: &GraphNode) -> Self {
		let properties = node
			.properties
			.iter()
			.filter(|(key, _)| !LAYOUT_KEYS.contains(&key.as_str()))
			.map(|(key, value)| {
				let shown = match value {
					serde_json::Value::String(s) => s.clone(),
					serde_json::Value::Null => "-".to_owned(),
					other => other.to_string(),
				};
				(key.clone(), shown)
			})
			.collect();
		Self {
			id: node.id.clone(),
			label: node.display_label().to_owned(),
			node_type: node.node_type,
			position: node.position,
			properties,
		}
	}
}

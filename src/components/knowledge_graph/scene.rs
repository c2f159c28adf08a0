use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::camera::{Camera, CameraTween, Vec3};
use super::style::{EdgeVisual, NodeVisual};
use super::types::{GraphDataset, GraphNode, NodeType};

pub const HIT_SLOP: f64 = 4.0;
pub const MIN_NODE_RADIUS: f64 = 1.5;
pub const MAX_NODE_RADIUS: f64 = 40.0;
/// Pointer travel (px) below which a press counts as a click.
pub const CLICK_SLOP: f64 = 4.0;
const ORBIT_SPEED: f64 = 0.005;

#[derive(Clone, Debug, Default)]
pub struct OrbitState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct SceneState {
	pub graph: ForceGraph<NodeVisual, EdgeVisual>,
	pub camera: Camera,
	pub orbit: OrbitState,
	pub hover: HoverState,
	pub selected: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	tween: Option<CameraTween>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	ids: HashMap<String, DefaultNodeIdx>,
	nodes: HashMap<DefaultNodeIdx, GraphNode>,
	time_axis: Vec<Vec3>,
}

/// Node store whose simulation never moves anything: every node is added as
/// an anchor at its server-assigned coordinates.
fn pinned_graph() -> ForceGraph<NodeVisual, EdgeVisual> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

pub fn node_radius(size: f64, scale: f64) -> f64 {
	(size * 0.5 * scale).clamp(MIN_NODE_RADIUS, MAX_NODE_RADIUS)
}

impl SceneState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: pinned_graph(),
			camera: Camera::default(),
			orbit: OrbitState::default(),
			hover: HoverState::default(),
			selected: None,
			width,
			height,
			flow_time: 0.0,
			tween: None,
			edges: Vec::new(),
			ids: HashMap::new(),
			nodes: HashMap::new(),
			time_axis: Vec::new(),
		}
	}

	/// Replaces the whole scene with `data`. Edges whose endpoints are not in
	/// `data` are skipped. Returns true when a hovered node was let go.
	pub fn set_graph(&mut self, data: &GraphDataset) -> bool {
		let selected_id = self.selected_id().map(str::to_owned);
		let mut graph = pinned_graph();
		let mut ids = HashMap::with_capacity(data.nodes.len());
		let mut nodes = HashMap::with_capacity(data.nodes.len());
		let mut axis = Vec::new();

		for node in &data.nodes {
			let idx = graph.add_node(NodeData {
				x: node.position.x as f32,
				y: node.position.y as f32,
				mass: 10.0,
				is_anchor: true,
				user_data: NodeVisual::for_node(node),
			});
			if node.node_type == NodeType::TimeSlice {
				axis.push(Vec3::new(node.position.x, node.position.y, node.position.z));
			}
			ids.insert(node.id.clone(), idx);
			nodes.insert(idx, node.clone());
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		for edge in &data.edges {
			if let (Some(&src), Some(&tgt)) = (ids.get(&edge.source), ids.get(&edge.target)) {
				graph.add_edge(
					src,
					tgt,
					EdgeData {
						user_data: EdgeVisual::for_edge(edge),
					},
				);
				edges.push((src, tgt));
			}
		}
		axis.sort_by(|a, b| a.z.total_cmp(&b.z));

		self.graph = graph;
		self.edges = edges;
		self.ids = ids;
		self.nodes = nodes;
		self.time_axis = axis;
		let was_hovering = self.hover.node.is_some();
		self.hover = HoverState::default();
		self.selected = selected_id.and_then(|id| self.ids.get(&id).copied());
		was_hovering
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn node(&self, idx: DefaultNodeIdx) -> Option<&GraphNode> {
		self.nodes.get(&idx)
	}

	pub fn index_of(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.ids.get(id).copied()
	}

	pub fn time_axis(&self) -> &[Vec3] {
		&self.time_axis
	}

	fn selected_id(&self) -> Option<&str> {
		self.selected
			.and_then(|idx| self.nodes.get(&idx))
			.map(|node| node.id.as_str())
	}

	/// Current scene coordinates of every node.
	pub fn positions(&self) -> Vec<(DefaultNodeIdx, Vec3)> {
		let mut out = Vec::with_capacity(self.nodes.len());
		self.graph.visit_nodes(|node| {
			out.push((
				node.index(),
				Vec3::new(node.x() as f64, node.y() as f64, node.data.user_data.z),
			));
		});
		out
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let mut found: Option<(DefaultNodeIdx, f64)> = None;
		self.graph.visit_nodes(|node| {
			let world = Vec3::new(node.x() as f64, node.y() as f64, node.data.user_data.z);
			let Some(p) = self.camera.project(world, self.width, self.height) else {
				return;
			};
			let (dx, dy) = (p.x - sx, p.y - sy);
			let reach = node_radius(node.data.user_data.size, p.scale) + HIT_SLOP;
			// Nearest to the camera wins when projections overlap.
			if (dx * dx + dy * dy).sqrt() < reach
				&& found.is_none_or(|(_, depth)| p.depth < depth)
			{
				found = Some((node.index(), p.depth));
			}
		});
		found.map(|(idx, _)| idx)
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the previous highlight around so it can fade out.
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn set_selected(&mut self, id: Option<&str>) {
		self.selected = id.and_then(|id| self.index_of(id));
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		if let Some(tween) = self.tween.as_mut() {
			let (camera, done) = tween.advance(dt as f64);
			self.camera = camera;
			if done {
				self.tween = None;
			}
		}

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Starts an animated move that frames every node.
	pub fn zoom_to_fit(&mut self, duration_secs: f64) {
		let points: Vec<Vec3> = self.positions().into_iter().map(|(_, p)| p).collect();
		let aspect = self.width / self.height.max(1.0);
		if let Some(target) = self.camera.framing(&points, aspect) {
			self.tween = Some(CameraTween::new(self.camera, target, duration_secs));
		}
	}

	pub fn begin_orbit(&mut self, x: f64, y: f64) {
		self.orbit = OrbitState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	pub fn drag_orbit(&mut self, x: f64, y: f64) {
		let (dx, dy) = (x - self.orbit.last_x, y - self.orbit.last_y);
		self.orbit.last_x = x;
		self.orbit.last_y = y;
		let travelled = ((x - self.orbit.start_x).powi(2) + (y - self.orbit.start_y).powi(2)).sqrt();
		if travelled > CLICK_SLOP {
			self.orbit.moved = true;
		}
		if self.orbit.moved {
			// A manual drag overrides any framing in progress.
			self.tween = None;
			self.camera.orbit(dx * ORBIT_SPEED, dy * ORBIT_SPEED);
		}
	}

	/// Ends a drag; returns true when it was a click rather than an orbit.
	pub fn end_orbit(&mut self) -> bool {
		let was_click = self.orbit.active && !self.orbit.moved;
		self.orbit = OrbitState::default();
		was_click
	}

	pub fn zoom_by(&mut self, factor: f64) {
		self.tween = None;
		self.camera.zoom(factor);
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn dataset() -> GraphDataset {
		serde_json::from_value(json!({
			"nodes": [
				{ "id": "domain_pipe", "nodeType": "Domain", "position": { "x": 200.0, "y": 0.0, "z": 0.0 } },
				{ "id": "S1", "nodeType": "Standard", "position": { "x": 230.0, "y": 10.0, "z": 250.0 } },
				{ "id": "K1", "nodeType": "Skill", "position": { "x": 215.0, "y": 5.0, "z": 250.0 } },
				{ "id": "2024", "nodeType": "TimeSlice", "position": { "x": 0.0, "y": 0.0, "z": 450.0 } },
				{ "id": "2020", "nodeType": "TimeSlice", "position": { "x": 0.0, "y": 0.0, "z": 250.0 } }
			],
			"edges": [
				{ "source": "S1", "target": "domain_pipe", "type": "BELONGS_TO_DOMAIN" },
				{ "source": "S1", "target": "K1", "type": "COMPILES_TO" },
				{ "source": "K1", "target": "gone", "type": "BELONGS_TO_CATEGORY" }
			]
		}))
		.unwrap()
	}

	fn scene() -> SceneState {
		let mut scene = SceneState::new(800.0, 600.0);
		scene.set_graph(&dataset());
		scene
	}

	fn position_of(scene: &SceneState, id: &str) -> Vec3 {
		let idx = scene.index_of(id).unwrap();
		scene
			.positions()
			.into_iter()
			.find(|(i, _)| *i == idx)
			.map(|(_, p)| p)
			.unwrap()
	}

	#[test]
	fn set_graph_skips_dangling_edges() {
		let scene = scene();
		assert_eq!(scene.node_count(), 5);
		assert_eq!(scene.edge_count(), 2);
	}

	#[test]
	fn nodes_stay_at_assigned_positions() {
		let mut scene = scene();
		let before = position_of(&scene, "S1");
		for _ in 0..120 {
			scene.tick(0.016);
		}
		assert_eq!(position_of(&scene, "S1"), before);
		assert_eq!(before, Vec3::new(230.0, 10.0, 250.0));
	}

	#[test]
	fn time_axis_runs_front_to_back() {
		let scene = scene();
		let depths: Vec<f64> = scene.time_axis().iter().map(|p| p.z).collect();
		assert_eq!(depths, vec![250.0, 450.0]);
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut scene = scene();
		let s1 = scene.index_of("S1").unwrap();
		scene.set_hover(Some(s1));
		assert!(scene.is_highlighted(scene.index_of("K1").unwrap()));
		assert!(scene.is_highlighted(scene.index_of("domain_pipe").unwrap()));
		assert!(!scene.is_highlighted(scene.index_of("2024").unwrap()));

		scene.set_hover(None);
		assert!(scene.is_hovered(s1));
		for _ in 0..600 {
			scene.tick(0.016);
		}
		assert!(!scene.has_active_highlight());
	}

	#[test]
	fn replacing_the_graph_lets_go_of_hover() {
		let mut scene = scene();
		assert!(!scene.set_graph(&dataset()));

		scene.set_hover(scene.index_of("K1"));
		let mut shrunk = dataset();
		shrunk.nodes.retain(|n| n.id != "K1");
		assert!(scene.set_graph(&shrunk));
		assert_eq!(scene.hover.node, None);
		assert!(!scene.has_active_highlight());
	}

	#[test]
	fn selection_survives_replacement_when_node_remains() {
		let mut scene = scene();
		scene.set_selected(Some("K1"));
		scene.set_graph(&dataset());
		assert_eq!(scene.selected, scene.index_of("K1"));

		let mut shrunk = dataset();
		shrunk.nodes.retain(|n| n.id != "K1");
		scene.set_graph(&shrunk);
		assert_eq!(scene.selected, None);
	}

	#[test]
	fn hit_test_finds_projected_node() {
		let mut scene = scene();
		scene.camera = scene
			.camera
			.framing(&[position_of(&scene, "2024")], 800.0 / 600.0)
			.unwrap();
		let hit = scene.node_at_position(400.0, 300.0);
		assert_eq!(hit, scene.index_of("2024"));
		assert_eq!(scene.node_at_position(2.0, 2.0), None);
	}

	#[test]
	fn zoom_to_fit_animates_to_framing() {
		let mut scene = scene();
		scene.zoom_to_fit(0.5);
		assert!(scene.tween.is_some());
		for _ in 0..60 {
			scene.tick(0.016);
		}
		assert!(scene.tween.is_none());
		for (_, point) in scene.positions() {
			let p = scene.camera.project(point, 800.0, 600.0).unwrap();
			assert!((0.0..=800.0).contains(&p.x) && (0.0..=600.0).contains(&p.y));
		}
	}

	#[test]
	fn short_press_is_a_click_and_drag_is_not() {
		let mut scene = scene();
		scene.begin_orbit(100.0, 100.0);
		scene.drag_orbit(101.0, 101.0);
		assert!(scene.end_orbit());

		let yaw = scene.camera.yaw;
		scene.begin_orbit(100.0, 100.0);
		scene.drag_orbit(160.0, 100.0);
		assert!(!scene.end_orbit());
		assert_ne!(scene.camera.yaw, yaw);
	}
}

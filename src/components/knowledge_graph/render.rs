use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::camera::{Projected, Vec3, ease_out_cubic};
use super::scene::{SceneState, node_radius};
use super::style::NodeVisual;

const BACKGROUND: &str = "#0a0a0f";
const AXIS_COLOR: &str = "rgba(99, 102, 241, 0.45)";
/// Scale above which every node gets a label.
const LABEL_SCALE: f64 = 1.6;

/// A node as it lands on screen this frame.
#[derive(Clone, Debug)]
pub struct ScreenNode {
	pub idx: DefaultNodeIdx,
	pub visual: NodeVisual,
	pub at: Projected,
	pub radius: f64,
}

/// Projects every visible node, ordered back to front.
pub fn project_nodes(state: &SceneState) -> Vec<ScreenNode> {
	let mut out = Vec::with_capacity(state.node_count());
	state.graph.visit_nodes(|node| {
		let visual = &node.data.user_data;
		let world = Vec3::new(node.x() as f64, node.y() as f64, visual.z);
		if let Some(at) = state.camera.project(world, state.width, state.height) {
			out.push(ScreenNode {
				idx: node.index(),
				visual: visual.clone(),
				radius: node_radius(visual.size, at.scale),
				at,
			});
		}
	});
	out.sort_by(|a, b| b.at.depth.total_cmp(&a.at.depth));
	out
}

pub fn render(state: &SceneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	let nodes = project_nodes(state);
	let screen: HashMap<DefaultNodeIdx, (Projected, f64)> =
		nodes.iter().map(|n| (n.idx, (n.at, n.radius))).collect();

	draw_time_axis(state, ctx);
	draw_edges(state, ctx, &screen);
	draw_nodes(state, ctx, &nodes);
}

fn draw_time_axis(state: &SceneState, ctx: &CanvasRenderingContext2d) {
	let points: Vec<Projected> = state
		.time_axis()
		.iter()
		.filter_map(|p| state.camera.project(*p, state.width, state.height))
		.collect();
	if points.len() < 2 {
		return;
	}
	ctx.set_stroke_style_str(AXIS_COLOR);
	ctx.set_line_width(1.0);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(6.0),
	));
	ctx.begin_path();
	ctx.move_to(points[0].x, points[0].y);
	for p in &points[1..] {
		ctx.line_to(p.x, p.y);
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edges(
	state: &SceneState,
	ctx: &CanvasRenderingContext2d,
	screen: &HashMap<DefaultNodeIdx, (Projected, f64)>,
) {
	let t = ease_out_cubic(state.hover.highlight_t);

	state.graph.visit_edges(|n1, n2, edge| {
		let (Some(&(a, ra)), Some(&(b, rb))) = (screen.get(&n1.index()), screen.get(&n2.index()))
		else {
			return;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < ra + rb + 0.5 {
			return;
		}

		let style = &edge.user_data.style;
		let is_highlighted = state.is_highlighted(n1.index()) && state.is_highlighted(n2.index());
		let (alpha, width) = if is_highlighted {
			(0.45 + 0.45 * t, style.width * (1.0 + 0.5 * t))
		} else {
			(0.45 - 0.35 * t, style.width)
		};
		// Thinner with distance from the camera.
		let depth_scale = ((a.scale + b.scale) / 2.0).clamp(0.4, 2.0);

		let (ux, uy) = (dx / dist, dy / dist);
		let arrow = style.arrow_length * depth_scale.min(1.2);
		let (sx, sy) = (a.x + ux * ra, a.y + uy * ra);
		let (tx, ty) = (b.x - ux * rb, b.y - uy * rb);

		ctx.set_stroke_style_str(&style.rgba(alpha));
		ctx.set_line_width(width * depth_scale);
		ctx.begin_path();
		ctx.move_to(sx, sy);
		ctx.line_to(tx - ux * arrow, ty - uy * arrow);
		ctx.stroke();

		if arrow > 0.0 {
			let (bx, by) = (tx - ux * arrow, ty - uy * arrow);
			let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
			ctx.set_fill_style_str(&style.rgba((alpha + 0.2).min(1.0)));
			ctx.begin_path();
			ctx.move_to(tx, ty);
			ctx.line_to(bx + px, by + py);
			ctx.line_to(bx - px, by - py);
			ctx.close_path();
			ctx.fill();
		}

		if style.particles > 0 {
			ctx.set_fill_style_str(&style.rgba((alpha + 0.35).min(1.0)));
			for i in 0..style.particles {
				let phase = (state.flow_time * style.particle_speed
					+ i as f64 / style.particles as f64)
					.fract();
				let (px, py) = (sx + (tx - sx) * phase, sy + (ty - sy) * phase);
				ctx.begin_path();
				let _ = ctx.arc(px, py, 1.6 * depth_scale, 0.0, 2.0 * PI);
				ctx.fill();
			}
		}
	});
}

fn draw_nodes(state: &SceneState, ctx: &CanvasRenderingContext2d, nodes: &[ScreenNode]) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
	);

	for node in nodes {
		let visual = &node.visual;
		let Projected { x, y, scale, .. } = node.at;
		let highlighted = has_highlight && state.is_highlighted(node.idx);
		let is_hovered = state.is_hovered(node.idx);
		let is_selected = state.selected == Some(node.idx);

		let (alpha, radius) = if !has_highlight || highlighted {
			let grow = if is_hovered { 0.35 } else if highlighted { 0.2 } else { 0.0 };
			(visual.opacity, node.radius * (1.0 + grow * t))
		} else {
			(visual.opacity * (1.0 - 0.7 * t), node.radius * (1.0 - 0.15 * t))
		};

		if highlighted && t > 0.01 {
			let glow_radius = radius * if is_hovered { 1.8 + 1.2 * t } else { 1.4 + 0.6 * t };
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let glow = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {glow})"));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", glow * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&visual.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		if is_selected || (is_hovered && t > 0.01) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 3.0, 0.0, 2.0 * PI);
			let ring = if is_selected { 0.9 } else { 0.7 * t };
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {ring})"));
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		let labelled =
			visual.always_labelled() || scale > LABEL_SCALE || is_selected || highlighted;
		if labelled && !visual.label.is_empty() {
			let label_alpha = if highlighted || is_selected { 1.0 } else { alpha * 0.8 };
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {label_alpha})"));
			ctx.set_font(&format!("{}px sans-serif", (11.0 * scale.sqrt()).clamp(9.0, 16.0)));
			let _ = ctx.fill_text(&visual.label, x + radius + 3.0, y + 3.0);
		}
	}
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::adapter::{CallbackCell, SceneCallbacks, SceneRenderer};
use super::render;
use super::scene::SceneState;
use super::types::{GraphDataset, GraphNode};
use crate::error::SceneError;

const FRAME_DT: f32 = 0.016;
const ZOOM_STEP: f64 = 1.1;

type Listener = Closure<dyn FnMut(MouseEvent)>;

/// Canvas-backed renderer handle: one 2D context, one animation loop and the
/// pointer listeners feeding the scene. Cursor styling is left to the
/// container, which follows the hover events emitted here.
pub struct CanvasScene {
	state: Rc<RefCell<SceneState>>,
	canvas: HtmlCanvasElement,
	hover: CallbackCell<Option<GraphNode>>,
	running: Rc<Cell<bool>>,
	frame: Rc<Cell<Option<i32>>>,
	animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
	listeners: Vec<(&'static str, Listener)>,
}

fn pointer(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn js_error(err: JsValue) -> SceneError {
	SceneError::Js(format!("{err:?}"))
}

impl CanvasScene {
	pub fn create(
		canvas: HtmlCanvasElement,
		width: f64,
		height: f64,
		callbacks: SceneCallbacks,
	) -> Result<Self, SceneError> {
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(js_error)?
			.ok_or(SceneError::NoContext)?
			.dyn_into()
			.map_err(|_| SceneError::NoContext)?;
		let window = web_sys::window().ok_or(SceneError::NoContext)?;

		canvas.set_width(width.max(1.0) as u32);
		canvas.set_height(height.max(1.0) as u32);

		let mut scene = Self {
			state: Rc::new(RefCell::new(SceneState::new(width, height))),
			canvas,
			hover: callbacks.hover.clone(),
			running: Rc::new(Cell::new(true)),
			frame: Rc::new(Cell::new(None)),
			animate: Rc::new(RefCell::new(None)),
			listeners: Vec::new(),
		};
		scene.install_listeners(&callbacks)?;

		let (state_anim, animate_inner, running, frame) = (
			scene.state.clone(),
			scene.animate.clone(),
			scene.running.clone(),
			scene.frame.clone(),
		);
		*scene.animate.borrow_mut() = Some(Closure::new(move || {
			if !running.get() {
				return;
			}
			if let Ok(mut s) = state_anim.try_borrow_mut() {
				s.tick(FRAME_DT);
				render::render(&s, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		let first = scene
			.animate
			.borrow()
			.as_ref()
			.map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
		scene.frame.set(first.transpose().map_err(js_error)?);

		log::info!("knowledge graph renderer created ({width}x{height})");
		Ok(scene)
	}

	fn install_listeners(&mut self, callbacks: &SceneCallbacks) -> Result<(), SceneError> {
		let (state, canvas) = (self.state.clone(), self.canvas.clone());
		let on_mousedown: Listener = Closure::new(move |ev: MouseEvent| {
			let (x, y) = pointer(&canvas, &ev);
			state.borrow_mut().begin_orbit(x, y);
		});

		let (state, canvas, hover) = (self.state.clone(), self.canvas.clone(), callbacks.hover.clone());
		let on_mousemove: Listener = Closure::new(move |ev: MouseEvent| {
			let (x, y) = pointer(&canvas, &ev);
			let changed = {
				let mut s = state.borrow_mut();
				if s.orbit.active {
					s.drag_orbit(x, y);
				}
				if s.orbit.moved {
					None
				} else {
					let hovered = s.node_at_position(x, y);
					(hovered != s.hover.node).then(|| {
						s.set_hover(hovered);
						hovered.and_then(|idx| s.node(idx).cloned())
					})
				}
			};
			if let Some(node) = changed {
				hover.emit(node);
			}
		});

		let (state, canvas, click) = (self.state.clone(), self.canvas.clone(), callbacks.click.clone());
		let on_mouseup: Listener = Closure::new(move |ev: MouseEvent| {
			let (x, y) = pointer(&canvas, &ev);
			let clicked: Option<GraphNode> = {
				let mut s = state.borrow_mut();
				if s.end_orbit() {
					s.node_at_position(x, y).and_then(|idx| s.node(idx).cloned())
				} else {
					None
				}
			};
			if let Some(node) = clicked {
				click.emit(node);
			}
		});

		let (state, hover) = (self.state.clone(), callbacks.hover.clone());
		let on_mouseleave: Listener = Closure::new(move |_: MouseEvent| {
			let was_hovering = {
				let mut s = state.borrow_mut();
				s.end_orbit();
				let was = s.hover.node.is_some();
				s.set_hover(None);
				was
			};
			if was_hovering {
				hover.emit(None);
			}
		});

		let state = self.state.clone();
		let on_wheel: Listener = Closure::new(move |ev: MouseEvent| {
			let Some(wheel) = ev.dyn_ref::<WheelEvent>() else {
				return;
			};
			wheel.prevent_default();
			let factor = if wheel.delta_y() > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
			state.borrow_mut().zoom_by(factor);
		});

		for (event, listener) in [
			("mousedown", on_mousedown),
			("mousemove", on_mousemove),
			("mouseup", on_mouseup),
			("mouseleave", on_mouseleave),
			("wheel", on_wheel),
		] {
			self.canvas
				.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
				.map_err(js_error)?;
			self.listeners.push((event, listener));
		}
		Ok(())
	}
}

impl SceneRenderer for CanvasScene {
	fn resize(&mut self, width: f64, height: f64) {
		self.canvas.set_width(width.max(1.0) as u32);
		self.canvas.set_height(height.max(1.0) as u32);
		self.state.borrow_mut().resize(width, height);
	}

	fn set_graph(&mut self, data: &GraphDataset) {
		let released = {
			let mut s = self.state.borrow_mut();
			let released = s.set_graph(data);
			log::debug!("scene holds {} nodes, {} edges", s.node_count(), s.edge_count());
			released
		};
		if released {
			self.hover.emit(None);
		}
	}

	fn zoom_to_fit(&mut self, duration_ms: u32) {
		self.state.borrow_mut().zoom_to_fit(duration_ms as f64 / 1000.0);
	}

	fn highlight(&mut self, node_id: Option<&str>) {
		self.state.borrow_mut().set_selected(node_id);
	}

	fn destroy(&mut self) {
		self.running.set(false);
		if let (Some(id), Some(win)) = (self.frame.take(), web_sys::window()) {
			let _ = win.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		for (event, listener) in self.listeners.drain(..) {
			let _ = self
				.canvas
				.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
		}
	}
}

impl Drop for CanvasScene {
	fn drop(&mut self) {
		self.destroy();
	}
}

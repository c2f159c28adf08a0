//! Lifecycle owner for the single live renderer handle.
//!
//! The handle is created once per mounted canvas, receives every filtered
//! dataset as a full replacement, follows container size changes in place and
//! is torn down explicitly when the view unmounts. Nothing outside
//! [`RenderAdapter`] touches the handle.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::types::{GraphDataset, GraphNode};

/// Imperative surface of a renderer bound to one canvas.
pub trait SceneRenderer {
	fn resize(&mut self, width: f64, height: f64);
	/// Replaces every node and edge. Node positions are authoritative.
	fn set_graph(&mut self, data: &GraphDataset);
	fn zoom_to_fit(&mut self, duration_ms: u32);
	fn highlight(&mut self, node_id: Option<&str>);
	/// Releases the rendering context, animation loop and listeners.
	fn destroy(&mut self);
}

/// Identifies the data push a deferred fit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitTicket(u64);

pub struct RenderAdapter<R: SceneRenderer> {
	handle: Option<R>,
	data: Arc<GraphDataset>,
	size: (f64, f64),
	selected: Option<String>,
	pushes: u64,
}

impl<R: SceneRenderer> Default for RenderAdapter<R> {
	fn default() -> Self {
		Self {
			handle: None,
			data: Arc::default(),
			size: (0.0, 0.0),
			selected: None,
			pushes: 0,
		}
	}
}

impl<R: SceneRenderer> RenderAdapter<R> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_mounted(&self) -> bool {
		self.handle.is_some()
	}

	/// Binds a freshly created handle and brings it up to date. A handle that
	/// was already bound is destroyed first.
	pub fn mount(&mut self, mut handle: R) -> FitTicket {
		self.unmount();
		let (width, height) = self.size;
		handle.resize(width, height);
		handle.set_graph(&self.data);
		handle.highlight(self.selected.as_deref());
		self.handle = Some(handle);
		self.next_ticket()
	}

	pub fn unmount(&mut self) {
		if let Some(mut handle) = self.handle.take() {
			handle.destroy();
			log::info!("knowledge graph renderer destroyed");
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		if self.size == (width, height) {
			return;
		}
		self.size = (width, height);
		if let Some(handle) = self.handle.as_mut() {
			handle.resize(width, height);
		}
	}

	/// Pushes a dataset as a full replacement. Pushing the same dataset again
	/// is a no-op and returns `None`.
	pub fn push(&mut self, data: Arc<GraphDataset>) -> Option<FitTicket> {
		if Arc::ptr_eq(&self.data, &data) {
			return None;
		}
		self.data = data;
		if let Some(handle) = self.handle.as_mut() {
			handle.set_graph(&self.data);
			handle.highlight(self.selected.as_deref());
		}
		Some(self.next_ticket())
	}

	pub fn select(&mut self, node_id: Option<&str>) {
		if self.selected.as_deref() == node_id {
			return;
		}
		self.selected = node_id.map(str::to_owned);
		if let Some(handle) = self.handle.as_mut() {
			handle.highlight(node_id);
		}
	}

	/// Frames the scene if `ticket` still belongs to the latest push.
	pub fn fit(&mut self, ticket: FitTicket, duration_ms: u32) -> bool {
		if ticket != FitTicket(self.pushes) {
			log::debug!("skipping superseded fit {ticket:?}");
			return false;
		}
		match self.handle.as_mut() {
			Some(handle) => {
				handle.zoom_to_fit(duration_ms);
				true
			}
			None => false,
		}
	}

	fn next_ticket(&mut self) -> FitTicket {
		self.pushes += 1;
		FitTicket(self.pushes)
	}
}

impl<R: SceneRenderer> Drop for RenderAdapter<R> {
	fn drop(&mut self) {
		self.unmount();
	}
}

/// Shared slot holding the latest callback, so listeners installed once on
/// the renderer always reach the current handler.
pub struct CallbackCell<T>(Rc<RefCell<Option<Rc<dyn Fn(T)>>>>);

impl<T> Clone for CallbackCell<T> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<T> Default for CallbackCell<T> {
	fn default() -> Self {
		Self(Rc::new(RefCell::new(None)))
	}
}

impl<T> CallbackCell<T> {
	pub fn set(&self, f: impl Fn(T) + 'static) {
		*self.0.borrow_mut() = Some(Rc::new(f));
	}

	pub fn clear(&self) {
		self.0.borrow_mut().take();
	}

	pub fn emit(&self, value: T) {
		// Release the borrow before calling out; the handler may call `set`.
		let current = self.0.borrow().clone();
		if let Some(f) = current {
			f(value);
		}
	}
}

#[derive(Clone, Default)]
pub struct SceneCallbacks {
	pub click: CallbackCell<GraphNode>,
	pub hover: CallbackCell<Option<GraphNode>>,
}

impl SceneCallbacks {
	pub fn clear(&self) {
		self.click.clear();
		self.hover.clear();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	enum Call {
		Resize(f64, f64),
		SetGraph(usize),
		Fit(u32),
		Highlight(Option<String>),
		Destroy(u32),
	}

	struct FakeRenderer {
		id: u32,
		log: Rc<RefCell<Vec<Call>>>,
	}

	impl SceneRenderer for FakeRenderer {
		fn resize(&mut self, width: f64, height: f64) {
			self.log.borrow_mut().push(Call::Resize(width, height));
		}

		fn set_graph(&mut self, data: &GraphDataset) {
			self.log.borrow_mut().push(Call::SetGraph(data.nodes.len()));
		}

		fn zoom_to_fit(&mut self, duration_ms: u32) {
			self.log.borrow_mut().push(Call::Fit(duration_ms));
		}

		fn highlight(&mut self, node_id: Option<&str>) {
			self.log
				.borrow_mut()
				.push(Call::Highlight(node_id.map(str::to_owned)));
		}

		fn destroy(&mut self) {
			self.log.borrow_mut().push(Call::Destroy(self.id));
		}
	}

	fn dataset(nodes: usize) -> Arc<GraphDataset> {
		let nodes = (0..nodes)
			.map(|i| serde_json::from_value(serde_json::json!({ "id": format!("n{i}"), "nodeType": "Skill" })))
			.collect::<Result<Vec<_>, _>>()
			.unwrap();
		Arc::new(GraphDataset {
			nodes,
			..GraphDataset::default()
		})
	}

	fn fake(id: u32, log: &Rc<RefCell<Vec<Call>>>) -> FakeRenderer {
		FakeRenderer {
			id,
			log: Rc::clone(log),
		}
	}

	#[test]
	fn mount_applies_latest_state() {
		let log = Rc::default();
		let mut adapter = RenderAdapter::<FakeRenderer>::new();
		adapter.resize(640.0, 480.0);
		adapter.push(dataset(3));
		adapter.select(Some("n1"));
		adapter.mount(fake(1, &log));
		assert_eq!(
			*log.borrow(),
			vec![
				Call::Resize(640.0, 480.0),
				Call::SetGraph(3),
				Call::Highlight(Some("n1".into())),
			]
		);
	}

	#[test]
	fn resize_updates_without_recreating() {
		let log = Rc::default();
		let mut adapter = RenderAdapter::<FakeRenderer>::new();
		adapter.mount(fake(1, &log));
		log.borrow_mut().clear();

		adapter.resize(800.0, 600.0);
		adapter.resize(800.0, 600.0);
		assert_eq!(*log.borrow(), vec![Call::Resize(800.0, 600.0)]);
		assert!(adapter.is_mounted());
	}

	#[test]
	fn each_push_is_a_full_replacement() {
		let log = Rc::default();
		let mut adapter = RenderAdapter::<FakeRenderer>::new();
		adapter.mount(fake(1, &log));
		log.borrow_mut().clear();

		let data = dataset(4);
		assert!(adapter.push(Arc::clone(&data)).is_some());
		assert!(adapter.push(data).is_none());
		adapter.push(dataset(2));
		let pushes: Vec<Call> = log
			.borrow()
			.iter()
			.filter(|c| matches!(c, Call::SetGraph(_)))
			.cloned()
			.collect();
		assert_eq!(pushes, vec![Call::SetGraph(4), Call::SetGraph(2)]);
	}

	#[test]
	fn only_the_latest_fit_runs() {
		let log = Rc::default();
		let mut adapter = RenderAdapter::<FakeRenderer>::new();
		adapter.mount(fake(1, &log));
		let first = adapter.push(dataset(1)).unwrap();
		let second = adapter.push(dataset(2)).unwrap();
		assert!(!adapter.fit(first, 800));
		assert!(adapter.fit(second, 800));
		assert_eq!(log.borrow().last(), Some(&Call::Fit(800)));
	}

	#[test]
	fn remount_and_drop_destroy_handles() {
		let log = Rc::default();
		{
			let mut adapter = RenderAdapter::<FakeRenderer>::new();
			adapter.mount(fake(1, &log));
			adapter.mount(fake(2, &log));
			assert!(log.borrow().contains(&Call::Destroy(1)));
			assert!(!log.borrow().contains(&Call::Destroy(2)));
		}
		assert!(log.borrow().contains(&Call::Destroy(2)));
	}

	#[test]
	fn unmount_is_idempotent() {
		let log = Rc::default();
		let mut adapter = RenderAdapter::<FakeRenderer>::new();
		adapter.mount(fake(7, &log));
		adapter.unmount();
		adapter.unmount();
		drop(adapter);
		let destroys = log
			.borrow()
			.iter()
			.filter(|c| matches!(c, Call::Destroy(_)))
			.count();
		assert_eq!(destroys, 1);
	}

	#[test]
	fn callback_cell_dispatches_to_latest_handler() {
		let cell: CallbackCell<u32> = CallbackCell::default();
		let seen = Rc::new(Cell::new(0));
		let listener = cell.clone();

		let s = Rc::clone(&seen);
		cell.set(move |v| s.set(v));
		listener.emit(1);
		assert_eq!(seen.get(), 1);

		let s = Rc::clone(&seen);
		cell.set(move |v| s.set(v * 10));
		listener.emit(2);
		assert_eq!(seen.get(), 20);

		cell.clear();
		listener.emit(3);
		assert_eq!(seen.get(), 20);
	}

	#[test]
	fn handler_may_rebind_while_running() {
		let cell: CallbackCell<()> = CallbackCell::default();
		let inner = cell.clone();
		cell.set(move |()| inner.set(|()| {}));
		cell.emit(());
		cell.emit(());
	}
}

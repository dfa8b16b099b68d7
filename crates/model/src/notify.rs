//! Listener bookkeeping shared by [`Record`] and [`Collection`].
//!
//! [`Record`]: crate::record::Record
//! [`Collection`]: crate::collection::Collection

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hindsight_engine::{MutationEvent, MutationListener, ObserverId};
use rustc_hash::FxHashMap;

/// A set of wildcard mutation listeners.
///
/// Delivery order across listeners is unspecified. Emission iterates a
/// snapshot, so a listener may subscribe or unsubscribe re-entrantly
/// without disturbing the dispatch in flight.
#[derive(Default)]
pub struct ObserverSet {
	next: Cell<u64>,
	listeners: RefCell<FxHashMap<u64, MutationListener>>,
}

impl ObserverSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn subscribe(&self, listener: MutationListener) -> ObserverId {
		let id = self.next.get();
		self.next.set(id + 1);
		self.listeners.borrow_mut().insert(id, listener);
		ObserverId(id)
	}

	/// Removes a subscription. Returns `false` for unknown ids.
	pub fn unsubscribe(&self, id: ObserverId) -> bool {
		self.listeners.borrow_mut().remove(&id.0).is_some()
	}

	pub fn emit(&self, event: &MutationEvent) {
		let snapshot: Vec<MutationListener> =
			self.listeners.borrow().values().map(Rc::clone).collect();
		for listener in snapshot {
			listener(event);
		}
	}

	pub fn len(&self) -> usize {
		self.listeners.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.borrow().is_empty()
	}
}

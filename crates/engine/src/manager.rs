//! Public façade binding observed objects to a history stack.
//!
//! ```text
//! observed object          HistoryManager              HistoryStack
//! ┌──────────────┐  event  ┌───────────────────┐      ┌─────────────┐
//! │ Record /     │────────►│ listener closure  │─────►│ capture     │
//! │ Collection / │         │ (types + stack)   │      │ undo / redo │
//! │ custom       │◄────────│ replay handlers   │◄─────│             │
//! └──────────────┘ mutate  └───────────────────┘      └─────────────┘
//! ```
//!
//! A manager owns exactly one stack reference at a time. Several managers
//! can share one stack after a [`merge`](HistoryManager::merge): each keeps
//! its own bound objects and its own undo-type overrides, but they append
//! to and navigate one combined timeline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::cycle::CycleClock;
use crate::defer::TurnScheduler;
use crate::objects::ObjectRegistry;
use crate::observe::{MutationListener, Trackable};
use crate::stack::HistoryStack;
use crate::types::{HandlerPatch, TypeRegistry, UndoHandlers};

/// Manager-level notification emitted after a successful undo or redo.
///
/// Fired exactly once per call, no matter how many actions the batch
/// replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
	Undo,
	Redo,
}

/// Handle for a manager-level event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryListenerId(u64);

/// Binds observed objects to a history stack and exposes undo/redo.
pub struct HistoryManager {
	/// Swapped wholesale by merge; never mutated in place.
	stack: RefCell<Rc<HistoryStack>>,
	types: Rc<TypeRegistry>,
	bound: RefCell<ObjectRegistry>,
	listeners: RefCell<Vec<(HistoryListenerId, Rc<dyn Fn(HistoryEvent)>)>>,
	next_listener: Cell<u64>,
}

impl HistoryManager {
	/// Creates a manager with its own empty stack, closing batches through
	/// `scheduler`. Tracking starts disabled.
	pub fn new(scheduler: Rc<dyn TurnScheduler>) -> Self {
		let clock = CycleClock::new(scheduler);
		Self::with_stack(Rc::new(HistoryStack::new(clock)))
	}

	/// Creates a manager writing into an existing (possibly shared) stack.
	pub fn with_stack(stack: Rc<HistoryStack>) -> Self {
		Self {
			stack: RefCell::new(stack),
			types: Rc::new(TypeRegistry::new()),
			bound: RefCell::new(ObjectRegistry::new()),
			listeners: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
		}
	}

	/// The stack this manager currently writes into.
	pub fn stack(&self) -> Rc<HistoryStack> {
		self.stack.borrow().clone()
	}

	/// Enables capture on the current stack.
	pub fn start_tracking(&self) {
		self.stack.borrow().set_tracking(true);
	}

	/// Disables capture on the current stack.
	pub fn stop_tracking(&self) {
		self.stack.borrow().set_tracking(false);
	}

	pub fn is_tracking(&self) -> bool {
		self.stack.borrow().is_tracking()
	}

	/// Binds `object`'s wildcard mutation notification to this manager's
	/// capture path.
	///
	/// Returns `false` without side effects if the object is already
	/// registered here or declines observation.
	pub fn register(&self, object: Rc<dyn Trackable>) -> bool {
		if self.bound.borrow().is_registered(&object) {
			tracing::trace!("register skipped: already bound");
			return false;
		}
		let Some(observer) = object.observe(self.make_listener()) else {
			tracing::debug!("register skipped: object declines observation");
			return false;
		};
		self.bound.borrow_mut().insert(&object, observer);
		true
	}

	/// Registers each object in turn.
	pub fn register_all<I>(&self, objects: I)
	where
		I: IntoIterator<Item = Rc<dyn Trackable>>,
	{
		for object in objects {
			self.register(object);
		}
	}

	/// Reverses a binding. Returns `false` if the object was not bound.
	/// Prior actions referencing the object remain replayable while the
	/// object is alive.
	pub fn unregister(&self, object: Rc<dyn Trackable>) -> bool {
		let Some(binding) = self.bound.borrow_mut().remove(&object) else {
			return false;
		};
		object.unobserve(binding.observer);
		true
	}

	/// Unbinds every registered object.
	pub fn unregister_all(&self) {
		for binding in self.bound.borrow_mut().drain() {
			if let Some(object) = binding.object.upgrade() {
				object.unobserve(binding.observer);
			}
		}
	}

	/// Number of currently bound objects.
	pub fn registered_len(&self) -> usize {
		self.bound.borrow().len()
	}

	/// Undoes the most recent batch on the current stack, replaying
	/// through this manager's effective undo types. Notifies listeners
	/// once on success.
	pub fn undo(&self) -> bool {
		let stack = self.stack();
		let performed = stack.undo(&self.types);
		if performed {
			self.emit(HistoryEvent::Undo);
		}
		performed
	}

	/// Redoes the next batch. Notifies listeners once on success.
	pub fn redo(&self) -> bool {
		let stack = self.stack();
		let performed = stack.redo(&self.types);
		if performed {
			self.emit(HistoryEvent::Redo);
		}
		performed
	}

	pub fn can_undo(&self) -> bool {
		self.stack.borrow().can_undo()
	}

	pub fn can_redo(&self) -> bool {
		self.stack.borrow().can_redo()
	}

	/// The current stack's length cap.
	pub fn limit(&self) -> Option<usize> {
		self.stack.borrow().limit()
	}

	/// Caps the current stack's length.
	pub fn set_limit(&self, limit: Option<usize>) {
		self.stack.borrow().set_limit(limit);
	}

	/// Drops all history on the current stack.
	pub fn clear(&self) {
		self.stack.borrow().clear();
	}

	/// Redirects this manager's future captures onto `other`'s stack.
	///
	/// Every bound object is unbound from the current stack, the stack
	/// reference (and with it the batch clock) is swapped for `other`'s,
	/// and the same objects are re-bound against it. One-directional:
	/// `other` is not modified.
	pub fn merge(&self, other: &HistoryManager) {
		let bindings = self.bound.borrow_mut().drain();
		for binding in &bindings {
			if let Some(object) = binding.object.upgrade() {
				object.unobserve(binding.observer);
			}
		}

		*self.stack.borrow_mut() = other.stack();

		let mut rebound = 0;
		for binding in bindings {
			if let Some(object) = binding.object.upgrade() {
				self.register(object);
				rebound += 1;
			}
		}
		tracing::trace!(rebound, "manager.merge: stack adopted");
	}

	/// Subscribes to manager-level undo/redo notifications.
	pub fn on_history(&self, listener: impl Fn(HistoryEvent) + 'static) -> HistoryListenerId {
		let id = HistoryListenerId(self.next_listener.get());
		self.next_listener.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, Rc::new(listener)));
		id
	}

	/// Removes a manager-level listener. Unknown ids are ignored.
	pub fn off_history(&self, id: HistoryListenerId) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(listener_id, _)| *listener_id != id);
		listeners.len() != before
	}

	/// Registers (or overwrites) an undo type on this manager alone.
	pub fn add_undo_type(&self, kind: impl Into<Box<str>>, handlers: UndoHandlers) {
		self.types.add(kind, handlers);
	}

	/// Registers several undo types on this manager alone.
	pub fn add_undo_types<K, I>(&self, entries: I)
	where
		K: Into<Box<str>>,
		I: IntoIterator<Item = (K, UndoHandlers)>,
	{
		self.types.add_many(entries);
	}

	/// Patches the undo type `kind` currently resolves to for this
	/// manager. Ignored for unknown kinds.
	pub fn change_undo_type(&self, kind: &str, patch: &HandlerPatch) -> bool {
		self.types.change(kind, patch)
	}

	/// Applies several patches.
	pub fn change_undo_types<'a, I>(&self, entries: I)
	where
		I: IntoIterator<Item = (&'a str, HandlerPatch)>,
	{
		self.types.change_many(entries);
	}

	/// Drops this manager's override for `kind`, revealing the shared
	/// default again.
	pub fn remove_undo_type(&self, kind: &str) -> bool {
		self.types.remove(kind)
	}

	/// Drops each named override.
	pub fn remove_undo_types<I, S>(&self, kinds: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.types.remove_many(kinds);
	}

	/// Registers an undo type in the shared default table, visible to
	/// every manager without its own override for `kind`. Equivalent to
	/// [`defaults::add`](crate::types::defaults::add).
	pub fn add_default_undo_type(kind: impl Into<Box<str>>, handlers: UndoHandlers) {
		crate::types::defaults::add(kind, handlers);
	}

	/// Patches a shared default. Equivalent to
	/// [`defaults::change`](crate::types::defaults::change).
	pub fn change_default_undo_type(kind: &str, patch: &HandlerPatch) -> bool {
		crate::types::defaults::change(kind, patch)
	}

	/// Deletes a shared default. Equivalent to
	/// [`defaults::remove`](crate::types::defaults::remove).
	pub fn remove_default_undo_type(kind: &str) -> bool {
		crate::types::defaults::remove(kind)
	}

	fn make_listener(&self) -> MutationListener {
		let stack = self.stack();
		let types = Rc::clone(&self.types);
		Rc::new(move |event| stack.capture(event, &types))
	}

	fn emit(&self, event: HistoryEvent) {
		let listeners: Vec<_> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in listeners {
			listener(event);
		}
	}
}

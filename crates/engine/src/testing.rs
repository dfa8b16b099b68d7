//! Shared test doubles for the engine's own tests.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::action::CapturedChange;
use crate::observe::{MutationEvent, MutationListener, ObserverId, Trackable};
use crate::types::UndoHandlers;

/// Arguments every [`TestObject`] notification carries.
pub struct TestArgs {
	pub object: Rc<TestObject>,
	pub value: i64,
}

/// Minimal observed object: announces whatever the test tells it to.
pub struct TestObject {
	weak: Weak<TestObject>,
	id: Option<Box<str>>,
	observable: bool,
	next: Cell<u64>,
	listeners: RefCell<Vec<(ObserverId, MutationListener)>>,
}

impl TestObject {
	pub fn new() -> Rc<Self> {
		Self::build(None, true)
	}

	pub fn with_id(id: &str) -> Rc<Self> {
		Self::build(Some(id.into()), true)
	}

	/// An object that declines observation entirely.
	pub fn silent() -> Rc<Self> {
		Self::build(None, false)
	}

	fn build(id: Option<Box<str>>, observable: bool) -> Rc<Self> {
		Rc::new_cyclic(|weak| Self {
			weak: weak.clone(),
			id,
			observable,
			next: Cell::new(0),
			listeners: RefCell::new(Vec::new()),
		})
	}

	/// Announces a mutation of the given kind to every listener.
	pub fn emit(&self, kind: &str, value: i64) {
		let Some(object) = self.weak.upgrade() else {
			return;
		};
		let event = MutationEvent::new(kind, Rc::new(TestArgs { object, value }));
		let listeners: Vec<MutationListener> = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();
		for listener in listeners {
			listener(&event);
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}
}

impl Trackable for TestObject {
	fn stable_id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	fn observe(&self, listener: MutationListener) -> Option<ObserverId> {
		if !self.observable {
			return None;
		}
		let id = ObserverId(self.next.get());
		self.next.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, listener));
		Some(id)
	}

	fn unobserve(&self, id: ObserverId) {
		self.listeners
			.borrow_mut()
			.retain(|(listener_id, _)| *listener_id != id);
	}

	fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

/// Handlers whose capture records the emitting object and value, and whose
/// replay appends `"undo:<tag>:<value>"` / `"redo:<tag>:<value>"` to `log`.
pub fn recording_handlers(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> UndoHandlers {
	let undo_log = Rc::clone(log);
	let redo_log = Rc::clone(log);
	UndoHandlers {
		capture: Rc::new(|event| {
			let args = event.args().downcast_ref::<TestArgs>()?;
			Some(CapturedChange {
				target: args.object.clone(),
				before: Rc::new(args.value - 1),
				after: Rc::new(args.value),
			})
		}),
		undo: Rc::new(move |_target, _before, after, _action| {
			let value = after.downcast_ref::<i64>().copied().unwrap_or_default();
			undo_log.borrow_mut().push(format!("undo:{tag}:{value}"));
		}),
		redo: Rc::new(move |_target, _before, after, _action| {
			let value = after.downcast_ref::<i64>().copied().unwrap_or_default();
			redo_log.borrow_mut().push(format!("redo:{tag}:{value}"));
		}),
	}
}

thread_local! {
	static LAST_TAG: RefCell<String> = RefCell::new(String::new());
}

/// Handlers distinguishable by which undo handler last ran.
pub fn tagged_handlers(tag: &'static str) -> UndoHandlers {
	UndoHandlers {
		capture: Rc::new(|_event| None),
		undo: Rc::new(move |_target, _before, _after, _action| {
			LAST_TAG.with(|last| *last.borrow_mut() = tag.to_owned());
		}),
		redo: Rc::new(|_target, _before, _after, _action| {}),
	}
}

/// Invokes the triple's undo handler and reports which tag it carries.
pub fn undo_tag(handlers: &UndoHandlers) -> String {
	let object: Rc<dyn Trackable> = TestObject::new();
	let payload: crate::action::Payload = Rc::new(());
	let action = crate::action::Action::new(
		"probe",
		CapturedChange {
			target: object.clone(),
			before: payload.clone(),
			after: payload.clone(),
		},
		0,
	);
	(handlers.undo)(&object, &payload, &payload, &action);
	LAST_TAG.with(|last| last.borrow().clone())
}

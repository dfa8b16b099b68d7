//! Observable keyed record.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hindsight_engine::{MutationEvent, MutationListener, ObserverId, Trackable};
use serde_json::{Map, Value};

use crate::events::{FieldChangeArgs, kind};
use crate::notify::ObserverSet;

/// A bag of named field values with change notification.
///
/// Records are always handled through `Rc`; constructors return the
/// handle directly. Every effective field mutation announces a
/// [`kind::FIELD_CHANGE`] event carrying the old and new values — setting
/// a field to its current value announces nothing.
pub struct Record {
	weak: Weak<Record>,
	stable: Option<Box<str>>,
	fields: RefCell<Map<String, Value>>,
	observers: ObserverSet,
}

impl Record {
	/// Creates an empty record keyed by reference identity.
	pub fn new() -> Rc<Self> {
		Self::build(None, Map::new())
	}

	/// Creates an empty record with a stable identity token.
	pub fn with_id(id: impl Into<Box<str>>) -> Rc<Self> {
		Self::build(Some(id.into()), Map::new())
	}

	/// Creates a record from existing fields, without notifications.
	pub fn from_fields(fields: Map<String, Value>) -> Rc<Self> {
		Self::build(None, fields)
	}

	fn build(stable: Option<Box<str>>, fields: Map<String, Value>) -> Rc<Self> {
		Rc::new_cyclic(|weak| Self {
			weak: weak.clone(),
			stable,
			fields: RefCell::new(fields),
			observers: ObserverSet::new(),
		})
	}

	/// The stable identity token, if any.
	pub fn id(&self) -> Option<&str> {
		self.stable.as_deref()
	}

	pub fn get(&self, field: &str) -> Option<Value> {
		self.fields.borrow().get(field).cloned()
	}

	pub fn contains(&self, field: &str) -> bool {
		self.fields.borrow().contains_key(field)
	}

	/// Sets `field` to `value`, announcing the change.
	///
	/// Returns `false` (announcing nothing) if the field already holds an
	/// equal value.
	pub fn set(&self, field: &str, value: impl Into<Value>) -> bool {
		let value = value.into();
		let old = {
			let mut fields = self.fields.borrow_mut();
			let old = fields.get(field).cloned();
			if old.as_ref() == Some(&value) {
				return false;
			}
			fields.insert(field.to_owned(), value.clone());
			old
		};
		self.announce(field, old, Some(value));
		true
	}

	/// Removes `field`, announcing the change. Returns `false` if the
	/// field was absent.
	pub fn unset(&self, field: &str) -> bool {
		let old = self.fields.borrow_mut().remove(field);
		let Some(old) = old else {
			return false;
		};
		self.announce(field, Some(old), None);
		true
	}

	/// Snapshot of all fields.
	pub fn fields(&self) -> Map<String, Value> {
		self.fields.borrow().clone()
	}

	/// The record as a JSON object.
	pub fn to_value(&self) -> Value {
		Value::Object(self.fields.borrow().clone())
	}

	fn announce(&self, field: &str, old: Option<Value>, new: Option<Value>) {
		let Some(record) = self.weak.upgrade() else {
			return;
		};
		let event = MutationEvent::new(
			kind::FIELD_CHANGE,
			Rc::new(FieldChangeArgs {
				record,
				field: field.into(),
				old,
				new,
			}),
		);
		self.observers.emit(&event);
	}
}

impl Trackable for Record {
	fn stable_id(&self) -> Option<&str> {
		self.stable.as_deref()
	}

	fn observe(&self, listener: MutationListener) -> Option<ObserverId> {
		Some(self.observers.subscribe(listener))
	}

	fn unobserve(&self, id: ObserverId) {
		self.observers.unsubscribe(id);
	}

	fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
		self
	}
}

//! Observable ordered collection of records.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use hindsight_engine::{MutationEvent, MutationListener, ObserverId, Trackable};

use crate::error::ModelError;
use crate::events::{InsertArgs, RemoveArgs, ResetArgs, kind};
use crate::notify::ObserverSet;
use crate::record::Record;

/// An ordered sequence of records with mutation notification.
///
/// Membership is reference identity: the same `Rc<Record>` cannot be
/// located twice, and removal finds the record by pointer, never by
/// field equality. Every native mutation — including one performed by an
/// undo/redo handler — announces the corresponding wildcard event; the
/// history stack's replay guard is what keeps those replays out of the
/// recorded timeline.
pub struct Collection {
	weak: Weak<Collection>,
	stable: Option<Box<str>>,
	items: RefCell<Vec<Rc<Record>>>,
	observers: ObserverSet,
}

impl Collection {
	/// Creates an empty collection keyed by reference identity.
	pub fn new() -> Rc<Self> {
		Self::build(None)
	}

	/// Creates an empty collection with a stable identity token.
	pub fn with_id(id: impl Into<Box<str>>) -> Rc<Self> {
		Self::build(Some(id.into()))
	}

	fn build(stable: Option<Box<str>>) -> Rc<Self> {
		Rc::new_cyclic(|weak| Self {
			weak: weak.clone(),
			stable,
			items: RefCell::new(Vec::new()),
			observers: ObserverSet::new(),
		})
	}

	/// The stable identity token, if any.
	pub fn id(&self) -> Option<&str> {
		self.stable.as_deref()
	}

	pub fn len(&self) -> usize {
		self.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.borrow().is_empty()
	}

	pub fn get(&self, index: usize) -> Option<Rc<Record>> {
		self.items.borrow().get(index).cloned()
	}

	/// Snapshot of the current contents.
	pub fn items(&self) -> Vec<Rc<Record>> {
		self.items.borrow().clone()
	}

	/// Position of `record` by reference identity.
	pub fn position(&self, record: &Rc<Record>) -> Option<usize> {
		self.items
			.borrow()
			.iter()
			.position(|item| Rc::ptr_eq(item, record))
	}

	pub fn contains(&self, record: &Rc<Record>) -> bool {
		self.position(record).is_some()
	}

	/// Appends `record`, announcing an [`kind::INSERT`].
	pub fn insert(&self, record: Rc<Record>) {
		let index = {
			let mut items = self.items.borrow_mut();
			items.push(record.clone());
			items.len() - 1
		};
		self.announce_insert(record, index);
	}

	/// Inserts `record` at `index`, announcing an [`kind::INSERT`].
	pub fn insert_at(&self, index: usize, record: Rc<Record>) -> Result<(), ModelError> {
		{
			let mut items = self.items.borrow_mut();
			if index > items.len() {
				return Err(ModelError::IndexOutOfRange {
					index,
					len: items.len(),
				});
			}
			items.insert(index, record.clone());
		}
		self.announce_insert(record, index);
		Ok(())
	}

	/// Removes `record` by reference identity, announcing a
	/// [`kind::REMOVE`]. Returns the vacated index, or `None` if the
	/// record was not present.
	pub fn remove(&self, record: &Rc<Record>) -> Option<usize> {
		let index = {
			let mut items = self.items.borrow_mut();
			let index = items.iter().position(|item| Rc::ptr_eq(item, record))?;
			items.remove(index);
			index
		};
		self.announce_remove(record.clone(), index);
		Some(index)
	}

	/// Replaces the whole contents, announcing a [`kind::RESET`].
	/// Returns the previous contents.
	pub fn reset(&self, items: Vec<Rc<Record>>) -> Vec<Rc<Record>> {
		let before = std::mem::replace(&mut *self.items.borrow_mut(), items.clone());
		if let Some(collection) = self.weak.upgrade() {
			let event = MutationEvent::new(
				kind::RESET,
				Rc::new(ResetArgs {
					collection,
					before: before.clone(),
					after: items,
				}),
			);
			self.observers.emit(&event);
		}
		before
	}

	fn announce_insert(&self, record: Rc<Record>, index: usize) {
		let Some(collection) = self.weak.upgrade() else {
			return;
		};
		let event = MutationEvent::new(
			kind::INSERT,
			Rc::new(InsertArgs {
				collection,
				record,
				index,
			}),
		);
		self.observers.emit(&event);
	}

	fn announce_remove(&self, record: Rc<Record>, index: usize) {
		let Some(collection) = self.weak.upgrade() else {
			return;
		};
		let event = MutationEvent::new(
			kind::REMOVE,
			Rc::new(RemoveArgs {
				collection,
				record,
				index,
			}),
		);
		self.observers.emit(&event);
	}
}

impl Trackable for Collection {
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

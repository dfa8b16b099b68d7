//! Bound-object bookkeeping.

use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::observe::{ObserverId, Trackable};

/// Registry key for a bound object: the stable identity token when the
/// object exposes one, else its reference identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindKey {
	Stable(Box<str>),
	Identity(usize),
}

impl BindKey {
	/// Derives the key for `object`.
	pub fn for_object(object: &Rc<dyn Trackable>) -> Self {
		match object.stable_id() {
			Some(id) => Self::Stable(id.into()),
			None => Self::Identity(Rc::as_ptr(object) as *const () as usize),
		}
	}
}

/// One live listener binding.
pub struct Binding {
	/// The bound object; the registry never keeps it alive.
	pub object: Weak<dyn Trackable>,
	/// Subscription handle needed to unbind.
	pub observer: ObserverId,
}

/// Set of currently bound objects.
///
/// Exists to prevent binding the same listener twice to one object and to
/// support clean re-registration during a merge. Registering a present
/// object and unregistering an absent one are both no-ops.
#[derive(Default)]
pub struct ObjectRegistry {
	bound: FxHashMap<BindKey, Binding>,
}

impl ObjectRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if `object` is currently bound.
	pub fn is_registered(&self, object: &Rc<dyn Trackable>) -> bool {
		self.bound.contains_key(&BindKey::for_object(object))
	}

	/// Records a binding. Returns `false` (keeping the existing binding)
	/// if the object is already bound.
	pub fn insert(&mut self, object: &Rc<dyn Trackable>, observer: ObserverId) -> bool {
		let key = BindKey::for_object(object);
		if self.bound.contains_key(&key) {
			return false;
		}
		self.bound.insert(
			key,
			Binding {
				object: Rc::downgrade(object),
				observer,
			},
		);
		true
	}

	/// Removes and returns the binding for `object`, if any.
	pub fn remove(&mut self, object: &Rc<dyn Trackable>) -> Option<Binding> {
		self.bound.remove(&BindKey::for_object(object))
	}

	/// Removes and returns every binding. Used when a merge moves this
	/// registry's objects onto another stack.
	pub fn drain(&mut self) -> Vec<Binding> {
		self.bound.drain().map(|(_, binding)| binding).collect()
	}

	/// Currently bound objects that are still alive.
	pub fn objects(&self) -> Vec<Rc<dyn Trackable>> {
		self.bound
			.values()
			.filter_map(|binding| binding.object.upgrade())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.bound.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bound.is_empty()
	}
}

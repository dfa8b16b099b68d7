//! Capability interface for observed objects.
//!
//! The engine never inspects the objects it tracks; it only requires that
//! they can announce "a mutation happened" to a subscribed listener. That
//! requirement is an explicit trait here rather than a structural check:
//! an object either implements [`Trackable`] or it cannot be registered.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Identifier for one listener subscription on an observed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// A wildcard mutation notification.
///
/// `kind` names the mutation type (the key into the undo-type registry);
/// `args` carries the type-specific arguments as an opaque payload that the
/// matching capture handler downcasts.
pub struct MutationEvent {
	kind: Box<str>,
	args: Rc<dyn Any>,
}

impl MutationEvent {
	/// Builds an event for the given mutation kind.
	pub fn new(kind: impl Into<Box<str>>, args: Rc<dyn Any>) -> Self {
		Self {
			kind: kind.into(),
			args,
		}
	}

	/// The mutation kind name.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// The type-specific arguments.
	pub fn args(&self) -> &Rc<dyn Any> {
		&self.args
	}
}

impl fmt::Debug for MutationEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MutationEvent")
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// Callback invoked with every mutation an observed object announces.
pub type MutationListener = Rc<dyn Fn(&MutationEvent)>;

/// An object the engine can observe.
///
/// Implementors own their listener bookkeeping; the engine only holds the
/// [`ObserverId`] it needs to unsubscribe, plus a weak reference — tracking
/// an object must never keep it alive.
pub trait Trackable: 'static {
	/// Stable identity token, unique and immutable for the object's
	/// lifetime when present. Used as a fast registry key; objects without
	/// one are keyed by reference identity.
	fn stable_id(&self) -> Option<&str> {
		None
	}

	/// Subscribes `listener` to every mutation this object announces.
	///
	/// Returns `None` if the object cannot deliver notifications; such
	/// objects are silently skipped at registration.
	fn observe(&self, listener: MutationListener) -> Option<ObserverId>;

	/// Removes a subscription. Unknown ids are ignored.
	fn unobserve(&self, id: ObserverId);

	/// Upcast used by replay handlers to recover the concrete type.
	fn as_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Recovers the concrete type of a tracked object.
///
/// Replay handlers receive targets as `Rc<dyn Trackable>`; this is the
/// supported way back to the concrete object they mutate.
pub fn downcast_target<T: 'static>(target: &Rc<dyn Trackable>) -> Option<Rc<T>> {
	Rc::clone(target).as_any_rc().downcast().ok()
}

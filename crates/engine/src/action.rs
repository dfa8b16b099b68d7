//! Recorded reversible mutations.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::observe::Trackable;

/// Opaque snapshot payload produced by a capture handler.
///
/// The engine never looks inside; only the matching undo/redo handlers
/// know the concrete type. A mutation with no meaningful before or after
/// state uses `Rc::new(())`.
pub type Payload = Rc<dyn Any>;

/// Well-formed result of a capture handler.
pub struct CapturedChange {
	/// The mutated object.
	pub target: Rc<dyn Trackable>,
	/// State needed to reverse the mutation.
	pub before: Payload,
	/// State needed to reapply the mutation.
	pub after: Payload,
}

/// One recorded reversible mutation.
///
/// Actions are created only by the capture path and are immutable once
/// appended to the stack; the stack may drop them (truncation, trimming)
/// but never rewrites them. The target is held weakly — recording history
/// for an object must not extend its lifetime.
#[derive(Clone)]
pub struct Action {
	kind: Box<str>,
	target: Weak<dyn Trackable>,
	before: Payload,
	after: Payload,
	cycle: u64,
}

impl Action {
	pub(crate) fn new(kind: &str, change: CapturedChange, cycle: u64) -> Self {
		Self {
			kind: kind.into(),
			target: Rc::downgrade(&change.target),
			before: change.before,
			after: change.after,
			cycle,
		}
	}

	/// The mutation kind this action was captured as.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// The target object, if it is still alive.
	pub fn target(&self) -> Option<Rc<dyn Trackable>> {
		self.target.upgrade()
	}

	/// Snapshot of the state the mutation replaced.
	pub fn before(&self) -> &Payload {
		&self.before
	}

	/// Snapshot of the state the mutation produced.
	pub fn after(&self) -> &Payload {
		&self.after
	}

	/// The batch this action belongs to.
	pub fn cycle(&self) -> u64 {
		self.cycle
	}
}

impl fmt::Debug for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action")
			.field("kind", &self.kind)
			.field("cycle", &self.cycle)
			.field("target_alive", &(self.target.strong_count() > 0))
			.finish_non_exhaustive()
	}
}

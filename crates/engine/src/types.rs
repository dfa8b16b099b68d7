//! Undo-type registry: pluggable per-mutation-kind reverse logic.
//!
//! Every mutation kind resolves to a handler triple: `capture` turns a raw
//! notification into an [`Action`]'s payloads, `undo` and `redo` replay the
//! mutation in either direction. Lookup is two-level: an instance table is
//! checked first and falls through to a shared default table, evaluated at
//! lookup time — adding a default later is visible to every already-built
//! instance that has not shadowed that kind.
//!
//! The shared table is thread-local. Handlers are `Rc`-based because the
//! whole engine runs on a single thread of control; for that thread the
//! table is process-wide in exactly the sense the layering needs.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::action::{Action, CapturedChange, Payload};
use crate::observe::{MutationEvent, Trackable};

/// Turns a notification into payloads, or `None` for "not capturable".
pub type CaptureFn = Rc<dyn Fn(&MutationEvent) -> Option<CapturedChange>>;

/// Replays a recorded mutation: `(target, before, after, action)`.
pub type ReplayFn = Rc<dyn Fn(&Rc<dyn Trackable>, &Payload, &Payload, &Action)>;

/// Handler triple for one mutation kind.
///
/// All three handlers are required fields, so a registration missing one
/// does not exist as a value — there is no malformed-entry state to guard
/// against at lookup time.
#[derive(Clone)]
pub struct UndoHandlers {
	pub capture: CaptureFn,
	pub undo: ReplayFn,
	pub redo: ReplayFn,
}

/// Partial handler triple shallow-merged into an existing entry.
#[derive(Clone, Default)]
pub struct HandlerPatch {
	pub capture: Option<CaptureFn>,
	pub undo: Option<ReplayFn>,
	pub redo: Option<ReplayFn>,
}

impl HandlerPatch {
	fn apply_to(&self, handlers: &mut UndoHandlers) {
		if let Some(capture) = &self.capture {
			handlers.capture = Rc::clone(capture);
		}
		if let Some(undo) = &self.undo {
			handlers.undo = Rc::clone(undo);
		}
		if let Some(redo) = &self.redo {
			handlers.redo = Rc::clone(redo);
		}
	}
}

/// Instance-scoped undo-type table layered over [`defaults`].
#[derive(Default)]
pub struct TypeRegistry {
	local: RefCell<FxHashMap<Box<str>, UndoHandlers>>,
}

impl TypeRegistry {
	/// Creates an empty instance table (every kind falls through to the
	/// shared defaults).
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves `kind`: instance table first, shared defaults second.
	pub fn resolve(&self, kind: &str) -> Option<UndoHandlers> {
		if let Some(handlers) = self.local.borrow().get(kind) {
			return Some(handlers.clone());
		}
		defaults::resolve(kind)
	}

	/// Returns `true` if `kind` is shadowed on this instance.
	pub fn has_override(&self, kind: &str) -> bool {
		self.local.borrow().contains_key(kind)
	}

	/// Registers (or overwrites) `kind` on this instance.
	pub fn add(&self, kind: impl Into<Box<str>>, handlers: UndoHandlers) {
		self.local.borrow_mut().insert(kind.into(), handlers);
	}

	/// Registers several kinds at once.
	pub fn add_many<K, I>(&self, entries: I)
	where
		K: Into<Box<str>>,
		I: IntoIterator<Item = (K, UndoHandlers)>,
	{
		for (kind, handlers) in entries {
			self.add(kind, handlers);
		}
	}

	/// Shallow-merges `patch` into the entry `kind` currently resolves to.
	///
	/// A kind that only resolves through the shared defaults is shadowed
	/// first (copy-on-write), so patching through an instance never mutates
	/// the defaults other instances see. Returns `false`, changing nothing,
	/// if `kind` does not resolve at all.
	pub fn change(&self, kind: &str, patch: &HandlerPatch) -> bool {
		let mut local = self.local.borrow_mut();
		if let Some(handlers) = local.get_mut(kind) {
			patch.apply_to(handlers);
			return true;
		}
		let Some(mut handlers) = defaults::resolve(kind) else {
			tracing::debug!(kind, "undo type change ignored: unknown kind");
			return false;
		};
		patch.apply_to(&mut handlers);
		local.insert(kind.into(), handlers);
		true
	}

	/// Applies several patches at once.
	pub fn change_many<'a, I>(&self, entries: I)
	where
		I: IntoIterator<Item = (&'a str, HandlerPatch)>,
	{
		for (kind, patch) in entries {
			self.change(kind, &patch);
		}
	}

	/// Removes this instance's override for `kind`, revealing the shared
	/// default again. Returns `false` if there was no override.
	pub fn remove(&self, kind: &str) -> bool {
		self.local.borrow_mut().remove(kind).is_some()
	}

	/// Removes each named override.
	pub fn remove_many<I, S>(&self, kinds: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for kind in kinds {
			self.remove(kind.as_ref());
		}
	}
}

/// The shared default undo-type table.
///
/// Defaults apply to every [`TypeRegistry`] without an override for the
/// same kind, retroactively: layering is evaluated per lookup, never
/// copied at construction.
pub mod defaults {
	use super::*;

	thread_local! {
		static TABLE: RefCell<FxHashMap<Box<str>, UndoHandlers>> =
			RefCell::new(FxHashMap::default());
	}

	/// Resolves `kind` against the shared table alone.
	pub fn resolve(kind: &str) -> Option<UndoHandlers> {
		TABLE.with(|table| table.borrow().get(kind).cloned())
	}

	/// Registers (or overwrites) a shared default.
	pub fn add(kind: impl Into<Box<str>>, handlers: UndoHandlers) {
		TABLE.with(|table| table.borrow_mut().insert(kind.into(), handlers));
	}

	/// Registers several shared defaults at once.
	pub fn add_many<K, I>(entries: I)
	where
		K: Into<Box<str>>,
		I: IntoIterator<Item = (K, UndoHandlers)>,
	{
		for (kind, handlers) in entries {
			add(kind, handlers);
		}
	}

	/// Shallow-merges `patch` into an existing shared default. Returns
	/// `false`, changing nothing, for an unknown kind.
	pub fn change(kind: &str, patch: &HandlerPatch) -> bool {
		TABLE.with(|table| {
			let mut table = table.borrow_mut();
			let Some(handlers) = table.get_mut(kind) else {
				tracing::debug!(kind, "default undo type change ignored: unknown kind");
				return false;
			};
			patch.apply_to(handlers);
			true
		})
	}

	/// Applies several patches at once.
	pub fn change_many<'a, I>(entries: I)
	where
		I: IntoIterator<Item = (&'a str, HandlerPatch)>,
	{
		for (kind, patch) in entries {
			change(kind, &patch);
		}
	}

	/// Deletes a shared default, affecting every instance without its own
	/// override. Returns `false` if the kind was not present.
	pub fn remove(kind: &str) -> bool {
		TABLE.with(|table| table.borrow_mut().remove(kind).is_some())
	}

	/// Deletes each named shared default.
	pub fn remove_many<I, S>(kinds: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for kind in kinds {
			remove(kind.as_ref());
		}
	}
}

//! The history stack: one linear timeline of recorded actions.
//!
//! # Navigation
//!
//! ```text
//!             entries
//!   [ a1 a2 | a3 a4 a5 ]
//!           ^cursor
//! ```
//!
//! `cursor` counts the currently applied entries: everything left of it can
//! be undone, everything right of it redone. A capture while the cursor is
//! not at the tail destroys the redo branch — history is linear, not a
//! tree. Entries sharing a cycle id were captured in one synchronous turn
//! and always travel together: undo replays the group newest-first, redo
//! replays it oldest-first.
//!
//! # Re-entrancy
//!
//! Replaying an action mutates the target object, which synchronously
//! announces that mutation right back at the capture path. The `replaying`
//! flag is the only guard: while it is set, capture is suppressed and
//! nested undo/redo calls are rejected. It is armed through a drop guard so
//! a panicking handler cannot leave the stack stuck.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::action::Action;
use crate::cycle::CycleClock;
use crate::observe::MutationEvent;
use crate::types::TypeRegistry;

#[derive(Default)]
struct StackState {
	entries: Vec<Action>,
	/// Count of applied entries, in `0..=entries.len()`.
	cursor: usize,
	/// Length cap; oldest entries are dropped beyond it.
	limit: Option<usize>,
}

impl StackState {
	fn trim_to_limit(&mut self) -> usize {
		let Some(limit) = self.limit else {
			return 0;
		};
		let mut dropped = 0;
		while self.entries.len() > limit {
			self.entries.remove(0);
			self.cursor = self.cursor.saturating_sub(1);
			dropped += 1;
		}
		dropped
	}
}

enum ReplayDirection {
	Undo,
	Redo,
}

/// Ordered sequence of recorded actions with pointer-based navigation.
///
/// A stack may be shared by several managers after a merge; all of them
/// append to and navigate the same timeline. The batch clock lives with
/// the stack so every writer stamps consistent cycle ids.
pub struct HistoryStack {
	state: RefCell<StackState>,
	tracking: Cell<bool>,
	replaying: Cell<bool>,
	clock: Rc<CycleClock>,
}

impl HistoryStack {
	/// Creates an empty, non-tracking stack stamping batches from `clock`.
	pub fn new(clock: Rc<CycleClock>) -> Self {
		Self {
			state: RefCell::new(StackState::default()),
			tracking: Cell::new(false),
			replaying: Cell::new(false),
			clock,
		}
	}

	/// The batch clock this stack stamps captures with.
	pub fn clock(&self) -> &Rc<CycleClock> {
		&self.clock
	}

	/// Whether capture is currently enabled.
	pub fn is_tracking(&self) -> bool {
		self.tracking.get()
	}

	/// Enables or disables capture. Shared stacks share the flag.
	pub fn set_tracking(&self, tracking: bool) {
		self.tracking.set(tracking);
	}

	/// Whether an undo/redo replay is in progress.
	pub fn is_replaying(&self) -> bool {
		self.replaying.get()
	}

	pub fn len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.borrow().entries.is_empty()
	}

	/// Count of applied entries; the classic pointer is `cursor - 1`.
	pub fn cursor(&self) -> usize {
		self.state.borrow().cursor
	}

	/// The length cap, if any.
	pub fn limit(&self) -> Option<usize> {
		self.state.borrow().limit
	}

	/// Sets the length cap, dropping oldest entries immediately if the
	/// stack already exceeds it.
	pub fn set_limit(&self, limit: Option<usize>) {
		let mut state = self.state.borrow_mut();
		state.limit = limit;
		let dropped = state.trim_to_limit();
		if dropped > 0 {
			tracing::trace!(dropped, ?limit, "stack.trim");
		}
	}

	/// Drops all entries and resets the cursor.
	pub fn clear(&self) {
		let mut state = self.state.borrow_mut();
		state.entries.clear();
		state.cursor = 0;
	}

	pub fn can_undo(&self) -> bool {
		self.state.borrow().cursor > 0
	}

	pub fn can_redo(&self) -> bool {
		let state = self.state.borrow();
		state.cursor < state.entries.len()
	}

	/// Capture entry point: records `event` as a new action if tracking is
	/// enabled, no replay is in progress, and the event's kind resolves in
	/// `types`.
	///
	/// The resolved capture handler decides whether the event is worth
	/// recording; a `None` result records nothing. A successful capture
	/// destroys any undone-but-not-yet-discarded future entries first.
	pub fn capture(&self, event: &MutationEvent, types: &TypeRegistry) {
		if !self.tracking.get() || self.replaying.get() {
			return;
		}
		let Some(handlers) = types.resolve(event.kind()) else {
			tracing::trace!(kind = event.kind(), "capture skipped: unresolved kind");
			return;
		};
		let Some(change) = (handlers.capture)(event) else {
			return;
		};

		let cycle = self.clock.current();
		let mut state = self.state.borrow_mut();
		if state.cursor < state.entries.len() {
			let cursor = state.cursor;
			let discarded = state.entries.len() - cursor;
			state.entries.truncate(cursor);
			tracing::trace!(discarded, "stack.truncate: redo branch destroyed");
		}
		state
			.entries
			.push(Action::new(event.kind(), change, cycle));
		state.cursor = state.entries.len();
		let dropped = state.trim_to_limit();
		tracing::trace!(
			kind = event.kind(),
			cycle,
			len = state.entries.len(),
			dropped,
			"stack.capture"
		);
	}

	/// Undoes the most recent batch. Returns `true` if anything replayed.
	///
	/// The whole group sharing the anchor entry's cycle id is unwound,
	/// newest first, so dependent mutations reverse safely.
	pub fn undo(&self, types: &TypeRegistry) -> bool {
		if self.replaying.get() {
			return false;
		}
		let batch = {
			let mut state = self.state.borrow_mut();
			if state.cursor == 0 {
				tracing::trace!("undo: nothing to undo");
				return false;
			}
			let anchor = state.entries[state.cursor - 1].cycle();
			let mut start = state.cursor;
			while start > 0 && state.entries[start - 1].cycle() == anchor {
				start -= 1;
			}
			let batch = state.entries[start..state.cursor].to_vec();
			state.cursor = start;
			tracing::trace!(
				cycle = anchor,
				actions = batch.len(),
				cursor = state.cursor,
				"undo: batch collected"
			);
			batch
		};

		let _guard = ReplayGuard::arm(&self.replaying);
		for action in batch.iter().rev() {
			self.replay(action, types, ReplayDirection::Undo);
		}
		true
	}

	/// Redoes the next batch. Returns `true` if anything replayed.
	///
	/// The group is reapplied in original capture order.
	pub fn redo(&self, types: &TypeRegistry) -> bool {
		if self.replaying.get() {
			return false;
		}
		let batch = {
			let mut state = self.state.borrow_mut();
			if state.cursor == state.entries.len() {
				tracing::trace!("redo: nothing to redo");
				return false;
			}
			let anchor = state.entries[state.cursor].cycle();
			let mut end = state.cursor;
			while end < state.entries.len() && state.entries[end].cycle() == anchor {
				end += 1;
			}
			let batch = state.entries[state.cursor..end].to_vec();
			state.cursor = end;
			tracing::trace!(
				cycle = anchor,
				actions = batch.len(),
				cursor = state.cursor,
				"redo: batch collected"
			);
			batch
		};

		let _guard = ReplayGuard::arm(&self.replaying);
		for action in &batch {
			self.replay(action, types, ReplayDirection::Redo);
		}
		true
	}

	fn replay(&self, action: &Action, types: &TypeRegistry, direction: ReplayDirection) {
		// Resolution happens at replay time: the layered registry view may
		// have changed since capture, and the caller's instance overrides
		// apply to its own replays.
		let Some(handlers) = types.resolve(action.kind()) else {
			tracing::debug!(kind = action.kind(), "replay skipped: unresolved kind");
			return;
		};
		let Some(target) = action.target() else {
			tracing::debug!(kind = action.kind(), "replay skipped: target dropped");
			return;
		};
		let handler = match direction {
			ReplayDirection::Undo => &handlers.undo,
			ReplayDirection::Redo => &handlers.redo,
		};
		handler(&target, action.before(), action.after(), action);
	}
}

/// Arms the replay flag for the duration of a batch replay.
struct ReplayGuard<'a> {
	flag: &'a Cell<bool>,
}

impl<'a> ReplayGuard<'a> {
	fn arm(flag: &'a Cell<bool>) -> Self {
		flag.set(true);
		Self { flag }
	}
}

impl Drop for ReplayGuard<'_> {
	fn drop(&mut self) {
		self.flag.set(false);
	}
}

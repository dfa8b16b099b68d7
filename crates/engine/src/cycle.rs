//! Logical clock grouping same-turn captures into one batch.

use std::cell::Cell;
use std::rc::Rc;

use crate::defer::TurnScheduler;

/// Monotonically increasing batch id for capture grouping.
///
/// Every capture that occurs within one uninterrupted synchronous run
/// receives the same cycle id, so the whole run undoes and redoes as a
/// single unit. There is no transaction API and no wall clock involved:
/// the first [`current`](Self::current) call since the last turn boundary
/// opens a new batch and defers the batch-close task through the
/// [`TurnScheduler`]; every call before that task runs sees the same id.
///
/// A slow synchronous routine producing many mutations is therefore still
/// one batch, while two runs separated by at least one scheduler turn get
/// distinct ids.
pub struct CycleClock {
	/// Last issued batch id.
	counter: Cell<u64>,
	/// Whether a batch is currently open.
	open: Cell<bool>,
	scheduler: Rc<dyn TurnScheduler>,
}

impl CycleClock {
	/// Creates a clock that closes batches through `scheduler`.
	pub fn new(scheduler: Rc<dyn TurnScheduler>) -> Rc<Self> {
		Rc::new(Self {
			counter: Cell::new(0),
			open: Cell::new(false),
			scheduler,
		})
	}

	/// Returns the current batch id, opening a new batch if none is open.
	///
	/// Opening a batch schedules the deferred close; the clock itself is
	/// held weakly by that task so it never outlives its owner.
	pub fn current(self: &Rc<Self>) -> u64 {
		if !self.open.get() {
			self.counter.set(self.counter.get() + 1);
			self.open.set(true);
			tracing::trace!(cycle = self.counter.get(), "cycle.open");

			let weak = Rc::downgrade(self);
			self.scheduler.defer(Box::new(move || {
				if let Some(clock) = weak.upgrade() {
					clock.open.set(false);
					tracing::trace!(cycle = clock.counter.get(), "cycle.close");
				}
			}));
		}
		self.counter.get()
	}

	/// Returns `true` while a batch is open.
	pub fn is_open(&self) -> bool {
		self.open.get()
	}

	/// Returns the last issued batch id without opening a batch.
	pub fn last(&self) -> u64 {
		self.counter.get()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::defer::DeferQueue;

	#[test]
	fn same_turn_shares_one_id() {
		let queue = Rc::new(DeferQueue::new());
		let clock = CycleClock::new(queue.clone());

		assert_eq!(clock.current(), 1);
		assert_eq!(clock.current(), 1);
		assert_eq!(clock.current(), 1);
		assert!(clock.is_open());
	}

	#[test]
	fn turn_boundary_advances_the_id() {
		let queue = Rc::new(DeferQueue::new());
		let clock = CycleClock::new(queue.clone());

		assert_eq!(clock.current(), 1);
		queue.run_until_idle();
		assert!(!clock.is_open());

		assert_eq!(clock.current(), 2);
		queue.run_until_idle();
		assert_eq!(clock.current(), 3);
	}

	#[test]
	fn one_close_task_per_batch() {
		let queue = Rc::new(DeferQueue::new());
		let clock = CycleClock::new(queue.clone());

		clock.current();
		clock.current();
		assert_eq!(queue.pending(), 1);
	}

	#[test]
	fn close_task_outliving_the_clock_is_harmless() {
		let queue = Rc::new(DeferQueue::new());
		let clock = CycleClock::new(queue.clone());

		clock.current();
		drop(clock);
		assert_eq!(queue.run_until_idle(), 1);
	}
}

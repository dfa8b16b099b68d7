//! Deferred-task seam marking the end of a synchronous turn.
//!
//! The engine groups mutations captured within one uninterrupted synchronous
//! run into a single undoable batch. The only scheduling primitive that
//! grouping relies on is "run this after the current synchronous execution
//! returns to the scheduler": [`CycleClock`] defers its batch-close task
//! through the [`TurnScheduler`] trait defined here.
//!
//! Hosts with a real event loop implement [`TurnScheduler`] on top of their
//! zero-delay task primitive. Hosts without one (and tests) use the provided
//! [`DeferQueue`] and drain it between turns with
//! [`run_until_idle`](DeferQueue::run_until_idle). A fixed wall-clock delay is
//! never a valid substitute: it would change grouping semantics under load.
//!
//! [`CycleClock`]: crate::cycle::CycleClock

use std::cell::RefCell;
use std::collections::VecDeque;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Schedules work to run after the current synchronous turn completes.
pub trait TurnScheduler {
	/// Enqueues `task` to run once the current synchronous execution has
	/// returned to the scheduler, before the next externally triggered turn.
	fn defer(&self, task: Task);
}

/// FIFO queue of deferred tasks for hosts without an event loop.
///
/// Draining the queue is what ends a turn: everything captured before a
/// drain belongs to the same batch, everything after it to a new one.
#[derive(Default)]
pub struct DeferQueue {
	queue: RefCell<VecDeque<Task>>,
}

impl DeferQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if no tasks are pending.
	pub fn is_idle(&self) -> bool {
		self.queue.borrow().is_empty()
	}

	/// Returns the number of pending tasks.
	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}

	/// Runs queued tasks until none remain, including tasks deferred by the
	/// tasks themselves. Returns the number of tasks executed.
	pub fn run_until_idle(&self) -> usize {
		let mut executed = 0;
		loop {
			// Tasks may defer further tasks; never hold the borrow across one.
			let task = self.queue.borrow_mut().pop_front();
			let Some(task) = task else {
				break;
			};
			task();
			executed += 1;
		}
		if executed > 0 {
			tracing::trace!(executed, "defer.drain");
		}
		executed
	}
}

impl TurnScheduler for DeferQueue {
	fn defer(&self, task: Task) {
		let mut queue = self.queue.borrow_mut();
		queue.push_back(task);
		tracing::trace!(pending = queue.len(), "defer.schedule");
	}
}

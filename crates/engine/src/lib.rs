//! Generic undo/redo engine over observed mutations.
//!
//! The engine watches a set of registered stateful objects, records every
//! announced mutation as a reversible [`Action`] on a [`HistoryStack`], and
//! replays those actions through pluggable per-kind handler triples. It
//! never owns the objects it tracks and never defines what a mutation
//! means — both live behind small seams ([`Trackable`] and
//! [`UndoHandlers`]) that embedders fill in.
//!
//! # Batching
//!
//! Mutations captured within one uninterrupted synchronous run share a
//! [`CycleClock`] batch id and undo/redo as a single unit. The turn
//! boundary is the only grouping signal; see [`defer`] for the scheduling
//! seam that defines it.
//!
//! # Sharing
//!
//! Several [`HistoryManager`]s can write into one stack after a merge,
//! each with its own bound objects and undo-type overrides, producing one
//! combined undo sequence.

pub mod action;
pub mod cycle;
pub mod defer;
pub mod manager;
pub mod objects;
pub mod observe;
pub mod stack;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{Action, CapturedChange, Payload};
pub use cycle::CycleClock;
pub use defer::{DeferQueue, Task, TurnScheduler};
pub use manager::{HistoryEvent, HistoryListenerId, HistoryManager};
pub use objects::{BindKey, Binding, ObjectRegistry};
pub use observe::{MutationEvent, MutationListener, ObserverId, Trackable, downcast_target};
pub use stack::HistoryStack;
pub use types::{CaptureFn, HandlerPatch, ReplayFn, TypeRegistry, UndoHandlers, defaults};

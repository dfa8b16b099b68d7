//! Observable records and collections for the history engine.
//!
//! This crate is the concrete half of the engine's collaborator contract:
//! [`Record`] (a keyed bag of JSON values) and [`Collection`] (an ordered
//! record sequence) implement [`Trackable`] and announce every native
//! mutation as a wildcard event, and [`builtins`] supplies the matching
//! undoable types — insert, remove, field-change, reset — as handler
//! triples for the engine's registry.
//!
//! ```
//! use std::rc::Rc;
//!
//! use hindsight_engine::{DeferQueue, HistoryManager};
//! use hindsight_model::{Collection, Record, builtins};
//!
//! let queue = Rc::new(DeferQueue::new());
//! let manager = HistoryManager::new(queue.clone());
//! builtins::register_with(&manager);
//!
//! let todos = Collection::new();
//! manager.register(todos.clone());
//! manager.start_tracking();
//!
//! todos.insert(Record::with_id("a"));
//! queue.run_until_idle(); // end of turn: the insert is one batch
//!
//! assert!(manager.undo());
//! assert!(todos.is_empty());
//! assert!(manager.redo());
//! assert_eq!(todos.len(), 1);
//! ```
//!
//! [`Trackable`]: hindsight_engine::Trackable

pub mod builtins;
pub mod collection;
pub mod error;
pub mod events;
pub mod notify;
pub mod record;

pub use collection::Collection;
pub use error::ModelError;
pub use events::{FieldChangeArgs, InsertArgs, RemoveArgs, ResetArgs, kind};
pub use notify::ObserverSet;
pub use record::Record;

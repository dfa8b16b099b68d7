//! Built-in mutation kinds and their notification arguments.
//!
//! Embedders emitting the built-in kinds from their own [`Trackable`]
//! objects use these argument structs so the built-in capture handlers
//! understand the events.
//!
//! [`Trackable`]: hindsight_engine::Trackable

use std::rc::Rc;

use serde_json::Value;

use crate::collection::Collection;
use crate::record::Record;

/// Names of the built-in mutation kinds.
pub mod kind {
	/// A record was inserted into a collection.
	pub const INSERT: &str = "insert";
	/// A record was removed from a collection.
	pub const REMOVE: &str = "remove";
	/// A record field changed value (including being set or unset).
	pub const FIELD_CHANGE: &str = "field-change";
	/// A collection's contents were replaced wholesale.
	pub const RESET: &str = "reset";
}

/// Arguments of an [`INSERT`](kind::INSERT) notification.
pub struct InsertArgs {
	pub collection: Rc<Collection>,
	pub record: Rc<Record>,
	pub index: usize,
}

/// Arguments of a [`REMOVE`](kind::REMOVE) notification.
pub struct RemoveArgs {
	pub collection: Rc<Collection>,
	pub record: Rc<Record>,
	pub index: usize,
}

/// Arguments of a [`FIELD_CHANGE`](kind::FIELD_CHANGE) notification.
///
/// `old` is `None` when the field was newly set, `new` is `None` when it
/// was unset.
pub struct FieldChangeArgs {
	pub record: Rc<Record>,
	pub field: Box<str>,
	pub old: Option<Value>,
	pub new: Option<Value>,
}

/// Arguments of a [`RESET`](kind::RESET) notification.
pub struct ResetArgs {
	pub collection: Rc<Collection>,
	pub before: Vec<Rc<Record>>,
	pub after: Vec<Rc<Record>>,
}

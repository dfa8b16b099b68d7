//! Built-in undoable types for records and collections.
//!
//! Each built-in is a handler triple: `capture` reads the notification's
//! arguments into snapshot payloads, `undo`/`redo` call back into the
//! target's native operations. Those callbacks announce fresh mutation
//! events of their own; the history stack's replay guard keeps them from
//! being recorded again.

use std::rc::Rc;

use hindsight_engine::{
	CapturedChange, HistoryManager, Payload, Trackable, UndoHandlers, defaults, downcast_target,
};
use serde_json::Value;

use crate::collection::Collection;
use crate::events::{FieldChangeArgs, InsertArgs, RemoveArgs, ResetArgs, kind};
use crate::record::Record;

/// Snapshot of one record's place in a collection.
pub struct Placement {
	pub record: Rc<Record>,
	pub index: usize,
}

/// Snapshot of one field's value (`None` = absent).
pub struct FieldState {
	pub field: Box<str>,
	pub value: Option<Value>,
}

/// Handlers for [`kind::INSERT`]: undo removes the record, redo puts it
/// back where it was.
pub fn insert_type() -> UndoHandlers {
	UndoHandlers {
		capture: Rc::new(|event| {
			let args = event.args().downcast_ref::<InsertArgs>()?;
			Some(CapturedChange {
				target: args.collection.clone(),
				before: Rc::new(()),
				after: Rc::new(Placement {
					record: args.record.clone(),
					index: args.index,
				}),
			})
		}),
		undo: Rc::new(|target, _before, after, _action| {
			let Some(collection) = downcast_target::<Collection>(target) else {
				return;
			};
			let Some(placement) = after.downcast_ref::<Placement>() else {
				return;
			};
			collection.remove(&placement.record);
		}),
		redo: Rc::new(|target, _before, after, _action| {
			restore_placement(target, after);
		}),
	}
}

/// Handlers for [`kind::REMOVE`]: undo reinserts the record at its old
/// index, redo removes it again.
pub fn remove_type() -> UndoHandlers {
	UndoHandlers {
		capture: Rc::new(|event| {
			let args = event.args().downcast_ref::<RemoveArgs>()?;
			Some(CapturedChange {
				target: args.collection.clone(),
				before: Rc::new(Placement {
					record: args.record.clone(),
					index: args.index,
				}),
				after: Rc::new(()),
			})
		}),
		undo: Rc::new(|target, before, _after, _action| {
			restore_placement(target, before);
		}),
		redo: Rc::new(|target, before, _after, _action| {
			let Some(collection) = downcast_target::<Collection>(target) else {
				return;
			};
			let Some(placement) = before.downcast_ref::<Placement>() else {
				return;
			};
			collection.remove(&placement.record);
		}),
	}
}

/// Handlers for [`kind::FIELD_CHANGE`]: undo restores the old value (or
/// absence), redo reapplies the new one.
pub fn field_change_type() -> UndoHandlers {
	UndoHandlers {
		capture: Rc::new(|event| {
			let args = event.args().downcast_ref::<FieldChangeArgs>()?;
			Some(CapturedChange {
				target: args.record.clone(),
				before: Rc::new(FieldState {
					field: args.field.clone(),
					value: args.old.clone(),
				}),
				after: Rc::new(FieldState {
					field: args.field.clone(),
					value: args.new.clone(),
				}),
			})
		}),
		undo: Rc::new(|target, before, _after, _action| {
			apply_field_state(target, before);
		}),
		redo: Rc::new(|target, _before, after, _action| {
			apply_field_state(target, after);
		}),
	}
}

/// Handlers for [`kind::RESET`]: undo restores the previous contents,
/// redo reapplies the replacement.
pub fn reset_type() -> UndoHandlers {
	UndoHandlers {
		capture: Rc::new(|event| {
			let args = event.args().downcast_ref::<ResetArgs>()?;
			Some(CapturedChange {
				target: args.collection.clone(),
				before: Rc::new(args.before.clone()),
				after: Rc::new(args.after.clone()),
			})
		}),
		undo: Rc::new(|target, before, _after, _action| {
			apply_lineup(target, before);
		}),
		redo: Rc::new(|target, _before, after, _action| {
			apply_lineup(target, after);
		}),
	}
}

fn restore_placement(target: &Rc<dyn Trackable>, payload: &Payload) {
	let Some(collection) = downcast_target::<Collection>(target) else {
		return;
	};
	let Some(placement) = payload.downcast_ref::<Placement>() else {
		return;
	};
	if let Err(err) = collection.insert_at(placement.index, placement.record.clone()) {
		tracing::debug!(%err, "placement restore fell outside the collection");
	}
}

fn apply_field_state(target: &Rc<dyn Trackable>, payload: &Payload) {
	let Some(record) = downcast_target::<Record>(target) else {
		return;
	};
	let Some(state) = payload.downcast_ref::<FieldState>() else {
		return;
	};
	match &state.value {
		Some(value) => {
			record.set(&state.field, value.clone());
		}
		None => {
			record.unset(&state.field);
		}
	}
}

fn apply_lineup(target: &Rc<dyn Trackable>, payload: &Payload) {
	let Some(collection) = downcast_target::<Collection>(target) else {
		return;
	};
	let Some(items) = payload.downcast_ref::<Vec<Rc<Record>>>() else {
		return;
	};
	collection.reset(items.clone());
}

/// The four built-in undoable types, keyed by their kind names.
pub fn default_types() -> [(&'static str, UndoHandlers); 4] {
	[
		(kind::INSERT, insert_type()),
		(kind::REMOVE, remove_type()),
		(kind::FIELD_CHANGE, field_change_type()),
		(kind::RESET, reset_type()),
	]
}

/// Installs the built-ins into the shared default table, making them
/// visible to every manager without an override for the same kinds.
pub fn install_defaults() {
	defaults::add_many(default_types());
}

/// Registers the built-ins on one manager alone.
pub fn register_with(manager: &HistoryManager) {
	manager.add_undo_types(default_types());
}

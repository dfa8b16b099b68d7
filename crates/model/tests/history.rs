//! End-to-end flows: records and collections tracked through the engine.

use std::rc::Rc;

use hindsight_engine::{DeferQueue, HistoryManager, defaults};
use hindsight_model::{Collection, Record, builtins};
use pretty_assertions::assert_eq;
use serde_json::json;

fn world() -> (Rc<DeferQueue>, HistoryManager) {
	let queue = Rc::new(DeferQueue::new());
	let manager = HistoryManager::new(queue.clone());
	builtins::register_with(&manager);
	manager.start_tracking();
	(queue, manager)
}

fn ids(collection: &Rc<Collection>) -> Vec<String> {
	collection
		.items()
		.iter()
		.map(|record| record.id().unwrap_or("?").to_owned())
		.collect()
}

#[test]
fn insert_undo_redo_walks_the_timeline() {
	let (queue, manager) = world();
	let todos = Collection::new();
	manager.register(todos.clone());

	todos.insert(Record::with_id("x"));
	queue.run_until_idle();
	assert_eq!(manager.stack().len(), 1);
	assert_eq!(manager.stack().cursor(), 1);

	todos.insert(Record::with_id("y"));
	queue.run_until_idle();
	assert_eq!(manager.stack().len(), 2);
	assert_eq!(manager.stack().cursor(), 2);

	assert!(manager.undo());
	assert_eq!(ids(&todos), vec!["x"]);
	assert_eq!(manager.stack().cursor(), 1);

	assert!(manager.undo());
	assert!(todos.is_empty());
	assert_eq!(manager.stack().cursor(), 0);
	assert!(!manager.can_undo());

	assert!(manager.redo());
	assert_eq!(ids(&todos), vec!["x"]);
	assert_eq!(manager.stack().cursor(), 1);
}

#[test]
fn field_change_round_trips() {
	let (_queue, manager) = world();
	let record = Record::new();
	record.set("a", 1);
	manager.register(record.clone());

	record.set("a", 2);

	assert!(manager.undo());
	assert_eq!(record.get("a"), Some(json!(1)));

	assert!(manager.redo());
	assert_eq!(record.get("a"), Some(json!(2)));
}

#[test]
fn unset_round_trips() {
	let (_queue, manager) = world();
	let record = Record::new();
	record.set("a", 1);
	manager.register(record.clone());

	record.unset("a");

	assert!(manager.undo());
	assert_eq!(record.get("a"), Some(json!(1)));

	assert!(manager.redo());
	assert!(!record.contains("a"));
}

#[test]
fn one_synchronous_run_undoes_as_one_unit() {
	let (_queue, manager) = world();
	let todos = Collection::new();
	manager.register(todos.clone());

	// No turn boundary between these three inserts.
	todos.insert(Record::with_id("a"));
	todos.insert(Record::with_id("b"));
	todos.insert(Record::with_id("c"));
	assert_eq!(manager.stack().len(), 3);

	assert!(manager.undo());
	assert!(todos.is_empty());

	assert!(manager.redo());
	assert_eq!(ids(&todos), vec!["a", "b", "c"]);
}

#[test]
fn new_capture_discards_the_undone_branch() {
	let (queue, manager) = world();
	let record = Record::new();
	record.set("n", 0);
	manager.register(record.clone());

	for n in 1..=3 {
		record.set("n", n);
		queue.run_until_idle();
	}
	manager.undo();
	manager.undo();
	assert_eq!(record.get("n"), Some(json!(1)));

	record.set("n", 9);
	let stack = manager.stack();
	assert_eq!(stack.len(), 2);
	assert_eq!(stack.cursor(), 2);
	assert!(!manager.can_redo());

	assert!(manager.undo());
	assert_eq!(record.get("n"), Some(json!(1)));
}

#[test]
fn availability_tracks_the_cursor_exactly() {
	let (queue, manager) = world();
	let record = Record::new();
	manager.register(record.clone());

	assert!(!manager.can_undo());
	assert!(!manager.can_redo());

	record.set("a", 1);
	queue.run_until_idle();
	record.set("a", 2);
	assert!(manager.can_undo());
	assert!(!manager.can_redo());

	manager.undo();
	assert!(manager.can_undo());
	assert!(manager.can_redo());

	manager.undo();
	assert!(!manager.can_undo());
	assert!(manager.can_redo());
}

#[test]
fn limit_drops_oldest_history_without_skew() {
	let (queue, manager) = world();
	manager.set_limit(Some(2));
	let record = Record::new();
	record.set("n", 0);
	manager.register(record.clone());

	for n in 1..=3 {
		record.set("n", n);
		queue.run_until_idle();
	}
	assert_eq!(manager.stack().len(), 2);

	assert!(manager.undo());
	assert_eq!(record.get("n"), Some(json!(2)));
	assert!(manager.undo());
	assert_eq!(record.get("n"), Some(json!(1)));
	assert!(!manager.can_undo());
}

#[test]
fn reset_round_trips_the_whole_lineup() {
	let (queue, manager) = world();
	let todos = Collection::new();
	let a = Record::with_id("a");
	let b = Record::with_id("b");
	todos.insert(a.clone());
	todos.insert(b.clone());
	manager.register(todos.clone());

	todos.reset(vec![Record::with_id("z")]);
	queue.run_until_idle();
	assert_eq!(ids(&todos), vec!["z"]);

	assert!(manager.undo());
	assert_eq!(ids(&todos), vec!["a", "b"]);
	assert!(Rc::ptr_eq(&todos.get(0).unwrap(), &a));

	assert!(manager.redo());
	assert_eq!(ids(&todos), vec!["z"]);
}

#[test]
fn replays_are_not_recorded_as_new_history() {
	let (_queue, manager) = world();
	let todos = Collection::new();
	manager.register(todos.clone());

	todos.insert(Record::with_id("x"));
	assert_eq!(manager.stack().len(), 1);

	// Undoing calls Collection::remove, which announces a remove event;
	// the replay guard keeps it off the stack.
	manager.undo();
	manager.redo();
	assert_eq!(manager.stack().len(), 1);
}

#[test]
fn unregistered_objects_keep_their_recorded_history() {
	let (queue, manager) = world();
	let record = Record::new();
	record.set("a", 1);
	manager.register(record.clone());

	record.set("a", 2);
	queue.run_until_idle();

	manager.unregister(record.clone());
	record.set("a", 3);
	assert_eq!(manager.stack().len(), 1);

	assert!(manager.undo());
	assert_eq!(record.get("a"), Some(json!(1)));
}

#[test]
fn merged_managers_write_one_combined_history() {
	let (queue, a) = world();
	let (_queue_b, b) = world();

	let shared_doc = Record::new();
	b.register(shared_doc.clone());

	// b joins a's history: captures on b's objects land on a's stack.
	b.merge(&a);
	shared_doc.set("title", "draft");
	queue.run_until_idle();

	assert_eq!(a.stack().len(), 1);
	assert!(a.can_undo());

	assert!(a.undo());
	assert!(!shared_doc.contains("title"));
}

#[test]
fn shared_defaults_apply_retroactively() {
	let queue = Rc::new(DeferQueue::new());
	let manager = HistoryManager::new(queue.clone());
	manager.start_tracking();

	let record = Record::new();
	manager.register(record.clone());

	// No types anywhere yet: nothing is captured.
	record.set("a", 1);
	assert!(manager.stack().is_empty());

	// Installing the built-ins as shared defaults reaches the existing
	// manager at lookup time.
	builtins::install_defaults();
	record.set("a", 2);
	assert_eq!(manager.stack().len(), 1);

	assert!(manager.undo());
	assert_eq!(record.get("a"), Some(json!(1)));

	defaults::remove_many([hindsight_model::kind::FIELD_CHANGE]);
	record.set("a", 5);
	assert_eq!(manager.stack().len(), 1);
}

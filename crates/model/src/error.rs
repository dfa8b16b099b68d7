use thiserror::Error;

/// Hard failures in the observed-object model.
///
/// Edge conditions that are part of normal flow (removing an absent
/// record, unsetting an absent field) are quiet `Option`/`bool` returns;
/// this enum is reserved for genuine misuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
	#[error("insertion index {index} out of range for collection of length {len}")]
	IndexOutOfRange { index: usize, len: usize },
}

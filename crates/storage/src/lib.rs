//! Storage abstraction and implementations for fitlog.
//!
//! This crate provides a trait-based storage interface with a JSON file
//! reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;

/// The last `n` rows of a time-ordered list, newest first.
pub fn recent<T: Clone>(rows: &[T], n: usize) -> Vec<T> {
    rows.iter().rev().take(n).cloned().collect()
}

//! Trait definitions for Signals Notebook operations.
//!
//! Each model type implements the traits it supports, encapsulating
//! endpoint differences in the implementations. Creation takes different
//! inputs for every kind and lives in inherent `create` functions.

mod delete;
mod get;
mod list;
mod save;

pub use delete::Delete;
pub use get::Get;
pub use list::List;
pub use save::Save;

//! Pure calendar logic: next occurrences and upcoming-task projection.
//!
//! Nothing in this module performs I/O or holds state, so every function
//! is safe to call concurrently from any number of callers.

pub mod recurrence;
pub mod upcoming;

pub use recurrence::{next_due, next_due_on_or_after, next_occurrence, next_occurrence_on_or_after};
pub use upcoming::{project, project_all};

//! Domain model for personal task tracking.
//!
//! The task domain models slug derivation, the active/done lifecycle, and
//! owner-scoped identity while keeping all infrastructure concerns outside of
//! the domain boundary.

mod error;
mod ids;
mod slug;
mod task;

pub use error::{ParseSlugPolicyError, TaskDomainError};
pub use ids::{OwnerId, TaskId, TaskSlug, TaskTitle, fold_slug};
pub use self::slug::{SlugPolicy, generate_slug, next_sequence, normalize_title};
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges, TaskState, validate_do_before};

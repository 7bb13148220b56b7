//! Business rules for task lists and tasks.
//!
//! Every operation that depends on who is calling takes the caller as an
//! explicit `&User`; nothing here reads ambient request state.

pub mod task;
pub mod task_list;

pub use task::TaskService;
pub use task_list::TaskListService;

pub(crate) use crate::repository::{task_list_not_found, task_not_found};

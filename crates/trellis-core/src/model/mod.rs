//! Entity model for the category/task/subtask tree.

pub mod completion;
pub mod node;

pub use completion::{Completion, MAX_COMPLETION, aggregate};
pub use node::{Category, Subtask, Task, WorkLog};

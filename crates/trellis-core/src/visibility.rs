//! Visibility filtering for unauthenticated readers.
//!
//! Effective visibility is `self.public AND all ancestors public`. Rather
//! than recomputing the ancestor chain per leaf, the filter prunes top-down:
//! a dropped category takes its whole subtree with it, so a surviving node's
//! ancestors are public by construction. Flags are never rewritten.

use crate::model::Category;

/// Reduce a tree to what an unauthenticated reader may see.
///
/// Authenticated callers get the tree back unchanged.
#[must_use]
pub fn filter_visible(categories: Vec<Category>, authenticated: bool) -> Vec<Category> {
    if authenticated {
        return categories;
    }

    categories
        .into_iter()
        .filter(|category| category.public)
        .map(|mut category| {
            category.tasks = category
                .tasks
                .into_iter()
                .filter(|task| task.public)
                .map(|mut task| {
                    task.subtasks.retain(|sub| sub.public);
                    task
                })
                .collect();
            category
        })
        .collect()
}

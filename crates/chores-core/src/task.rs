use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item.
///
/// The serialized form is the on-disk contract: an object with `id`, `text`,
/// `completed` and an ISO-8601 `createdAt` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at: now,
        }
    }
}

/// Completion tally over the full task list, independent of the active
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub completed: usize,
    pub total: usize,
}

impl Counts {
    /// Label noun for the total: "task" when there is exactly one.
    pub fn noun(&self) -> &'static str {
        if self.total == 1 { "task" } else { "tasks" }
    }
}

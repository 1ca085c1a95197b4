use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::filter::Filter;
use crate::task::{Counts, Task};

/// Fixed slot name inside the data directory. The file holds the whole task
/// list as one JSON array.
pub const STORAGE_FILE: &str = "tasks.json";

/// Ordered task list (newest first) plus its on-disk slot. Every mutation
/// rewrites the slot synchronously before returning, so the persisted list
/// and the in-memory list never diverge.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let path = data_dir.join(STORAGE_FILE);
        let tasks = load_tasks(&path);

        info!(
            slot = %path.display(),
            count = tasks.len(),
            "opened task store"
        );

        Ok(Self { path, tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Add a task with the given text, newest first.
    ///
    /// Whitespace-only text is a validation failure, not an error: nothing is
    /// stored and `Ok(None)` is returned so the caller can play its rejection
    /// cue.
    #[tracing::instrument(skip(self, text, now))]
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> anyhow::Result<Option<Task>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("rejected empty task text");
            return Ok(None);
        }

        let task = Task::new(self.next_id(now), text.to_string(), now);
        self.tasks.insert(0, task.clone());
        self.persist()?;

        debug!(id = task.id, total = self.tasks.len(), "task added");
        Ok(Some(task))
    }

    /// Set a task's completion flag. Unknown ids are a silent no-op.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, id: u64, completed: bool) -> anyhow::Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "toggle on unknown id ignored");
            return Ok(false);
        };

        task.completed = completed;
        self.persist()?;
        Ok(true)
    }

    /// Replace a task's text. Empty-after-trim text or an unknown id leaves
    /// the list untouched.
    #[tracing::instrument(skip(self, text))]
    pub fn edit(&mut self, id: u64, text: &str) -> anyhow::Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            debug!(id, "rejected empty edit text");
            return Ok(false);
        }

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "edit on unknown id ignored");
            return Ok(false);
        };

        task.text = text.to_string();
        self.persist()?;
        Ok(true)
    }

    /// Remove the task with the given id. Unknown ids are a silent no-op.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> anyhow::Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);

        if self.tasks.len() == before {
            debug!(id, "delete on unknown id ignored");
            return Ok(false);
        }

        self.persist()?;
        debug!(id, total = self.tasks.len(), "task deleted");
        Ok(true)
    }

    pub fn count(&self) -> Counts {
        Counts {
            completed: self.tasks.iter().filter(|task| task.completed).count(),
            total: self.tasks.len(),
        }
    }

    /// Order-preserving subsequence matching the filter.
    pub fn filtered(&self, filter: Filter) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    /// Ids are creation timestamps in milliseconds, bumped past the current
    /// maximum when two tasks land in the same millisecond.
    fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let stamp = now.timestamp_millis().max(0) as u64;
        let max_existing = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        stamp.max(max_existing + 1)
    }

    fn persist(&self) -> anyhow::Result<()> {
        save_json_atomic(&self.path, &self.tasks)
            .with_context(|| format!("failed to save {}", self.path.display()))
    }
}

/// Best-effort load: a missing or unreadable slot is an empty list, never a
/// fatal condition.
fn load_tasks(path: &Path) -> Vec<Task> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(slot = %path.display(), error = %err, "no readable slot, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!(slot = %path.display(), error = %err, "malformed slot content, starting empty");
            Vec::new()
        }
    }
}

#[tracing::instrument(skip(path, tasks))]
fn save_json_atomic(path: &Path, tasks: &[Task]) -> anyhow::Result<()> {
    debug!(slot = %path.display(), count = tasks.len(), "saving task list");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    let serialized = serde_json::to_string(tasks)?;
    temp.write_all(serialized.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    use super::TaskStore;
    use crate::filter::Filter;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap()
    }

    #[test]
    fn add_prepends_and_rejects_whitespace() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");

        let first = store.add("Buy milk", now()).expect("add").expect("created");
        store
            .add("Walk dog", now() + Duration::minutes(1))
            .expect("add")
            .expect("created");

        assert_eq!(store.add("   ", now()).expect("add"), None);
        assert_eq!(store.add("", now()).expect("add"), None);

        let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Walk dog", "Buy milk"]);
        assert_eq!(store.tasks()[1].id, first.id);
    }

    #[test]
    fn add_trims_text_before_storing() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");

        let task = store
            .add("  Water plants  ", now())
            .expect("add")
            .expect("created");
        assert_eq!(task.text, "Water plants");
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");

        let a = store.add("a", now()).expect("add").expect("created");
        let b = store.add("b", now()).expect("add").expect("created");
        let c = store.add("c", now()).expect("add").expect("created");

        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[test]
    fn toggle_is_idempotent_and_flips_membership() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");
        let task = store.add("Buy milk", now()).expect("add").expect("created");

        assert!(store.toggle(task.id, true).expect("toggle"));
        assert!(store.toggle(task.id, true).expect("toggle"));
        assert!(store.tasks()[0].completed);

        assert_eq!(store.filtered(Filter::Completed).len(), 1);
        assert_eq!(store.filtered(Filter::Pending).len(), 0);

        assert!(store.toggle(task.id, false).expect("toggle"));
        assert_eq!(store.filtered(Filter::Completed).len(), 0);
        assert_eq!(store.filtered(Filter::Pending).len(), 1);

        assert!(!store.toggle(task.id + 999, true).expect("toggle"));
    }

    #[test]
    fn edit_changes_only_the_text() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");
        let task = store.add("Buy milk", now()).expect("add").expect("created");
        store.toggle(task.id, true).expect("toggle");

        assert!(store.edit(task.id, "Buy oat milk").expect("edit"));
        let edited = &store.tasks()[0];
        assert_eq!(edited.text, "Buy oat milk");
        assert_eq!(edited.id, task.id);
        assert!(edited.completed);
        assert_eq!(edited.created_at, task.created_at);

        assert!(!store.edit(task.id, "   ").expect("edit"));
        assert_eq!(store.tasks()[0].text, "Buy oat milk");

        assert!(!store.edit(task.id + 999, "ghost").expect("edit"));
    }

    #[test]
    fn delete_removes_exactly_one_entry() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");
        let milk = store.add("Buy milk", now()).expect("add").expect("created");
        store.add("Walk dog", now()).expect("add").expect("created");

        assert!(store.delete(milk.id).expect("delete"));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "Walk dog");

        assert!(!store.delete(milk.id).expect("delete"));
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn counts_partition_across_filters() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::open(temp.path()).expect("open store");
        for (idx, text) in ["a", "b", "c", "d"].iter().enumerate() {
            let task = store
                .add(text, now() + Duration::seconds(idx as i64))
                .expect("add")
                .expect("created");
            if idx % 2 == 0 {
                store.toggle(task.id, true).expect("toggle");
            }
        }

        let counts = store.count();
        assert!(counts.completed <= counts.total);
        assert_eq!(
            store.filtered(Filter::All).len(),
            store.filtered(Filter::Completed).len() + store.filtered(Filter::Pending).len()
        );
        assert_eq!(counts.total, store.filtered(Filter::All).len());
        assert_eq!(counts.completed, store.filtered(Filter::Completed).len());
    }
}

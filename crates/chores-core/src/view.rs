use chrono::{DateTime, Local, Utc};

use crate::filter::Filter;
use crate::task::{Counts, Task};

/// One visible task row, ready for any frontend to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub created_label: String,
}

/// Pure render output: the filtered rows in list order plus the full-list
/// tally. Event wiring stays out of this type on purpose.
#[derive(Debug, Clone)]
pub struct TaskListView {
    pub rows: Vec<TaskRow>,
    pub filter: Filter,
    pub counts: Counts,
}

impl TaskListView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count line for the header, always computed over the full list:
    /// `"2 / 5 tasks"`.
    pub fn count_line(&self) -> String {
        format!(
            "{} / {} {}",
            self.counts.completed,
            self.counts.total,
            self.counts.noun()
        )
    }
}

pub fn build_view(tasks: &[Task], filter: Filter, counts: Counts) -> TaskListView {
    let rows = tasks
        .iter()
        .filter(|task| filter.matches(task))
        .map(|task| TaskRow {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
            created_label: format_created(task.created_at),
        })
        .collect();

    TaskListView {
        rows,
        filter,
        counts,
    }
}

/// Short local date + time, e.g. `Feb 16, 05:04`.
pub fn format_created(created_at: DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%b %-d, %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::build_view;
    use crate::filter::Filter;
    use crate::task::{Counts, Task};

    fn sample() -> Vec<Task> {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let mut done = Task::new(2, "Buy milk".to_string(), now);
        done.completed = true;
        let open = Task::new(3, "Walk dog".to_string(), now + Duration::minutes(1));
        vec![open, done]
    }

    #[test]
    fn rows_follow_filter_and_preserve_order() {
        let tasks = sample();
        let counts = Counts {
            completed: 1,
            total: 2,
        };

        let all = build_view(&tasks, Filter::All, counts);
        let texts: Vec<&str> = all.rows.iter().map(|row| row.text.as_str()).collect();
        assert_eq!(texts, vec!["Walk dog", "Buy milk"]);

        let completed = build_view(&tasks, Filter::Completed, counts);
        assert_eq!(completed.rows.len(), 1);
        assert_eq!(completed.rows[0].text, "Buy milk");
        assert!(completed.rows[0].completed);

        let pending = build_view(&tasks, Filter::Pending, counts);
        assert_eq!(pending.rows.len(), 1);
        assert_eq!(pending.rows[0].text, "Walk dog");
    }

    #[test]
    fn count_line_ignores_the_active_filter() {
        let tasks = sample();
        let counts = Counts {
            completed: 1,
            total: 2,
        };
        let view = build_view(&tasks, Filter::Pending, counts);
        assert_eq!(view.count_line(), "1 / 2 tasks");
    }

    #[test]
    fn count_line_uses_singular_noun_for_one_task() {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let mut task = Task::new(1, "Buy milk".to_string(), now);
        task.completed = true;
        let view = build_view(
            &[task],
            Filter::All,
            Counts {
                completed: 1,
                total: 1,
            },
        );
        assert_eq!(view.count_line(), "1 / 1 task");
    }

    #[test]
    fn empty_view_signals_placeholder_state() {
        let view = build_view(
            &[],
            Filter::All,
            Counts {
                completed: 0,
                total: 0,
            },
        );
        assert!(view.is_empty());
        assert_eq!(view.count_line(), "0 / 0 tasks");
    }
}

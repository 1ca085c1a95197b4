use crate::task::Task;

/// Visibility filter for the task list. Transient state: it is never
/// persisted and every launch starts at `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Pending,
}

impl Filter {
    /// Tab order as shown in the UI.
    pub const TABS: [Filter; 3] = [Filter::All, Filter::Completed, Filter::Pending];

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Completed => "Completed",
            Filter::Pending => "Pending",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Pending => !task.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Completed,
            Filter::Completed => Filter::Pending,
            Filter::Pending => Filter::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Completed => Filter::All,
            Filter::Pending => Filter::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::Filter;
    use crate::task::Task;

    #[test]
    fn membership_follows_completion() {
        let now = Utc.with_ymd_and_hms(2026, 2, 16, 5, 0, 0).unwrap();
        let mut done = Task::new(1, "done".to_string(), now);
        done.completed = true;
        let open = Task::new(2, "open".to_string(), now);

        assert!(Filter::All.matches(&done));
        assert!(Filter::All.matches(&open));

        assert!(Filter::Completed.matches(&done));
        assert!(!Filter::Completed.matches(&open));

        assert!(!Filter::Pending.matches(&done));
        assert!(Filter::Pending.matches(&open));
    }

    #[test]
    fn cycling_visits_all_tabs_and_wraps() {
        let mut filter = Filter::All;
        for expected in [Filter::Completed, Filter::Pending, Filter::All] {
            filter = filter.next();
            assert_eq!(filter, expected);
        }
        assert_eq!(Filter::All.prev(), Filter::Pending);
        assert_eq!(Filter::All.prev().prev().prev(), Filter::All);
    }
}

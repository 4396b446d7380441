//! Task list derivations: the filter predicate, daily progress and range counts.
//!
//! All functions are pure and take `today` explicitly; callers read it from the
//! local clock once per command.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{DateRange, Priority, Task};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub categories: BTreeSet<String>,
    pub priorities: BTreeSet<Priority>,
    pub date_range: DateRange,
    pub search_query: String,
    pub show_completed: bool,
}

impl TaskFilter {
    /// Every dimension is ANDed; empty sets and an empty query match anything.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.show_completed && task.completed {
            return false;
        }

        let query = self.search_query.trim();
        if !query.is_empty() {
            let query = query.to_lowercase();
            if !task.title.to_lowercase().contains(&query)
                && !task.description.to_lowercase().contains(&query)
            {
                return false;
            }
        }

        if !self.categories.is_empty() && !self.categories.contains(&task.category) {
            return false;
        }

        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }

        in_range(task, self.date_range, today)
    }

    pub fn apply(&self, tasks: &[Task], today: NaiveDate) -> Vec<Task> {
        tasks
            .iter()
            .filter(|task| self.matches(task, today))
            .cloned()
            .collect()
    }

    /// True when the filter differs from the default Today view.
    pub fn is_active(&self) -> bool {
        !self.categories.is_empty()
            || !self.priorities.is_empty()
            || !self.search_query.trim().is_empty()
            || self.date_range != DateRange::Today
            || self.show_completed
    }
}

fn in_range(task: &Task, range: DateRange, today: NaiveDate) -> bool {
    if range == DateRange::All {
        return true;
    }
    let Some(due) = task.due_date else {
        return false;
    };
    match range {
        DateRange::Today => due == today,
        DateRange::Overdue => due < today && !task.completed,
        DateRange::Upcoming => due > today,
        DateRange::All => true,
    }
}

pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due_date.is_some_and(|due| due < today) && !task.completed
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DailyProgress {
    pub completed: usize,
    pub total: usize,
}

impl DailyProgress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Completion over the tasks due today.
pub fn daily_progress(tasks: &[Task], today: NaiveDate) -> DailyProgress {
    let due_today = tasks.iter().filter(|task| task.due_date == Some(today));
    let mut progress = DailyProgress::default();
    for task in due_today {
        progress.total += 1;
        if task.completed {
            progress.completed += 1;
        }
    }
    progress
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RangeCounts {
    pub today: usize,
    pub upcoming: usize,
    pub overdue: usize,
    pub all: usize,
}

impl RangeCounts {
    pub fn get(&self, range: DateRange) -> usize {
        match range {
            DateRange::Today => self.today,
            DateRange::Upcoming => self.upcoming,
            DateRange::Overdue => self.overdue,
            DateRange::All => self.all,
        }
    }
}

/// Open (incomplete) tasks per date range.
pub fn range_counts(tasks: &[Task], today: NaiveDate) -> RangeCounts {
    let mut counts = RangeCounts::default();
    for task in tasks.iter().filter(|task| !task.completed) {
        counts.all += 1;
        match task.due_date {
            Some(due) if due == today => counts.today += 1,
            Some(due) if due < today => counts.overdue += 1,
            Some(_) => counts.upcoming += 1,
            None => {}
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 11).expect("valid date")
    }

    fn task(id: i64, title: &str, due_offset: Option<i64>, completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            category: "General".to_string(),
            due_date: due_offset.map(|days| today() + Duration::days(days)),
            completed,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Task> {
        let mut tasks = vec![
            task(1, "Pay rent", Some(0), false),
            task(2, "Water plants", Some(0), true),
            task(3, "File taxes", Some(-3), false),
            task(4, "Old chore", Some(-1), true),
            task(5, "Plan holiday", Some(5), false),
            task(6, "Someday idea", None, false),
        ];
        tasks[0].category = "Home".to_string();
        tasks[0].priority = Priority::High;
        tasks[2].description = "Deadline from the TAX office".to_string();
        tasks[4].priority = Priority::Low;
        tasks
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|task| task.id).collect()
    }

    #[test]
    fn default_filter_shows_open_tasks_due_today() {
        let filter = TaskFilter::default();
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![1]);
    }

    #[test]
    fn show_completed_includes_done_tasks_due_today() {
        let filter = TaskFilter {
            show_completed: true,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![1, 2]);
    }

    #[test]
    fn hiding_completed_excludes_every_completed_task() {
        for range in [
            DateRange::Today,
            DateRange::Upcoming,
            DateRange::Overdue,
            DateRange::All,
        ] {
            let filter = TaskFilter {
                date_range: range,
                ..Default::default()
            };
            let visible = filter.apply(&sample(), today());
            assert!(visible.iter().all(|task| !task.completed), "{range:?}");
        }
    }

    #[test]
    fn overdue_ignores_completed_even_when_shown() {
        let filter = TaskFilter {
            date_range: DateRange::Overdue,
            show_completed: true,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![3]);
    }

    #[test]
    fn upcoming_keeps_future_due_dates_only() {
        let filter = TaskFilter {
            date_range: DateRange::Upcoming,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![5]);
    }

    #[test]
    fn tasks_without_due_date_only_appear_in_all() {
        let undated = vec![task(6, "Someday idea", None, false)];
        for range in [DateRange::Today, DateRange::Upcoming, DateRange::Overdue] {
            let filter = TaskFilter {
                date_range: range,
                ..Default::default()
            };
            assert!(filter.apply(&undated, today()).is_empty(), "{range:?}");
        }
        let filter = TaskFilter {
            date_range: DateRange::All,
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&undated, today())), vec![6]);
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let filter = TaskFilter {
            date_range: DateRange::All,
            search_query: "tax".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![3]);

        let filter = TaskFilter {
            date_range: DateRange::All,
            search_query: "PLAN".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![5]);
    }

    #[test]
    fn category_and_priority_sets_are_anded() {
        let mut filter = TaskFilter {
            date_range: DateRange::All,
            ..Default::default()
        };
        filter.categories.insert("Home".to_string());
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![1]);

        filter.priorities.insert(Priority::Low);
        assert!(filter.apply(&sample(), today()).is_empty());

        filter.priorities.insert(Priority::High);
        assert_eq!(ids(&filter.apply(&sample(), today())), vec![1]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut filters = vec![TaskFilter::default()];
        for range in [DateRange::Upcoming, DateRange::Overdue, DateRange::All] {
            filters.push(TaskFilter {
                date_range: range,
                show_completed: true,
                search_query: "a".to_string(),
                ..Default::default()
            });
        }
        for filter in filters {
            let once = filter.apply(&sample(), today());
            let twice = filter.apply(&once, today());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn daily_progress_counts_tasks_due_today() {
        let progress = daily_progress(&sample(), today());
        assert_eq!(progress, DailyProgress { completed: 1, total: 2 });
        assert!((progress.percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn daily_progress_is_zero_without_tasks_today() {
        let progress = daily_progress(&[task(1, "later", Some(2), true)], today());
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage(), 0.0);
    }

    #[test]
    fn range_counts_only_count_open_tasks() {
        let counts = range_counts(&sample(), today());
        assert_eq!(
            counts,
            RangeCounts {
                today: 1,
                upcoming: 1,
                overdue: 1,
                all: 4,
            }
        );
        assert_eq!(counts.get(DateRange::All), 4);
    }

    #[test]
    fn overdue_flag_requires_open_past_due_task() {
        let tasks = sample();
        assert!(is_overdue(&tasks[2], today()));
        assert!(!is_overdue(&tasks[3], today()));
        assert!(!is_overdue(&tasks[0], today()));
        assert!(!is_overdue(&tasks[5], today()));
    }

    #[test]
    fn is_active_detects_non_default_views() {
        assert!(!TaskFilter::default().is_active());
        assert!(TaskFilter {
            date_range: DateRange::All,
            ..Default::default()
        }
        .is_active());
        assert!(TaskFilter {
            search_query: "x".to_string(),
            ..Default::default()
        }
        .is_active());
    }
}

//! Projections recomputed from the store's collection on every read.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::model::{Task, TaskStatus};

/// Number of tasks per status shown in the dashboard's recent columns.
pub const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
}

pub fn by_status(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|task| task.status == status).collect()
}

/// Tasks scheduled on `date` in the local time zone.
pub fn by_exact_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    by_exact_date_in(tasks, date, &Local)
}

pub fn by_exact_date_in<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.scheduled_date_in(tz) == Some(date))
        .collect()
}

pub fn is_today(task: &Task) -> bool {
    is_on(task, Local::now().date_naive(), &Local)
}

pub fn is_on<Tz: TimeZone>(task: &Task, day: NaiveDate, tz: &Tz) -> bool {
    task.scheduled_date_in(tz) == Some(day)
}

pub fn today(tasks: &[Task]) -> Vec<&Task> {
    by_exact_date(tasks, Local::now().date_naive())
}

pub fn counts_by_status(tasks: &[Task]) -> StatusCounts {
    tasks
        .iter()
        .fold(StatusCounts::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
            counts.total += 1;
            counts
        })
}

/// First `limit` tasks with `status`, in collection order.
pub fn recent(tasks: &[Task], status: TaskStatus, limit: usize) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.status == status)
        .take(limit)
        .collect()
}

/// Scheduled tasks keyed by calendar date; unscheduled tasks are left out.
pub fn group_by_date<'a, Tz: TimeZone>(
    tasks: &'a [Task],
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        if let Some(date) = task.scheduled_date_in(tz) {
            grouped.entry(date).or_default().push(task);
        }
    }
    grouped
}

/// Summary feeding the dashboard: tallies plus the latest tasks of each status.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    pub counts: StatusCounts,
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> Dashboard<'a> {
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        Self {
            counts: counts_by_status(tasks),
            pending: recent(tasks, TaskStatus::Pending, RECENT_LIMIT),
            completed: recent(tasks, TaskStatus::Completed, RECENT_LIMIT),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::task;
    use super::*;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.title.clone()).collect()
    }

    fn scenario() -> Vec<Task> {
        vec![
            task("a", "A", TaskStatus::Pending, Some("2024-06-01")),
            task("b", "B", TaskStatus::Completed, Some("2024-06-02")),
        ]
    }

    #[test]
    fn filters_scenario_by_status_and_date() {
        let tasks = scenario();
        assert_eq!(titles(&by_status(&tasks, TaskStatus::Pending)), vec!["A"]);
        assert_eq!(titles(&by_exact_date(&tasks, ymd(2024, 6, 2))), vec!["B"]);
    }

    #[test]
    fn unscheduled_and_unparseable_tasks_only_show_in_status_views() {
        let mut tasks = scenario();
        tasks.push(task("c", "C", TaskStatus::Pending, None));
        tasks.push(task("d", "D", TaskStatus::Pending, Some("whenever")));

        let grouped = group_by_date(&tasks, &Utc);
        assert_eq!(grouped.values().map(Vec::len).sum::<usize>(), 2);
        assert!(by_exact_date_in(&tasks, ymd(2024, 6, 1), &Utc)
            .iter()
            .all(|task| task.scheduled_at.as_deref() == Some("2024-06-01")));
        assert_eq!(
            titles(&by_status(&tasks, TaskStatus::Pending)),
            vec!["A", "C", "D"]
        );
        assert_eq!(counts_by_status(&tasks).total, 4);
    }

    #[test]
    fn exact_date_honours_time_zone_for_instants() {
        let tasks = vec![task(
            "late",
            "Late call",
            TaskStatus::Pending,
            Some("2024-06-02T02:00:00Z"),
        )];
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(by_exact_date_in(&tasks, ymd(2024, 6, 1), &new_york).len(), 1);
        assert_eq!(by_exact_date_in(&tasks, ymd(2024, 6, 2), &Utc).len(), 1);
        assert!(is_on(&tasks[0], ymd(2024, 6, 1), &new_york));
        assert!(!is_on(&tasks[0], ymd(2024, 6, 2), &new_york));
    }

    #[test]
    fn is_today_ignores_time_of_day() {
        let today = Local::now().date_naive();
        let morning = today
            .and_hms_opt(0, 5, 0)
            .unwrap()
            .format("%Y-%m-%dT%H:%M")
            .to_string();
        let date_only = today.format("%Y-%m-%d").to_string();
        let tasks = vec![
            task("x", "Morning", TaskStatus::Pending, Some(morning.as_str())),
            task("y", "Date only", TaskStatus::Pending, Some(date_only.as_str())),
            task("z", "Never", TaskStatus::Pending, None),
        ];
        assert!(is_today(&tasks[0]));
        assert!(is_today(&tasks[1]));
        assert!(!is_today(&tasks[2]));
        assert_eq!(today_titles(&tasks), vec!["Morning", "Date only"]);
    }

    fn today_titles(tasks: &[Task]) -> Vec<String> {
        titles(&today(tasks))
    }

    #[test]
    fn counts_total_matches_length() {
        let mut tasks = scenario();
        assert_eq!(
            counts_by_status(&tasks),
            StatusCounts {
                pending: 1,
                completed: 1,
                total: 2
            }
        );
        tasks.clear();
        assert_eq!(counts_by_status(&tasks), StatusCounts::default());
    }

    #[test]
    fn dashboard_caps_recent_columns() {
        let tasks: Vec<Task> = (0..5)
            .map(|i| task(&format!("p{i}"), &format!("P{i}"), TaskStatus::Pending, None))
            .chain(std::iter::once(task("c0", "C0", TaskStatus::Completed, None)))
            .collect();
        let dashboard = Dashboard::from_tasks(&tasks);
        assert_eq!(titles(&dashboard.pending), vec!["P0", "P1", "P2"]);
        assert_eq!(titles(&dashboard.completed), vec!["C0"]);
        assert_eq!(dashboard.counts.total, 6);
    }
}

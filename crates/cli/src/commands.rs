use std::fmt;
use std::io::Write;

use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDate};

use crate::calendar::MonthGrid;
use crate::capture::{CaptureInput, EditInput};
use crate::cli::{CalendarArgs, CliCommand, DeleteArgs, EditArgs, ListArgs};
use crate::core::{Dashboard, Task, TaskError, TaskStatus, TaskStore};
use crate::parser::parse_schedule_spec;
use crate::views;

pub async fn execute<W: Write>(
    store: &TaskStore,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::List(args) => handle_list(store, &args, &mut writer).await,
        CliCommand::Show(args) => {
            let task = store.fetch(&args.id).await?;
            write_details(&task, &mut writer)
        }
        CliCommand::Add(args) => {
            let draft = CaptureInput::from(args).into_new_task()?;
            let task = store.create(draft).await?;
            writeln!(writer, "Created {}", TaskLine(&task))?;
            Ok(())
        }
        CliCommand::Edit(args) => handle_edit(store, args, &mut writer).await,
        CliCommand::Toggle(args) => {
            let task = store.toggle_status(&args.id).await?;
            let status = task.status.as_str().to_lowercase();
            writeln!(writer, "Marked \"{}\" {status}", task.title)?;
            Ok(())
        }
        CliCommand::Delete(args) => handle_delete(store, &args, &mut writer).await,
        CliCommand::Today => {
            store.refresh(None).await?;
            let tasks = store.tasks();
            write_section(&views::today(&tasks), "Nothing scheduled for today", &mut writer)
        }
        CliCommand::Calendar(args) => handle_calendar(store, &args, &mut writer).await,
        CliCommand::Dashboard => {
            store.refresh(None).await?;
            let tasks = store.tasks();
            write_dashboard(&Dashboard::from_tasks(&tasks), &mut writer)
        }
    }
}

async fn handle_list<W: Write>(store: &TaskStore, args: &ListArgs, mut writer: W) -> Result<()> {
    let date = match &args.date {
        Some(spec) => Some(parse_schedule_spec(spec)?.date()),
        None => None,
    };
    store.refresh(date).await?;
    let tasks = store.tasks();
    write_section(&args.status.apply(&tasks), "No tasks found", &mut writer)
}

async fn handle_edit<W: Write>(store: &TaskStore, args: EditArgs, mut writer: W) -> Result<()> {
    let id = args.id.clone();
    let patch = EditInput::from(args).into_patch()?;
    if patch.is_empty() {
        bail!("Nothing to update: pass --title, --description, --status, --at or --unschedule");
    }
    let task = store.update(&id, patch).await?;
    writeln!(writer, "Updated {}", TaskLine(&task))?;
    Ok(())
}

async fn handle_delete<W: Write>(
    store: &TaskStore,
    args: &DeleteArgs,
    mut writer: W,
) -> Result<()> {
    let mut summary = DeleteSummary::default();
    for id in &args.ids {
        match store.delete(id).await {
            Ok(()) => summary.deleted += 1,
            Err(err) if err.is_not_found() => summary.missing.push(id.clone()),
            Err(err) => {
                summary.write_to(&mut writer)?;
                return Err(err.into());
            }
        }
    }
    summary.write_to(&mut writer)
}

async fn handle_calendar<W: Write>(
    store: &TaskStore,
    args: &CalendarArgs,
    mut writer: W,
) -> Result<()> {
    let grid = match &args.month {
        Some(label) => MonthGrid::parse(label)?,
        None => MonthGrid::containing(Local::now().date_naive()),
    };
    store.refresh(None).await?;
    let tasks = store.tasks();
    let days = grid.tasks_by_day(&tasks, &Local);
    write_calendar(&grid, &days, &mut writer)
}

/// One-line rendering used by every listing.
struct TaskLine<'a>(&'a Task);

impl fmt::Display for TaskLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.0;
        let mark = match task.status {
            TaskStatus::Pending => ' ',
            TaskStatus::Completed => 'x',
        };
        write!(f, "[{mark}] {}  {}", task.id, task.title)?;
        if let Some(date) = task.scheduled_date_in(&Local) {
            write!(f, " ({})", date.format("%a %b %-d"))?;
        }
        Ok(())
    }
}

fn write_section<W: Write>(tasks: &[&Task], empty: &str, mut writer: W) -> Result<()> {
    if tasks.is_empty() {
        writeln!(writer, "{empty}")?;
    }
    for task in tasks {
        writeln!(writer, "{}", TaskLine(task))?;
    }
    Ok(())
}

fn write_details<W: Write>(task: &Task, mut writer: W) -> Result<()> {
    writeln!(writer, "id:          {}", task.id)?;
    writeln!(writer, "title:       {}", task.title)?;
    writeln!(writer, "status:      {}", task.status)?;
    writeln!(
        writer,
        "description: {}",
        task.description.as_deref().unwrap_or("-")
    )?;
    writeln!(
        writer,
        "scheduled:   {}",
        task.scheduled_at.as_deref().unwrap_or("-")
    )?;
    writeln!(writer, "created:     {}", task.created_at.to_rfc3339())?;
    writeln!(writer, "updated:     {}", task.updated_at.to_rfc3339())?;
    Ok(())
}

fn write_dashboard<W: Write>(dashboard: &Dashboard<'_>, mut writer: W) -> Result<()> {
    let counts = dashboard.counts;
    if counts.total == 0 {
        writeln!(writer, "No tasks yet. Add one with `tacktrack add <title>`.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{} tasks: {} pending, {} completed",
        counts.total, counts.pending, counts.completed
    )?;
    writeln!(writer)?;
    writeln!(writer, "Recent pending")?;
    write_section(&dashboard.pending, "  none", &mut writer)?;
    writeln!(writer)?;
    writeln!(writer, "Recently completed")?;
    write_section(&dashboard.completed, "  none", &mut writer)?;
    Ok(())
}

const WEEKDAY_HEADER: &str = "Su  Mo  Tu  We  Th  Fr  Sa";
const CELL_WIDTH: usize = 4;

fn write_calendar<W: Write>(
    grid: &MonthGrid,
    days: &[(NaiveDate, Vec<&Task>)],
    mut writer: W,
) -> Result<()> {
    writeln!(writer, "{:^width$}", grid.title(), width = WEEKDAY_HEADER.len())?;
    writeln!(writer, "{WEEKDAY_HEADER}")?;

    let mut cells = vec![" ".repeat(CELL_WIDTH); grid.leading_blanks()];
    cells.extend(days.iter().map(|(day, tasks)| {
        let marker = if tasks.is_empty() { "" } else { "*" };
        format!("{:>2}{:<2}", day.day(), marker)
    }));
    for week in cells.chunks(7) {
        writeln!(writer, "{}", week.concat().trim_end())?;
    }

    for (day, tasks) in days.iter().filter(|(_, tasks)| !tasks.is_empty()) {
        writeln!(writer)?;
        writeln!(writer, "{}", day.format("%A %-d"))?;
        for task in tasks {
            writeln!(writer, "  {}", TaskLine(task))?;
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct DeleteSummary {
    deleted: usize,
    missing: Vec<String>,
}

impl DeleteSummary {
    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::deleted(self.deleted))?;
        if !self.missing.is_empty() {
            writeln!(writer, "Not found: {}", self.missing.join(", "))?;
        }
        Ok(())
    }
}

enum SummaryLine {
    Deleted(usize),
    NoneDeleted,
}

impl SummaryLine {
    fn deleted(count: usize) -> Self {
        if count > 0 {
            SummaryLine::Deleted(count)
        } else {
            SummaryLine::NoneDeleted
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Deleted(count) => write!(
                f,
                "Deleted {} task{}",
                count,
                if *count == 1 { "" } else { "s" }
            ),
            SummaryLine::NoneDeleted => write!(f, "No tasks deleted"),
        }
    }
}

/// Surface a store failure the way the command line reports it.
pub fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TaskError>() {
        Some(TaskError::Network(_)) => format!(
            "{err}\nIs the task server running? Set --api-url or TACKTRACK_API_URL to point at it."
        ),
        _ => format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AddArgs, IdArgs};
    use crate::core::{MemoryGateway, NewTask, TaskGateway, TaskPatch};
    use crate::model::TaskFilter;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Backend that refuses to delete one particular id.
    struct LockedGateway {
        inner: MemoryGateway,
        locked: &'static str,
    }

    #[async_trait]
    impl TaskGateway for LockedGateway {
        async fn list(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, TaskError> {
            self.inner.list(date).await
        }

        async fn get(&self, id: &str) -> Result<Task, TaskError> {
            self.inner.get(id).await
        }

        async fn create(&self, draft: &NewTask) -> Result<Task, TaskError> {
            self.inner.create(draft).await
        }

        async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
            self.inner.update(id, patch).await
        }

        async fn toggle_status(&self, id: &str) -> Result<Task, TaskError> {
            self.inner.toggle_status(id).await
        }

        async fn delete(&self, id: &str) -> Result<(), TaskError> {
            if id == self.locked {
                return Err(TaskError::Gateway {
                    status: 500,
                    message: "record is locked".into(),
                });
            }
            self.inner.delete(id).await
        }
    }

    /// Writer that reads the store on every write, like a redraw hook would.
    struct StoreAwareWriter<'a> {
        store: &'a TaskStore,
        output: Vec<u8>,
        observed: usize,
    }

    impl Write for StoreAwareWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.observed = self.store.tasks().len();
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn store() -> (TaskStore, Arc<MemoryGateway>) {
        let backend = Arc::new(MemoryGateway::new());
        (TaskStore::new(backend.clone()), backend)
    }

    async fn seed(store: &TaskStore, title: &str, scheduled: Option<&str>) -> Task {
        let mut draft = NewTask::titled(title);
        draft.scheduled_at = scheduled.map(str::to_string);
        store.create(draft).await.unwrap()
    }

    async fn run(store: &TaskStore, command: CliCommand) -> Result<String> {
        let mut output = Vec::new();
        execute(store, command, &mut output).await?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn add_creates_and_reports_the_task() {
        let (store, backend) = store();
        let args = AddArgs {
            text: vec!["Buy".into(), "milk".into()],
            description: Some("  ".into()),
            scheduled: Some("2024-06-01".into()),
        };
        let output = run(&store, CliCommand::Add(args)).await.unwrap();

        let records = backend.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Buy milk");
        assert_eq!(records[0].description, None);
        assert_eq!(records[0].scheduled_at.as_deref(), Some("2024-06-01"));
        assert!(output.starts_with("Created [ ] "));
        assert!(output.contains("Buy milk (Sat Jun 1)"));
    }

    #[tokio::test]
    async fn blank_add_is_rejected_without_a_request() {
        let (store, backend) = store();
        let args = AddArgs {
            text: vec!["   ".into()],
            description: None,
            scheduled: None,
        };
        assert!(run(&store, CliCommand::Add(args)).await.is_err());
        assert_eq!(backend.requests(), 0);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_date() {
        let (store, _backend) = store();
        seed(&store, "A", Some("2024-06-01")).await;
        let b = seed(&store, "B", Some("2024-06-02")).await;
        store.toggle_status(&b.id).await.unwrap();

        let pending = ListArgs {
            date: None,
            status: TaskFilter::Pending,
        };
        let output = run(&store, CliCommand::List(pending)).await.unwrap();
        assert!(output.contains("  A (Sat Jun 1)"));
        assert!(!output.contains("  B"));

        let dated = ListArgs {
            date: Some("2024-06-02".into()),
            status: TaskFilter::All,
        };
        let output = run(&store, CliCommand::List(dated)).await.unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("[x] "));

        let empty = ListArgs {
            date: Some("2024-06-03".into()),
            status: TaskFilter::All,
        };
        let output = run(&store, CliCommand::List(empty)).await.unwrap();
        assert_eq!(output, "No tasks found\n");
    }

    #[tokio::test]
    async fn toggle_and_show_reflect_server_state() {
        let (store, _backend) = store();
        let task = seed(&store, "Water plants", None).await;

        let output = run(&store, CliCommand::Toggle(IdArgs { id: task.id.clone() }))
            .await
            .unwrap();
        assert_eq!(output, "Marked \"Water plants\" completed\n");

        let output = run(&store, CliCommand::Show(IdArgs { id: task.id.clone() }))
            .await
            .unwrap();
        assert!(output.contains(&format!("id:          {}", task.id)));
        assert!(output.contains("status:      Completed"));
        assert!(output.contains("scheduled:   -"));
    }

    #[tokio::test]
    async fn edit_requires_at_least_one_field() {
        let (store, backend) = store();
        let task = seed(&store, "Draft", None).await;
        let requests = backend.requests();

        let args = EditArgs {
            id: task.id.clone(),
            title: None,
            description: None,
            status: None,
            scheduled: None,
            unschedule: false,
        };
        let err = run(&store, CliCommand::Edit(args)).await.unwrap_err();
        assert!(err.to_string().starts_with("Nothing to update"));
        assert_eq!(backend.requests(), requests);

        let args = EditArgs {
            id: task.id.clone(),
            title: Some("Final".into()),
            description: None,
            status: None,
            scheduled: None,
            unschedule: false,
        };
        let output = run(&store, CliCommand::Edit(args)).await.unwrap();
        assert!(output.contains("Final"));
        assert_eq!(backend.records()[0].title, "Final");
    }

    #[tokio::test]
    async fn delete_reports_deleted_and_missing() {
        let (store, _backend) = store();
        let task = seed(&store, "Test", None).await;

        let args = DeleteArgs {
            ids: vec![task.id.clone(), "missing".into()],
        };
        let output = run(&store, CliCommand::Delete(args)).await.unwrap();
        assert!(output.contains("Deleted 1 task\n"));
        assert!(output.contains("Not found: missing"));
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn delete_handles_no_matches() {
        let (store, _backend) = store();
        let args = DeleteArgs {
            ids: vec!["missing".into()],
        };
        let output = run(&store, CliCommand::Delete(args)).await.unwrap();
        assert!(output.contains("No tasks deleted"));
    }

    #[tokio::test]
    async fn delete_reports_progress_before_a_server_failure() {
        let store = TaskStore::new(Arc::new(LockedGateway {
            inner: MemoryGateway::new(),
            locked: "locked",
        }));
        let first = seed(&store, "First", None).await;
        let last = seed(&store, "Last", None).await;

        let args = DeleteArgs {
            ids: vec![
                first.id.clone(),
                "missing".into(),
                "locked".into(),
                last.id.clone(),
            ],
        };
        let mut output = Vec::new();
        let err = execute(&store, CliCommand::Delete(args), &mut output)
            .await
            .unwrap_err();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Deleted 1 task\nNot found: missing\n"
        );
        assert!(err.to_string().contains("record is locked"));
        assert!(store.find(&first.id).is_none());
        assert!(store.find(&last.id).is_some());
    }

    #[tokio::test]
    async fn rendering_runs_outside_the_store_lock() {
        let (store, _backend) = store();
        seed(&store, "Open", Some("2024-06-03")).await;

        let commands = [
            CliCommand::Dashboard,
            CliCommand::Today,
            CliCommand::List(ListArgs::default()),
            CliCommand::Calendar(CalendarArgs {
                month: Some("2024-06".into()),
            }),
        ];
        for command in commands {
            let mut writer = StoreAwareWriter {
                store: &store,
                output: Vec::new(),
                observed: 0,
            };
            execute(&store, command, &mut writer).await.unwrap();
            assert_eq!(writer.observed, 1);
            assert!(!writer.output.is_empty());
        }
    }

    #[tokio::test]
    async fn today_lists_only_todays_tasks() {
        let (store, _backend) = store();
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        seed(&store, "Now", Some(today.as_str())).await;
        seed(&store, "Later", Some("1999-01-01")).await;

        let output = run(&store, CliCommand::Today).await.unwrap();
        assert!(output.contains("Now"));
        assert!(!output.contains("Later"));
    }

    #[tokio::test]
    async fn calendar_marks_busy_days() {
        let (store, _backend) = store();
        seed(&store, "Dentist", Some("2024-06-03")).await;
        seed(&store, "Elsewhere", Some("2024-07-03")).await;

        let args = CalendarArgs {
            month: Some("2024-06".into()),
        };
        let output = run(&store, CliCommand::Calendar(args)).await.unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0].trim(), "June 2024");
        assert_eq!(lines[1], WEEKDAY_HEADER);
        assert_eq!(lines[2], format!("{} 1", " ".repeat(CELL_WIDTH * 6)));
        assert_eq!(lines[3], " 2   3*  4   5   6   7   8");
        assert!(output.contains("Monday 3\n"));
        assert!(output.contains("Dentist"));
        assert!(!output.contains("Elsewhere"));
    }

    #[tokio::test]
    async fn dashboard_summarises_counts() {
        let (store, _backend) = store();
        let output = run(&store, CliCommand::Dashboard).await.unwrap();
        assert!(output.starts_with("No tasks yet"));

        let done = seed(&store, "Done", None).await;
        seed(&store, "Open", None).await;
        store.toggle_status(&done.id).await.unwrap();

        let output = run(&store, CliCommand::Dashboard).await.unwrap();
        assert!(output.starts_with("2 tasks: 1 pending, 1 completed"));
        assert!(output.contains("Recent pending\n[ ] "));
        assert!(output.contains("Recently completed\n[x] "));
    }

    #[test]
    fn network_failures_get_a_hint() {
        let err = anyhow::Error::from(TaskError::Network("connection refused".into()));
        assert!(describe_error(&err).contains("TACKTRACK_API_URL"));

        let err = anyhow::Error::from(TaskError::empty_title());
        assert_eq!(describe_error(&err), "Task title cannot be empty");
    }
}

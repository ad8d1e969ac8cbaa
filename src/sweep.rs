//! The periodic due-task sweep.
//!
//! Every tick the sweep queries for incomplete tasks due inside the reminder
//! window and for incomplete tasks that are already due, and publishes one
//! notice per matching task. The sweep keeps no state of its own, so a task is
//! re-announced on every tick it matches; notices are broadcast to every
//! connected client regardless of who owns the task.

use chrono::{DateTime, Duration, Utc};
use entity::task;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    constants::{REMINDER_FAR_MINS, REMINDER_NEAR_MINS, SWEEP_INTERVAL},
    error::ServerError,
    server::State,
};

/// A realtime notification event, broadcast to all connected clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub(crate) enum Notice {
    #[serde(rename = "task-reminder", rename_all = "camelCase")]
    TaskReminder {
        task_name: String,
        due_date: DateTime<Utc>,
        message: String,
    },
    #[serde(rename = "due-now", rename_all = "camelCase")]
    DueNow {
        task_name: String,
        due_date: DateTime<Utc>,
        message: String,
    },
}

/// The `[near, far]` due-date window announced ahead of time.
pub(crate) fn reminder_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now + Duration::minutes(REMINDER_NEAR_MINS),
        now + Duration::minutes(REMINDER_FAR_MINS),
    )
}

fn reminder_message(task_name: &str, minutes_left: i64) -> String {
    format!(
        "Reminder: Task \"{}\" is due in {} hours and {} minutes.",
        task_name,
        minutes_left / 60,
        minutes_left % 60
    )
}

fn due_now_message(task_name: &str) -> String {
    format!("Task \"{}\" is due right now!", task_name)
}

/// Run one sweep against the store, publishing a notice per matching task.
///
/// Queries are idempotent; a failed tick is logged by the caller and simply
/// retried on the next interval.
pub(crate) async fn sweep_once(
    db: &DatabaseConnection,
    notifier: &broadcast::Sender<Notice>,
    now: DateTime<Utc>,
) -> Result<(), ServerError> {
    let (near, far) = reminder_window(now);

    let upcoming = task::Entity::find()
        .filter(task::Column::Completed.eq(false))
        .filter(task::Column::DueDate.gte(near))
        .filter(task::Column::DueDate.lte(far))
        .all(db)
        .await?;

    for task in upcoming {
        let minutes_left = (task.due_date - now).num_minutes();
        tracing::info!(
            "Reminder: task {:?} is due in {} minutes at {}",
            task.task_name,
            minutes_left,
            task.due_date
        );
        // a send error only means no client is connected right now
        let _ = notifier.send(Notice::TaskReminder {
            message: reminder_message(&task.task_name, minutes_left),
            task_name: task.task_name,
            due_date: task.due_date,
        });
    }

    let due_now = task::Entity::find()
        .filter(task::Column::Completed.eq(false))
        .filter(task::Column::DueDate.lte(now))
        .all(db)
        .await?;

    for task in due_now {
        tracing::info!(
            "Task {:?} is due now (due date was {})",
            task.task_name,
            task.due_date
        );
        let _ = notifier.send(Notice::DueNow {
            message: due_now_message(&task.task_name),
            task_name: task.task_name,
            due_date: task.due_date,
        });
    }

    Ok(())
}

/// Run the sweep forever on a fixed interval.
pub(crate) async fn run(state: Arc<State>) {
    run_with(state.db.clone(), state.notifier.clone()).await
}

async fn run_with(db: DatabaseConnection, notifier: broadcast::Sender<Notice>) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    // the first tick completes immediately; consume it so the first sweep
    // waits a full interval instead of firing at startup
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(err) = sweep_once(&db, &notifier, Utc::now()).await {
            tracing::error!("reminder sweep failed: {:?}", err);
        }
    }
}

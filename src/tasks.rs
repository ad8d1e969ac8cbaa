//! Task CRUD action-like resources.
//!
//! Every operation takes the authenticated caller explicitly and enforces that
//! a task is only ever read back to or mutated by its owner. The owner is set
//! at creation and never changes.

use chrono::{DateTime, Utc};
use entity::task;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::Deserialize;
use ulid::Ulid;
use uuid::Uuid;
use validator::Validate;

use crate::{auth::UserInfo, error::ServerError};

/// The action by which a task is created.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewTask {
    pub(crate) task_name: String,
    pub(crate) due_date: DateTime<Utc>,
}

/// The action by which a task is edited. Can be understood as a sort of changeset.
///
/// Only supplied fields are applied, and an empty name is ignored like an
/// absent one, so a field cannot be cleared to empty.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditTask {
    pub(crate) task_name: Option<String>,
    pub(crate) due_date: Option<DateTime<Utc>>,
}

fn ensure_owner(task: &task::Model, user: &UserInfo) -> Result<(), ServerError> {
    if task.user_id != user.id {
        return Err(ServerError::NotAuthorized);
    }
    Ok(())
}

async fn find_task(db: &DatabaseConnection, id: Uuid) -> Result<task::Model, ServerError> {
    task::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServerError::TaskNotFound)
}

fn apply_edit(task: task::Model, input: EditTask) -> task::ActiveModel {
    let mut task: task::ActiveModel = task.into();
    if let Some(name) = input.task_name.filter(|name| !name.is_empty()) {
        task.task_name = Set(name);
    }
    if let Some(due_date) = input.due_date {
        task.due_date = Set(due_date);
    }
    task
}

/// All tasks owned by the caller, in storage order.
pub(crate) async fn list(
    db: &DatabaseConnection,
    user: &UserInfo,
) -> Result<Vec<task::Model>, ServerError> {
    Ok(task::Entity::find()
        .filter(task::Column::UserId.eq(user.id))
        .all(db)
        .await?)
}

/// Persist a new task owned by the caller, not yet completed.
pub(crate) async fn create(
    db: &DatabaseConnection,
    user: &UserInfo,
    input: NewTask,
) -> Result<task::Model, ServerError> {
    let task = task::ActiveModel {
        id: Set(Uuid::from(Ulid::new())),
        user_id: Set(user.id),
        task_name: Set(input.task_name),
        due_date: Set(input.due_date),
        completed: Set(false),
    };
    Ok(task.insert(db).await?)
}

/// Apply the supplied fields to an owned task.
pub(crate) async fn edit(
    db: &DatabaseConnection,
    user: &UserInfo,
    id: Uuid,
    input: EditTask,
) -> Result<task::Model, ServerError> {
    let task = find_task(db, id).await?;
    ensure_owner(&task, user)?;

    let changeset = apply_edit(task.clone(), input);
    if !changeset.is_changed() {
        return Ok(task);
    }
    Ok(changeset.update(db).await?)
}

/// Remove an owned task.
pub(crate) async fn delete(
    db: &DatabaseConnection,
    user: &UserInfo,
    id: Uuid,
) -> Result<(), ServerError> {
    let task = find_task(db, id).await?;
    ensure_owner(&task, user)?;

    task::Entity::delete_by_id(task.id).exec(db).await?;
    Ok(())
}

/// Flip the completed flag on an owned task.
pub(crate) async fn toggle_complete(
    db: &DatabaseConnection,
    user: &UserInfo,
    id: Uuid,
) -> Result<task::Model, ServerError> {
    let task = find_task(db, id).await?;
    ensure_owner(&task, user)?;

    let completed = !task.completed;
    let mut task: task::ActiveModel = task.into();
    task.completed = Set(completed);
    Ok(task.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase, MockExecResult};

    fn caller() -> UserInfo {
        UserInfo {
            id: Uuid::new_v4(),
            name: "frieda".to_owned(),
        }
    }

    fn task_owned_by(user: &UserInfo) -> task::Model {
        task::Model {
            id: Uuid::new_v4(),
            user_id: user.id,
            task_name: "Pay rent".to_owned(),
            due_date: Utc::now() + Duration::hours(4),
            completed: false,
        }
    }

    #[test]
    fn owner_check_rejects_other_users() {
        let owner = caller();
        let stranger = caller();
        let task = task_owned_by(&owner);

        assert!(ensure_owner(&task, &owner).is_ok());
        assert!(matches!(
            ensure_owner(&task, &stranger),
            Err(ServerError::NotAuthorized)
        ));
    }

    #[test]
    fn edit_applies_only_supplied_fields() {
        let owner = caller();
        let task = task_owned_by(&owner);
        let original_due = task.due_date;

        let changeset = apply_edit(
            task,
            EditTask {
                task_name: Some("Pay rent and utilities".to_owned()),
                due_date: None,
            },
        );

        assert_eq!(
            changeset.task_name,
            ActiveValue::Set("Pay rent and utilities".to_owned())
        );
        assert_eq!(changeset.due_date, ActiveValue::Unchanged(original_due));
    }

    #[test]
    fn edit_ignores_empty_name() {
        let owner = caller();
        let task = task_owned_by(&owner);
        let new_due = task.due_date + Duration::hours(1);

        let changeset = apply_edit(
            task,
            EditTask {
                task_name: Some(String::new()),
                due_date: Some(new_due),
            },
        );

        assert_eq!(
            changeset.task_name,
            ActiveValue::Unchanged("Pay rent".to_owned())
        );
        assert_eq!(changeset.due_date, ActiveValue::Set(new_due));
    }

    #[tokio::test]
    async fn create_persists_incomplete_task_for_caller() {
        let owner = caller();
        let due = Utc::now() + Duration::hours(4);
        let stored = task::Model {
            id: Uuid::new_v4(),
            user_id: owner.id,
            task_name: "Pay rent".to_owned(),
            due_date: due,
            completed: false,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let task = create(
            &db,
            &owner,
            NewTask {
                task_name: "Pay rent".to_owned(),
                due_date: due,
            },
        )
        .await
        .unwrap();

        assert_eq!(task.user_id, owner.id);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn edit_by_non_owner_is_not_authorized() {
        let owner = caller();
        let stranger = caller();
        let task = task_owned_by(&owner);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![task.clone()]])
            .into_connection();

        let result = edit(
            &db,
            &stranger,
            task.id,
            EditTask {
                task_name: Some("hijacked".to_owned()),
                due_date: None,
            },
        )
        .await;

        assert!(matches!(result, Err(ServerError::NotAuthorized)));
    }

    #[tokio::test]
    async fn edit_of_missing_task_is_not_found() {
        let owner = caller();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<task::Model>::new()])
            .into_connection();

        let result = edit(
            &db,
            &owner,
            Uuid::new_v4(),
            EditTask {
                task_name: None,
                due_date: None,
            },
        )
        .await;

        assert!(matches!(result, Err(ServerError::TaskNotFound)));
    }

    #[tokio::test]
    async fn edit_with_no_fields_returns_task_unchanged() {
        let owner = caller();
        let task = task_owned_by(&owner);

        // no update statement should reach the store
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![task.clone()]])
            .into_connection();

        let result = edit(
            &db,
            &owner,
            task.id,
            EditTask {
                task_name: None,
                due_date: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(result, task);
    }

    #[tokio::test]
    async fn toggle_complete_twice_restores_original_flag() {
        let owner = caller();
        let task = task_owned_by(&owner);
        let mut flipped = task.clone();
        flipped.completed = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![task.clone()],
                vec![flipped.clone()],
                vec![flipped.clone()],
                vec![task.clone()],
            ])
            .into_connection();

        let once = toggle_complete(&db, &owner, task.id).await.unwrap();
        assert!(once.completed);

        let twice = toggle_complete(&db, &owner, task.id).await.unwrap();
        assert_eq!(twice.completed, task.completed);
    }

    #[tokio::test]
    async fn delete_removes_owned_task() {
        let owner = caller();
        let task = task_owned_by(&owner);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![task.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        delete(&db, &owner, task.id).await.unwrap();
    }

    #[tokio::test]
    async fn list_returns_only_callers_tasks() {
        let owner = caller();
        let mine = task_owned_by(&owner);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![mine.clone()]])
            .into_connection();

        let tasks = list(&db, &owner).await.unwrap();
        assert_eq!(tasks, vec![mine]);
    }
}

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use entity::task;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::ServerError;
use crate::handlers::ValidatedJson;
use crate::server::State;
use crate::tasks::{self, EditTask, NewTask};

/// A task as rendered to its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskResponse {
    pub(crate) id: Uuid,
    pub(crate) task_name: String,
    pub(crate) due_date: DateTime<Utc>,
    pub(crate) completed: bool,
}

impl From<task::Model> for TaskResponse {
    fn from(task: task::Model) -> Self {
        Self {
            id: task.id,
            task_name: task.task_name,
            due_date: task.due_date,
            completed: task.completed,
        }
    }
}

/// Handler for `GET /api/tasks`
pub(crate) async fn list_tasks(
    Extension(state): Extension<Arc<State>>,
    auth: Auth,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let user = auth.user()?;
    let tasks = tasks::list(&state.db, &user).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Handler for `POST /api/tasks`
pub(crate) async fn create_task(
    Extension(state): Extension<Arc<State>>,
    auth: Auth,
    ValidatedJson(input): ValidatedJson<NewTask>,
) -> Result<(StatusCode, Json<TaskResponse>), ServerError> {
    let user = auth.user()?;
    let task = tasks::create(&state.db, &user, input).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Handler for `PUT /api/tasks/:id`
pub(crate) async fn edit_task(
    Extension(state): Extension<Arc<State>>,
    Path(id): Path<Uuid>,
    auth: Auth,
    ValidatedJson(input): ValidatedJson<EditTask>,
) -> Result<Json<TaskResponse>, ServerError> {
    let user = auth.user()?;
    let task = tasks::edit(&state.db, &user, id, input).await?;
    Ok(Json(task.into()))
}

/// Handler for `DELETE /api/tasks/:id`
pub(crate) async fn delete_task(
    Extension(state): Extension<Arc<State>>,
    Path(id): Path<Uuid>,
    auth: Auth,
) -> Result<Json<Value>, ServerError> {
    let user = auth.user()?;
    tasks::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// Handler for `PUT /api/tasks/:id/complete`
pub(crate) async fn toggle_task_complete(
    Extension(state): Extension<Arc<State>>,
    Path(id): Path<Uuid>,
    auth: Auth,
) -> Result<Json<TaskResponse>, ServerError> {
    let user = auth.user()?;
    let task = tasks::toggle_complete(&state.db, &user, id).await?;
    Ok(Json(task.into()))
}

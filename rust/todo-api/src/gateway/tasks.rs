//! Task endpoints.
//!
//! | Method | Path              | Action                               |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/api/nextdate`   | compute next date (plain text)       |
//! | POST   | `/api/task`       | create                               |
//! | GET    | `/api/task?id=`   | fetch                                |
//! | PUT    | `/api/task`       | edit                                 |
//! | DELETE | `/api/task?id=`   | delete                               |
//! | POST   | `/api/task/done?id=` | complete                          |
//! | GET    | `/api/tasks?search=` | list                              |

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};

use super::json_body;
use crate::domain::Task;
use crate::error::ApiResult;
use crate::runtime::parse_task_id;
use crate::AppState;

/// Routes that read or change stored tasks.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/task",
            post(create_task)
                .get(get_task)
                .put(edit_task)
                .delete(delete_task),
        )
        .route("/api/task/done", post(complete_task))
        .route("/api/tasks", get(list_tasks))
}

/// Routes that never touch stored tasks.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/nextdate", get(next_date))
}

/// Task as submitted by clients.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    /// Task id; accepted as a string or a number.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub repeat: String,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

impl TaskPayload {
    fn into_task(self, id: Option<i64>) -> Task {
        Task {
            id,
            date: self.date,
            title: self.title,
            comment: self.comment,
            repeat: self.repeat,
        }
    }
}

/// Task as returned to clients. The id is rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.map(|id| id.to_string()).unwrap_or_default(),
            date: task.date,
            title: task.title,
            comment: task.comment,
            repeat: task.repeat,
        }
    }
}

/// Response to a successful create.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Task listing response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
}

/// Empty JSON object acknowledging a mutation.
#[derive(Debug, Default, Serialize)]
pub struct Ack {}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextDateQuery {
    pub now: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub repeat: String,
}

/// `GET /api/nextdate?now=&date=&repeat=`
pub async fn next_date(
    State(state): State<AppState>,
    Query(query): Query<NextDateQuery>,
) -> Result<String, (StatusCode, String)> {
    state
        .tasks
        .next_date(query.now.as_deref(), &query.date, &query.repeat)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))
}

/// `POST /api/task`
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<Json<CreatedResponse>> {
    let task = json_body(payload)?.into_task(None);
    let id = state.tasks.create(task).await?;
    Ok(Json(CreatedResponse { id }))
}

/// `GET /api/task?id=`
pub async fn get_task(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_task_id(query.id.as_deref())?;
    let task = state.tasks.get(id).await?;
    Ok(Json(task.into()))
}

/// `PUT /api/task`
pub async fn edit_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> ApiResult<Json<Ack>> {
    let payload = json_body(payload)?;
    let id = parse_task_id(payload.id.as_deref())?;
    state.tasks.edit(payload.into_task(Some(id))).await?;
    Ok(Json(Ack::default()))
}

/// `DELETE /api/task?id=`
pub async fn delete_task(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Ack>> {
    let id = parse_task_id(query.id.as_deref())?;
    state.tasks.delete(id).await?;
    Ok(Json(Ack::default()))
}

/// `POST /api/task/done?id=`
pub async fn complete_task(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Ack>> {
    let id = parse_task_id(query.id.as_deref())?;
    state.tasks.complete(id).await?;
    Ok(Json(Ack::default()))
}

/// `GET /api/tasks?search=`
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.tasks.list(query.search.as_deref()).await?;
    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_string_or_number_id() {
        let payload: TaskPayload =
            serde_json::from_str(r#"{"id":"12","date":"20240101","title":"t"}"#).unwrap();
        assert_eq!(payload.id.as_deref(), Some("12"));

        let payload: TaskPayload = serde_json::from_str(r#"{"id":12,"title":"t"}"#).unwrap();
        assert_eq!(payload.id.as_deref(), Some("12"));

        let payload: TaskPayload = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(payload.id, None);
        assert_eq!(payload.comment, "");
        assert_eq!(payload.repeat, "");

        let payload: TaskPayload = serde_json::from_str(r#"{"id":null,"title":"t"}"#).unwrap();
        assert_eq!(payload.id, None);
    }

    #[test]
    fn test_response_renders_id_as_string() {
        let response = TaskResponse::from(Task::new("20240101", "Pay rent", "", "m 1").with_id(7));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["repeat"], "m 1");
    }

    #[test]
    fn test_ack_is_empty_object() {
        assert_eq!(serde_json::to_string(&Ack::default()).unwrap(), "{}");
    }

    #[test]
    fn test_empty_listing_is_array() {
        let json = serde_json::to_string(&TaskListResponse { tasks: Vec::new() }).unwrap();
        assert_eq!(json, r#"{"tasks":[]}"#);
    }
}

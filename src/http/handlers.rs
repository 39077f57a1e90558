//! Handler implementations for the routes declared in `http::build_router`
//! (spec §6). Each maps directly onto a `Supervisor` operation (spec §4.6).

use super::ApiState;
use crate::errors::SupervisorError;
use crate::launcher::NodeRequest;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct NodeList {
    pub nodes: Vec<String>,
}

pub async fn list_nodes(
    State(state): State<ApiState>,
) -> Result<Json<NodeList>, SupervisorError> {
    let nodes = state.supervisor.list().await?;
    Ok(Json(NodeList { nodes }))
}

#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

pub async fn launch_node(
    State(state): State<ApiState>,
    Json(req): Json<NodeRequest>,
) -> Result<(StatusCode, Json<Message>), SupervisorError> {
    if req.name.is_empty() {
        return Err(SupervisorError::InvalidRequest("name must not be empty".into()));
    }
    let name = req.name.clone();
    state.supervisor.launch(req).await?;
    Ok((
        StatusCode::OK,
        Json(Message {
            message: format!("Node '{name}' launched."),
        }),
    ))
}

#[derive(Deserialize)]
pub struct TerminateQuery {
    pub name: String,
    pub grace_timeout_secs: Option<u64>,
}

pub async fn terminate_node(
    State(state): State<ApiState>,
    Query(query): Query<TerminateQuery>,
) -> (StatusCode, Json<Message>) {
    state
        .supervisor
        .terminate(&query.name, query.grace_timeout_secs)
        .await;
    (
        StatusCode::OK,
        Json(Message {
            message: format!("Node '{}' terminated.", query.name),
        }),
    )
}

#[derive(Serialize)]
pub struct NodeStatus {
    pub name: String,
    pub status: Vec<crate::events::NodeEvent>,
}

pub async fn node_status(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<NodeStatus>, SupervisorError> {
    let status = state.supervisor.get_events(&name).await?;
    Ok(Json(NodeStatus { name, status }))
}

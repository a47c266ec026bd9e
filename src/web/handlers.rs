//! Refresh and status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::trigger::{JobTrigger, StartOutcome};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    /// `"started"`, or `"running"` when a refresh was already in flight.
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// Timestamp of the last completed run, empty before the first one.
    pub updated_at: String,
    pub running: bool,
}

/// `GET /api/refresh`
pub async fn refresh(State(trigger): State<Arc<JobTrigger>>) -> Json<RefreshResponse> {
    let status = match trigger.start() {
        StartOutcome::Started => "started",
        StartOutcome::AlreadyRunning => "running",
    };
    Json(RefreshResponse {
        status: status.to_string(),
    })
}

/// `GET /api/status`
pub async fn status(State(trigger): State<Arc<JobTrigger>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        updated_at: trigger.last_completed().await,
        running: trigger.is_running(),
    })
}

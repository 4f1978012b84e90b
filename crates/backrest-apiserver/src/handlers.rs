//! Request handlers
//!
//! Handlers validate the request shape and delegate to [`BackrestService`].
//! Per-cluster failures come back inside the response status with HTTP 200;
//! only malformed requests are rejected at this layer.
//!
//! [`BackrestService`]: backrest_core::BackrestService

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use backrest_core::messages::{
    CreateBackrestBackupRequest, CreateBackrestBackupResponse, RestoreRequest, RestoreResponse,
    ShowBackrestResponse,
};

use crate::error::{Error, Result};
use crate::server::AppState;

/// Query parameters of the show endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    /// Label selector; empty means "by name"
    #[serde(default)]
    pub selector: String,
}

/// `POST /backrestbackup`
#[instrument(skip(state, request), fields(selector = %request.selector))]
pub async fn backup_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateBackrestBackupRequest>,
) -> Result<Json<CreateBackrestBackupResponse>> {
    if request.args.is_empty() && request.selector.is_empty() {
        return Err(Error::bad_request(
            "cluster names or a selector are required",
        ));
    }
    Ok(Json(state.service.create_backup(&request).await))
}

/// `GET /backrest/{name}`
#[instrument(skip(state))]
pub async fn show_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ShowParams>,
) -> Json<ShowBackrestResponse> {
    Json(
        state
            .service
            .show_backup_status(&name, &params.selector)
            .await,
    )
}

/// `POST /restore`
#[instrument(skip(state, request), fields(from = %request.from_cluster, to = %request.to_pvc))]
pub async fn restore_handler(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>> {
    if request.from_cluster.is_empty() {
        return Err(Error::bad_request("FromCluster is required"));
    }
    if request.to_pvc.is_empty() {
        return Err(Error::bad_request("ToPVC is required"));
    }
    Ok(Json(state.service.restore(&request).await))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment provisioning HTTP handlers.

use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use envd_server_environment::EnvironmentCreateRequest;

use crate::{api::AppState, error::ServerError};

/// POST /api/environments - Create the pod and service for an environment.
///
/// Responds `201 Created` with the pod as stored by the cluster.
pub async fn create_environment(
	State(state): State<AppState>,
	payload: Result<Json<EnvironmentCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
	let Json(request) = payload?;

	tracing::debug!(identity = %request.identity_token, image = %request.image, "create environment request");

	let pod = state.provisioner.create_environment(&request).await?;

	Ok((StatusCode::CREATED, Json(pod)))
}

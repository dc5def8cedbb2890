// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Router,
};
use envd_server_environment::{EnvironmentConfig, Provisioner};
use envd_server_k8s::K8sClient;

use crate::routes;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
	pub provisioner: Arc<Provisioner>,
}

/// Build the application state around an already-constructed K8s client.
pub fn create_app_state(
	client: Arc<dyn K8sClient>,
	config: &envd_server_config::EnvironmentConfig,
) -> AppState {
	let provisioner = Arc::new(Provisioner::new(client, environment_config(config)));

	tracing::info!(
		namespace = %config.namespace,
		compensate_on_failure = config.compensate_on_failure,
		"Environment provisioning enabled"
	);

	AppState { provisioner }
}

/// Map the server configuration section onto the provisioner's config.
pub fn environment_config(config: &envd_server_config::EnvironmentConfig) -> EnvironmentConfig {
	EnvironmentConfig {
		namespace: config.namespace.clone(),
		call_timeout_secs: config.call_timeout_secs,
		compensate_on_failure: config.compensate_on_failure,
		reconcile_interval_secs: config.reconcile_interval_secs,
		orphan_grace_secs: config.orphan_grace_secs,
		image_pull_secrets: config.image_pull_secrets.clone(),
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route(
			"/api/environments",
			post(routes::environment::create_environment),
		)
		.with_state(state)
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health check types and component probes.

use std::time::Duration;

use envd_server_environment::Provisioner;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Instant};

const K8S_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Overall or per-component health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Unhealthy,
}

/// Kubernetes component health.
#[derive(Debug, Serialize, Deserialize)]
pub struct KubernetesHealth {
	pub status: HealthStatus,
	pub latency_ms: u64,
	pub namespace: String,
	pub reachable: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Health endpoint response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub duration_ms: u64,
	pub version: String,
	pub kubernetes: KubernetesHealth,
}

/// Check that the environment namespace can be read.
pub async fn check_kubernetes(provisioner: &Provisioner) -> KubernetesHealth {
	let start = Instant::now();
	let namespace = provisioner.namespace().to_string();

	let result = timeout(K8S_CHECK_TIMEOUT, provisioner.validate_namespace()).await;
	let latency_ms = start.elapsed().as_millis() as u64;

	let (status, reachable, error) = match result {
		Ok(Ok(())) => (HealthStatus::Healthy, true, None),
		Ok(Err(e)) => (HealthStatus::Unhealthy, false, Some(e.to_string())),
		Err(_) => (
			HealthStatus::Unhealthy,
			false,
			Some("Kubernetes health check timed out".to_string()),
		),
	};

	KubernetesHealth {
		status,
		latency_ms,
		namespace,
		reachable,
		error,
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background task that removes pods left behind by half-created environments.

use std::sync::Arc;
use std::time::Duration;

use crate::provisioner::Provisioner;
use crate::types::ReconcileResult;

/// Start the background task that periodically deletes orphaned environment
/// pods.
///
/// Runs once immediately so pods orphaned before a restart are picked up,
/// then loops at the configured interval.
pub async fn start_reconcile_task(provisioner: Arc<Provisioner>) {
	tracing::info!(
		interval_secs = provisioner.reconcile_interval_secs(),
		"Starting orphan reconcile task"
	);

	run_reconcile(&provisioner).await;

	let interval = provisioner
		.config()
		.reconcile_interval()
		.max(Duration::from_secs(1));

	loop {
		tokio::time::sleep(interval).await;
		run_reconcile(&provisioner).await;
	}
}

/// Run a single reconcile pass, logging the outcome.
pub async fn run_reconcile(provisioner: &Provisioner) -> Option<ReconcileResult> {
	tracing::debug!("Running orphaned environment reconcile");

	match provisioner.reconcile_orphans().await {
		Ok(result) => {
			if result.count > 0 {
				tracing::info!(
					count = result.count,
					deleted = ?result.deleted,
					"Reconcile completed, deleted orphaned pods"
				);
			} else {
				tracing::debug!("Reconcile completed, no orphaned pods found");
			}
			Some(result)
		}
		Err(e) => {
			tracing::error!(error = %e, "Reconcile task failed");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::EnvironmentConfig;
	use crate::spec::identity_labels;
	use chrono::Utc;
	use envd_server_k8s::{K8sError, MockK8sClient, ObjectMeta, Operation, Pod};
	use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

	fn orphan(name: &str) -> Pod {
		Pod {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				labels: Some(identity_labels(name)),
				creation_timestamp: Some(Time(Utc::now() - chrono::Duration::hours(1))),
				..Default::default()
			},
			..Default::default()
		}
	}

	#[tokio::test]
	async fn test_run_reconcile_reports_deletions() {
		let mock = Arc::new(MockK8sClient::new());
		mock.insert_pod("default", orphan("left-behind"));
		let provisioner = Provisioner::new(mock.clone(), EnvironmentConfig::default());

		let result = run_reconcile(&provisioner).await.unwrap();

		assert_eq!(result.count, 1);
		assert!(mock.pod("default", "left-behind").is_none());
	}

	#[tokio::test]
	async fn test_run_reconcile_swallows_list_errors() {
		let mock = Arc::new(MockK8sClient::new());
		mock.fail_always(
			Operation::ListPods,
			K8sError::Unavailable {
				message: "apiserver down".to_string(),
			},
		);
		let provisioner = Provisioner::new(mock.clone(), EnvironmentConfig::default());

		assert!(run_reconcile(&provisioner).await.is_none());
	}

	#[tokio::test]
	async fn test_task_runs_immediately_on_start() {
		let mock = Arc::new(MockK8sClient::new());
		mock.insert_pod("default", orphan("left-behind"));
		let provisioner = Arc::new(Provisioner::new(mock.clone(), EnvironmentConfig::default()));

		let handle = tokio::spawn(start_reconcile_task(provisioner));
		for _ in 0..50 {
			if mock.pod("default", "left-behind").is_none() {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(10)).await;
		}
		handle.abort();

		assert!(mock.pod("default", "left-behind").is_none());
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core provisioner implementation for environment creation.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use envd_server_k8s::{K8sClient, K8sError, Pod};

use crate::config::EnvironmentConfig;
use crate::error::ProvisionerError;
use crate::spec::{build_environment_spec, managed_selector};
use crate::types::{EnvironmentCreateRequest, ProvisioningStep, ReconcileResult};

/// Grace period for deleting a pod whose service could not be created. The
/// pod never became reachable, so there is nothing to drain.
const COMPENSATION_GRACE_PERIOD_SECS: u32 = 0;
const ORPHAN_GRACE_PERIOD_SECS: u32 = 5;

/// Creates environments as a Pod plus a Service selecting it.
pub struct Provisioner {
	client: Arc<dyn K8sClient>,
	config: EnvironmentConfig,
}

impl Provisioner {
	/// Create a new provisioner with the given K8s client and configuration.
	pub fn new(client: Arc<dyn K8sClient>, config: EnvironmentConfig) -> Self {
		Self { client, config }
	}

	/// Get the namespace this provisioner operates in.
	pub fn namespace(&self) -> &str {
		&self.config.namespace
	}

	pub fn config(&self) -> &EnvironmentConfig {
		&self.config
	}

	/// Validate that the configured namespace exists in the cluster.
	///
	/// This should be called on startup to fail fast if the namespace
	/// is not properly configured.
	pub async fn validate_namespace(&self) -> Result<(), ProvisionerError> {
		match self
			.bounded(self.client.get_namespace(&self.config.namespace))
			.await
		{
			Ok(_) => {
				tracing::info!(namespace = %self.config.namespace, "Validated namespace exists");
				Ok(())
			}
			Err(K8sError::NamespaceNotFound { .. }) => Err(ProvisionerError::NamespaceNotFound {
				name: self.config.namespace.clone(),
			}),
			Err(e) => Err(e.into()),
		}
	}

	/// Create the pod and service for an environment.
	///
	/// The pod is created first; the service is only attempted once the pod
	/// exists. If the service fails, the pod is deleted again (unless
	/// compensation is disabled) and `ExposureCreation` reports whether it
	/// was left behind. On success the pod as stored by the API server is
	/// returned.
	pub async fn create_environment(
		&self,
		req: &EnvironmentCreateRequest,
	) -> Result<Pod, ProvisionerError> {
		let spec = build_environment_spec(req, &self.config)?;
		let identity = req.identity_token.as_str();
		let namespace = self.config.namespace.as_str();

		tracing::info!(identity = %identity, namespace = %namespace, image = %req.image, "Creating environment pod");

		let pod = self
			.bounded(self.client.create_pod(namespace, spec.pod))
			.await
			.map_err(|e| workload_error(identity, e))?;

		tracing::debug!(identity = %identity, "Creating environment service");

		if let Err(source) = self
			.bounded(self.client.create_service(namespace, spec.service))
			.await
		{
			tracing::warn!(identity = %identity, error = %source, "Environment service creation failed");
			let orphaned = self.compensate(identity).await;
			return Err(ProvisionerError::ExposureCreation {
				identity: identity.to_string(),
				orphaned,
				source,
			});
		}

		tracing::info!(identity = %identity, namespace = %namespace, "Environment created");
		Ok(pod)
	}

	/// Delete the pod of a half-created environment. Returns whether the pod
	/// is still there afterwards.
	async fn compensate(&self, identity: &str) -> bool {
		if !self.config.compensate_on_failure {
			tracing::warn!(identity = %identity, "Compensation disabled, leaving orphaned pod");
			return true;
		}

		match self
			.bounded(self.client.delete_pod(
				identity,
				&self.config.namespace,
				COMPENSATION_GRACE_PERIOD_SECS,
			))
			.await
		{
			Ok(()) => {
				tracing::info!(identity = %identity, "Deleted pod of failed environment");
				false
			}
			Err(e) if e.is_not_found() => false,
			Err(e) => {
				tracing::error!(identity = %identity, error = %e, "Failed to delete pod of failed environment");
				true
			}
		}
	}

	/// Find managed pods with no service of the same name that are older
	/// than the configured grace period.
	pub async fn find_orphaned_pods(&self) -> Result<Vec<Pod>, ProvisionerError> {
		let selector = managed_selector();
		let pods = self
			.bounded(self.client.list_pods(&self.config.namespace, &selector))
			.await?;
		let services = self
			.bounded(self.client.list_services(&self.config.namespace, &selector))
			.await?;

		let exposed: HashSet<String> = services
			.into_iter()
			.filter_map(|svc| svc.metadata.name)
			.collect();
		let now = Utc::now();

		let orphans = pods
			.into_iter()
			.filter(|pod| {
				pod
					.metadata
					.name
					.as_ref()
					.is_some_and(|name| !exposed.contains(name))
			})
			.filter(|pod| self.past_grace(pod, now))
			.collect();
		Ok(orphans)
	}

	/// Whether a pod is old enough, and not already terminating, to be
	/// treated as an orphan.
	fn past_grace(&self, pod: &Pod, now: DateTime<Utc>) -> bool {
		if pod.metadata.deletion_timestamp.is_some() {
			return false;
		}
		let grace = orphan_grace_secs(self.config.orphan_grace_secs);
		pod_age_secs(pod, now).is_some_and(|age| age >= grace)
	}

	/// Re-read a candidate right before deleting it. The pod may have been
	/// recreated under the same name, or its service created, since the
	/// list calls.
	async fn still_orphaned(&self, name: &str) -> bool {
		let namespace = self.config.namespace.as_str();

		match self.bounded(self.client.get_pod(name, namespace)).await {
			Ok(pod) if self.past_grace(&pod, Utc::now()) => {}
			Ok(_) => {
				tracing::debug!(identity = %name, "Pod replaced since listing, skipping");
				return false;
			}
			Err(e) if e.is_not_found() => return false,
			Err(e) => {
				tracing::warn!(identity = %name, error = %e, "Failed to re-read orphan candidate");
				return false;
			}
		}

		match self.bounded(self.client.get_service(name, namespace)).await {
			Ok(_) => {
				tracing::debug!(identity = %name, "Service appeared since listing, skipping");
				false
			}
			Err(e) if e.is_not_found() => true,
			Err(e) => {
				tracing::warn!(identity = %name, error = %e, "Failed to check service of orphan candidate");
				false
			}
		}
	}

	/// Delete every orphaned pod.
	pub async fn reconcile_orphans(&self) -> Result<ReconcileResult, ProvisionerError> {
		let orphans = self.find_orphaned_pods().await?;
		let mut deleted = Vec::new();

		for pod in orphans {
			let name = pod.metadata.name.unwrap_or_default();
			if !self.still_orphaned(&name).await {
				continue;
			}
			match self
				.bounded(self.client.delete_pod(
					&name,
					&self.config.namespace,
					ORPHAN_GRACE_PERIOD_SECS,
				))
				.await
			{
				Ok(()) => {
					tracing::info!(identity = %name, "Deleted orphaned environment pod");
					deleted.push(name);
				}
				Err(e) if e.is_not_found() => {
					tracing::debug!(identity = %name, "Orphaned pod already deleted");
				}
				Err(e) => {
					tracing::error!(identity = %name, error = %e, "Failed to delete orphaned pod");
				}
			}
		}

		let count = deleted.len() as u32;
		Ok(ReconcileResult { deleted, count })
	}

	/// Get the configured reconcile interval in seconds.
	pub fn reconcile_interval_secs(&self) -> u64 {
		self.config.reconcile_interval_secs
	}

	/// Run a K8s call under the configured per-call timeout. A timeout of
	/// zero disables the bound.
	async fn bounded<T, F>(&self, call: F) -> Result<T, K8sError>
	where
		F: Future<Output = Result<T, K8sError>>,
	{
		if self.config.call_timeout_secs == 0 {
			return call.await;
		}
		match tokio::time::timeout(self.config.call_timeout(), call).await {
			Ok(result) => result,
			Err(_) => Err(K8sError::Timeout),
		}
	}
}

/// Classify a failed pod create.
fn workload_error(identity: &str, err: K8sError) -> ProvisionerError {
	if err.is_already_exists() {
		ProvisionerError::AlreadyExists {
			identity: identity.to_string(),
		}
	} else if err.is_transient() {
		ProvisionerError::Transient {
			step: ProvisioningStep::Workload,
			source: err,
		}
	} else {
		ProvisionerError::WorkloadCreation {
			identity: identity.to_string(),
			source: err,
		}
	}
}

/// Grace period as a signed age bound. Values past `i64::MAX` saturate so a
/// huge grace never wraps into a negative one.
fn orphan_grace_secs(secs: u64) -> i64 {
	i64::try_from(secs).unwrap_or(i64::MAX)
}

fn pod_age_secs(pod: &Pod, now: DateTime<Utc>) -> Option<i64> {
	let created = pod.metadata.creation_timestamp.as_ref()?;
	Some(now.signed_duration_since(created.0).num_seconds())
}

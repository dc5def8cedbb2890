// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment provisioner configuration.

use std::time::Duration;

use crate::spec::DEFAULT_NAMESPACE;

/// Configuration for the environment provisioner.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
	/// Kubernetes namespace for environment pods and services
	pub namespace: String,
	/// Upper bound for a single K8s API call in seconds
	pub call_timeout_secs: u64,
	/// Delete the pod when its service cannot be created
	pub compensate_on_failure: bool,
	/// Orphan reconciler interval in seconds
	pub reconcile_interval_secs: u64,
	/// Minimum pod age before the reconciler treats it as an orphan
	pub orphan_grace_secs: u64,
	/// Image pull secret names for private registries
	pub image_pull_secrets: Vec<String>,
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_string(),
			call_timeout_secs: 30,
			compensate_on_failure: true,
			reconcile_interval_secs: 300,
			orphan_grace_secs: 120,
			image_pull_secrets: Vec::new(),
		}
	}
}

impl EnvironmentConfig {
	pub fn call_timeout(&self) -> Duration {
		Duration::from_secs(self.call_timeout_secs)
	}

	pub fn reconcile_interval(&self) -> Duration {
		Duration::from_secs(self.reconcile_interval_secs)
	}
}

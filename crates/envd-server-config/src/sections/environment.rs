// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment provisioning configuration section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;
const DEFAULT_ORPHAN_GRACE_SECS: u64 = 120;

/// Environment configuration layer (for merging).
///
/// All fields are optional to support layered configuration from
/// multiple sources (defaults, files, environment).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfigLayer {
	pub namespace: Option<String>,
	pub call_timeout_secs: Option<u64>,
	pub compensate_on_failure: Option<bool>,
	pub reconcile_enabled: Option<bool>,
	pub reconcile_interval_secs: Option<u64>,
	pub orphan_grace_secs: Option<u64>,
	pub image_pull_secrets: Option<Vec<String>>,
}

impl EnvironmentConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.call_timeout_secs.is_some() {
			self.call_timeout_secs = other.call_timeout_secs;
		}
		if other.compensate_on_failure.is_some() {
			self.compensate_on_failure = other.compensate_on_failure;
		}
		if other.reconcile_enabled.is_some() {
			self.reconcile_enabled = other.reconcile_enabled;
		}
		if other.reconcile_interval_secs.is_some() {
			self.reconcile_interval_secs = other.reconcile_interval_secs;
		}
		if other.orphan_grace_secs.is_some() {
			self.orphan_grace_secs = other.orphan_grace_secs;
		}
		if other.image_pull_secrets.is_some() {
			self.image_pull_secrets = other.image_pull_secrets;
		}
	}

	pub fn finalize(self) -> Result<EnvironmentConfig, ConfigError> {
		let config = EnvironmentConfig {
			namespace: self
				.namespace
				.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
			call_timeout_secs: self.call_timeout_secs.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS),
			compensate_on_failure: self.compensate_on_failure.unwrap_or(true),
			reconcile_enabled: self.reconcile_enabled.unwrap_or(true),
			reconcile_interval_secs: self
				.reconcile_interval_secs
				.unwrap_or(DEFAULT_RECONCILE_INTERVAL_SECS),
			orphan_grace_secs: self.orphan_grace_secs.unwrap_or(DEFAULT_ORPHAN_GRACE_SECS),
			image_pull_secrets: self.image_pull_secrets.unwrap_or_default(),
		};
		config.validate()?;
		Ok(config)
	}
}

/// Environment provisioning configuration (runtime).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentConfig {
	/// Namespace environments are created in.
	pub namespace: String,
	/// Upper bound on a single K8s API call. Zero disables the bound.
	pub call_timeout_secs: u64,
	/// Delete the pod again when its service cannot be created.
	pub compensate_on_failure: bool,
	pub reconcile_enabled: bool,
	pub reconcile_interval_secs: u64,
	/// Minimum pod age before the reconciler treats it as orphaned.
	pub orphan_grace_secs: u64,
	pub image_pull_secrets: Vec<String>,
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_string(),
			call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
			compensate_on_failure: true,
			reconcile_enabled: true,
			reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
			orphan_grace_secs: DEFAULT_ORPHAN_GRACE_SECS,
			image_pull_secrets: Vec::new(),
		}
	}
}

impl EnvironmentConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.namespace.trim().is_empty() {
			return Err(ConfigError::section(
				"environment",
				"namespace must not be empty",
			));
		}
		if !self.reconcile_enabled {
			return Ok(());
		}
		if self.reconcile_interval_secs == 0 {
			return Err(ConfigError::section(
				"environment",
				"reconcile_interval_secs must be greater than zero when reconcile is enabled",
			));
		}
		// The reconciler must never see a pod whose create call may still be
		// waiting on its service; that needs a bounded call timeout and a
		// grace period covering both calls.
		if self.call_timeout_secs == 0 {
			return Err(ConfigError::section(
				"environment",
				"call_timeout_secs must be greater than zero when reconcile is enabled",
			));
		}
		let min_grace = self.call_timeout_secs.saturating_mul(2);
		if self.orphan_grace_secs <= min_grace {
			return Err(ConfigError::section(
				"environment",
				format!(
					"orphan_grace_secs ({}) must exceed twice call_timeout_secs ({}) when reconcile is enabled",
					self.orphan_grace_secs, self.call_timeout_secs
				),
			));
		}
		Ok(())
	}
}

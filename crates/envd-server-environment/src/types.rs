// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment provisioning types.

use serde::{Deserialize, Serialize};

/// Request to create a new environment.
///
/// Fields default to empty strings when absent so that missing fields are
/// reported by validation rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCreateRequest {
	/// Unique name of the environment; names both the pod and the service
	#[serde(default)]
	pub identity_token: String,
	/// Container image reference
	#[serde(default)]
	pub image: String,
}

impl EnvironmentCreateRequest {
	pub fn new(identity_token: impl Into<String>, image: impl Into<String>) -> Self {
		Self {
			identity_token: identity_token.into(),
			image: image.into(),
		}
	}
}

/// The two K8s calls that make up environment creation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
	/// Pod creation
	Workload,
	/// Service creation
	Exposure,
}

impl std::fmt::Display for ProvisioningStep {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ProvisioningStep::Workload => f.write_str("workload"),
			ProvisioningStep::Exposure => f.write_str("exposure"),
		}
	}
}

/// Result of an orphan reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileResult {
	/// Names of orphaned pods that were deleted
	pub deleted: Vec<String>,
	/// Number of pods deleted
	pub count: u32,
}

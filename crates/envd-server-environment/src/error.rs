// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioner error types.

use envd_server_k8s::K8sError;

use crate::types::ProvisioningStep;

/// Errors that can occur during environment provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionerError {
	/// The request is malformed; nothing was sent to the cluster
	#[error("Invalid {field}: {message}")]
	Validation { field: &'static str, message: String },

	/// An environment with this identity token already exists
	#[error("Environment already exists: {identity}")]
	AlreadyExists { identity: String },

	/// The pod could not be created; nothing was left behind
	#[error("Failed to create pod for environment {identity}: {source}")]
	WorkloadCreation {
		identity: String,
		#[source]
		source: K8sError,
	},

	/// The pod was created but its service was not
	#[error("Failed to create service for environment {identity} (pod orphaned: {orphaned}): {source}")]
	ExposureCreation {
		identity: String,
		orphaned: bool,
		#[source]
		source: K8sError,
	},

	/// The cluster could not be reached or did not answer in time
	#[error("K8s unavailable during {step} creation: {source}")]
	Transient {
		step: ProvisioningStep,
		#[source]
		source: K8sError,
	},

	/// Namespace not found
	#[error("Namespace not found: {name}")]
	NamespaceNotFound { name: String },

	/// Any other Kubernetes failure (reconciler, startup checks)
	#[error(transparent)]
	Kubernetes(#[from] K8sError),
}

impl ProvisionerError {
	pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
		ProvisionerError::Validation {
			field,
			message: message.into(),
		}
	}

	/// The provisioning step that produced this error, if any.
	pub fn step(&self) -> Option<ProvisioningStep> {
		match self {
			ProvisionerError::AlreadyExists { .. } | ProvisionerError::WorkloadCreation { .. } => {
				Some(ProvisioningStep::Workload)
			}
			ProvisionerError::ExposureCreation { .. } => Some(ProvisioningStep::Exposure),
			ProvisionerError::Transient { step, .. } => Some(*step),
			_ => None,
		}
	}

	/// Whether the caller may retry with the same identity token.
	pub fn is_retryable(&self) -> bool {
		match self {
			ProvisionerError::Transient { .. } => true,
			ProvisionerError::ExposureCreation {
				orphaned, source, ..
			} => !orphaned && source.is_transient(),
			_ => false,
		}
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::types::ResourceKind;

/// Errors that can occur during K8s operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum K8sError {
	#[error("K8s API error ({code}): {message}")]
	ApiError { code: u16, message: String },

	#[error("{kind} already exists: {name}")]
	AlreadyExists { kind: ResourceKind, name: String },

	#[error("{kind} not found: {name}")]
	NotFound { kind: ResourceKind, name: String },

	#[error("Namespace not found: {name}")]
	NamespaceNotFound { name: String },

	#[error("K8s API unavailable: {message}")]
	Unavailable { message: String },

	#[error("Operation timed out")]
	Timeout,

	#[error("K8s client error: {message}")]
	ClientError { message: String },
}

impl K8sError {
	/// Whether the failure is a network or availability problem that may
	/// succeed if the same call is made again later.
	pub fn is_transient(&self) -> bool {
		matches!(self, K8sError::Unavailable { .. } | K8sError::Timeout)
	}

	/// Whether the failure is a uniqueness conflict on create.
	pub fn is_already_exists(&self) -> bool {
		matches!(self, K8sError::AlreadyExists { .. })
	}

	/// Whether the failure reports a missing object.
	pub fn is_not_found(&self) -> bool {
		matches!(
			self,
			K8sError::NotFound { .. } | K8sError::NamespaceNotFound { .. }
		)
	}

	/// Convert a kube error raised while operating on a named object.
	///
	/// 404 and 409 responses become `NotFound` and `AlreadyExists` for the
	/// given object; everything else goes through the generic conversion.
	pub fn for_object(err: kube::Error, kind: ResourceKind, name: &str) -> Self {
		match err {
			kube::Error::Api(ref resp) if resp.code == 404 => K8sError::NotFound {
				kind,
				name: name.into(),
			},
			kube::Error::Api(ref resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
				K8sError::AlreadyExists {
					kind,
					name: name.into(),
				}
			}
			other => other.into(),
		}
	}
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		match err {
			kube::Error::Api(resp) => match resp.code {
				429 | 500 | 502 | 503 | 504 => K8sError::Unavailable {
					message: resp.message,
				},
				code => K8sError::ApiError {
					code,
					message: resp.message,
				},
			},
			kube::Error::HyperError(_) | kube::Error::Service(_) => K8sError::Unavailable {
				message: err.to_string(),
			},
			other => K8sError::ClientError {
				message: other.to_string(),
			},
		}
	}
}

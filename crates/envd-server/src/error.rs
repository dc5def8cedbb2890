// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	extract::rejection::JsonRejection,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use envd_server_environment::{ProvisionerError, ProvisioningStep};
use serde::{Deserialize, Serialize};

/// Server error types for environment operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Invalid request payload.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// Environment provisioner error.
	#[error("Provisioner error: {0}")]
	Provisioner(#[from] ProvisionerError),
}

impl From<JsonRejection> for ServerError {
	fn from(rejection: JsonRejection) -> Self {
		ServerError::BadRequest(rejection.body_text())
	}
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub step: Option<ProvisioningStep>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub orphaned: Option<bool>,
}

impl ErrorResponse {
	fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
			step: None,
			orphaned: None,
		}
	}

	fn at(mut self, step: Option<ProvisioningStep>) -> Self {
		self.step = step;
		self
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error_response) = match &self {
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Provisioner(e) => provisioner_response(e),
		};

		(status, Json(error_response)).into_response()
	}
}

fn provisioner_response(e: &ProvisionerError) -> (StatusCode, ErrorResponse) {
	match e {
		ProvisionerError::Validation { .. } => (
			StatusCode::BAD_REQUEST,
			ErrorResponse::new("validation_error", e.to_string()),
		),
		ProvisionerError::AlreadyExists { .. } => (
			StatusCode::CONFLICT,
			ErrorResponse::new("already_exists", e.to_string()).at(e.step()),
		),
		ProvisionerError::Transient { .. } => {
			tracing::warn!(error = %e, "orchestrator unavailable");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				ErrorResponse::new("orchestrator_unavailable", e.to_string()).at(e.step()),
			)
		}
		ProvisionerError::WorkloadCreation { .. } => {
			tracing::error!(error = %e, "workload creation failed");
			(
				StatusCode::BAD_GATEWAY,
				ErrorResponse::new("workload_creation_failed", e.to_string()).at(e.step()),
			)
		}
		ProvisionerError::ExposureCreation { orphaned, .. } => {
			tracing::error!(error = %e, orphaned = *orphaned, "exposure creation failed");
			let mut body =
				ErrorResponse::new("exposure_creation_failed", e.to_string()).at(e.step());
			body.orphaned = Some(*orphaned);
			(StatusCode::BAD_GATEWAY, body)
		}
		ProvisionerError::Kubernetes(source) if source.is_transient() => {
			tracing::warn!(error = %e, "orchestrator unavailable");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				ErrorResponse::new("orchestrator_unavailable", e.to_string()),
			)
		}
		_ => {
			tracing::error!(error = %e, "provisioner error");
			(
				StatusCode::INTERNAL_SERVER_ERROR,
				ErrorResponse::new("provisioner_error", e.to_string()),
			)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use envd_server_k8s::K8sError;

	fn status_of(e: ProvisionerError) -> StatusCode {
		ServerError::from(e).into_response().status()
	}

	fn api_error() -> K8sError {
		K8sError::ApiError {
			code: 422,
			message: "invalid".to_string(),
		}
	}

	#[test]
	fn test_status_by_kind() {
		assert_eq!(
			status_of(envd_server_environment::validate_identity_token("").unwrap_err()),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			status_of(ProvisionerError::AlreadyExists {
				identity: "demo-env".to_string()
			}),
			StatusCode::CONFLICT
		);
		assert_eq!(
			status_of(ProvisionerError::Transient {
				step: ProvisioningStep::Workload,
				source: K8sError::Timeout,
			}),
			StatusCode::SERVICE_UNAVAILABLE
		);
		assert_eq!(
			status_of(ProvisionerError::WorkloadCreation {
				identity: "demo-env".to_string(),
				source: api_error(),
			}),
			StatusCode::BAD_GATEWAY
		);
		assert_eq!(
			status_of(ProvisionerError::ExposureCreation {
				identity: "demo-env".to_string(),
				orphaned: true,
				source: api_error(),
			}),
			StatusCode::BAD_GATEWAY
		);
		assert_eq!(
			status_of(ProvisionerError::NamespaceNotFound {
				name: "envd".to_string()
			}),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_exposure_body_carries_step_and_orphaned() {
		let (_, body) = provisioner_response(&ProvisionerError::ExposureCreation {
			identity: "demo-env".to_string(),
			orphaned: true,
			source: api_error(),
		});
		let json = serde_json::to_value(&body).unwrap();
		assert_eq!(json["error"], "exposure_creation_failed");
		assert_eq!(json["step"], "exposure");
		assert_eq!(json["orphaned"], true);
	}

	#[test]
	fn test_optional_fields_omitted() {
		let body = ErrorResponse::new("bad_request", "missing body");
		let json = serde_json::to_value(&body).unwrap();
		assert!(json.get("step").is_none());
		assert!(json.get("orphaned").is_none());
	}
}

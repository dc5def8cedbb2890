// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pod and Service descriptors for an environment.
//!
//! Both objects are named after the identity token, and the Service selects
//! its Pod through the `name` label. Every label and selector here is derived
//! from [`identity_selector`], so the two can never disagree.

use std::collections::BTreeMap;

use envd_server_k8s::{
	Container, ContainerPort, IntOrString, LocalObjectReference, ObjectMeta, Pod, PodSpec, Service,
	ServicePort, ServiceSpec,
};

use crate::config::EnvironmentConfig;
use crate::error::ProvisionerError;
use crate::types::EnvironmentCreateRequest;
use crate::validation::validate_request;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";
/// Label whose value is the identity token; the Service selects on it.
pub const NAME_LABEL: &str = "name";
/// Marks objects created by this server, used by the orphan reconciler.
pub const MANAGED_LABEL: &str = "envd.tensorchord.ai/managed";
/// Name of the single container in an environment pod.
pub const CONTAINER_NAME: &str = "envd";
/// Name of the SSH port on both the container and the service.
pub const SSH_PORT_NAME: &str = "ssh";
/// SSH port exposed by the envd container.
pub const SSH_PORT: i32 = 2222;
const SERVICE_TYPE: &str = "ClusterIP";

/// The pair of objects that make up one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentSpec {
	pub pod: Pod,
	pub service: Service,
}

/// Validate a request and build its Pod and Service descriptors.
///
/// Pure: performs no I/O.
pub fn build_environment_spec(
	req: &EnvironmentCreateRequest,
	config: &EnvironmentConfig,
) -> Result<EnvironmentSpec, ProvisionerError> {
	validate_request(req)?;
	Ok(EnvironmentSpec {
		pod: build_pod_spec(req, config),
		service: build_service_spec(&req.identity_token, config),
	})
}

/// The selector that binds a Service to its environment pod.
pub fn identity_selector(identity_token: &str) -> BTreeMap<String, String> {
	BTreeMap::from([(NAME_LABEL.to_string(), identity_token.to_string())])
}

/// Labels carried by both the Pod and the Service of an environment.
///
/// Always a superset of [`identity_selector`].
pub fn identity_labels(identity_token: &str) -> BTreeMap<String, String> {
	let mut labels = identity_selector(identity_token);
	labels.insert(MANAGED_LABEL.to_string(), "true".to_string());
	labels
}

/// Label selector string matching every managed object.
pub fn managed_selector() -> String {
	format!("{MANAGED_LABEL}=true")
}

fn object_meta(identity_token: &str, config: &EnvironmentConfig) -> ObjectMeta {
	ObjectMeta {
		name: Some(identity_token.to_string()),
		namespace: Some(config.namespace.clone()),
		labels: Some(identity_labels(identity_token)),
		..Default::default()
	}
}

fn build_pod_spec(req: &EnvironmentCreateRequest, config: &EnvironmentConfig) -> Pod {
	let container = Container {
		name: CONTAINER_NAME.to_string(),
		image: Some(req.image.clone()),
		ports: Some(vec![ContainerPort {
			name: Some(SSH_PORT_NAME.to_string()),
			container_port: SSH_PORT,
			..Default::default()
		}]),
		..Default::default()
	};

	let image_pull_secrets = if config.image_pull_secrets.is_empty() {
		None
	} else {
		Some(
			config
				.image_pull_secrets
				.iter()
				.map(|name| LocalObjectReference { name: name.clone() })
				.collect(),
		)
	};

	Pod {
		metadata: object_meta(&req.identity_token, config),
		spec: Some(PodSpec {
			containers: vec![container],
			image_pull_secrets,
			..Default::default()
		}),
		status: None,
	}
}

fn build_service_spec(identity_token: &str, config: &EnvironmentConfig) -> Service {
	Service {
		metadata: object_meta(identity_token, config),
		spec: Some(ServiceSpec {
			selector: Some(identity_selector(identity_token)),
			type_: Some(SERVICE_TYPE.to_string()),
			ports: Some(vec![ServicePort {
				name: Some(SSH_PORT_NAME.to_string()),
				port: SSH_PORT,
				target_port: Some(IntOrString::Int(SSH_PORT)),
				..Default::default()
			}]),
			..Default::default()
		}),
		status: None,
	}
}

/// Whether `service` selects `pod`: every selector entry appears in the
/// pod's labels and the selector is non-empty.
pub fn selects(service: &Service, pod: &Pod) -> bool {
	let selector = match service.spec.as_ref().and_then(|s| s.selector.as_ref()) {
		Some(selector) if !selector.is_empty() => selector,
		_ => return false,
	};
	let labels = match pod.metadata.labels.as_ref() {
		Some(labels) => labels,
		None => return false,
	};
	selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

pub use k8s_openapi::api::core::v1::{
	Container, ContainerPort, LocalObjectReference, Namespace, Pod, PodSpec, PodStatus, Service,
	ServicePort, ServiceSpec,
};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
pub use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// The object kinds the provisioner creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	Pod,
	Service,
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Pod => f.write_str("Pod"),
			ResourceKind::Service => f.write_str("Service"),
		}
	}
}

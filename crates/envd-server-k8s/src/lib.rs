// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! K8s client abstraction for envd environment provisioning.
//!
//! This crate provides:
//! - A trait-based K8s client abstraction for testability
//! - Production implementation using the kube crate
//! - An in-memory implementation with failure injection for tests (behind
//!   the `test-utils` feature)
//! - Common types for pod and service management

mod client;
mod error;
mod kube_client;
#[cfg(any(test, feature = "test-utils"))]
mod mock;
mod types;

pub use client::K8sClient;
pub use error::K8sError;
pub use kube_client::KubeClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockK8sClient, Operation};
pub use types::{
	Container, ContainerPort, IntOrString, LocalObjectReference, Namespace, ObjectMeta, Pod,
	PodSpec, PodStatus, ResourceKind, Service, ServicePort, ServiceSpec,
};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment provisioning business logic for envd-server.
//!
//! An environment is a Pod running the requested image plus a Service that
//! selects it, both named after the caller's identity token.
//!
//! # Architecture
//!
//! The provisioner layer sits between the HTTP API (envd-server) and the
//! Kubernetes client (envd-server-k8s), implementing:
//!
//! - Request validation and Pod/Service descriptor construction
//! - Two-step creation with compensation when the second step fails
//! - Error classification by provisioning step
//! - Periodic reconciliation of orphaned pods

pub mod config;
pub mod error;
pub mod provisioner;
pub mod reconcile;
pub mod spec;
pub mod types;
pub mod validation;

pub use config::EnvironmentConfig;
pub use error::ProvisionerError;
pub use provisioner::Provisioner;
pub use reconcile::{run_reconcile, start_reconcile_task};
pub use spec::{build_environment_spec, identity_labels, identity_selector, EnvironmentSpec};
pub use types::{EnvironmentCreateRequest, ProvisioningStep, ReconcileResult};
pub use validation::{validate_identity_token, validate_image, validate_request};

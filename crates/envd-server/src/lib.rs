// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP server for envd environment provisioning.
//!
//! Exposes `POST /api/environments`, which creates a pod and a service for a
//! caller-supplied identity token, and `GET /health`.

pub mod api;
pub mod error;
pub mod health;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use envd_server_config::ServerConfig;
pub use error::{ErrorResponse, ServerError};

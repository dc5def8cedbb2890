// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! envd environment provisioning server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use envd_server::{create_app_state, create_router};
use envd_server_config::LogFormat;
use envd_server_environment::start_reconcile_task;
use envd_server_k8s::KubeClient;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// envd-server - creates envd environments on Kubernetes.
#[derive(Parser, Debug)]
#[command(
	name = "envd-server",
	about = "envd environment provisioning server",
	version
)]
struct Args {
	/// Path to the TOML config file (defaults to /etc/envd/server.toml)
	#[arg(long, env = "ENVD_SERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Subcommands for envd-server (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Parse CLI arguments
	let args = Args::parse();

	// Handle subcommands that should not start the server
	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = match &args.config {
		Some(path) => envd_server_config::load_config_with_file(path)?,
		None => envd_server_config::load_config()?,
	};

	let json_logs = config.logging.format == LogFormat::Json;
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
		.with((!json_logs).then(tracing_subscriber::fmt::layer))
		.init();

	tracing::info!(
			host = %config.http.host,
			port = config.http.port,
			namespace = %config.environment.namespace,
			"starting envd-server"
	);

	let kube_client = Arc::new(KubeClient::new().await?);
	let state = create_app_state(kube_client, &config.environment);

	// Startup lifecycle - validate namespace, keep serving on failure so
	// /health reports the problem
	if let Err(e) = state.provisioner.validate_namespace().await {
		tracing::error!(error = %e, "Environment namespace validation failed");
	}

	let reconcile_handle = if config.environment.reconcile_enabled {
		Some(tokio::spawn(start_reconcile_task(Arc::clone(
			&state.provisioner,
		))))
	} else {
		tracing::info!("Orphan reconcile task disabled");
		None
	};

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	// Start server
	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	if let Some(handle) = reconcile_handle {
		tracing::info!("Stopping orphan reconcile task...");
		handle.abort();
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

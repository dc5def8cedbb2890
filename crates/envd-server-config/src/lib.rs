// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for envd-server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`ENVD_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use envd_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub environment: EnvironmentConfig,
}

impl ServerConfig {
	/// Address the HTTP listener binds to.
	pub fn socket_addr(&self) -> String {
		self.http.bind_addr()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ENVD_SERVER_*`)
/// 2. Config file (`/etc/envd/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize()?;
	let environment = layer.environment.unwrap_or_default().finalize()?;

	info!(
		host = %http.host,
		port = http.port,
		log_format = %logging.format,
		namespace = %environment.namespace,
		compensate_on_failure = environment.compensate_on_failure,
		reconcile_enabled = environment.reconcile_enabled,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		environment,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_socket_addr() {
		let config = ServerConfig::default();
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn test_finalize_empty_layer_uses_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.http.port, 8080);
		assert_eq!(config.environment, EnvironmentConfig::default());
		assert_eq!(config.logging, LoggingConfig::default());
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[environment]
orphan_grace_secs = 900
image_pull_secrets = ["registry-creds"]
"#
		)
		.unwrap();

		let mut sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(TomlSource::new(file.path())),
			Box::new(DefaultsSource),
		];
		sources.sort_by_key(|s| s.precedence());
		assert_eq!(sources[0].name(), "defaults");

		let config = load_from_sources(sources).unwrap();
		assert_eq!(config.environment.orphan_grace_secs, 900);
		assert_eq!(
			config.environment.image_pull_secrets,
			vec!["registry-creds".to_string()]
		);
		assert_eq!(config.environment.call_timeout_secs, 30);
	}

	#[test]
	fn test_invalid_file_section_fails_validation() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[environment]\nnamespace = \"\"").unwrap();

		let result = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		]);
		assert_eq!(result.unwrap_err().section_name(), Some("environment"));
	}

	#[test]
	fn test_blank_host_in_file_fails_validation() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http]\nhost = \"\"\n\n[logging]\nformat = \"json\"").unwrap();

		let result = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		]);
		assert_eq!(result.unwrap_err().section_name(), Some("http"));
	}

	#[test]
	fn test_logging_format_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[logging]\nformat = \"json\"").unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();
		assert_eq!(config.logging.format, LogFormat::Json);
		assert_eq!(config.logging.level, LoggingConfig::default().level);
	}
}

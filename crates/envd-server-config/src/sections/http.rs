// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener section.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Resolved listener address for the provisioning API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
		}
	}
}

impl HttpConfig {
	/// `host:port` suitable for `TcpListener::bind`. Bare IPv6 hosts are
	/// bracketed.
	pub fn bind_addr(&self) -> String {
		if self.host.contains(':') && !self.host.starts_with('[') {
			format!("[{}]:{}", self.host, self.port)
		} else {
			format!("{}:{}", self.host, self.port)
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfigLayer {
	#[serde(default)]
	pub host: Option<String>,
	#[serde(default)]
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: HttpConfigLayer) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	pub fn finalize(self) -> Result<HttpConfig, ConfigError> {
		let host = match self.host {
			Some(host) => host.trim().to_string(),
			None => DEFAULT_HOST.to_string(),
		};
		if host.is_empty() {
			return Err(ConfigError::section("http", "host must not be empty"));
		}
		Ok(HttpConfig {
			host,
			port: self.port.unwrap_or(DEFAULT_PORT),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = HttpConfigLayer::default().finalize().unwrap();
		assert_eq!(config, HttpConfig::default());
		assert_eq!(config.bind_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn test_merge_keeps_unset_host() {
		let mut base = HttpConfigLayer {
			host: Some("127.0.0.1".to_string()),
			port: Some(3000),
		};
		base.merge(HttpConfigLayer {
			host: None,
			port: Some(9000),
		});
		let config = base.finalize().unwrap();
		assert_eq!(config.bind_addr(), "127.0.0.1:9000");
	}

	#[test]
	fn test_blank_host_rejected() {
		let layer = HttpConfigLayer {
			host: Some(" ".to_string()),
			port: None,
		};
		let err = layer.finalize().unwrap_err();
		assert_eq!(err.section_name(), Some("http"));
	}

	#[test]
	fn test_ipv6_host_is_bracketed() {
		let config = HttpConfig {
			host: "::".to_string(),
			port: 8080,
		};
		assert_eq!(config.bind_addr(), "[::]:8080");

		let config = HttpConfig {
			host: "[::1]".to_string(),
			port: 9000,
		};
		assert_eq!(config.bind_addr(), "[::1]:9000");
	}

	#[test]
	fn test_unknown_key_rejected() {
		assert!(toml::from_str::<HttpConfigLayer>("prot = 9090").is_err());
		let layer: HttpConfigLayer = toml::from_str("port = 9090").unwrap();
		assert_eq!(layer.finalize().unwrap().port, 9090);
	}
}

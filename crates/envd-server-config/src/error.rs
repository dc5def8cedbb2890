// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors raised while loading or resolving envd-server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// An `ENVD_SERVER_*` variable could not be parsed.
	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("failed to parse TOML config at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A merged section failed its checks in `finalize`.
	#[error("invalid [{section}] configuration: {message}")]
	Section {
		section: &'static str,
		message: String,
	},
}

impl ConfigError {
	pub(crate) fn section(section: &'static str, message: impl Into<String>) -> Self {
		Self::Section {
			section,
			message: message.into(),
		}
	}

	/// Name of the section that failed validation, if any.
	pub fn section_name(&self) -> Option<&'static str> {
		match self {
			Self::Section { section, .. } => Some(section),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_section_error_names_section() {
		let err = ConfigError::section("http", "host must not be empty");
		assert_eq!(err.section_name(), Some("http"));
		assert_eq!(
			err.to_string(),
			"invalid [http] configuration: host must not be empty"
		);
	}

	#[test]
	fn test_invalid_value_names_key() {
		let err = ConfigError::InvalidValue {
			key: "ENVD_SERVER_PORT".to_string(),
			message: "expected u16, got \"abc\"".to_string(),
		};
		assert!(err.to_string().starts_with("invalid value for ENVD_SERVER_PORT"));
		assert_eq!(err.section_name(), None);
	}
}

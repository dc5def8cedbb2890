// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as read from a single source.

use serde::Deserialize;

use crate::sections::{EnvironmentConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// One source's view of the server config. Absent sections and fields defer
/// to lower-precedence sources. Unknown sections are rejected so a misspelt
/// `[enviroment]` table fails loudly instead of silently using defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub environment: Option<EnvironmentConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlay `other` onto `self`; fields set in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		overlay(&mut self.http, other.http, HttpConfigLayer::merge);
		overlay(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		overlay(
			&mut self.environment,
			other.environment,
			EnvironmentConfigLayer::merge,
		);
	}
}

fn overlay<T>(target: &mut Option<T>, source: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(source) = source else {
		return;
	};
	match target {
		Some(existing) => merge(existing, source),
		None => *target = Some(source),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sections::LogFormat;

	#[test]
	fn test_empty_overlay_is_noop() {
		let mut base = ServerConfigLayer {
			environment: Some(EnvironmentConfigLayer {
				namespace: Some("envd".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer::default());
		assert!(base.http.is_none());
		assert_eq!(
			base.environment.unwrap().namespace.as_deref(),
			Some("envd")
		);
	}

	#[test]
	fn test_env_layer_overrides_file_field_by_field() {
		let mut file: ServerConfigLayer = toml::from_str(
			r#"
[environment]
namespace = "envd"
orphan_grace_secs = 600

[logging]
format = "json"
"#,
		)
		.unwrap();
		let env = ServerConfigLayer {
			environment: Some(EnvironmentConfigLayer {
				orphan_grace_secs: Some(900),
				..Default::default()
			}),
			..Default::default()
		};
		file.merge(env);

		let environment = file.environment.unwrap();
		assert_eq!(environment.namespace.as_deref(), Some("envd"));
		assert_eq!(environment.orphan_grace_secs, Some(900));
		assert_eq!(file.logging.unwrap().format, Some(LogFormat::Json));
	}

	#[test]
	fn test_full_file() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
[http]
port = 9999

[logging]
level = "debug"

[environment]
namespace = "envd"
compensate_on_failure = false
"#,
		)
		.unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9999));
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
		let env = layer.environment.unwrap();
		assert_eq!(env.namespace.as_deref(), Some("envd"));
		assert_eq!(env.compensate_on_failure, Some(false));
	}

	#[test]
	fn test_misspelt_section_rejected() {
		let result = toml::from_str::<ServerConfigLayer>("[enviroment]\nnamespace = \"envd\"");
		assert!(result.is_err());
	}

	#[test]
	fn test_misspelt_environment_key_rejected() {
		let result =
			toml::from_str::<ServerConfigLayer>("[environment]\norphan_grace = 600");
		assert!(result.is_err());
	}
}

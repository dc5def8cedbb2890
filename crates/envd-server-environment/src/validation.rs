// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request validation.
//!
//! The identity token names both a Pod and a Service, so it has to satisfy
//! the stricter of the two rules: a Service name is an RFC 1035 label
//! (lowercase alphanumerics and `-`, starting with a letter, ending with an
//! alphanumeric, at most 63 characters).

use crate::error::ProvisionerError;
use crate::types::EnvironmentCreateRequest;

/// Maximum length of an identity token.
pub const MAX_IDENTITY_TOKEN_LENGTH: usize = 63;

/// Validate every field of a create request.
pub fn validate_request(req: &EnvironmentCreateRequest) -> Result<(), ProvisionerError> {
	validate_identity_token(&req.identity_token)?;
	validate_image(&req.image)
}

/// Check that a token can be used as both a Pod and a Service name.
pub fn validate_identity_token(token: &str) -> Result<(), ProvisionerError> {
	const FIELD: &str = "identityToken";

	if token.is_empty() {
		return Err(ProvisionerError::validation(FIELD, "must not be empty"));
	}
	if token.len() > MAX_IDENTITY_TOKEN_LENGTH {
		return Err(ProvisionerError::validation(
			FIELD,
			format!(
				"must be at most {MAX_IDENTITY_TOKEN_LENGTH} characters (got {})",
				token.len()
			),
		));
	}
	if let Some(c) = token
		.chars()
		.find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
	{
		return Err(ProvisionerError::validation(
			FIELD,
			format!("invalid character {c:?}; only lowercase letters, digits and '-' are allowed"),
		));
	}
	if !token.starts_with(|c: char| c.is_ascii_lowercase()) {
		return Err(ProvisionerError::validation(
			FIELD,
			"must start with a lowercase letter",
		));
	}
	if token.ends_with('-') {
		return Err(ProvisionerError::validation(
			FIELD,
			"must end with a letter or digit",
		));
	}
	Ok(())
}

/// Check that an image reference is present and free of whitespace.
pub fn validate_image(image: &str) -> Result<(), ProvisionerError> {
	const FIELD: &str = "image";

	if image.trim().is_empty() {
		return Err(ProvisionerError::validation(FIELD, "must not be empty"));
	}
	if image.chars().any(char::is_whitespace) {
		return Err(ProvisionerError::validation(
			FIELD,
			"must not contain whitespace",
		));
	}
	Ok(())
}

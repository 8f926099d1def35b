//! Registry configuration.
//!
//! ```toml
//! default_execute_context = "ExecuteContext"
//! eager_type_resolution = true
//! subtype_overloads = true
//! suggest_names = true
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables applied when the registry is built and queried.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Context type required by functions that declare none.
	pub default_execute_context: String,
	/// Resolve every argument type during `initialize` instead of on first use.
	pub eager_type_resolution: bool,
	/// Let template members accept refinements of their declared types.
	pub subtype_overloads: bool,
	/// Attach the closest registered name to `NotFound` errors.
	pub suggest_names: bool,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			default_execute_context: "ExecuteContext".to_string(),
			eager_type_resolution: true,
			subtype_overloads: true,
			suggest_names: true,
		}
	}
}

impl RegistryConfig {
	/// Parses a TOML document. Missing keys keep their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(RegistryConfig::from_toml_str("").unwrap(), RegistryConfig::default());
	}

	#[test]
	fn partial_override() {
		let config = RegistryConfig::from_toml_str(
			r#"
			default_execute_context = "RigContext"
			eager_type_resolution = false
			"#,
		)
		.unwrap();
		assert_eq!(config.default_execute_context, "RigContext");
		assert!(!config.eager_type_resolution);
		assert!(config.subtype_overloads);
		assert!(config.suggest_names);
	}

	#[test]
	fn unknown_key_is_rejected() {
		let err = RegistryConfig::from_toml_str("strict = true").unwrap_err();
		assert!(err.to_string().contains("strict"), "{err}");
	}
}

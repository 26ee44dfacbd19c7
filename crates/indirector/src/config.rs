//! TOML configuration for terminus selection and autoloading.
//!
//! ```toml
//! [autoload]
//! namespace = "indirector"
//!
//! [indirections.certificate]
//! terminus = "rest"
//! cache = "memory"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autoload::DEFAULT_NAMESPACE;
use crate::name::is_canonical;

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		error: std::io::Error,
	},

	/// A value parsed but cannot be used.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parsed indirector configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndirectorConfig {
	pub autoload: AutoloadConfig,
	/// Per-indirection terminus selection, keyed by indirection name.
	pub indirections: BTreeMap<String, IndirectionSettings>,
}

/// Where autoloaders look for terminus plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoloadConfig {
	pub namespace: String,
}

impl Default for AutoloadConfig {
	fn default() -> Self {
		Self {
			namespace: DEFAULT_NAMESPACE.to_string(),
		}
	}
}

/// Terminus selection for one indirection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndirectionSettings {
	/// Concrete terminus serving requests.
	pub terminus: Option<String>,
	/// Concrete terminus caching the primary terminus's results.
	pub cache: Option<String>,
}

impl IndirectorConfig {
	/// Parse a TOML string into an [`IndirectorConfig`].
	pub fn parse(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Settings for the named indirection, if any.
	pub fn indirection(&self, name: &str) -> Option<&IndirectionSettings> {
		self.indirections.get(name)
	}

	fn validate(&self) -> Result<()> {
		if self.autoload.namespace.is_empty() {
			return Err(ConfigError::Invalid("autoload.namespace must not be empty".into()));
		}
		for (indirection, settings) in &self.indirections {
			let names = settings.terminus.iter().chain(settings.cache.iter());
			for name in names.chain(std::iter::once(indirection)) {
				if !is_canonical(name) {
					return Err(ConfigError::Invalid(format!(
						"{name:?} in [indirections.{indirection}] is not a canonical name"
					)));
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_parse_full() {
		let config = IndirectorConfig::parse(
			r#"
			[autoload]
			namespace = "site"

			[indirections.certificate]
			terminus = "rest"
			cache = "memory"

			[indirections.catalog]
			terminus = "compiler"
			"#,
		)
		.unwrap();

		assert_eq!(config.autoload.namespace, "site");
		assert_eq!(
			config.indirection("certificate"),
			Some(&IndirectionSettings {
				terminus: Some("rest".into()),
				cache: Some("memory".into()),
			})
		);
		assert_eq!(config.indirection("catalog").unwrap().cache, None);
		assert!(config.indirection("node").is_none());
	}

	#[test]
	fn test_empty_uses_defaults() {
		let config = IndirectorConfig::parse("").unwrap();
		assert_eq!(config, IndirectorConfig::default());
		assert_eq!(config.autoload.namespace, DEFAULT_NAMESPACE);
	}

	#[test]
	fn test_rejects_unknown_fields() {
		let err = IndirectorConfig::parse("[indirections.catalog]\nterminal = \"x\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn test_rejects_non_canonical_names() {
		let err = IndirectorConfig::parse("[indirections.catalog]\nterminus = \"StaticCompiler\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));

		let err = IndirectorConfig::parse("[autoload]\nnamespace = \"\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	#[test]
	fn test_load_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[indirections.node]\nterminus = \"plain\"").unwrap();

		let config = IndirectorConfig::load(file.path()).unwrap();
		assert_eq!(config.indirection("node").unwrap().terminus.as_deref(), Some("plain"));

		let err = IndirectorConfig::load(file.path().with_extension("missing")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
	}
}

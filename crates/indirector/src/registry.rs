//! The process-wide registry context.
//!
//! A [`Registry`] owns the indirection directory and the terminus registry. It
//! is built once at startup and passed by reference to every call site; tests
//! build their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::autoload::{ConventionPolicy, DiscoveryPolicy};
use crate::config::{IndirectionSettings, IndirectorConfig};
use crate::error::{IndirectorError, Result};
use crate::indirection::{Indirection, IndirectionDirectory};
use crate::model::ModelType;
use crate::terminus::{TerminusClass, TerminusInstance, TerminusRegistry};

/// Indirections, terminus classes and autoloaders for one process.
pub struct Registry {
	indirections: IndirectionDirectory,
	termini: TerminusRegistry,
	settings: RwLock<HashMap<String, IndirectionSettings>>,
}

impl Registry {
	/// Creates a registry that autoloads plugins from the default namespace.
	pub fn new() -> Self {
		Self::with_policy(Arc::new(ConventionPolicy::default()))
	}

	/// Creates a registry with an application-supplied discovery policy.
	pub fn with_policy(policy: Arc<dyn DiscoveryPolicy>) -> Self {
		Self {
			indirections: IndirectionDirectory::new(),
			termini: TerminusRegistry::new(policy),
			settings: RwLock::new(HashMap::new()),
		}
	}

	/// Creates a registry from parsed configuration.
	///
	/// Terminus selections apply to matching indirections as they are registered.
	pub fn from_config(config: &IndirectorConfig) -> Self {
		let registry = Self::with_policy(Arc::new(ConventionPolicy::new(config.autoload.namespace.clone())));
		registry.configure(config);
		registry
	}

	/// Applies per-indirection terminus selections.
	///
	/// Already registered indirections are updated immediately, the rest when
	/// they are registered. A selection without a cache clears any cache
	/// terminus chosen earlier.
	pub fn configure(&self, config: &IndirectorConfig) {
		let mut settings = self.settings.write();
		for (name, selection) in &config.indirections {
			settings.insert(name.clone(), selection.clone());
			if let Some(indirection) = self.indirections.resolve(name) {
				apply_settings(&indirection, selection);
			}
		}
	}

	pub fn indirections(&self) -> &IndirectionDirectory {
		&self.indirections
	}

	pub fn termini(&self) -> &TerminusRegistry {
		&self.termini
	}

	/// Registers an indirection and applies any configured terminus selection.
	pub fn register_indirection(&self, indirection: Indirection) -> Result<Arc<Indirection>> {
		let indirection = self.indirections.register(indirection)?;
		self.apply_configured(&indirection);
		Ok(indirection)
	}

	/// Returns the named indirection, creating it with `model` on first use.
	pub fn indirection_or_register(&self, name: &str, model: impl FnOnce() -> ModelType) -> Arc<Indirection> {
		let indirection = self.indirections.get_or_register(name, model);
		if indirection.terminus_class().is_none() {
			self.apply_configured(&indirection);
		}
		indirection
	}

	pub fn indirection(&self, name: &str) -> Option<Arc<Indirection>> {
		self.indirections.resolve(name)
	}

	fn apply_configured(&self, indirection: &Indirection) {
		if let Some(selection) = self.settings.read().get(indirection.name()) {
			apply_settings(indirection, selection);
		}
	}

	/// Looks up a concrete terminus class, autoloading it on a miss.
	///
	/// Only the autoloader for a terminus type is cached. Each miss for a new
	/// name calls `load` again with that name.
	pub fn terminus_class(&self, terminus_type: &str, terminus_name: &str) -> Result<Arc<TerminusClass>> {
		if let Some(class) = self.termini.get(terminus_type, terminus_name) {
			return Ok(class);
		}

		let slot = self.termini.loader_slot(terminus_type);
		{
			let _gate = slot.gate.lock();
			if let Some(class) = self.termini.get(terminus_type, terminus_name) {
				return Ok(class);
			}
			debug!(terminus_type, terminus_name, path = slot.loader.path(), "autoloading terminus");
			let loaded = slot.loader.load(self, terminus_name)?;
			debug!(terminus_type, terminus_name, loaded, "autoload finished");
		}

		self.termini
			.get(terminus_type, terminus_name)
			.ok_or_else(|| IndirectorError::Lookup {
				terminus_type: terminus_type.to_string(),
				terminus_name: terminus_name.to_string(),
			})
	}

	/// Loads every terminus available for `terminus_type` and lists their names.
	pub fn terminus_classes(&self, terminus_type: &str) -> Result<Vec<String>> {
		let slot = self.termini.loader_slot(terminus_type);
		{
			let _gate = slot.gate.lock();
			slot.loader.load_all(self)?;
		}
		Ok(self.termini.names(terminus_type))
	}

	/// Builds an instance of the named terminus for an indirection.
	pub fn terminus(&self, indirection: &str, terminus_name: &str) -> Result<TerminusInstance> {
		let indirection = self
			.indirections
			.resolve(indirection)
			.ok_or_else(|| IndirectorError::Argument(format!("could not find indirection instance {indirection}")))?;
		self.terminus_class(indirection.name(), terminus_name)?.instantiate()
	}
}

fn apply_settings(indirection: &Indirection, selection: &IndirectionSettings) {
	if let Some(terminus) = &selection.terminus {
		indirection.set_terminus_class(terminus.clone());
	}
	indirection.set_cache_class(selection.cache.clone());
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("indirections", &self.indirections.names())
			.field("termini", &self.termini)
			.finish()
	}
}

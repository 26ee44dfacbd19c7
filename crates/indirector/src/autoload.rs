//! On-demand loading of terminus classes that are not yet registered.
//!
//! The registry never knows where backends live. It asks a [`DiscoveryPolicy`]
//! for one [`Autoloader`] per terminus type and calls it on lookup misses.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::plugin::TerminusPlugin;
use crate::registry::Registry;

/// Namespace used when no other is configured.
pub const DEFAULT_NAMESPACE: &str = "indirector";

/// Loads and registers terminus classes for one terminus type.
pub trait Autoloader: Send + Sync {
	/// The discovery location this loader is bound to.
	fn path(&self) -> &str;

	/// Loads the terminus named `terminus_name`.
	///
	/// Returns whether anything was registered. Registration happens as a
	/// side effect through `registry`.
	fn load(&self, registry: &Registry, terminus_name: &str) -> Result<bool>;

	/// Loads every terminus available at this location that is not registered
	/// yet, returning how many were registered.
	fn load_all(&self, _registry: &Registry) -> Result<usize> {
		Ok(0)
	}
}

/// Maps a terminus type to the autoloader responsible for it.
pub trait DiscoveryPolicy: Send + Sync {
	fn autoloader(&self, terminus_type: &str) -> Arc<dyn Autoloader>;
}

/// Binds each terminus type to `"{namespace}/{terminus_type}"` and discovers
/// link-time [`TerminusPlugin`]s filed under that location.
#[derive(Debug, Clone)]
pub struct ConventionPolicy {
	namespace: String,
}

impl ConventionPolicy {
	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}
}

impl Default for ConventionPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_NAMESPACE)
	}
}

impl DiscoveryPolicy for ConventionPolicy {
	fn autoloader(&self, terminus_type: &str) -> Arc<dyn Autoloader> {
		Arc::new(PluginAutoloader::new(format!("{}/{}", self.namespace, terminus_type)))
	}
}

/// Autoloader over plugins submitted with the [`terminus!`](crate::terminus) macro.
pub struct PluginAutoloader {
	path: String,
}

impl PluginAutoloader {
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}

	fn plugins(&self) -> impl Iterator<Item = &'static TerminusPlugin> + '_ {
		TerminusPlugin::all().filter(move |plugin| plugin.location() == self.path)
	}
}

impl fmt::Debug for PluginAutoloader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginAutoloader").field("path", &self.path).finish()
	}
}

impl Autoloader for PluginAutoloader {
	fn path(&self) -> &str {
		&self.path
	}

	fn load(&self, registry: &Registry, terminus_name: &str) -> Result<bool> {
		let Some(plugin) = self.plugins().find(|plugin| plugin.name() == terminus_name) else {
			debug!(path = %self.path, terminus_name, "no plugin at location");
			return Ok(false);
		};
		registry.define_terminus(plugin.to_def())?;
		info!(path = %self.path, terminus_name, "terminus plugin loaded");
		Ok(true)
	}

	fn load_all(&self, registry: &Registry) -> Result<usize> {
		let mut count = 0;
		for plugin in self.plugins() {
			if registry.termini().get(plugin.terminus_type, &plugin.name()).is_some() {
				continue;
			}
			registry.define_terminus(plugin.to_def())?;
			count += 1;
		}
		debug!(path = %self.path, count, "loaded all plugins at location");
		Ok(count)
	}
}

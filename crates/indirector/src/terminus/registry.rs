//! Storage for terminus classes and per-type autoloader slots.
//!
//! # Concurrency
//!
//! - `abstracts`/`classes`: `RwLock`, so warm lookups never block each other
//! - `loaders`: `Mutex` held only while a slot is found or created, so each
//!   terminus type gets exactly one autoloader
//! - `LoaderSlot::gate`: serializes `load` calls per terminus type; reentrant
//!   so a loading plugin may look up siblings of its own type. A loader must
//!   not look up other terminus types: two loaders doing so in opposite
//!   directions would each wait on the other's gate

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, warn};

use super::class::TerminusClass;
use crate::autoload::{Autoloader, DiscoveryPolicy};

/// The autoloader cached for one terminus type.
pub(crate) struct LoaderSlot {
	pub(crate) loader: Arc<dyn Autoloader>,
	pub(crate) gate: ReentrantMutex<()>,
}

/// Concrete and abstract terminus classes, keyed by type and name.
pub struct TerminusRegistry {
	abstracts: RwLock<HashMap<String, Arc<TerminusClass>>>,
	classes: RwLock<HashMap<String, HashMap<String, Arc<TerminusClass>>>>,
	loaders: Mutex<HashMap<String, Arc<LoaderSlot>>>,
	policy: Arc<dyn DiscoveryPolicy>,
}

impl TerminusRegistry {
	pub fn new(policy: Arc<dyn DiscoveryPolicy>) -> Self {
		Self {
			abstracts: RwLock::new(HashMap::new()),
			classes: RwLock::new(HashMap::new()),
			loaders: Mutex::new(HashMap::new()),
			policy,
		}
	}

	/// Returns the registered concrete class without autoloading.
	pub fn get(&self, terminus_type: &str, terminus_name: &str) -> Option<Arc<TerminusClass>> {
		self.classes.read().get(terminus_type)?.get(terminus_name).cloned()
	}

	/// Stores a concrete class, returning the class it replaced.
	pub fn insert(&self, class: Arc<TerminusClass>) -> Option<Arc<TerminusClass>> {
		let previous = self
			.classes
			.write()
			.entry(class.terminus_type().to_string())
			.or_default()
			.insert(class.name().to_string(), Arc::clone(&class));
		if previous.is_some() {
			warn!(
				terminus_type = %class.terminus_type(),
				terminus_name = %class.name(),
				"terminus class redefined, replacing previous definition"
			);
		}
		previous
	}

	pub fn abstract_class(&self, terminus_type: &str) -> Option<Arc<TerminusClass>> {
		self.abstracts.read().get(terminus_type).cloned()
	}

	pub(crate) fn insert_abstract(&self, class: Arc<TerminusClass>) -> Option<Arc<TerminusClass>> {
		self.abstracts.write().insert(class.terminus_type().to_string(), class)
	}

	/// Sorted names of the concrete classes registered under `terminus_type`.
	pub fn names(&self, terminus_type: &str) -> Vec<String> {
		let mut names: Vec<_> = self
			.classes
			.read()
			.get(terminus_type)
			.map(|by_name| by_name.keys().cloned().collect())
			.unwrap_or_default();
		names.sort();
		names
	}

	/// Sorted names of all abstract terminus types.
	pub fn terminus_types(&self) -> Vec<String> {
		let mut types: Vec<_> = self.abstracts.read().keys().cloned().collect();
		types.sort();
		types
	}

	/// Returns true once an autoloader has been created for `terminus_type`.
	pub fn has_autoloader(&self, terminus_type: &str) -> bool {
		self.loaders.lock().contains_key(terminus_type)
	}

	/// Returns the autoloader slot for `terminus_type`, creating it on first use.
	pub(crate) fn loader_slot(&self, terminus_type: &str) -> Arc<LoaderSlot> {
		let mut loaders = self.loaders.lock();
		if let Some(slot) = loaders.get(terminus_type) {
			return Arc::clone(slot);
		}
		let loader = self.policy.autoloader(terminus_type);
		debug!(terminus_type, path = loader.path(), "autoloader created");
		let slot = Arc::new(LoaderSlot {
			loader,
			gate: ReentrantMutex::new(()),
		});
		loaders.insert(terminus_type.to_string(), Arc::clone(&slot));
		slot
	}
}

impl fmt::Debug for TerminusRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TerminusRegistry")
			.field("terminus_types", &self.terminus_types())
			.field("autoloaders", &self.loaders.lock().keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

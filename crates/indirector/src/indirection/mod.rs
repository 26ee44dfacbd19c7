//! Logical resource families and the process-wide directory that names them.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{IndirectorError, Result};
use crate::model::ModelType;

/// One logical resource family, e.g. `certificate` or `catalog`.
///
/// The name and model never change after construction. The set of known
/// terminus types only grows.
pub struct Indirection {
	name: String,
	model: ModelType,
	terminus_types: RwLock<BTreeSet<String>>,
	selection: RwLock<Selection>,
}

#[derive(Debug, Clone, Default)]
struct Selection {
	terminus_class: Option<String>,
	cache_class: Option<String>,
}

impl Indirection {
	pub fn new(name: impl Into<String>, model: ModelType) -> Self {
		Self {
			name: name.into(),
			model,
			terminus_types: RwLock::new(BTreeSet::new()),
			selection: RwLock::new(Selection::default()),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn model(&self) -> &ModelType {
		&self.model
	}

	/// Records a terminus type as serving this indirection.
	pub fn register_terminus_type(&self, terminus_type: &str) {
		if self.terminus_types.write().insert(terminus_type.to_string()) {
			debug!(indirection = %self.name, terminus_type, "terminus type attached");
		}
	}

	pub fn known_terminus_types(&self) -> Vec<String> {
		self.terminus_types.read().iter().cloned().collect()
	}

	/// The concrete terminus name dispatch uses, if one is selected.
	pub fn terminus_class(&self) -> Option<String> {
		self.selection.read().terminus_class.clone()
	}

	pub fn set_terminus_class(&self, name: impl Into<String>) {
		let name = name.into();
		info!(indirection = %self.name, terminus = %name, "terminus class selected");
		self.selection.write().terminus_class = Some(name);
	}

	/// The terminus used to cache results of the primary terminus.
	pub fn cache_class(&self) -> Option<String> {
		self.selection.read().cache_class.clone()
	}

	/// Sets or clears the cache terminus.
	pub fn set_cache_class(&self, name: Option<String>) {
		info!(indirection = %self.name, cache = ?name, "cache class selected");
		self.selection.write().cache_class = name;
	}
}

impl fmt::Debug for Indirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Indirection")
			.field("name", &self.name)
			.field("model", &self.model)
			.field("terminus_types", &*self.terminus_types.read())
			.finish()
	}
}

/// How a terminus class is pointed at its indirection.
#[derive(Debug, Clone)]
pub enum IndirectionRef {
	/// Resolved through the [`IndirectionDirectory`].
	Name(String),
	/// Used as-is without a directory lookup.
	Instance(Arc<Indirection>),
}

impl From<&str> for IndirectionRef {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<String> for IndirectionRef {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}

impl From<Arc<Indirection>> for IndirectionRef {
	fn from(indirection: Arc<Indirection>) -> Self {
		Self::Instance(indirection)
	}
}

impl From<&Arc<Indirection>> for IndirectionRef {
	fn from(indirection: &Arc<Indirection>) -> Self {
		Self::Instance(Arc::clone(indirection))
	}
}

/// Name-keyed directory of every indirection in the process.
#[derive(Default)]
pub struct IndirectionDirectory {
	entries: RwLock<HashMap<String, Arc<Indirection>>>,
}

impl IndirectionDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks up an indirection by name.
	pub fn resolve(&self, name: &str) -> Option<Arc<Indirection>> {
		self.entries.read().get(name).cloned()
	}

	/// Adds an indirection. Names are unique across the directory.
	pub fn register(&self, indirection: Indirection) -> Result<Arc<Indirection>> {
		let mut entries = self.entries.write();
		if entries.contains_key(indirection.name()) {
			return Err(IndirectorError::configuration(format!(
				"indirection {} is already registered",
				indirection.name()
			)));
		}
		let indirection = Arc::new(indirection);
		entries.insert(indirection.name().to_string(), Arc::clone(&indirection));
		info!(indirection = %indirection.name(), model = %indirection.model(), "indirection registered");
		Ok(indirection)
	}

	/// Returns the named indirection, creating it with `model` on first use.
	pub fn get_or_register(&self, name: &str, model: impl FnOnce() -> ModelType) -> Arc<Indirection> {
		if let Some(found) = self.resolve(name) {
			return found;
		}
		let mut entries = self.entries.write();
		Arc::clone(entries.entry(name.to_string()).or_insert_with(|| {
			let model = model();
			info!(indirection = name, model = %model, "indirection created on demand");
			Arc::new(Indirection::new(name, model))
		}))
	}

	/// Resolves `target` to an indirection, failing with `Argument` for unknown names.
	pub fn bind(&self, target: IndirectionRef) -> Result<Arc<Indirection>> {
		match target {
			IndirectionRef::Instance(indirection) => Ok(indirection),
			IndirectionRef::Name(name) => self
				.resolve(&name)
				.ok_or_else(|| IndirectorError::Argument(format!("could not find indirection instance {name}"))),
		}
	}

	/// Sorted names of all registered indirections.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<_> = self.entries.read().keys().cloned().collect();
		names.sort();
		names
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

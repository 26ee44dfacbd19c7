//! Live terminus instances and the backend operation contract.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::class::TerminusClass;
use crate::error::{IndirectorError, Operation, Result};
use crate::indirection::Indirection;
use crate::model::{Model, ModelRef, ModelType, Version};

/// Operations a concrete backend may implement.
///
/// Every operation defaults to [`InvalidOperation::Unsupported`]. `version`
/// defaults to the version of whatever `find` returns, so a backend that
/// implements `find` gets freshness checks for free.
///
/// [`InvalidOperation::Unsupported`]: crate::InvalidOperation::Unsupported
pub trait Terminus: Send {
	fn find(&self, _key: &str) -> Result<Option<ModelRef>> {
		Err(IndirectorError::unsupported(Operation::Find))
	}

	fn save(&mut self, _instance: ModelRef) -> Result<()> {
		Err(IndirectorError::unsupported(Operation::Save))
	}

	fn search(&self, _query: &str) -> Result<Vec<ModelRef>> {
		Err(IndirectorError::unsupported(Operation::Search))
	}

	fn destroy(&mut self, _instance: &dyn Model) -> Result<()> {
		Err(IndirectorError::unsupported(Operation::Destroy))
	}

	/// Current version of the object stored under `key`.
	fn version(&self, key: &str) -> Result<Option<Version>> {
		match self.find(key) {
			Ok(found) => Ok(found.and_then(|instance| instance.version())),
			Err(err) if err.is_unsupported(Operation::Find) => Err(IndirectorError::unsupported(Operation::Version)),
			Err(err) => Err(err),
		}
	}
}

/// A backend object bound to its class and indirection.
///
/// Built per operation by [`TerminusClass::instantiate`] and dropped when the
/// caller is done.
pub struct TerminusInstance {
	class: Arc<TerminusClass>,
	indirection: Arc<Indirection>,
	backend: Box<dyn Terminus>,
}

impl TerminusInstance {
	pub(crate) fn new(class: Arc<TerminusClass>, indirection: Arc<Indirection>, backend: Box<dyn Terminus>) -> Self {
		Self {
			class,
			indirection,
			backend,
		}
	}

	pub fn name(&self) -> &str {
		self.class.name()
	}

	pub fn indirection(&self) -> &Arc<Indirection> {
		&self.indirection
	}

	pub fn terminus_type(&self) -> &str {
		self.class.terminus_type()
	}

	pub fn model(&self) -> &ModelType {
		self.indirection.model()
	}

	pub fn class(&self) -> &Arc<TerminusClass> {
		&self.class
	}

	pub fn find(&self, key: &str) -> Result<Option<ModelRef>> {
		trace!(terminus = %self.name(), key, "find");
		self.backend.find(key)
	}

	pub fn save(&mut self, instance: ModelRef) -> Result<()> {
		trace!(terminus = %self.name(), key = instance.key(), "save");
		self.backend.save(instance)
	}

	pub fn search(&self, query: &str) -> Result<Vec<ModelRef>> {
		trace!(terminus = %self.name(), query, "search");
		self.backend.search(query)
	}

	pub fn destroy(&mut self, instance: &dyn Model) -> Result<()> {
		trace!(terminus = %self.name(), key = instance.key(), "destroy");
		self.backend.destroy(instance)
	}

	pub fn version(&self, key: &str) -> Result<Option<Version>> {
		self.backend.version(key)
	}

	/// Returns true if the stored version of `key` is at least `provided`.
	///
	/// An object with no resolvable version is never fresh.
	pub fn is_fresh(&self, key: &str, provided: Version) -> Result<bool> {
		let fresh = self.version(key)?.is_some_and(|current| current >= provided);
		trace!(terminus = %self.name(), key, %provided, fresh, "freshness check");
		Ok(fresh)
	}
}

impl fmt::Debug for TerminusInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TerminusInstance")
			.field("name", &self.name())
			.field("terminus_type", &self.terminus_type())
			.field("indirection", &self.indirection.name())
			.finish_non_exhaustive()
	}
}

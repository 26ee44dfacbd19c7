//! Terminus class descriptors.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::instance::{Terminus, TerminusInstance};
use crate::error::{InvalidOperation, Result};
use crate::indirection::Indirection;
use crate::model::ModelType;

/// Whether a terminus class anchors a family or implements a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
	/// The per-indirection base type. Never instantiated.
	Abstract,
	/// A backend implementation that can serve requests.
	Concrete,
}

/// Builds fresh backend objects for a concrete terminus class.
pub type TerminusFactory = Arc<dyn Fn() -> Box<dyn Terminus> + Send + Sync>;

/// Metadata for one terminus class.
pub struct TerminusClass {
	name: String,
	terminus_type: String,
	kind: BackendKind,
	indirection: RwLock<Arc<Indirection>>,
	description: RwLock<Option<String>>,
	factory: Option<TerminusFactory>,
}

impl TerminusClass {
	pub(crate) fn new_abstract(indirection: Arc<Indirection>) -> Self {
		let name = indirection.name().to_string();
		Self {
			terminus_type: name.clone(),
			name,
			kind: BackendKind::Abstract,
			indirection: RwLock::new(indirection),
			description: RwLock::new(None),
			factory: None,
		}
	}

	pub(crate) fn new_concrete(
		terminus_type: String,
		name: String,
		indirection: Arc<Indirection>,
		factory: TerminusFactory,
	) -> Self {
		Self {
			name,
			terminus_type,
			kind: BackendKind::Concrete,
			indirection: RwLock::new(indirection),
			description: RwLock::new(None),
			factory: Some(factory),
		}
	}

	/// The class name. For abstract classes this is the indirection name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The abstract family this class belongs to.
	pub fn terminus_type(&self) -> &str {
		&self.terminus_type
	}

	pub fn kind(&self) -> BackendKind {
		self.kind
	}

	pub fn is_abstract(&self) -> bool {
		self.kind == BackendKind::Abstract
	}

	pub fn indirection(&self) -> Arc<Indirection> {
		self.indirection.read().clone()
	}

	/// The data model, delegated to the bound indirection.
	pub fn model(&self) -> ModelType {
		self.indirection.read().model().clone()
	}

	/// Sets operator-facing help text. Has no effect on dispatch.
	pub fn desc(&self, text: impl Into<String>) {
		*self.description.write() = Some(text.into());
	}

	pub fn description(&self) -> Option<String> {
		self.description.read().clone()
	}

	pub(crate) fn bind_indirection(&self, indirection: Arc<Indirection>) {
		*self.indirection.write() = indirection;
	}

	/// Builds a live instance. Abstract classes are rejected.
	pub fn instantiate(self: &Arc<Self>) -> Result<TerminusInstance> {
		let factory = match (self.kind, &self.factory) {
			(BackendKind::Concrete, Some(factory)) => factory,
			_ => {
				return Err(InvalidOperation::AbstractInstantiation {
					terminus_type: self.terminus_type.clone(),
				}
				.into());
			}
		};
		Ok(TerminusInstance::new(Arc::clone(self), self.indirection(), factory()))
	}
}

impl fmt::Debug for TerminusClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TerminusClass")
			.field("name", &self.name)
			.field("terminus_type", &self.terminus_type)
			.field("kind", &self.kind)
			.field("indirection", &self.indirection.read().name())
			.finish()
	}
}

/// Definition of a concrete terminus, consumed by [`crate::Registry::define_terminus`].
pub struct TerminusDef {
	pub(crate) terminus_type: String,
	pub(crate) name: String,
	pub(crate) description: Option<String>,
	pub(crate) factory: TerminusFactory,
}

impl TerminusDef {
	/// A terminus with an explicit name under `terminus_type`.
	pub fn new<F, T>(terminus_type: impl Into<String>, name: impl Into<String>, factory: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
		T: Terminus + 'static,
	{
		Self::with_factory(
			terminus_type,
			name,
			Arc::new(move || Box::new(factory()) as Box<dyn Terminus>),
		)
	}

	/// A terminus whose name is derived from a legacy type identifier.
	pub fn from_identifier<F, T>(terminus_type: impl Into<String>, identifier: &str, factory: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
		T: Terminus + 'static,
	{
		Self::new(terminus_type, crate::name::canonicalize(identifier), factory)
	}

	pub fn with_factory(terminus_type: impl Into<String>, name: impl Into<String>, factory: TerminusFactory) -> Self {
		Self {
			terminus_type: terminus_type.into(),
			name: name.into(),
			description: None,
			factory,
		}
	}

	pub fn description(mut self, text: impl Into<String>) -> Self {
		self.description = Some(text.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn terminus_type(&self) -> &str {
		&self.terminus_type
	}
}

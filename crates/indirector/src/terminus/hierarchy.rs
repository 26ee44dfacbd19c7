//! Registration protocol for abstract and concrete terminus classes.

use std::sync::Arc;

use tracing::{debug, info};

use super::class::{TerminusClass, TerminusDef};
use crate::error::{IndirectorError, Result};
use crate::indirection::IndirectionRef;
use crate::name::{canonicalize, is_canonical};
use crate::registry::Registry;

impl Registry {
	/// Defines the abstract terminus type anchoring an indirection's backends.
	///
	/// The canonical form of `identifier` must name a registered indirection;
	/// it becomes both the class name and the terminus type.
	pub fn define_abstract(&self, identifier: &str) -> Result<Arc<TerminusClass>> {
		let name = canonicalize(identifier);
		let indirection = self.indirections().resolve(&name).ok_or_else(|| {
			IndirectorError::configuration(format!("could not find indirection instance {name} for {identifier}"))
		})?;

		let class = Arc::new(TerminusClass::new_abstract(Arc::clone(&indirection)));
		indirection.register_terminus_type(class.terminus_type());
		if self.termini().insert_abstract(Arc::clone(&class)).is_some() {
			debug!(terminus_type = %name, "abstract terminus type redefined");
		}
		info!(terminus_type = %name, "abstract terminus type defined");
		Ok(class)
	}

	/// Defines a concrete terminus under an existing abstract type and
	/// registers it. A later definition under the same name replaces this one.
	pub fn define_terminus(&self, def: TerminusDef) -> Result<Arc<TerminusClass>> {
		if !is_canonical(&def.name) {
			return Err(IndirectorError::configuration(format!(
				"terminus name {:?} is not canonical (expected {:?})",
				def.name,
				canonicalize(&def.name)
			)));
		}
		let parent = self.termini().abstract_class(&def.terminus_type).ok_or_else(|| {
			IndirectorError::configuration(format!(
				"terminus {} names unknown terminus type {}",
				def.name, def.terminus_type
			))
		})?;

		let class = Arc::new(TerminusClass::new_concrete(
			parent.terminus_type().to_string(),
			def.name,
			parent.indirection(),
			def.factory,
		));
		if let Some(text) = def.description {
			class.desc(text);
		}
		self.register(Arc::clone(&class));
		Ok(class)
	}

	/// Registers a concrete class directly, replacing any class under the same key.
	pub fn register(&self, class: Arc<TerminusClass>) {
		info!(
			terminus_type = %class.terminus_type(),
			terminus_name = %class.name(),
			indirection = %class.indirection().name(),
			"terminus class registered"
		);
		self.termini().insert(class);
	}

	/// Rebinds `class` to another indirection.
	///
	/// Names are resolved through the directory and must exist; on failure the
	/// current binding is kept.
	pub fn set_indirection(&self, class: &TerminusClass, target: impl Into<IndirectionRef>) -> Result<()> {
		let indirection = self.indirections().bind(target.into())?;
		indirection.register_terminus_type(class.terminus_type());
		debug!(
			terminus = %class.name(),
			indirection = %indirection.name(),
			"terminus class rebound"
		);
		class.bind_indirection(indirection);
		Ok(())
	}
}

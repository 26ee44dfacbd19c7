//! Uniform dispatch through an indirection's selected terminus.
//!
//! When the indirection also names a cache terminus, `find` answers from the
//! cache while the cached copy is at least as recent as the primary's version.
//! Cache failures are logged and never fail the request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{IndirectorError, InvalidOperation, Operation, Result};
use crate::indirection::Indirection;
use crate::model::{Model, ModelRef};
use crate::registry::Registry;
use crate::terminus::TerminusInstance;

impl Registry {
	/// Finds `key` through the named indirection.
	pub fn find(&self, indirection: &str, key: &str) -> Result<Option<ModelRef>> {
		let (indirection, terminus) = self.selected_terminus(indirection)?;
		let Some(mut cache) = self.cache_terminus(&indirection) else {
			return terminus.find(key);
		};

		if let Some(found) = cached(&terminus, &cache, key)? {
			debug!(indirection = %indirection.name(), key, "answered from cache");
			return Ok(Some(found));
		}

		let found = terminus.find(key)?;
		if let Some(instance) = &found {
			if let Err(err) = cache.save(Arc::clone(instance)) {
				warn!(indirection = %indirection.name(), key, error = %err, "could not populate cache");
			}
		}
		Ok(found)
	}

	/// Saves `instance` through the named indirection, then into its cache.
	pub fn save(&self, indirection: &str, instance: ModelRef) -> Result<()> {
		let (indirection, mut terminus) = self.selected_terminus(indirection)?;
		terminus.save(Arc::clone(&instance))?;
		if let Some(mut cache) = self.cache_terminus(&indirection) {
			if let Err(err) = cache.save(instance) {
				warn!(indirection = %indirection.name(), error = %err, "could not update cache");
			}
		}
		Ok(())
	}

	/// Searches the named indirection's terminus. The cache is not consulted.
	pub fn search(&self, indirection: &str, query: &str) -> Result<Vec<ModelRef>> {
		let (_, terminus) = self.selected_terminus(indirection)?;
		terminus.search(query)
	}

	/// Destroys `instance` through the named indirection and evicts it from the cache.
	pub fn destroy(&self, indirection: &str, instance: &dyn Model) -> Result<()> {
		let (indirection, mut terminus) = self.selected_terminus(indirection)?;
		terminus.destroy(instance)?;
		if let Some(mut cache) = self.cache_terminus(&indirection) {
			if let Err(err) = cache.destroy(instance) {
				warn!(indirection = %indirection.name(), key = instance.key(), error = %err, "could not evict from cache");
			}
		}
		Ok(())
	}

	fn selected_terminus(&self, name: &str) -> Result<(Arc<Indirection>, TerminusInstance)> {
		let indirection = self
			.indirection(name)
			.ok_or_else(|| IndirectorError::Argument(format!("could not find indirection instance {name}")))?;
		let terminus_name = indirection
			.terminus_class()
			.ok_or_else(|| InvalidOperation::NoTerminusSelected {
				indirection: name.to_string(),
			})?;
		let terminus = self.terminus_class(indirection.name(), &terminus_name)?.instantiate()?;
		Ok((indirection, terminus))
	}

	fn cache_terminus(&self, indirection: &Indirection) -> Option<TerminusInstance> {
		let cache_name = indirection.cache_class()?;
		match self
			.terminus_class(indirection.name(), &cache_name)
			.and_then(|class| class.instantiate())
		{
			Ok(cache) => Some(cache),
			Err(err) => {
				warn!(indirection = %indirection.name(), cache = %cache_name, error = %err, "cache terminus unavailable");
				None
			}
		}
	}
}

/// Returns the cached copy of `key` if it is fresh against the primary terminus.
fn cached(terminus: &TerminusInstance, cache: &TerminusInstance, key: &str) -> Result<Option<ModelRef>> {
	let version = match terminus.version(key) {
		Ok(Some(version)) => version,
		Ok(None) => return Ok(None),
		Err(err) if err.is_unsupported(Operation::Version) => return Ok(None),
		Err(err) => return Err(err),
	};
	match cache.is_fresh(key, version) {
		Ok(true) => {}
		Ok(false) => return Ok(None),
		Err(err) => {
			warn!(cache = %cache.name(), key, error = %err, "cache freshness check failed");
			return Ok(None);
		}
	}
	cache.find(key).or_else(|err| {
		warn!(cache = %cache.name(), key, error = %err, "cache lookup failed");
		Ok(None)
	})
}

//! Process-local terminus keeping objects in a shared map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::model::{Model, ModelRef, Version};
use crate::terminus::{Terminus, TerminusFactory};

type Store = Arc<RwLock<HashMap<String, ModelRef>>>;

/// Keeps saved objects in memory for the lifetime of its store.
///
/// Instances built by the same [`MemoryTerminus::factory`] share one store, so
/// objects saved through one per-request instance are visible to the next.
#[derive(Debug, Clone, Default)]
pub struct MemoryTerminus {
	store: Store,
}

impl MemoryTerminus {
	pub fn new() -> Self {
		Self::default()
	}

	/// A factory whose instances all share one fresh store.
	pub fn factory() -> TerminusFactory {
		let shared = Self::new();
		Arc::new(move || Box::new(shared.clone()) as Box<dyn Terminus>)
	}

	pub fn len(&self) -> usize {
		self.store.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.store.read().is_empty()
	}
}

impl Terminus for MemoryTerminus {
	fn find(&self, key: &str) -> Result<Option<ModelRef>> {
		Ok(self.store.read().get(key).cloned())
	}

	fn save(&mut self, instance: ModelRef) -> Result<()> {
		self.store.write().insert(instance.key().to_string(), instance);
		Ok(())
	}

	/// Returns every object whose key contains `query`; `"*"` matches all.
	fn search(&self, query: &str) -> Result<Vec<ModelRef>> {
		let store = self.store.read();
		let mut found: Vec<ModelRef> = store
			.values()
			.filter(|instance| query == "*" || instance.key().contains(query))
			.cloned()
			.collect();
		found.sort_by(|a, b| a.key().cmp(b.key()));
		Ok(found)
	}

	fn destroy(&mut self, instance: &dyn Model) -> Result<()> {
		self.store.write().remove(instance.key());
		Ok(())
	}

	fn version(&self, key: &str) -> Result<Option<Version>> {
		Ok(self.store.read().get(key).and_then(|instance| instance.version()))
	}
}

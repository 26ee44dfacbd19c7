//! Indirected objects, their data shapes, and version stamps.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Authoritative version of an indirected object.
///
/// Versions are totally ordered; a larger value is more recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl From<u64> for Version {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// An object served through an indirection.
pub trait Model: Any + fmt::Debug + Send + Sync {
	/// Key the object is stored and found under.
	fn key(&self) -> &str;

	/// The object's own version, if it carries one.
	fn version(&self) -> Option<Version> {
		None
	}

	fn as_any(&self) -> &dyn Any;
}

/// Shared handle to an indirected object.
pub type ModelRef = Arc<dyn Model>;

impl dyn Model {
	/// Downcasts to a concrete model type.
	pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
		self.as_any().downcast_ref::<T>()
	}
}

/// The data shape an indirection manages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelType {
	name: String,
	type_id: Option<TypeId>,
}

impl ModelType {
	/// A model identified only by name.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			type_id: None,
		}
	}

	/// The model described by the Rust type `T`.
	pub fn of<T: Model>() -> Self {
		let full = std::any::type_name::<T>();
		let name = full.rsplit("::").next().unwrap_or(full);
		Self {
			name: name.to_string(),
			type_id: Some(TypeId::of::<T>()),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns true if this model describes the Rust type `T`.
	pub fn is<T: Model>(&self) -> bool {
		self.type_id == Some(TypeId::of::<T>())
	}
}

impl fmt::Display for ModelType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

impl PartialEq<&str> for ModelType {
	fn eq(&self, other: &&str) -> bool {
		self.name == *other
	}
}

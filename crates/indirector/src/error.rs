//! Error types for terminus registration, lookup and dispatch.

use std::fmt;

use thiserror::Error;

/// A backend operation named in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	Find,
	Save,
	Search,
	Destroy,
	Version,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Find => "find",
			Self::Save => "save",
			Self::Search => "search",
			Self::Destroy => "destroy",
			Self::Version => "version",
		};
		f.write_str(name)
	}
}

/// Misuse of a terminus class or instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidOperation {
	/// An abstract terminus type was asked to build an instance.
	#[error("cannot create instances of abstract terminus type {terminus_type}")]
	AbstractInstantiation { terminus_type: String },
	/// The concrete backend does not implement the requested operation.
	#[error("terminus does not support {operation}")]
	Unsupported { operation: Operation },
	/// An indirection was used for dispatch before a terminus class was selected.
	#[error("no terminus class selected for indirection {indirection}")]
	NoTerminusSelected { indirection: String },
}

/// Errors raised by the indirection core.
///
/// All variants are surfaced synchronously at the point of misuse; nothing is
/// retried at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndirectorError {
	/// A terminus type was defined without a matching indirection, or a
	/// concrete terminus names an abstract parent that does not exist.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// An indirection assignment by name did not resolve.
	#[error("invalid argument: {0}")]
	Argument(String),

	/// No terminus class is registered under the key, even after autoloading.
	#[error("could not find terminus {terminus_name} for type {terminus_type}")]
	Lookup {
		terminus_type: String,
		terminus_name: String,
	},

	#[error("invalid operation: {0}")]
	InvalidOperation(#[from] InvalidOperation),

	/// Failure reported by a concrete backend.
	#[error("terminus {terminus} failed: {message}")]
	Backend { terminus: String, message: String },
}

impl IndirectorError {
	pub(crate) fn configuration(msg: impl Into<String>) -> Self {
		Self::Configuration(msg.into())
	}

	pub(crate) fn unsupported(operation: Operation) -> Self {
		Self::InvalidOperation(InvalidOperation::Unsupported { operation })
	}

	/// Builds a backend failure for `terminus`.
	pub fn backend(terminus: impl Into<String>, message: impl fmt::Display) -> Self {
		Self::Backend {
			terminus: terminus.into(),
			message: message.to_string(),
		}
	}

	/// Returns true if this error reports an unimplemented backend operation.
	pub fn is_unsupported(&self, op: Operation) -> bool {
		matches!(
			self,
			Self::InvalidOperation(InvalidOperation::Unsupported { operation }) if *operation == op
		)
	}
}

/// Result type for indirection operations.
pub type Result<T> = std::result::Result<T, IndirectorError>;

#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Backend indirection for configuration-management resources.
//!
//! Every logical resource type (an *indirection*, e.g. `certificate`) is served
//! by one of several interchangeable backends (*termini*, e.g. `rest`, `file`,
//! `ca`) chosen by configuration. Callers name the indirection; the
//! [`Registry`] resolves the terminus class, autoloading it on first use, and
//! dispatches to a fresh [`TerminusInstance`].
//!
//! # Class hierarchy
//!
//! Each indirection has exactly one *abstract* terminus type, defined with
//! [`Registry::define_abstract`], whose name is the indirection name. Concrete
//! termini are defined under it with [`Registry::define_terminus`] or declared
//! statically with [`terminus!`] and autoloaded on demand.
//!
//! ```ignore
//! let registry = Registry::new();
//! registry.register_indirection(Indirection::new("certificate", ModelType::of::<Certificate>()))?;
//! registry.define_abstract("Certificate")?;
//! registry.define_terminus(TerminusDef::new("certificate", "file", FileCertificate::default))?;
//!
//! let terminus = registry.terminus("certificate", "file")?;
//! let fresh = terminus.is_fresh("host.example.com", Version(3))?;
//! ```
//!
//! # Freshness
//!
//! [`Terminus::version`] defaults to the version of the object `find`
//! returns. [`TerminusInstance::is_fresh`] treats an equal version as fresh,
//! since the caller already holds it.

pub mod autoload;
pub mod config;
mod dispatch;
pub mod error;
pub mod indirection;
pub mod model;
pub mod name;
pub mod plugin;
mod registry;
pub mod termini;
pub mod terminus;

pub use autoload::{Autoloader, ConventionPolicy, DEFAULT_NAMESPACE, DiscoveryPolicy, PluginAutoloader};
pub use config::{ConfigError, IndirectionSettings, IndirectorConfig};
pub use error::{IndirectorError, InvalidOperation, Operation, Result};
pub use indirection::{Indirection, IndirectionDirectory, IndirectionRef};
pub use model::{Model, ModelRef, ModelType, Version};
pub use name::canonicalize;
pub use plugin::{TerminusPlugin, TerminusPluginReg};
pub use registry::Registry;
pub use terminus::{BackendKind, Terminus, TerminusClass, TerminusDef, TerminusFactory, TerminusInstance, TerminusRegistry};

#[doc(hidden)]
pub mod __private {
	pub use inventory;
	pub use paste;
}

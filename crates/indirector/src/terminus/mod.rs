//! Terminus classes, their registry, and live instances.

mod class;
mod hierarchy;
mod instance;
mod registry;

pub use class::{BackendKind, TerminusClass, TerminusDef, TerminusFactory};
pub use instance::{Terminus, TerminusInstance};
pub use registry::TerminusRegistry;

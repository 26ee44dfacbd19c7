//! Reference termini shipped with the core.

pub mod memory;

pub use memory::MemoryTerminus;

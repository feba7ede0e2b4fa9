//! Session context store implementations for enamAI.

pub mod in_memory;

pub use in_memory::InMemorySessionStore;

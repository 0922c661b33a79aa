mod memory;

pub use memory::InMemorySession;

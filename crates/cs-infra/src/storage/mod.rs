mod memory;

pub use memory::InMemoryStorage;

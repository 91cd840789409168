pub mod engine;
pub mod memory;
pub mod table;

pub use engine::{ScopeStore, StoreTransaction};
pub use memory::MemoryStore;
pub use table::Table;

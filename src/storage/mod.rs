//! Persistent node records behind a narrow CRUD seam.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::NodeStore;

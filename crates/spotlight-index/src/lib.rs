//! spotlight-index
//!
//! Implementations of `SearchIndex`: a tantivy-backed local index that stands
//! in for the system search service, and an in-memory index for tests.
pub mod memory;
pub mod schema;
pub mod text_index;

pub use memory::MemoryIndex;
pub use text_index::TantivyIndex;

//! makro_core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{CopyMode, Document};
pub use error::{MakroError, Result};
pub use storage::{GrdStore, JsonStore, MemoryStore, SheetStore};

pub use makro_engine::engine::{CellRange, CellRef};

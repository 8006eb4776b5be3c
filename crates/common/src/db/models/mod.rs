//! SeaORM entity models
//!
//! Database entities for the Griot answering service

mod memory_entry;
mod passage;

pub use memory_entry::{
    Entity as MemoryEntity,
    Model as MemoryEntry,
    ActiveModel as MemoryActiveModel,
    Column as MemoryColumn,
    MemoryRole,
    MemoryTier,
};

pub use passage::{
    Entity as PassageEntity,
    Model as Passage,
    ActiveModel as PassageActiveModel,
    Column as PassageColumn,
};

// src/infrastructure/repositories/mod.rs
mod error;
mod memory_record;
mod sqlite_record;

pub use memory_record::InMemoryRecordRepository;
pub use sqlite_record::SqliteRecordRepository;

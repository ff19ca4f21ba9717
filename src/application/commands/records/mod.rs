// src/application/commands/records/mod.rs
mod create;
mod delete;
mod service;
mod update;

pub use create::{CreateRecordCommand, CreateRecordCommandBuilder};
pub use delete::DeleteRecordCommand;
pub use service::RecordCommandService;
pub use update::UpdateRecordCommand;

//! Scoped unique slug generation for persisted records.
//!
//! [`application::registry::SlugRegistry`] is the entry point: configure a
//! [`domain::slug::SlugConfig`] per record type, then call `before_save`
//! ahead of every insert or update. [`application::commands::records`] wraps
//! that hook around a record store and retries on slug conflicts.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

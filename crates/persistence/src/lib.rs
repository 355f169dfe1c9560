//! Persistence layer for the Hotspot backend.
//!
//! This crate contains:
//! - Database connection management
//! - The PostgreSQL document store
//! - Database metrics

pub mod db;
pub mod document_store;
pub mod metrics;

pub use document_store::PgDocumentStore;

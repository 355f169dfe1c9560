//! Domain layer for the Hotspot backend.
//!
//! This crate contains:
//! - Domain models (groups, join codes, memberships, schedules)
//! - The document store abstraction and its in-memory implementation
//! - Business logic services (join-code allocation, membership, schedule)
//! - Domain error types

pub mod error;
pub mod models;
pub mod paths;
pub mod services;
pub mod store;

pub use error::{DomainError, ErrorKind};

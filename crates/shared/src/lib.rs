//! Shared utilities and common types for the Hotspot backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Bearer token verification (and minting, for tooling and tests)
//! - Common validation logic

pub mod jwt;
pub mod validation;

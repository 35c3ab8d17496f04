//! Backoffice Core - Shared types library.
//!
//! This crate provides common types used across all Backoffice components:
//! - `admin` - Server-rendered administration panel for users and products
//! - `cli` - Command-line tools for seeding and probing the backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no templates. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, prices, tags and
//!   the display theme

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

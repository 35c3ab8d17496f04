//! Core types for Backoffice.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod tags;
pub mod theme;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use tags::Tags;
pub use theme::{Theme, ThemePreference, resolve_effective};

//! Utility functions and helpers
//!
//! Framework-agnostic helpers shared by the domain entities and services.

pub mod time;

pub use time::*;

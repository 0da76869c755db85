//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive storage,
//! catalog and tag defaults, and helpers to load it from disk.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;

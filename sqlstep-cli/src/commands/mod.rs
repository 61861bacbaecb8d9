//! CLI command implementations.

pub mod migrate;
pub mod new;
pub mod version;

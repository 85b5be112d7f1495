//! CLI command implementations.

pub mod common;
pub mod info;
pub mod process;
pub mod stages;
pub mod validate;

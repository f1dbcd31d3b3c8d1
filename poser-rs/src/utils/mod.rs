//! Shared utilities for the poser-rs CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;

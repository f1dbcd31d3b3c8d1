//! Poser-RS library
//!
//! Command implementations behind the poser-rs CLI.

pub mod cli;
pub mod commands;
pub mod utils;

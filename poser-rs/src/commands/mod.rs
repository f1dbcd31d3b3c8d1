//! Command implementations

pub mod joints;
pub mod pose;

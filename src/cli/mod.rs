//! Command-line interface for pulse-loader

pub mod commands;
pub mod error;

//! CLI library components for the VCT statistics importer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod pipeline;
pub mod summary;

//! NutriScan Tools module
//!
//! MCP tool implementations for the NutriScan ingredient analyzer.

pub mod dashboard;
pub mod history;
pub mod profile;
pub mod reports;
pub mod scanner;
pub mod status;

//! NutriScan Library
//!
//! Ingredient hazard matching, nutrition scoring and scan history.

pub mod analysis;
pub mod build_info;
pub mod config;
pub mod db;
pub mod intake;
pub mod mcp;
pub mod models;
pub mod tools;

//! Data models
//!
//! Rust structs representing database entities.

mod scan;
mod user;

pub use scan::{format_timestamp, new_scan_id, Scan, NO_INGREDIENTS_TEXT};
pub use user::{
    scan_streak, Preferences, User, UserStats, UserUpdate, DEMO_USER_EMAIL, DEMO_USER_NAME,
    DIETARY_RESTRICTIONS,
};

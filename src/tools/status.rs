//! NutriScan Status Tool
//!
//! Provides runtime status information about the NutriScan service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage guide for AI assistants
pub const SCAN_INSTRUCTIONS: &str = r#"
# NutriScan Scanning Instructions

NutriScan checks food ingredient lists against a table of known harmful
additives and returns a nutrition score, a risk level and health alerts.

## Choosing an input

| Tool | Input |
|------|-------|
| `analyze_ingredients` | Ingredient list as text |
| `scan_upload` | Label photo: file name, content type and size |
| `scan_camera` | A camera capture |
| `scan_barcode` | A product barcode scan |
| `scan_voice` | A spoken ingredient list, already transcribed |

Ingredient text is split on commas and newlines. Text inside parentheses is
ignored when matching, so "Red Dye 40 (color)" matches "red dye 40".

Uploads must have an `image/*` content type and be at most 10 MB.

## Languages

Pass `language` (see `list_languages`) when the text is not English. It is
translated to English before analysis.

## Reading the result

- `score.overall`: 0-100, starting at 100. Each harmful ingredient subtracts
  its impact, each safe one adds 2.
- `score.grade`: A+ (90+), A, B, C, D, F (below 50).
- `risk.level`: EXCELLENT, GOOD, MODERATE, POOR or DANGEROUS from a 0-10
  risk score (high = 3, medium = 2, low = 1 point per harmful ingredient).
- `alerts`: ingredients recently banned in several countries.

## History

Call `sign_in` first and pass the returned `user_id` to the scan tools to
keep a history (latest 50 scans). Use `get_scan_history`, `get_dashboard`
and `export_scan_report` (PDF) on stored scans.
"#;

/// Runtime status information
#[derive(Debug, Clone, Serialize)]
pub struct NutriscanStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub report_dir: String,
    pub history_limit: usize,
    pub hazard_count: usize,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    report_dir: PathBuf,
    history_limit: usize,
    hazard_count: usize,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, report_dir: PathBuf, history_limit: usize, hazard_count: usize) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            report_dir,
            history_limit,
            hazard_count,
        }
    }

    pub fn get_status(&self) -> NutriscanStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriscanStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            report_dir: self.report_dir.display().to_string(),
            history_limit: self.history_limit,
            hazard_count: self.hazard_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

//! Logging module for phpsema-analyze
//!
//! Optional file logging of the collect and resolve phases, for debugging
//! symbol extraction and exclusion decisions. Disabled unless initialized.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<AnalyzeLogger>> = Mutex::new(None);

/// Logger for analysis runs
pub struct AnalyzeLogger {
    file: File,
}

impl AnalyzeLogger {
    /// Create a new logger writing to the specified path
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;
        Ok(Self { file })
    }

    /// Write a log message
    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    /// Log a section header
    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Initialize the global logger
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("/tmp/phpsema-analyze-{}.log", timestamp))
    });

    let logger = AnalyzeLogger::new(&path)?;
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }
    Ok(path)
}

/// Log a message to the global logger
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header
pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Log the start of the collect phase
pub fn log_collect_start(files_count: usize) {
    section("COLLECT PHASE");
    log(&format!("Collecting symbols from {} files", files_count));
}

/// Log the end of the collect phase
pub fn log_collect_complete(classes: usize, functions: usize) {
    log(&format!(
        "Registry frozen: {} classes, {} function declarations",
        classes, functions
    ));
}

/// Log a file that failed to read or parse
pub fn log_file_error(path: &Path, error: &str) {
    log(&format!("FAILED: {} - {}", path.display(), error));
}

/// Log an exclusion decision
pub fn log_excluded(path: &Path, pattern: &str) {
    log(&format!("EXCLUDED: {} (matched: {})", path.display(), pattern));
}

/// Log the end of an analysis run
pub fn log_analysis_complete(files: usize, total_complexity: u32) {
    section("ANALYSIS COMPLETE");
    log(&format!("Files analyzed: {}", files));
    log(&format!("Total cognitive complexity: {}", total_complexity));
}

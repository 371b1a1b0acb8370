//! Logging configuration
//!
//! The subscriber itself is installed by the binary; this module only holds
//! the settings and the log file housekeeping.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

const LOG_FILE_PREFIX: &str = "shodou_";
const LOG_FILE_SUFFIX: &str = ".log";

/// Where and how much to log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`); `RUST_LOG` overrides
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a timestamped file in `log_dir`
    pub file_output: bool,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Number of log files kept
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            log_dir: PathBuf::from("logs"),
            max_log_files: 10,
        }
    }
}

impl LogConfig {
    /// Configured level, `INFO` when unparsable
    pub fn parse_level(&self) -> Level {
        Level::from_str(self.level.trim()).unwrap_or(Level::INFO)
    }

    /// Create `log_dir` if file output is on
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Delete the oldest log files so that at most `max_log_files - 1` remain,
    /// leaving room for the file about to be created
    pub fn cleanup_old_logs(&self) -> io::Result<()> {
        if !self.file_output || !self.log_dir.is_dir() {
            return Ok(());
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_FILE_PREFIX) && n.ends_with(LOG_FILE_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Timestamped names sort chronologically
        logs.sort();

        let keep = self.max_log_files.saturating_sub(1);
        if logs.len() > keep {
            let excess = logs.len() - keep;
            for path in logs.drain(..excess) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Path of the log file for a session starting now
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.log_dir
            .join(format!("{}{}{}", LOG_FILE_PREFIX, stamp, LOG_FILE_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), Level::INFO);
        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), Level::DEBUG);
        config.level = "WARN".to_string();
        assert_eq!(config.parse_level(), Level::WARN);
        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), Level::INFO);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            log_dir: dir.path().join("logs"),
            max_log_files: 3,
            ..Default::default()
        };
        config.ensure_log_directory().unwrap();

        for day in 1..=5 {
            let name = format!("shodou_2024-01-0{}_00-00-00.log", day);
            fs::write(config.log_dir.join(name), "x").unwrap();
        }
        fs::write(config.log_dir.join("notes.txt"), "keep").unwrap();

        config.cleanup_old_logs().unwrap();

        let mut left: Vec<String> = fs::read_dir(&config.log_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec![
                "notes.txt",
                "shodou_2024-01-04_00-00-00.log",
                "shodou_2024-01-05_00-00-00.log",
            ]
        );
    }

    #[test]
    fn test_current_log_path_is_in_log_dir() {
        let config = LogConfig::default();
        let path = config.current_log_path();
        assert!(path.starts_with("logs"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("shodou_") && name.ends_with(".log"));
    }
}

//! Display recent log entries from the application.

use crate::logging::{self, LOG_FILE_PREFIX};
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LINES: usize = 50;

/// Prints the last lines of the most recent log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If the log directory or file cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = logging::log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when xyscope runs.");
        return Ok(());
    }

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines: Vec<&str> = content.lines().collect();
    let tail = tail_lines(&lines, DEFAULT_LINES);

    if tail.len() < lines.len() {
        println!("Showing last {} of {} lines:", tail.len(), lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in tail {
        println!("{line}");
    }

    Ok(())
}

fn tail_lines<'a, 'b>(lines: &'a [&'b str], count: usize) -> &'a [&'b str] {
    &lines[lines.len().saturating_sub(count)..]
}

/// Finds the most recently modified log file in the directory.
fn find_latest_log(log_dir: &Path) -> Result<Option<PathBuf>, anyhow::Error> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let latest = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|path| {
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path);

    Ok(latest)
}

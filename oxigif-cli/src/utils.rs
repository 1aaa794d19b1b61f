//! Utility functions for the CLI.

use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Expand shell-style patterns into file paths.
///
/// A pattern that matches nothing is kept as a literal path so the caller
/// reports it as missing instead of silently skipping it.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob(pattern)? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "unreadable path"),
            }
        }
        if paths.len() == before {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

/// Format a delay in hundredths of a second.
pub fn format_delay(delay: u16) -> String {
    format!("{}.{:02}s", delay / 100, delay % 100)
}

//! Log Digest Builder
//!
//! Reduces execution logs to their high-signal lines. Every retained line
//! contains `WARN` or `ERROR`; each file that contributes lines gets a
//! `--- Log from file: <name> ---` header, in input order.

use std::fmt;
use std::path::Path;

use perf_analyzer_core::{CoreError, CoreResult, InputKind};
use serde::{Deserialize, Serialize};

/// Substrings that mark a line as high-signal (case-sensitive).
pub const LOG_MARKERS: [&str; 2] = ["WARN", "ERROR"];

/// Digest limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestOptions {
    /// Maximum retained lines across all files. `None` keeps everything.
    #[serde(default)]
    pub max_lines: Option<usize>,
}

impl DigestOptions {
    /// Keep every matching line
    pub fn unbounded() -> Self {
        Self { max_lines: None }
    }

    /// Keep at most `max_lines` matching lines; `0` means unbounded
    pub fn capped(max_lines: usize) -> Self {
        Self {
            max_lines: (max_lines > 0).then_some(max_lines),
        }
    }
}

/// Retained lines from a single log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSection {
    pub file_name: String,
    pub lines: Vec<String>,
}

/// Filtered view over a run's execution logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDigest {
    pub sections: Vec<LogSection>,
    /// Matching lines dropped by the line cap
    pub omitted: usize,
}

impl LogDigest {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.omitted == 0
    }

    /// Number of retained lines, headers excluded
    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Newline-joined text, headers included. Empty when nothing matched.
    pub fn render(&self) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.line_count() + self.sections.len() + 1);
        for section in &self.sections {
            out.push(format!("--- Log from file: {} ---", section.file_name));
            out.extend(section.lines.iter().cloned());
        }
        if self.omitted > 0 {
            out.push(format!(
                "--- Truncated: {} more WARN/ERROR lines omitted ---",
                self.omitted
            ));
        }
        out.join("\n")
    }

    fn apply_cap(&mut self, max_lines: usize) {
        let mut budget = max_lines;
        for section in &mut self.sections {
            let keep = section.lines.len().min(budget);
            self.omitted += section.lines.len() - keep;
            section.lines.truncate(keep);
            budget -= keep;
        }
        self.sections.retain(|s| !s.lines.is_empty());
    }
}

impl fmt::Display for LogDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Whether a log line carries one of `LOG_MARKERS`
pub fn is_high_signal(line: &str) -> bool {
    LOG_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Build the digest for `paths`, in order.
///
/// Every path is checked and read before the cap is applied, so a missing
/// file is reported even when earlier files already fill the cap.
pub fn build_log_digest<P: AsRef<Path>>(
    paths: &[P],
    options: &DigestOptions,
) -> CoreResult<LogDigest> {
    let mut digest = LogDigest::default();

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::not_found(InputKind::LogFile, path));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            CoreError::unexpected(format!(
                "Error reading log file {}: {}",
                path.display(),
                e
            ))
        })?;
        // Logs may carry stray non-UTF-8 bytes from the load generator
        let text = String::from_utf8_lossy(&bytes);

        // `\n`, `\r\n` and bare `\r` all end a line
        let lines: Vec<String> = text
            .split(['\n', '\r'])
            .filter(|line| is_high_signal(line))
            .map(|line| line.trim().to_string())
            .collect();

        tracing::debug!(
            path = %path.display(),
            retained = lines.len(),
            "filtered log file"
        );

        if !lines.is_empty() {
            digest.sections.push(LogSection {
                file_name: display_name(path),
                lines,
            });
        }
    }

    if let Some(max_lines) = options.max_lines {
        digest.apply_cap(max_lines);
        if digest.omitted > 0 {
            tracing::debug!(
                max_lines,
                omitted = digest.omitted,
                "log digest truncated"
            );
        }
    }

    Ok(digest)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! File scanner for discovering result files.
//!
//! This module lists the results directory (non-recursively) and keeps
//! the files whose names match one of the configured glob patterns.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File name patterns to include (e.g., ["bert_*.csv"])
    pub patterns: Vec<String>,
    /// Exact file names never returned, even when a pattern matches
    pub excludes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns: crate::config::default_patterns(),
            excludes: vec![crate::config::default_output_file()],
        }
    }
}

impl From<&crate::config::Config> for ScanConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            patterns: config.discovery.patterns.clone(),
            excludes: vec![config.output.file_name.clone()],
        }
    }
}

/// Scanned file information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Base file name
    pub file_name: String,
    /// File size in bytes
    pub size: u64,
}

/// File scanner for discovering result files.
pub struct FileScanner {
    config: ScanConfig,
    results_dir: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(results_dir: PathBuf, config: ScanConfig) -> Self {
        Self {
            config,
            results_dir,
        }
    }

    /// Scan for all matching files.
    ///
    /// Patterns are visited in order and the matches of each pattern are
    /// ordered by file name. A file matched by several patterns is kept
    /// once. A missing results directory yields no files.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.results_dir.exists() {
            warn!(
                "Results directory does not exist: {}",
                self.results_dir.display()
            );
            return Ok(Vec::new());
        }

        let candidates = self.list_candidates()?;
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for pattern in &self.config.patterns {
            for candidate in &candidates {
                if !glob_match(pattern, &candidate.file_name) {
                    continue;
                }
                if self.is_excluded(&candidate.file_name) {
                    debug!("Skipping excluded file: {}", candidate.file_name);
                    continue;
                }
                if seen.insert(candidate.path.clone()) {
                    files.push(candidate.clone());
                }
            }
        }

        debug!(
            "Matched {} of {} files in {}",
            files.len(),
            candidates.len(),
            self.results_dir.display()
        );

        Ok(files)
    }

    /// Check if a file name is explicitly excluded.
    fn is_excluded(&self, name: &str) -> bool {
        self.config.excludes.iter().any(|excluded| name == excluded)
    }

    /// List the regular files directly inside the results directory,
    /// sorted by file name.
    fn list_candidates(&self) -> Result<Vec<ScannedFile>> {
        let mut candidates = Vec::new();

        let walker = WalkDir::new(&self.results_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(e).with_context(|| {
                        format!(
                            "Failed to read results directory: {}",
                            self.results_dir.display()
                        )
                    });
                }
                Err(e) => {
                    debug!("Cannot read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            candidates.push(ScannedFile {
                path: path.to_path_buf(),
                file_name,
                size,
            });
        }

        Ok(candidates)
    }

    /// The directory being scanned.
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}

/// Match a file name against a glob pattern.
///
/// `*` matches any run of characters and `?` matches exactly one.
/// `[seq]` matches one character in `seq`, `[!seq]` one character not in
/// it; `seq` may hold ranges such as `a-z`, and a `[` with no closing `]`
/// is literal. The whole name must match. Wildcards never match a leading
/// `.`, so hidden files only match patterns that start with a literal dot.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if name.starts_with('.') && !pattern.starts_with('.') {
        return false;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` seen and the name index it was tried at.
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        let next = match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
                continue;
            }
            Some('?') => Some(p + 1),
            Some('[') => match match_class(&pattern, p, name[n]) {
                Some((true, end)) => Some(end),
                Some((false, _)) => None,
                None => (name[n] == '[').then_some(p + 1),
            },
            Some(&c) => (c == name[n]).then_some(p + 1),
            None => None,
        };

        match (next, star) {
            (Some(end), _) => {
                p = end;
                n += 1;
            }
            (None, Some((star_p, star_n))) => {
                p = star_p + 1;
                n = star_n + 1;
                star = Some((star_p, star_n + 1));
            }
            (None, None) => return false,
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

/// Match `c` against the bracket expression opening at `pattern[start]`.
///
/// Returns whether it matched and the index just past the closing `]`, or
/// `None` when the bracket is never closed. A `]` right after `[` or `[!`
/// is a member, not the terminator.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = pattern.get(i) == Some(&'!');
    if negate {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        let lo = *pattern.get(i)?;
        if lo == ']' && !first {
            break;
        }
        first = false;

        match (pattern.get(i + 1), pattern.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                matched |= lo <= c && c <= hi;
                i += 3;
            }
            _ => {
                matched |= lo == c;
                i += 1;
            }
        }
    }

    Some((matched != negate, i + 1))
}

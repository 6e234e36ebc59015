//! File utility functions for listing and filtering files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filename filter: every non-empty part must match.
/// Matching is case-sensitive, as night-directory filenames are.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameFilter<'a> {
    /// Required filename prefix.
    pub prefix: &'a str,
    /// Substring that must appear somewhere after the prefix.
    pub contains: &'a str,
    /// Required filename suffix (usually an extension such as `.yaml`).
    pub suffix: &'a str,
}

impl FileNameFilter<'_> {
    pub fn matches(&self, file_name: &str) -> bool {
        let Some(rest) = file_name.strip_prefix(self.prefix) else {
            return false;
        };
        let Some(rest) = rest.strip_suffix(self.suffix) else {
            return false;
        };
        rest.contains(self.contains)
    }
}

/// Returns the sorted paths of all regular files in `dir` whose name passes `filter`.
pub fn files_matching(dir: &Path, filter: &FileNameFilter<'_>) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| filter.matches(name))
        })
        .collect();

    paths.sort();
    tracing::trace!(dir = %dir.display(), count = paths.len(), "listed matching files");

    Ok(paths)
}

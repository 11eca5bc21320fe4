use crate::contexts::{SearchError, TestFileSearch};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File search over a workspace directory tree
///
/// Globs are matched against paths relative to the root with `/` as a literal
/// separator, so `*` stays within one path component and `**/` spans
/// directories. Entries are visited in file name order, which keeps results
/// stable between runs.
#[derive(Debug, Clone)]
pub struct WorkspaceSearch {
    root: PathBuf,
}

impl WorkspaceSearch {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl TestFileSearch for WorkspaceSearch {
    fn search(
        &self,
        pattern: &str,
        exclude: &str,
        max_results: usize,
    ) -> Result<Vec<PathBuf>, SearchError> {
        let include = compile(pattern)?;
        let exclude = compile(exclude)?;

        let mut found = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            // Prune excluded directories instead of walking into them
            .filter_entry(|entry| {
                !(entry.file_type().is_dir() && is_excluded_dir(&exclude, self.relative(entry.path())))
            });

        for entry in walker {
            if found.len() >= max_results {
                break;
            }

            // Unreadable entries below the root are skipped, the rest of the
            // tree still counts
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(SearchError::Walk(e.to_string())),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable workspace entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = self.relative(entry.path());
            if exclude.is_match(relative) || !include.is_match(relative) {
                continue;
            }

            found.push(entry.into_path());
        }

        debug!(pattern, hits = found.len(), "workspace search finished");
        Ok(found)
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher, SearchError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| SearchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A directory is excluded when anything inside it would be
fn is_excluded_dir(exclude: &GlobMatcher, relative_dir: &Path) -> bool {
    !relative_dir.as_os_str().is_empty() && exclude.is_match(relative_dir.join("_"))
}

use crate::catalog::{Catalog, ProductRecord};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Fatal scan failures. Per-entry I/O errors during the walk are absorbed;
/// only a missing or unreadable root aborts the scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("takeout folder not found: {0}")]
    RootNotFound(PathBuf),
    #[error("failed to read takeout folder {path}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStatus {
    Dead,
    Alive,
    Unknown,
}

/// Classification and statistics for one top-level export folder.
/// `product` is present exactly when `status` is `Dead`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub folder: String,
    pub path: PathBuf,
    pub status: FolderStatus,
    pub product: Option<ProductRecord>,
    pub file_count: u64,
    pub size_bytes: u64,
    pub oldest_file: Option<DateTime<Utc>>,
    pub newest_file: Option<DateTime<Utc>>,
}

pub struct FolderScanner {
    catalog: Catalog,
    ignore_patterns: Vec<String>,
}

impl FolderScanner {
    pub fn new(catalog: Catalog, ignore_patterns: Vec<String>) -> Self {
        Self {
            catalog,
            ignore_patterns,
        }
    }

    /// Produce one `ScanResult` per immediate child directory of `root`.
    /// Hidden directories and configured ignore patterns are skipped.
    /// Results are sorted by folder name so repeated scans of an unchanged
    /// tree are identical.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScanResult>, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }

        let entries = fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let folders: Vec<(String, PathBuf)> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .filter(|(name, _)| !name.starts_with('.') && !self.is_ignored(name))
            .collect();

        // Each folder gets its own accumulator; walks never share state.
        let mut results: Vec<ScanResult> = folders
            .par_iter()
            .map(|(name, path)| self.scan_folder(name, path))
            .collect();

        results.sort_by(|a, b| a.folder.cmp(&b.folder));
        Ok(results)
    }

    fn scan_folder(&self, name: &str, path: &Path) -> ScanResult {
        let stats = folder_stats(path);
        let (status, product) = self.classify(name);

        ScanResult {
            folder: name.to_string(),
            path: path.to_path_buf(),
            status,
            product,
            file_count: stats.file_count,
            size_bytes: stats.size_bytes,
            oldest_file: stats.oldest_file,
            newest_file: stats.newest_file,
        }
    }

    /// Ordered rule list, first match wins: dead beats alive beats unknown.
    fn classify(&self, folder: &str) -> (FolderStatus, Option<ProductRecord>) {
        if let Some(product) = self.catalog.match_folder(folder).filter(|p| p.is_dead()) {
            return (FolderStatus::Dead, Some(product.clone()));
        }
        if self.catalog.is_alive_product(folder) {
            return (FolderStatus::Alive, None);
        }
        (FolderStatus::Unknown, None)
    }

    fn is_ignored(&self, name: &str) -> bool {
        for pattern in &self.ignore_patterns {
            if pattern.contains('*') {
                let regex_pattern = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
                if let Ok(re) = regex::Regex::new(&regex_pattern) {
                    if re.is_match(name) {
                        return true;
                    }
                }
            } else if name.eq_ignore_ascii_case(pattern) {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Default)]
struct FolderStats {
    file_count: u64,
    size_bytes: u64,
    oldest_file: Option<DateTime<Utc>>,
    newest_file: Option<DateTime<Utc>>,
}

/// Walk one folder's whole subtree and aggregate regular-file statistics.
/// `walkdir` keeps the traversal iterative, and any entry that errors
/// (permissions, races, broken links) simply contributes nothing.
fn folder_stats(path: &Path) -> FolderStats {
    let mut stats = FolderStats::default();

    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        stats.file_count += 1;
        stats.size_bytes += metadata.len();

        if let Ok(modified) = metadata.modified() {
            let mtime = DateTime::<Utc>::from(modified);
            stats.oldest_file = Some(stats.oldest_file.map_or(mtime, |t| t.min(mtime)));
            stats.newest_file = Some(stats.newest_file.map_or(mtime, |t| t.max(mtime)));
        }
    }

    stats
}

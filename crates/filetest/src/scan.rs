use std::path::PathBuf;
use anyhow::Result;
use walkdir::WalkDir;
use crate::config::FileTestConfig;
use crate::filetest::is_supported_media;
use log::{debug, info, warn};

/// Walk the given roots and collect files that pass the extension gate, in walk order
pub fn scan_roots(cfg: &FileTestConfig, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        anyhow::bail!("No library roots configured");
    }

    let mut candidates = Vec::new();
    let mut files_checked = 0;

    for root in roots {
        if !root.exists() {
            warn!("Library root does not exist: {}", root.display());
            continue;
        }

        info!("Scanning directory: {}", root.display());
        let before = candidates.len();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error reading directory entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            files_checked += 1;
            if files_checked % 1000 == 0 {
                info!("Checked {} files so far...", files_checked);
            }

            let path = entry.path();
            if is_supported_media(cfg, path) {
                debug!("Found media file: {}", path.display());
                candidates.push(path.to_path_buf());
            }
        }

        info!("Finished scanning {}: {} media files", root.display(), candidates.len() - before);
    }

    info!("Scan complete: checked {} files, found {} media files", files_checked, candidates.len());
    Ok(candidates)
}

/// Scan the configured library roots
pub fn scan_library(cfg: &FileTestConfig) -> Result<Vec<PathBuf>> {
    scan_roots(cfg, &cfg.library_roots)
}

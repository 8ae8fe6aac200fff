use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::FilesConfig;

/// A file selected for indexing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on disk, used for reading.
    pub path: PathBuf,
    /// Root-relative path with forward-slash separators — the stable
    /// cross-platform key stored in vector payloads.
    pub source_file: String,
}

/// Walk the configured root and return files matching the include globs
/// and not matching the exclude globs, in deterministic order.
pub fn scan_files(config: &FilesConfig) -> Result<Vec<SourceFile>> {
    let root = &config.root;
    if !root.exists() {
        bail!("files.root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let source_file = normalize_path(&relative.to_string_lossy());

        if exclude_set.is_match(&source_file) {
            continue;
        }
        if !include_set.is_match(&source_file) {
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            source_file,
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.source_file.cmp(&b.source_file));

    Ok(files)
}

/// Normalize path separators to forward slashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

//! Pair matching: join two directories on filename stem.
//!
//! Directory B is indexed first (stem → path), then directory A is scanned
//! and every stem present in both sides becomes an [`ImagePair`]. Files whose
//! extension is not in the allow-list are skipped silently. An empty result
//! is a valid terminal state, not an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Recognized image extensions (lowercased for comparison).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "bmp"];

/// One unit of analysis: two images sharing a filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub stem: String,
    pub path_a: PathBuf,
    pub path_b: PathBuf,
}

/// Whether a path carries one of the recognized image extensions.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// List recognized image files in a directory, sorted by filename.
///
/// Sorting makes duplicate-stem resolution deterministic: when `a.jpg` and
/// `a.png` coexist, the lexicographically first file wins no matter what
/// order the filesystem enumerates them in.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|_| Error::DirectoryNotFound(dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();
    files.sort();
    Ok(files)
}

/// Index a directory's images by stem, first file per stem winning.
fn index_by_stem(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut index: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in list_images(dir)? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(kept) = index.get(stem) {
            tracing::warn!(
                stem,
                kept = %kept.display(),
                skipped = %path.display(),
                "duplicate stem in {}, keeping first match",
                dir.display()
            );
            continue;
        }
        index.insert(stem.to_string(), path);
    }
    Ok(index)
}

/// Match images across two directories by stem.
///
/// Both paths must be readable directories. The result is sorted by stem
/// and may be empty.
pub fn match_pairs(dir_a: &Path, dir_b: &Path) -> Result<Vec<ImagePair>> {
    let index_b = index_by_stem(dir_b)?;
    let index_a = index_by_stem(dir_a)?;

    let pairs: Vec<ImagePair> = index_a
        .into_iter()
        .filter_map(|(stem, path_a)| {
            index_b.get(&stem).map(|path_b| ImagePair {
                stem,
                path_a,
                path_b: path_b.clone(),
            })
        })
        .collect();

    tracing::debug!(
        pairs = pairs.len(),
        "matched {} against {}",
        dir_a.display(),
        dir_b.display()
    );
    Ok(pairs)
}

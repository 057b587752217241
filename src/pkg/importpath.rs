use std::path::Path;

use crate::error::{Error, Result};

/// Canonical import path of the package rooted at `abs_path`, relative to `<source_root>/src/`.
///
/// A pure prefix check on the path text; callers pass symlink-resolved paths.
pub fn import_identity(abs_path: &Path, source_root: &Path) -> Result<String> {
    let root = source_root.to_string_lossy();
    let src_prefix = format!("{}/src/", root.trim_end_matches('/'));
    let path = abs_path.to_string_lossy();

    match path.strip_prefix(&src_prefix) {
        Some(rel) if !rel.is_empty() => Ok(rel.trim_end_matches('/').to_string()),
        _ => Err(Error::NotUnderRoot {
            path: abs_path.to_path_buf(),
            root: Path::new(src_prefix.trim_end_matches('/')).to_path_buf(),
        }),
    }
}

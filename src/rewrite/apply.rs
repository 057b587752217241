use std::path::{Component, Path};
use tracing::debug;

use crate::error::Result;
use crate::rewrite::table::RewriteTable;

/// Capability that rewrites every import path literal in a source tree.
pub trait ImportRewriter {
    /// Visit every file under `root` whose root-relative path passes `filter`, replace each
    /// import literal `s` with `lookup(s)`, and write changed files back. Returns how many
    /// files were rewritten.
    fn rewrite_imports(
        &self,
        root: &Path,
        lookup: &mut dyn FnMut(&str) -> String,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<usize>;
}

pub fn is_go_file(rel: &Path) -> bool {
    rel.extension().and_then(|e| e.to_str()) == Some("go")
}

/// `.go` files outside the top-level `vendor` directory.
pub fn is_go_file_outside_vendor(rel: &Path) -> bool {
    is_go_file(rel) && rel.components().next() != Some(Component::Normal("vendor".as_ref()))
}

// Precondition: `table` was fully built; lookups may add cached entries to it.
// Postcondition: Every import under `root` is replaced by `table.lookup(import)`.
// Side effects: Rewrites files on disk through `rewriter`.
pub fn apply_rewrite(
    table: &mut RewriteTable,
    root: &Path,
    filter: &dyn Fn(&Path) -> bool,
    rewriter: &dyn ImportRewriter,
) -> Result<usize> {
    debug!("  - rewriting imports");
    let n = rewriter.rewrite_imports(root, &mut |s: &str| table.lookup(s), filter)?;
    debug!("  - finished! ({} files)", n);
    Ok(n)
}

/// Rewrite `old` (and any `old/...` sub-package) to `new` in `.go` files under `dir`, leaving
/// the vendor tree alone.
pub fn update_imports(
    dir: &Path,
    old: &str,
    new: &str,
    rewriter: &dyn ImportRewriter,
) -> Result<usize> {
    let mut lookup = |s: &str| -> String {
        if s == old {
            return new.to_string();
        }
        match s.strip_prefix(old) {
            Some(rest) if rest.starts_with('/') => format!("{new}{rest}"),
            _ => s.to_string(),
        }
    };
    rewriter.rewrite_imports(dir, &mut lookup, &is_go_file_outside_vendor)
}

// Purpose: Resolve a dependency edge to its package descriptor on disk.
// Inputs/Outputs: Takes a dependency reference and search roots; returns a fully parsed descriptor.
// Invariants: Local vendor tree is always consulted before the global cache; no partial results.
// Gotchas: Any local failure (missing dir, bad json) falls through to the global cache silently,
// but a workspace without GOPATH has no cache to fall through to and says so in the error.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pkg::package::{Dependency, Package, find_package_in_dir};
use crate::workspace::{GOPATH_VAR, Workspace};

/// Second lookup tier behind the local vendor tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalCache {
    At(PathBuf),
    /// The workspace has no source root, so the cache location is unknown.
    Unset,
    Disabled,
}

/// Where dependency descriptors are looked up, keyed by content hash.
#[derive(Debug, Clone)]
pub struct DepSearch {
    pub local: PathBuf,
    pub global: GlobalCache,
}

impl DepSearch {
    pub fn new(local: impl Into<PathBuf>, global: Option<PathBuf>) -> Self {
        Self {
            local: local.into(),
            global: global.map_or(GlobalCache::Disabled, GlobalCache::At),
        }
    }

    /// Search `local` first, then the workspace's global cache.
    pub fn for_workspace(ws: &Workspace, local: impl Into<PathBuf>) -> Self {
        Self {
            local: local.into(),
            global: ws
                .global_cache_dir()
                .map_or(GlobalCache::Unset, GlobalCache::At),
        }
    }

    /// The project's own `vendor/gx/ipfs`, then the global cache.
    pub fn vendored(ws: &Workspace) -> Self {
        Self::for_workspace(ws, ws.vendor_dir())
    }

    pub fn local_only(local: impl Into<PathBuf>) -> Self {
        Self::new(local, None)
    }
}

pub fn load_dep(dep: &Dependency, search: &DepSearch) -> Result<Package> {
    let local = search.local.join(&dep.hash);
    debug!("  - fetching dep: {} ({})", dep.name, dep.hash);
    let local_err = match find_package_in_dir(&local) {
        Ok(pkg) => return Ok(pkg),
        Err(e) => e,
    };

    debug!("  - local lookup failed: {}", local_err);
    let mut searched = vec![local];
    let mut skipped = None;
    match &search.global {
        GlobalCache::At(global_root) => {
            let global = global_root.join(&dep.hash);
            debug!("  - checking in global namespace ({})", global.display());
            match find_package_in_dir(&global) {
                Ok(pkg) => return Ok(pkg),
                Err(global_err) => debug!("  - global lookup failed: {}", global_err),
            }
            searched.push(global);
        }
        GlobalCache::Unset => {
            skipped = Some(Box::new(Error::SourceRootUnset { var: GOPATH_VAR }));
        }
        GlobalCache::Disabled => {}
    }

    Err(Error::DependencyNotFound {
        name: dep.name.clone(),
        hash: dep.hash.clone(),
        searched,
        skipped,
    })
}

/// Path of a package as installed under a hash directory (`<dir>/<name>`).
pub fn package_source_dir(hash_dir: &Path, pkg: &Package) -> PathBuf {
    hash_dir.join(&pkg.name)
}

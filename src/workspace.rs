// Purpose: Carry the per-invocation environment (working directory, Go source root) explicitly.
// Inputs/Outputs: Built once from process state in `from_env`; borrowed by every command.
// Invariants: `cwd` is absolute with symlinks resolved so prefix checks against GOPATH are stable.
// Gotchas: Only the first GOPATH entry counts; later entries are never searched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const GOPATH_VAR: &str = "GOPATH";

/// File name gx uses for package descriptors.
pub const PKG_FILE_NAME: &str = "package.json";

/// `gx/ipfs`, the namespace vendored packages live under.
pub fn gx_namespace() -> PathBuf {
    Path::new("gx").join("ipfs")
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub cwd: PathBuf,
    pub gopath: Option<PathBuf>,
}

impl Workspace {
    pub fn new(cwd: PathBuf, gopath: Option<PathBuf>) -> Self {
        Self { cwd, gopath }
    }

    pub fn from_env() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?.canonicalize()?;
        let gopath = first_path_entry(std::env::var_os(GOPATH_VAR));
        Ok(Self { cwd, gopath })
    }

    pub fn source_root(&self) -> Result<&Path> {
        self.gopath
            .as_deref()
            .ok_or(Error::SourceRootUnset { var: GOPATH_VAR })
    }

    /// `$GOPATH/src`, where `hook install-path --global` installs.
    pub fn global_install_dir(&self) -> Result<PathBuf> {
        Ok(self.source_root()?.join("src"))
    }

    /// `$GOPATH/src/gx/ipfs`, the machine-wide fallback for dependency lookup.
    pub fn global_cache_dir(&self) -> Option<PathBuf> {
        self.gopath
            .as_ref()
            .map(|gp| gp.join("src").join(gx_namespace()))
    }

    /// `<cwd>/vendor/gx/ipfs`.
    pub fn vendor_dir(&self) -> PathBuf {
        self.cwd.join("vendor").join(gx_namespace())
    }

    pub fn package_file(&self) -> PathBuf {
        self.cwd.join(PKG_FILE_NAME)
    }
}

fn first_path_entry(raw: Option<OsString>) -> Option<PathBuf> {
    let raw = raw?;
    std::env::split_paths(&raw)
        .next()
        .filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Workspace, first_path_entry};
    use crate::error::Error;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn only_first_gopath_entry_is_used() {
        let joined = std::env::join_paths(["/home/a/go", "/opt/go"]).expect("join paths");
        assert_eq!(first_path_entry(Some(joined)), Some(PathBuf::from("/home/a/go")));
        assert_eq!(first_path_entry(Some(OsString::new())), None);
        assert_eq!(first_path_entry(None), None);
    }

    #[test]
    fn missing_source_root_is_reported() {
        let ws = Workspace::new(PathBuf::from("/work/proj"), None);
        assert!(matches!(
            ws.source_root(),
            Err(Error::SourceRootUnset { var: "GOPATH" })
        ));
        assert_eq!(ws.global_cache_dir(), None);
        assert_eq!(ws.vendor_dir(), PathBuf::from("/work/proj/vendor/gx/ipfs"));
    }

    #[test]
    fn global_locations_hang_off_source_root() {
        let ws = Workspace::new(PathBuf::from("/w"), Some(PathBuf::from("/gp")));
        assert_eq!(ws.global_install_dir().expect("install dir"), PathBuf::from("/gp/src"));
        assert_eq!(ws.global_cache_dir(), Some(PathBuf::from("/gp/src/gx/ipfs")));
    }
}

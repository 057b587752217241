use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::workspace::PKG_FILE_NAME;

/// Go specific block of a gx package descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dvcsimport: Option<String>,

    /// Minimum compiler version; installs with an older `go` are refused by `req-check`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goversion: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub name: String,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "GoInfo::is_empty")]
    pub gx: GoInfo,

    /// Fields owned by gx itself (author, license, gxVersion, ...), kept so saves are lossless.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GoInfo {
    pub fn is_empty(&self) -> bool {
        self.dvcsimport.is_none() && self.goversion.is_none() && self.extra.is_empty()
    }
}

impl Dependency {
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            author: None,
            name: name.into(),
            hash: hash.into(),
            version: None,
        }
    }
}

impl Package {
    pub fn parse(json_text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(json_text).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::PackageFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        text.push('\n');
        fs::write(path, text).map_err(|source| Error::PackageFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// DVCS import path, treating an empty string the same as an absent one.
    pub fn dvcs_import(&self) -> Option<&str> {
        self.gx.dvcsimport.as_deref().filter(|s| !s.is_empty())
    }

    pub fn go_version(&self) -> Option<&str> {
        self.gx.goversion.as_deref().filter(|s| !s.is_empty())
    }

    pub fn find_dep(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Hash qualified import path of this package when vendored under `hash`.
    pub fn gx_import(&self, hash: &str) -> String {
        format!("gx/ipfs/{}/{}", hash, self.name)
    }
}

/// Locate and load the descriptor stored in a package directory.
///
/// gx installs a package as `<hash>/<name>/package.json`, so when `dir` has no descriptor of its
/// own, the single entry inside it is tried instead.
pub fn find_package_in_dir(dir: &Path) -> Result<Package> {
    let direct = dir.join(PKG_FILE_NAME);
    if direct.is_file() {
        return Package::load(&direct);
    }
    let inner = single_entry(dir)?;
    Package::load(&inner.join(PKG_FILE_NAME))
}

fn single_entry(dir: &Path) -> Result<PathBuf> {
    let no_package = |reason: String| Error::NoPackageInDir {
        dir: dir.to_path_buf(),
        reason,
    };
    let entries = fs::read_dir(dir)
        .map_err(|e| no_package(e.to_string()))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| no_package(e.to_string()))?;
    match entries.as_slice() {
        [only] => Ok(only.path()),
        [] => Err(no_package("directory is empty".to_string())),
        _ => Err(no_package(format!(
            "expected a single package directory, found {} entries",
            entries.len()
        ))),
    }
}

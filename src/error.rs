// Purpose: Typed error taxonomy shared by package loading, mapping, and rewriting.
// Inputs/Outputs: Library operations return `Result<T>`; the CLI converts into anyhow at the edge.
// Invariants: Every variant carries enough context (paths, hashes, names) to be reported standalone.
// Gotchas: Mapping conflicts are diagnostics, not errors; see `rewrite::table::MappingConflict`.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("read {}: {source}", .path.display())]
    PackageFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no package found in {}: {reason}", .dir.display())]
    NoPackageInDir { dir: PathBuf, reason: String },

    #[error(
        "failed to find package {name} ({hash}), searched: {}{}",
        display_paths(.searched),
        skipped_note(.skipped)
    )]
    DependencyNotFound {
        name: String,
        hash: String,
        searched: Vec<PathBuf>,
        /// Why the global cache could not be consulted, if it was expected but unavailable.
        #[source]
        skipped: Option<Box<Error>>,
    },

    #[error("loading dep {}: {source}", .chain.join(" -> "))]
    Dependency {
        chain: Vec<String>,
        #[source]
        source: Box<Error>,
    },

    #[error("dependency cycle through {hash}: {}", .chain.join(" -> "))]
    DependencyCycle { hash: String, chain: Vec<String> },

    #[error("{name} not found{}", .help.as_deref().map(|h| format!("\nhelp: {h}")).unwrap_or_default())]
    UnknownDependency { name: String, help: Option<String> },

    #[error("invalid version {version:?}: component {component:?} is not a number")]
    InvalidVersion { version: String, component: String },

    #[error("{} is not within {}", .path.display(), .root.display())]
    NotUnderRoot { path: PathBuf, root: PathBuf },

    #[error("{var} not set")]
    SourceRootUnset { var: &'static str },

    #[error("package '{package}' requires at least go version {required}, you have {have} installed.")]
    UnsupportedVersion {
        package: String,
        required: String,
        have: String,
    },

    #[error("no go compiler installed")]
    CompilerMissing(#[source] std::io::Error),

    #[error("unrecognized output from go compiler: {0:?}")]
    UnrecognizedCompiler(String),

    #[error("rewrite {}: {source}", .path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// Attach the name of the package whose dependency failed, innermost last.
    pub(crate) fn in_dependency(self, name: &str) -> Self {
        match self {
            Error::Dependency { mut chain, source } => {
                chain.insert(0, name.to_string());
                Error::Dependency { chain, source }
            }
            other => Error::Dependency {
                chain: vec![name.to_string()],
                source: Box::new(other),
            },
        }
    }
}

fn skipped_note(skipped: &Option<Box<Error>>) -> String {
    match skipped {
        Some(why) => format!("; global cache skipped: {why}"),
        None => String::new(),
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

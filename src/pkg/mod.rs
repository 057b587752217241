// Purpose: Package-descriptor module root: schema, lookup, version gating, import identity.
// Inputs/Outputs: Re-exports the descriptor workflow used by rewrite, hooks, and CLI.
// Invariants: Nothing here mutates the filesystem except `Package::save`.
// Gotchas: Keep pkg free of rewrite imports so mapping code can depend on it one way.

pub mod importpath;
pub mod loader;
pub mod package;
pub mod version;

pub use loader::{DepSearch, load_dep};
pub use package::{Dependency, GoInfo, Package, find_package_in_dir};

// Purpose: Import-path translation: table, dependency-graph builder, and source-tree application.
// Inputs/Outputs: Consumes package descriptors from `pkg`; rewrites files through `ImportRewriter`.
// Invariants: A table is built by exactly one walk and then only grows through memoized lookups.
// Gotchas: `gx/ipfs/<hash>/<name>` is the only hash-qualified form produced anywhere.

pub mod apply;
pub mod go_source;
pub mod mapping;
pub mod table;

pub use apply::{ImportRewriter, apply_rewrite, is_go_file, update_imports};
pub use go_source::GoSourceRewriter;
pub use mapping::{DepMap, build_dep_map, build_rewrite_table, rewrite_for_deps};
pub use table::{MappingConflict, RewriteTable};

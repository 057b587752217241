// Purpose: Define crate-level module surface for the gx Go extension.
// Inputs/Outputs: Re-exports library modules for the gx-go binary and tests.
// Invariants: Library code returns typed `Error`; only `cmd`, `hooks`, and `cli` speak anyhow.
// Gotchas: Keep module wiring consistent with src/main.rs.

pub mod cli;
pub mod cmd;
pub mod error;
pub mod hooks;
pub mod pkg;
pub mod rewrite;
pub mod suggest;
pub mod workspace;

pub use error::{Error, Result};

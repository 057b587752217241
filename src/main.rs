// Purpose: Binary entry for the gx-go tool invoked directly or as a gx hook.
// Inputs/Outputs: Reads process args and returns process exit code from CLI dispatcher.
// Invariants: Main must not bypass centralized CLI argument/diagnostic handling.

fn main() {
    let code = gx_go::cli::run_cli(std::env::args().skip(1));
    std::process::exit(code);
}

use std::process::Command;

const STAMP_VAR: &str = "GX_GO_GIT_COMMIT";

// Stamps `<pkg version> (<describe>)` into GX_GO_GIT_COMMIT for `gx-go --version`.
// A value already present in the environment (release builds, tarballs) is used verbatim.
fn main() {
    println!("cargo:rerun-if-env-changed={STAMP_VAR}");

    let preset = std::env::var(STAMP_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(stamp) = preset {
        println!("cargo:rustc-env={STAMP_VAR}={stamp}");
        return;
    }

    for watched in [".git/HEAD", ".git/index", ".git/refs/tags"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    if let Some(describe) = git_describe() {
        let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        println!("cargo:rustc-env={STAMP_VAR}={pkg_version} ({describe})");
    }
}

/// Nearest tag plus abbreviated commit, or just the commit when untagged; `-dirty` when the
/// work tree or index has changes.
fn git_describe() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--tags", "--always", "--abbrev=12", "--dirty=-dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let text = String::from_utf8(out.stdout).ok()?;
    Some(text.trim().to_string()).filter(|s| !s.is_empty())
}

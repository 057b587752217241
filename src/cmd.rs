use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::pkg::importpath::import_identity;
use crate::pkg::{DepSearch, Package};
use crate::rewrite::{
    ImportRewriter, RewriteTable, apply_rewrite, build_dep_map, build_rewrite_table, is_go_file,
    rewrite_for_deps, update_imports,
};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Default)]
pub struct RewriteOpts {
    pub undo: bool,
    pub dry_run: bool,
    pub pkgdir: Option<PathBuf>,
    /// Restrict the mapping to these direct dependencies (no recursion).
    pub deps: Vec<String>,
}

fn load_root_package(ws: &Workspace) -> anyhow::Result<Package> {
    Ok(Package::load(&ws.package_file())?)
}

pub fn cmd_dep_map(ws: &Workspace, out: &mut dyn Write) -> anyhow::Result<()> {
    let pkg = load_root_package(ws)?;
    let map = build_dep_map(&pkg, &DepSearch::vendored(ws))?;
    writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
    Ok(())
}

pub fn cmd_rewrite(
    ws: &Workspace,
    opts: &RewriteOpts,
    rewriter: &dyn ImportRewriter,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let pkg = load_root_package(ws)?;
    let pkgdir = opts.pkgdir.clone().unwrap_or_else(|| ws.vendor_dir());
    let search = DepSearch::for_workspace(ws, pkgdir);

    debug!("  - building rewrite mapping");
    let mut table = if opts.deps.is_empty() {
        build_rewrite_table(&pkg, &search, opts.undo)
            .context("build of rewrite mapping failed")?
    } else {
        rewrite_for_deps(&pkg, &opts.deps, &search, opts.undo)?
    };
    debug!("  - rewrite mapping complete");

    if opts.dry_run {
        write_sorted_map(out, &table)?;
        return Ok(());
    }

    apply_rewrite(&mut table, &ws.cwd, &is_go_file, rewriter)?;
    Ok(())
}

pub fn cmd_update(
    ws: &Workspace,
    old: &str,
    new: &str,
    rewriter: &dyn ImportRewriter,
) -> anyhow::Result<()> {
    let n = update_imports(&ws.cwd, old, new, rewriter)
        .with_context(|| format!("update {} -> {}", old, new))?;
    debug!("updated imports in {} files", n);
    Ok(())
}

pub fn cmd_path(ws: &Workspace, out: &mut dyn Write) -> anyhow::Result<()> {
    let root = ws
        .source_root()
        .context("GOPATH not set, cannot derive import path")?;
    let rel = import_identity(&ws.cwd, root).context("package not within GOPATH/src")?;
    writeln!(out, "{}", rel)?;
    Ok(())
}

/// Print `from  to` pairs sorted by key, left column padded to a common width.
pub fn write_sorted_map(out: &mut dyn Write, table: &RewriteTable) -> std::io::Result<()> {
    let rows = table.sorted();
    let width = rows
        .iter()
        .map(|(k, _)| k.chars().count() + 1)
        .max()
        .unwrap_or(0)
        .max(12);
    for (k, v) in rows {
        writeln!(out, "{:<width$}{}", k, v, width = width)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RewriteOpts, cmd_dep_map, cmd_path, cmd_rewrite, write_sorted_map};
    use crate::pkg::loader::tests::install;
    use crate::rewrite::{GoSourceRewriter, RewriteTable};
    use crate::workspace::Workspace;
    use std::fs;
    use std::path::Path;

    const ROOT_PKG: &str = r#"{
  "name": "app",
  "dependencies": [
    { "name": "y", "hash": "Qm123", "version": "0.1.0" },
    { "name": "z", "hash": "QmZ", "version": "0.2.0" }
  ],
  "gx": { "dvcsimport": "github.com/me/app" }
}"#;

    fn project() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        fs::write(root.join("package.json"), ROOT_PKG).expect("write root package");
        let vendor = root.join("vendor").join("gx").join("ipfs");
        install(&vendor, "Qm123", "y", Some("github.com/x/y"), &[]);
        install(&vendor, "QmZ", "z", Some("github.com/x/z"), &[]);
        fs::write(
            root.join("main.go"),
            "package main\n\nimport (\n\t\"github.com/x/y/sub\"\n\t\"github.com/x/z\"\n)\n",
        )
        .expect("write main.go");
        (dir, Workspace::new(root, None))
    }

    #[test]
    fn dry_run_prints_sorted_mapping_without_touching_files() {
        let (_dir, ws) = project();
        let before = fs::read_to_string(ws.cwd.join("main.go")).expect("read");
        let opts = RewriteOpts {
            dry_run: true,
            ..RewriteOpts::default()
        };
        let mut out: Vec<u8> = Vec::new();
        let rw = GoSourceRewriter::new().expect("rewriter");
        cmd_rewrite(&ws, &opts, &rw, &mut out).expect("dry run");

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "github.com/x/y gx/ipfs/Qm123/y\ngithub.com/x/z gx/ipfs/QmZ/z\n"
        );
        assert_eq!(fs::read_to_string(ws.cwd.join("main.go")).expect("read"), before);
    }

    #[test]
    fn rewrite_then_undo_restores_sources() {
        let (_dir, ws) = project();
        let original = fs::read_to_string(ws.cwd.join("main.go")).expect("read");
        let rw = GoSourceRewriter::new().expect("rewriter");
        let mut sink: Vec<u8> = Vec::new();

        cmd_rewrite(&ws, &RewriteOpts::default(), &rw, &mut sink).expect("rewrite");
        let rewritten = fs::read_to_string(ws.cwd.join("main.go")).expect("read");
        assert!(rewritten.contains("\"gx/ipfs/Qm123/y/sub\""));
        assert!(rewritten.contains("\"gx/ipfs/QmZ/z\""));

        let undo = RewriteOpts {
            undo: true,
            ..RewriteOpts::default()
        };
        cmd_rewrite(&ws, &undo, &rw, &mut sink).expect("undo");
        assert_eq!(fs::read_to_string(ws.cwd.join("main.go")).expect("read"), original);
    }

    #[test]
    fn rewrite_selected_dependency_only() {
        let (_dir, ws) = project();
        let opts = RewriteOpts {
            deps: vec!["z".to_string()],
            ..RewriteOpts::default()
        };
        let rw = GoSourceRewriter::new().expect("rewriter");
        cmd_rewrite(&ws, &opts, &rw, &mut Vec::<u8>::new()).expect("rewrite z");
        let text = fs::read_to_string(ws.cwd.join("main.go")).expect("read");
        assert!(text.contains("\"github.com/x/y/sub\""));
        assert!(text.contains("\"gx/ipfs/QmZ/z\""));
    }

    #[test]
    fn dep_map_is_pretty_json() {
        let (_dir, ws) = project();
        let mut out: Vec<u8> = Vec::new();
        cmd_dep_map(&ws, &mut out).expect("dep map");
        let v: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(v["github.com/x/y"], "Qm123");
        assert_eq!(v["github.com/x/z"], "QmZ");
    }

    #[test]
    fn path_requires_source_root() {
        let ws = Workspace::new(Path::new("/gp/src/github.com/me/app").to_path_buf(), None);
        assert!(cmd_path(&ws, &mut Vec::<u8>::new()).is_err());

        let ws = Workspace::new(
            Path::new("/gp/src/github.com/me/app").to_path_buf(),
            Some(Path::new("/gp").to_path_buf()),
        );
        let mut out: Vec<u8> = Vec::new();
        cmd_path(&ws, &mut out).expect("path");
        assert_eq!(String::from_utf8(out).expect("utf8"), "github.com/me/app\n");
    }

    #[test]
    fn sorted_map_pads_short_keys_to_minimum_width() {
        let mut t = RewriteTable::new();
        t.set("a/b", "gx/ipfs/Qm/b");
        let mut out: Vec<u8> = Vec::new();
        write_sorted_map(&mut out, &t).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "a/b         gx/ipfs/Qm/b\n");
    }
}

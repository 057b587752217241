// Purpose: Rewrite import path literals in Go source files under a directory tree.
// Inputs/Outputs: Reads every filtered file, maps each import literal through `lookup`, writes changes.
// Invariants: Nothing is written until every file has been read and transformed successfully.
// Gotchas: Pattern based, not a parser; import-looking text inside raw strings is rewritten too.

use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::rewrite::apply::ImportRewriter;

pub struct GoSourceRewriter {
    single: Regex,
    block_open: Regex,
    spec: Regex,
    literal: Regex,
}

impl GoSourceRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            single: Regex::new(
                r#"^([ \t]*import[ \t]+(?:[A-Za-z_.][A-Za-z0-9_]*[ \t]+)?)"([^"]+)""#,
            )?,
            block_open: Regex::new(r"^([ \t]*import[ \t]*\()(.*)$")?,
            spec: Regex::new(r#"^([ \t]*(?:[A-Za-z_.][A-Za-z0-9_]*[ \t]+)?)"([^"]+)""#)?,
            literal: Regex::new(r#""[^"]*""#)?,
        })
    }

    /// Rewrite the import literals of one source text; `None` when nothing changed.
    ///
    /// Works line by line: a grouped block runs from `import (` to the first line whose code
    /// starts with `)`, so parentheses inside comments or paths never end it early.
    pub fn rewrite_source(
        &self,
        src: &str,
        lookup: &mut dyn FnMut(&str) -> String,
    ) -> Option<String> {
        let mut out = String::with_capacity(src.len());
        let mut in_block = false;
        for line in src.split_inclusive('\n') {
            let (body, eol) = split_line_ending(line);
            if in_block {
                if body.trim_start().starts_with(')') {
                    in_block = false;
                    out.push_str(line);
                } else {
                    out.push_str(&self.rewrite_spec(body, lookup));
                    out.push_str(eol);
                }
                continue;
            }
            if let Some(caps) = self.block_open.captures(body) {
                let rest = self.rewrite_spec(&caps[2], lookup);
                in_block = !closes_block(&self.literal.replace_all(&rest, ""));
                out.push_str(&caps[1]);
                out.push_str(&rest);
                out.push_str(eol);
                continue;
            }
            let rewritten = self.single.replace_all(body, |caps: &Captures<'_>| {
                format!("{}\"{}\"", &caps[1], lookup(&caps[2]))
            });
            out.push_str(&rewritten);
            out.push_str(eol);
        }
        if out == src { None } else { Some(out) }
    }

    fn rewrite_spec(&self, line: &str, lookup: &mut dyn FnMut(&str) -> String) -> String {
        self.spec
            .replace(line, |caps: &Captures<'_>| {
                format!("{}\"{}\"", &caps[1], lookup(&caps[2]))
            })
            .into_owned()
    }

    fn collect_rewrites(
        &self,
        root: &Path,
        lookup: &mut dyn FnMut(&str) -> String,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<(PathBuf, String)>> {
        let mut pending = Vec::new();
        for ent in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skip_dir(e))
        {
            let ent = ent.map_err(|source| Error::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if !ent.file_type().is_file() {
                continue;
            }
            let rel = ent.path().strip_prefix(root).unwrap_or(ent.path());
            if !filter(rel) {
                continue;
            }
            let src = fs::read_to_string(ent.path()).map_err(|source| Error::Rewrite {
                path: ent.path().to_path_buf(),
                source,
            })?;
            if let Some(out) = self.rewrite_source(&src, lookup) {
                pending.push((ent.path().to_path_buf(), out));
            }
        }
        Ok(pending)
    }
}

impl ImportRewriter for GoSourceRewriter {
    fn rewrite_imports(
        &self,
        root: &Path,
        lookup: &mut dyn FnMut(&str) -> String,
        filter: &dyn Fn(&Path) -> bool,
    ) -> Result<usize> {
        let pending = self.collect_rewrites(root, lookup, filter)?;
        for (path, text) in &pending {
            debug!("  - rewriting {}", path.display());
            replace_file(path, text).map_err(|source| Error::Rewrite {
                path: path.clone(),
                source,
            })?;
        }
        Ok(pending.len())
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    let body = line.strip_suffix('\n').unwrap_or(line);
    let body = body.strip_suffix('\r').unwrap_or(body);
    (body, &line[body.len()..])
}

/// Whether the code on a line (string literals already removed) closes an import group.
fn closes_block(code: &str) -> bool {
    code.split("//").next().unwrap_or_default().contains(')')
}

fn is_skip_dir(ent: &DirEntry) -> bool {
    ent.file_type().is_dir() && matches!(ent.file_name().to_str(), Some(".git" | ".hg"))
}

/// Replace `path` with `text` via a sibling temp file so readers never see a half-written file.
fn replace_file(path: &Path, text: &str) -> std::io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.gx-go-tmp", name));
    let perms = fs::metadata(path)?.permissions();
    fs::write(&tmp, text)?;
    fs::set_permissions(&tmp, perms)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

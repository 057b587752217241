// Purpose: Walk a package's dependency graph and derive import-path mappings from it.
// Inputs/Outputs: Root descriptor + search roots in; a RewriteTable (or DVCS->hash DepMap) out.
// Invariants: Pre-order DFS in declaration order; one shared table per walk; first writer wins.
// Gotchas: Packages without a DVCS import add no entry but are still descended into.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pkg::{DepSearch, Dependency, Package, load_dep};
use crate::rewrite::table::RewriteTable;
use crate::suggest::dependency_hint;

/// DVCS import path -> content hash, as printed by `dep-map`.
pub type DepMap = BTreeMap<String, String>;

/// Build the rewrite table for every package reachable from `root`.
///
/// With `undo` set the pairs are reversed, mapping `gx/ipfs/<hash>/<name>` back to the DVCS path.
pub fn build_rewrite_table(
    root: &Package,
    search: &DepSearch,
    undo: bool,
) -> Result<RewriteTable> {
    let mut table = RewriteTable::new();
    extend_rewrite_table(&mut table, root, search, undo)?;
    Ok(table)
}

// Precondition: `table` is exclusively borrowed for the whole walk.
// Postcondition: Every reachable package with a DVCS import has an entry (or a recorded conflict).
// Side effects: Reads descriptors from the search roots.
pub fn extend_rewrite_table(
    table: &mut RewriteTable,
    root: &Package,
    search: &DepSearch,
    undo: bool,
) -> Result<()> {
    let mut ancestors = Vec::new();
    walk(table, root, search, undo, &mut ancestors)
}

fn walk(
    table: &mut RewriteTable,
    pkg: &Package,
    search: &DepSearch,
    undo: bool,
    ancestors: &mut Vec<(String, String)>,
) -> Result<()> {
    for dep in &pkg.dependencies {
        if ancestors.iter().any(|(_, h)| *h == dep.hash) {
            let mut chain: Vec<String> = ancestors.iter().map(|(n, _)| n.clone()).collect();
            chain.push(dep.name.clone());
            return Err(Error::DependencyCycle {
                hash: dep.hash.clone(),
                chain,
            });
        }

        let child = load_dep(dep, search).map_err(|e| e.in_dependency(&dep.name))?;
        add_rewrite_for_dep(table, dep, &child, undo);

        ancestors.push((dep.name.clone(), dep.hash.clone()));
        let res = walk(table, &child, search, undo, ancestors);
        ancestors.pop();
        res.map_err(|e| match e {
            cycle @ Error::DependencyCycle { .. } => cycle,
            other => other.in_dependency(&dep.name),
        })?;
    }
    Ok(())
}

/// Insert the entry contributed by a single dependency edge, if the child has a DVCS import.
pub fn add_rewrite_for_dep(
    table: &mut RewriteTable,
    dep: &Dependency,
    child: &Package,
    undo: bool,
) {
    let Some(dvcs) = child.dvcs_import() else {
        return;
    };
    let mut from = dvcs.to_string();
    let mut to = child.gx_import(&dep.hash);
    if undo {
        std::mem::swap(&mut from, &mut to);
    }
    table.insert_edge(from, to, &dep.hash);
}

/// Build entries only for the named direct dependencies of `root`, without recursing.
pub fn rewrite_for_deps(
    root: &Package,
    names: &[String],
    search: &DepSearch,
    undo: bool,
) -> Result<RewriteTable> {
    let mut table = RewriteTable::new();
    for name in names {
        let dep = root.find_dep(name).ok_or_else(|| Error::UnknownDependency {
            name: name.clone(),
            help: dependency_hint(name, &root.dependencies),
        })?;
        let child = load_dep(dep, search).map_err(|e| e.in_dependency(&dep.name))?;
        add_rewrite_for_dep(&mut table, dep, &child, undo);
    }
    Ok(table)
}

/// Map each DVCS import in the tree to the hash that provides it.
///
/// A repeated import keeps its first hash and its subtree is not walked again.
pub fn build_dep_map(root: &Package, search: &DepSearch) -> Result<DepMap> {
    let mut map = DepMap::new();
    dep_map_walk(root, search, &mut map)?;
    Ok(map)
}

fn dep_map_walk(pkg: &Package, search: &DepSearch, map: &mut DepMap) -> Result<()> {
    for dep in &pkg.dependencies {
        let child = load_dep(dep, search).map_err(|e| e.in_dependency(&dep.name))?;
        if let Some(dvcs) = child.dvcs_import() {
            if let Some(existing) = map.get(dvcs) {
                if *existing != dep.hash {
                    info!("have two dep packages with same import path: {}", dvcs);
                    info!("  - {}", existing);
                    info!("  - {}", dep.hash);
                }
                continue;
            }
            debug!("  - {} -> {}", dvcs, dep.hash);
            map.insert(dvcs.to_string(), dep.hash.clone());
        }
        dep_map_walk(&child, search, map).map_err(|e| e.in_dependency(&dep.name))?;
    }
    Ok(())
}

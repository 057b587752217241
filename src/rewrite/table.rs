// Purpose: Own the import-path translation table and its memoizing longest-prefix lookup.
// Inputs/Outputs: Filled by the mapping builder, then queried by source rewriters via `lookup`.
// Invariants: Exact entries are first-writer-wins; disagreeing writes become `MappingConflict`s.
// Gotchas: `lookup` caches every answer (identity included), so the table grows while applied.

use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Two dependencies claimed the same import path with different targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConflict {
    pub import: String,
    pub kept: String,
    pub kept_hash: String,
    pub rejected: String,
    pub rejected_hash: String,
}

impl fmt::Display for MappingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "have two dep packages with same import path: {}\n  - {} ({})\n  - {} ({})",
            self.import, self.kept_hash, self.kept, self.rejected_hash, self.rejected
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteTable {
    entries: HashMap<String, String>,
    origins: HashMap<String, String>,
    conflicts: Vec<MappingConflict>,
}

impl RewriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, import: &str) -> Option<&str> {
        self.entries.get(import).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries ordered by key, for printing.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut v: Vec<_> = self.iter().collect();
        v.sort_unstable();
        v
    }

    pub fn conflicts(&self) -> &[MappingConflict] {
        &self.conflicts
    }

    /// Record an entry contributed by the dependency with content hash `hash`.
    ///
    /// Returns false when an earlier, different entry for `from` was kept instead.
    pub fn insert_edge(&mut self, from: String, to: String, hash: &str) -> bool {
        if let Some(existing) = self.entries.get(&from) {
            if *existing == to {
                return true;
            }
            let conflict = MappingConflict {
                kept: existing.clone(),
                kept_hash: self.origins.get(&from).cloned().unwrap_or_default(),
                rejected: to,
                rejected_hash: hash.to_string(),
                import: from,
            };
            warn!("{}", conflict);
            self.conflicts.push(conflict);
            return false;
        }
        self.origins.insert(from.clone(), hash.to_string());
        self.entries.insert(from, to);
        true
    }

    /// Unconditionally map `from` to `to`, replacing any previous entry.
    pub fn set(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        self.origins.remove(&from);
        self.entries.insert(from, to.into());
    }

    /// Translate `import`, caching the answer.
    ///
    /// Exact keys win; otherwise the longest key `k` with `import` under `k/` is substituted;
    /// otherwise `import` maps to itself.
    pub fn lookup(&mut self, import: &str) -> String {
        if let Some(v) = self.entries.get(import) {
            return v.clone();
        }
        let resolved = match self.longest_prefix(import) {
            Some((key_len, value)) => format!("{}{}", value, &import[key_len..]),
            None => import.to_string(),
        };
        self.entries.insert(import.to_string(), resolved.clone());
        resolved
    }

    fn longest_prefix(&self, import: &str) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| is_path_prefix(k, import))
            .max_by_key(|(k, _)| k.len())
            .map(|(k, v)| (k.len(), v.as_str()))
    }
}

fn is_path_prefix(prefix: &str, import: &str) -> bool {
    !prefix.is_empty()
        && import
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

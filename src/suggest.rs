// Purpose: "did you mean" help for dependency names typed on the command line.
// Inputs/Outputs: Wanted name plus the root package's dependency list; returns a help line or None.
// Invariants: At most three names, closest first, never the wanted name itself.

use strsim::levenshtein;

use crate::pkg::Dependency;

fn edit_budget(wanted: &str) -> usize {
    (wanted.chars().count() / 3).clamp(1, 4)
}

/// Names of `deps` within the edit budget of `wanted`, closest (then alphabetical) first.
pub fn closest_dependencies<'a>(wanted: &str, deps: &'a [Dependency]) -> Vec<&'a str> {
    let wanted = wanted.trim();
    if wanted.is_empty() {
        return Vec::new();
    }
    let budget = edit_budget(wanted);

    let mut scored: Vec<(usize, &str)> = deps
        .iter()
        .map(|d| d.name.as_str())
        .filter(|name| *name != wanted)
        .map(|name| (levenshtein(wanted, name), name))
        .filter(|(dist, _)| *dist <= budget)
        .collect();
    scored.sort_unstable();
    scored.dedup_by(|a, b| a.1 == b.1);

    scored.into_iter().take(3).map(|(_, name)| name).collect()
}

pub fn dependency_hint(wanted: &str, deps: &[Dependency]) -> Option<String> {
    match closest_dependencies(wanted, deps).as_slice() {
        [] => None,
        [one] => Some(format!("did you mean `{}`?", one)),
        many => {
            let quoted: Vec<String> = many.iter().map(|n| format!("`{}`", n)).collect();
            Some(format!("did you mean one of: {}?", quoted.join(", ")))
        }
    }
}

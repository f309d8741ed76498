use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

fn strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Strip punctuation, trim, and join whitespace runs with `_`.
pub fn sanitize_label(label: &str) -> String {
    let stripped = strip_re().replace_all(label, "");
    whitespace_re()
        .replace_all(stripped.trim(), "_")
        .into_owned()
}

#[derive(Default)]
struct Dedup {
    counts: HashMap<String, usize>,
    produced: HashSet<String>,
    out: Vec<String>,
}

impl Dedup {
    fn push(mut self, base: String) -> Self {
        let label = if self.produced.contains(&base) {
            let count = self.counts.entry(base.clone()).or_insert(1);
            loop {
                *count += 1;
                let candidate = format!("{base}_{count}");
                if !self.produced.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            self.counts.entry(base.clone()).or_insert(1);
            base
        };
        self.produced.insert(label.clone());
        self.out.push(label);
        self
    }
}

/// Map raw column labels to unique, sanitized identifiers, same length and order.
///
/// Repeats of a base identifier get `_2`, `_3`, ... from a per-base counter.
/// A suffixed candidate that was already produced is skipped, so the result
/// is always unique. Applying this to its own output is a no-op.
pub fn normalize_columns<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(|l| sanitize_label(l.as_ref()))
        .fold(Dedup::default(), Dedup::push)
        .out
}

/// Apply fixed renames, then dedupe again so a rename cannot introduce a
/// collision.
///
/// Rename sources go through `sanitize_label`, so the raw sensor name from
/// the file (`Temp PV`) and its normalized form (`Temp_PV`) both match.
pub fn apply_renames(labels: &[String], renames: &[(String, String)]) -> Vec<String> {
    if renames.is_empty() {
        return labels.to_vec();
    }
    let lookup: HashMap<String, &str> = renames
        .iter()
        .map(|(from, to)| (sanitize_label(from), to.as_str()))
        .collect();

    for (from, _) in renames {
        if !labels.contains(&sanitize_label(from)) {
            warn!(rename = %from, "rename matched no column");
        }
    }

    let renamed: Vec<&str> = labels
        .iter()
        .map(|l| lookup.get(l).copied().unwrap_or(l.as_str()))
        .collect();
    normalize_columns(&renamed)
}

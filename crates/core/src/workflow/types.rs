//! Workflow identity and list resolution.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a remotely triggerable CI workflow (its file name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowName(String);

impl WorkflowName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkflowName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for WorkflowName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkflowName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkflowName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Workflows that are allowed to fail without failing the overall run.
///
/// Matching is by exact workflow name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedFailureSet {
    names: HashSet<WorkflowName>,
}

impl ExpectedFailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &WorkflowName) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowName> {
        self.names.iter()
    }

    /// Entries that do not name any workflow in `workflows`, sorted.
    ///
    /// A renamed or version-bumped workflow silently loses its allowed-failure
    /// status; callers use this to surface such stale entries.
    pub fn unknown_entries(&self, workflows: &[WorkflowName]) -> Vec<WorkflowName> {
        let known: HashSet<&WorkflowName> = workflows.iter().collect();
        let mut unknown: Vec<WorkflowName> = self
            .names
            .iter()
            .filter(|name| !known.contains(name))
            .cloned()
            .collect();
        unknown.sort();
        unknown
    }
}

impl<T: Into<WorkflowName>> FromIterator<T> for ExpectedFailureSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parse a comma-separated workflow list.
///
/// Entries are trimmed, blanks are dropped and duplicates keep their first
/// position.
pub fn parse_workflows_csv(csv: &str) -> Vec<WorkflowName> {
    let mut seen = HashSet::new();
    csv.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.to_string()))
        .map(WorkflowName::from)
        .collect()
}

/// Pick the workflow list for a run.
///
/// Precedence: a non-empty override list, then the CSV value, then the
/// built-in catalogue when `use_builtin` is set. May return an empty list;
/// the orchestrator rejects that before dispatching anything.
pub fn resolve_workflows(
    override_list: &[String],
    csv: Option<&str>,
    use_builtin: bool,
) -> Vec<WorkflowName> {
    if !override_list.is_empty() {
        return parse_workflows_csv(&override_list.join(","));
    }

    if let Some(csv) = csv {
        let parsed = parse_workflows_csv(csv);
        if !parsed.is_empty() {
            return parsed;
        }
    }

    if use_builtin {
        return super::catalog::builtin_workflows();
    }

    Vec::new()
}

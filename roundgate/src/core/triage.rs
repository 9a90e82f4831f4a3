//! Tag-based routing of issue labels to owning categories.
//!
//! Reporting only: triage never feeds back into the round loop.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::error::TrackerError;

/// Category that owns a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Design,
    Content,
    Engineering,
}

impl Owner {
    pub const ALL: [Owner; 3] = [Owner::Design, Owner::Content, Owner::Engineering];

    pub fn as_str(self) -> &'static str {
        match self {
            Owner::Design => "design",
            Owner::Content => "content",
            Owner::Engineering => "engineering",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Owner {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "design" => Ok(Owner::Design),
            "content" => Ok(Owner::Content),
            "engineering" => Ok(Owner::Engineering),
            other => Err(format!(
                "unknown owner '{other}' (expected design, content or engineering)"
            )),
        }
    }
}

/// Tag substrings per owner, checked in this order.
const RULES: &[(Owner, &[&str])] = &[
    (Owner::Design, &["DESIGN", "RESP", "NAV"]),
    (Owner::Content, &["CONTENT"]),
    (
        Owner::Engineering,
        &["SECURITY", "AUTH", "MILE", "ROUTE", "JOB", "DASH"],
    ),
];

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^:]+?)\s*:").expect("tag pattern should be valid"));

/// Map a label such as `"AUTH: session bug"` to its owner.
pub fn classify(label: &str) -> Result<Owner, TrackerError> {
    let unclassified = || TrackerError::UnclassifiedIssue {
        label: label.to_string(),
    };
    let tag = TAG_RE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|tag| tag.as_str().to_ascii_uppercase())
        .ok_or_else(unclassified)?;

    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| tag.contains(needle)))
        .map(|(owner, _)| *owner)
        .ok_or_else(unclassified)
}

/// Like [`classify`], routing unmatched labels to `fallback`.
pub fn classify_or(label: &str, fallback: Owner) -> Owner {
    classify(label).unwrap_or(fallback)
}

/// Issues grouped by owner; input order is kept within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TriageReport {
    pub design: Vec<String>,
    pub content: Vec<String>,
    pub engineering: Vec<String>,
    /// Labels that matched no rule and were routed to the fallback owner.
    pub fallback: Vec<String>,
}

impl TriageReport {
    pub fn issues_for(&self, owner: Owner) -> &[String] {
        match owner {
            Owner::Design => &self.design,
            Owner::Content => &self.content,
            Owner::Engineering => &self.engineering,
        }
    }

    pub fn total(&self) -> usize {
        self.design.len() + self.content.len() + self.engineering.len()
    }

    fn push(&mut self, owner: Owner, label: String) {
        match owner {
            Owner::Design => self.design.push(label),
            Owner::Content => self.content.push(label),
            Owner::Engineering => self.engineering.push(label),
        }
    }
}

/// Classify every label; nothing is dropped.
pub fn triage<S: AsRef<str>>(labels: &[S], fallback: Owner) -> TriageReport {
    let mut report = TriageReport::default();
    for label in labels {
        let label = label.as_ref();
        let owner = match classify(label) {
            Ok(owner) => owner,
            Err(_) => {
                report.fallback.push(label.to_string());
                fallback
            }
        };
        report.push(owner, label.to_string());
    }
    report
}

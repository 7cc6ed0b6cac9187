//! The in-memory Public Suffix List: one rule trie per list section.
//!
//! Rules are tries over reversed labels, so the root's children are TLDs.
//! Wildcards are stored as a literal `*` child and exceptions as a flag on
//! the node the `!`-rule ends at. The whole structure serializes to a
//! nested-mapping snapshot for cache round-trips.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::Host;
use crate::idna::{label_to_ascii, IdnaOptions};
use crate::resolved::ResolvedDomain;
use crate::resolver::{self, Policy};

pub(crate) const WILDCARD: &str = "*";

const ICANN_BEGIN: &str = "// ===BEGIN ICANN DOMAINS===";
const ICANN_END: &str = "// ===END ICANN DOMAINS===";
const PRIVATE_BEGIN: &str = "// ===BEGIN PRIVATE DOMAINS===";
const PRIVATE_END: &str = "// ===END PRIVATE DOMAINS===";
const MARKER_PREFIX: &str = "// ===";

/// One node of a rule trie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RuleNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) children: BTreeMap<String, RuleNode>,
    /// A rule ends here.
    #[serde(default, skip_serializing_if = "is_false")]
    pub(crate) terminal: bool,
    /// An exception (`!`) rule ends here.
    #[serde(default, skip_serializing_if = "is_false")]
    pub(crate) exception: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl RuleNode {
    fn insert(&mut self, labels: &[String], exception: bool) {
        match labels.split_first() {
            None => {
                if exception {
                    self.exception = true;
                } else {
                    self.terminal = true;
                }
            }
            Some((first, rest)) => self
                .children
                .entry(first.clone())
                .or_default()
                .insert(rest, exception),
        }
    }

    pub(crate) fn wildcard(&self) -> Option<&RuleNode> {
        self.children.get(WILDCARD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveSection {
    Icann,
    Private,
}

/// The parsed Public Suffix List. Read-only after construction, so a shared
/// reference can serve any number of concurrent resolutions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub(crate) icann: RuleNode,
    pub(crate) private: RuleNode,
}

impl RuleSet {
    /// Parses the raw list text as published by Mozilla.
    ///
    /// `//` comment lines and blank lines are skipped; everything else
    /// inside a section is a rule whose first whitespace-separated token is
    /// taken. Labels are converted to ASCII on ingest, so Unicode and ACE
    /// spellings of the same rule land on the same trie node.
    ///
    /// # Errors
    ///
    /// `InvalidRules` on mismatched or unknown section markers, rules
    /// outside any section, or rule labels that fail IDNA conversion.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut rules = RuleSet::default();
        let mut active: Option<ActiveSection> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let number = index + 1;
            if line.is_empty() {
                continue;
            }
            if line.starts_with(MARKER_PREFIX) {
                active = apply_marker(active, line, number)?;
                continue;
            }
            if line.starts_with("//") {
                continue;
            }
            let section = active.ok_or_else(|| {
                Error::InvalidRules(format!("rule `{line}` outside of any section (line {number})"))
            })?;
            let token = line
                .split_whitespace()
                .next()
                .expect("a trimmed non-empty line has a first token");
            let (labels, exception) = parse_rule_token(token, number)?;
            let tree = match section {
                ActiveSection::Icann => &mut rules.icann,
                ActiveSection::Private => &mut rules.private,
            };
            tree.insert(&labels, exception);
        }

        if active.is_some() {
            return Err(Error::InvalidRules("unterminated list section".to_string()));
        }
        debug!(
            "parsed rule set: {} ICANN TLDs, {} PRIVATE TLDs",
            rules.icann.children.len(),
            rules.private.children.len()
        );
        Ok(rules)
    }

    /// Rebuilds a rule set from a snapshot produced by
    /// [`RuleSet::to_snapshot`].
    pub fn from_snapshot(snapshot: &str) -> Result<Self> {
        serde_json::from_str(snapshot)
            .map_err(|err| Error::InvalidRules(format!("invalid snapshot: {err}")))
    }

    /// Serializes both tries into the nested-mapping snapshot exchanged
    /// with the cache collaborator. The round-trip through
    /// [`RuleSet::from_snapshot`] is lossless.
    pub fn to_snapshot(&self) -> String {
        serde_json::to_string(self).expect("a rule tree always serializes")
    }

    /// Resolves `host` against the list under the given policy.
    pub fn resolve(&self, host: &Host, policy: Policy) -> Result<ResolvedDomain> {
        resolver::resolve(self, host, policy)
    }

    /// Resolution the way cookie handling wants it: both sections, longest
    /// match, PRIVATE breaking ties.
    pub fn cookie_domain(&self, host: &Host) -> Result<ResolvedDomain> {
        self.resolve(host, Policy::Cookie)
    }

    /// Resolution restricted to the ICANN section.
    pub fn icann_domain(&self, host: &Host) -> Result<ResolvedDomain> {
        self.resolve(host, Policy::Icann)
    }

    /// Resolution restricted to the PRIVATE section.
    pub fn private_domain(&self, host: &Host) -> Result<ResolvedDomain> {
        self.resolve(host, Policy::Private)
    }
}

fn apply_marker(
    active: Option<ActiveSection>,
    line: &str,
    number: usize,
) -> Result<Option<ActiveSection>> {
    let (section, begins) = match line {
        ICANN_BEGIN => (ActiveSection::Icann, true),
        ICANN_END => (ActiveSection::Icann, false),
        PRIVATE_BEGIN => (ActiveSection::Private, true),
        PRIVATE_END => (ActiveSection::Private, false),
        _ => {
            return Err(Error::InvalidRules(format!(
                "unknown section marker `{line}` (line {number})"
            )))
        }
    };
    match (begins, active) {
        (true, None) => Ok(Some(section)),
        (true, Some(_)) => Err(Error::InvalidRules(format!(
            "section begins inside another section (line {number})"
        ))),
        (false, Some(current)) if current == section => Ok(None),
        (false, _) => Err(Error::InvalidRules(format!(
            "section end without matching begin (line {number})"
        ))),
    }
}

fn parse_rule_token(token: &str, number: usize) -> Result<(Vec<String>, bool)> {
    let (body, exception) = match token.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if body.is_empty() {
        return Err(Error::InvalidRules(format!(
            "empty rule (line {number})"
        )));
    }

    let mut labels = Vec::new();
    for label in body.split('.') {
        if label == WILDCARD {
            labels.push(WILDCARD.to_string());
            continue;
        }
        let ascii = label_to_ascii(label, IdnaOptions::default_ascii()).map_err(|errors| {
            Error::InvalidRules(format!(
                "rule `{token}` has an invalid label `{label}`: {errors} (line {number})"
            ))
        })?;
        labels.push(ascii);
    }
    labels.reverse();
    Ok((labels, exception))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = "\
// A trimmed-down list for the tests below.
// ===BEGIN ICANN DOMAINS===
com

be
ac.be
*.ck
!www.ck
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
github.io
// ===END PRIVATE DOMAINS===
";

    #[test]
    fn test_sections_are_split() {
        let rules = RuleSet::from_text(LIST).unwrap();
        assert!(rules.icann.children.contains_key("com"));
        assert!(rules.icann.children.contains_key("be"));
        assert!(!rules.icann.children.contains_key("io"));
        assert!(rules.private.children.contains_key("io"));
    }

    #[test]
    fn test_wildcard_and_exception_nodes() {
        let rules = RuleSet::from_text(LIST).unwrap();
        let ck = &rules.icann.children["ck"];
        assert!(!ck.terminal);
        assert!(ck.wildcard().is_some());
        assert!(ck.wildcard().unwrap().terminal);
        let www = &ck.children["www"];
        assert!(www.exception);
        assert!(!www.terminal);
    }

    #[test]
    fn test_nested_rule_keeps_parent_terminal() {
        let rules = RuleSet::from_text(LIST).unwrap();
        let be = &rules.icann.children["be"];
        assert!(be.terminal);
        assert!(be.children["ac"].terminal);
    }

    #[test]
    fn test_unicode_rules_are_stored_in_ascii() {
        let list = "\
// ===BEGIN ICANN DOMAINS===
cn
公司.cn
// ===END ICANN DOMAINS===
";
        let rules = RuleSet::from_text(list).unwrap();
        let cn = &rules.icann.children["cn"];
        assert!(cn.children.contains_key("xn--55qx5d"));
    }

    #[test]
    fn test_rule_comment_suffix_is_ignored() {
        let list = "\
// ===BEGIN ICANN DOMAINS===
com trailing commentary
// ===END ICANN DOMAINS===
";
        let rules = RuleSet::from_text(list).unwrap();
        assert!(rules.icann.children["com"].terminal);
        assert_eq!(rules.icann.children.len(), 1);
    }

    #[test]
    fn test_malformed_markers_are_rejected() {
        let unterminated = "// ===BEGIN ICANN DOMAINS===\ncom\n";
        assert!(matches!(
            RuleSet::from_text(unterminated).unwrap_err(),
            Error::InvalidRules(_)
        ));

        let mismatched = "\
// ===BEGIN ICANN DOMAINS===
com
// ===END PRIVATE DOMAINS===
";
        assert!(RuleSet::from_text(mismatched).is_err());

        let nested = "\
// ===BEGIN ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
";
        assert!(RuleSet::from_text(nested).is_err());

        let unknown = "// ===SOMETHING ELSE===\n";
        assert!(RuleSet::from_text(unknown).is_err());
    }

    #[test]
    fn test_rule_outside_section_is_rejected() {
        assert!(matches!(
            RuleSet::from_text("com\n").unwrap_err(),
            Error::InvalidRules(_)
        ));
    }

    #[test]
    fn test_snapshot_round_trip_is_lossless() {
        let rules = RuleSet::from_text(LIST).unwrap();
        let snapshot = rules.to_snapshot();
        let restored = RuleSet::from_snapshot(&snapshot).unwrap();
        assert_eq!(rules, restored);
        // a second round trip produces the identical snapshot
        assert_eq!(snapshot, restored.to_snapshot());
    }

    #[test]
    fn test_invalid_snapshot_is_rejected() {
        assert!(matches!(
            RuleSet::from_snapshot("{not json").unwrap_err(),
            Error::InvalidRules(_)
        ));
    }
}

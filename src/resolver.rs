//! The longest-match engine over the two list sections.

use log::trace;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::resolved::ResolvedDomain;
use crate::rules::{RuleNode, RuleSet};
use crate::suffix::Section;

/// Which list sections participate in a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// Both sections, the way cookie handling wants it: the longest match
    /// wins, PRIVATE breaks ties, and an unlisted TLD still yields an
    /// `Unknown` single-label suffix.
    #[default]
    Cookie,
    /// Only the ICANN section; no match is an error.
    Icann,
    /// Only the PRIVATE section; no match is an error.
    Private,
}

/// Resolves `host` against `rules`, producing the decomposition into
/// suffix, registrable domain and sub-domain.
pub(crate) fn resolve(rules: &RuleSet, host: &Host, policy: Policy) -> Result<ResolvedDomain> {
    match host.content() {
        None => return Err(Error::invalid_domain("cannot resolve the null host")),
        Some("") => return Err(Error::invalid_domain("cannot resolve an empty host")),
        Some(_) => {}
    }
    if host.has_trailing_dot() {
        return Err(Error::UnableToResolveDomain(format!(
            "`{host}` carries a trailing dot"
        )));
    }
    if host.count() < 2 {
        return Err(Error::UnableToResolveDomain(format!(
            "`{host}` has a single label"
        )));
    }

    // The trees store A-labels, so the walk happens over the ASCII form;
    // the result is sliced from the host's own (possibly Unicode) labels.
    let search = host.to_ascii()?;
    let labels: Vec<&str> = search.labels().iter().map(String::as_str).collect();

    let icann = match policy {
        Policy::Private => None,
        _ => walk(&rules.icann, &labels),
    };
    let private = match policy {
        Policy::Icann => None,
        _ => walk(&rules.private, &labels),
    };

    let (length, section) = match policy {
        Policy::Cookie => match (icann, private) {
            (Some(icann), Some(private)) if private >= icann => (private, Section::Private),
            (Some(icann), _) => (icann, Section::Icann),
            (None, Some(private)) => (private, Section::Private),
            (None, None) => (1, Section::Unknown),
        },
        Policy::Icann => match icann {
            Some(length) => (length, Section::Icann),
            None => {
                return Err(Error::UnableToResolveDomain(format!(
                    "`{host}` has no suffix in the ICANN section"
                )))
            }
        },
        Policy::Private => match private {
            Some(length) => (length, Section::Private),
            None => {
                return Err(Error::UnableToResolveDomain(format!(
                    "`{host}` has no suffix in the PRIVATE section"
                )))
            }
        },
    };

    // A public suffix cannot by itself be registered.
    if length >= host.count() {
        return Err(Error::UnableToResolveDomain(format!(
            "`{host}` is a public suffix"
        )));
    }

    trace!("`{host}` matched {length} suffix label(s) in {section:?}");
    Ok(ResolvedDomain::compose(host.clone(), length, section))
}

/// Walks one section trie along the reversed labels and returns the number
/// of labels of the longest matching rule, if any.
///
/// An exact child is preferred over the wildcard child at every node. An
/// exception child settles the walk at one label fewer than the wildcard it
/// narrows.
fn walk(root: &RuleNode, labels: &[&str]) -> Option<usize> {
    let mut node = root;
    let mut best = None;
    for (depth, label) in labels.iter().enumerate() {
        if let Some(child) = node.children.get(*label) {
            if child.exception {
                return if depth == 0 { None } else { Some(depth) };
            }
            if child.terminal {
                best = Some(depth + 1);
            }
            node = child;
        } else if let Some(wild) = node.wildcard() {
            best = Some(depth + 1);
            node = wild;
        } else {
            break;
        }
    }
    best
}

//! Error types for host parsing and public suffix resolution.

use thiserror::Error;

use crate::idna::LabelErrors;

/// Errors that can occur while constructing hosts, parsing the Public Suffix
/// List or resolving a domain against it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The host content is null or empty where a non-null host is required,
    /// or IDNA validation failed for the host as a whole. `errors` carries
    /// the per-label flags aggregated over every offending label.
    #[error("invalid domain: {reason}")]
    InvalidDomain { reason: String, errors: LabelErrors },

    /// A single label failed validation (empty, too long, disallowed
    /// character, hyphen misuse).
    #[error("invalid label `{label}`: {errors}")]
    InvalidLabel { label: String, errors: LabelErrors },

    /// A label offset lies outside `[-count - 1, count]` for a mutation.
    #[error("label key {key} is out of range for a host with {count} label(s)")]
    InvalidLabelKey { key: i32, count: usize },

    /// The host has too few labels, carries a trailing dot, equals its own
    /// public suffix, or no suffix exists in the requested list section.
    #[error("unable to resolve domain: {0}")]
    UnableToResolveDomain(String),

    /// A sub-domain operation was attempted on a host that has no
    /// registrable domain.
    #[error("unable to resolve sub-domain: {0}")]
    UnableToResolveSubDomain(String),

    /// The Public Suffix List text or a rule snapshot could not be parsed.
    #[error("invalid public suffix list: {0}")]
    InvalidRules(String),

    /// A list collaborator (fetcher or cache) failed to produce the list.
    #[error("unable to load the public suffix list: {0}")]
    UnableToLoadList(String),
}

impl Error {
    /// An `InvalidDomain` without IDNA flags, for structural failures such
    /// as a null host where content is required.
    pub fn invalid_domain(reason: impl Into<String>) -> Self {
        Error::InvalidDomain {
            reason: reason.into(),
            errors: LabelErrors::empty(),
        }
    }

    /// An `InvalidDomain` carrying the flag set aggregated over all labels
    /// that failed IDNA conversion.
    pub fn idna_domain(reason: impl Into<String>, errors: LabelErrors) -> Self {
        Error::InvalidDomain {
            reason: reason.into(),
            errors,
        }
    }

    /// An `InvalidLabel` for a single offending label.
    pub fn invalid_label(label: impl Into<String>, errors: LabelErrors) -> Self {
        Error::InvalidLabel {
            label: label.into(),
            errors,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_domain("host content is null");
        assert_eq!(err.to_string(), "invalid domain: host content is null");

        let err = Error::InvalidLabelKey { key: 5, count: 2 };
        assert_eq!(
            err.to_string(),
            "label key 5 is out of range for a host with 2 label(s)"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(Error::invalid_domain("x"), Error::invalid_domain("x"));
        assert_ne!(
            Error::UnableToResolveDomain("a".into()),
            Error::UnableToResolveSubDomain("a".into())
        );
    }
}

//! The public suffix value: a host carrying the list section it came from.

use std::fmt;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::idna::IdnaOptions;

/// The section of the Public Suffix List a suffix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Registry-run suffixes from the ICANN section.
    Icann,
    /// Community-delegated suffixes from the PRIVATE section.
    Private,
    /// A suffix that was assigned without being found in either section.
    Unknown,
    /// No suffix; only the null suffix carries this tag.
    None,
}

/// A public suffix. The null suffix (no content, [`Section::None`]) is the
/// unique value a domain without any matched suffix carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
    host: Host,
    section: Section,
}

impl Suffix {
    /// The null suffix.
    pub fn none() -> Self {
        Suffix {
            host: Host::null(),
            section: Section::None,
        }
    }

    /// A suffix from the ICANN section.
    pub fn from_icann(host: Host) -> Result<Self> {
        Self::tagged(host, Section::Icann)
    }

    /// A suffix from the PRIVATE section.
    pub fn from_private(host: Host) -> Result<Self> {
        Self::tagged(host, Section::Private)
    }

    /// A suffix that is asserted rather than matched against the list.
    pub fn from_unknown(host: Host) -> Result<Self> {
        Self::tagged(host, Section::Unknown)
    }

    /// Parses a bare string into an [`Section::Unknown`] suffix.
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_unknown(Host::parse(content)?)
    }

    fn tagged(host: Host, section: Section) -> Result<Self> {
        match host.content() {
            None => {
                return Err(Error::invalid_domain(
                    "a tagged suffix requires at least one label",
                ))
            }
            Some("") => {
                return Err(Error::invalid_domain(
                    "a suffix cannot be the empty host",
                ))
            }
            Some(_) => {}
        }
        if host.has_trailing_dot() {
            return Err(Error::invalid_domain("a suffix cannot carry a trailing dot"));
        }
        Ok(Suffix { host, section })
    }

    /// Wraps an already-validated host slice. Only resolution internals may
    /// skip the checks of [`Suffix::tagged`].
    pub(crate) fn with_section(host: Host, section: Section) -> Self {
        Suffix { host, section }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Whether the suffix was found in the list at all.
    pub fn is_known(&self) -> bool {
        matches!(self.section, Section::Icann | Section::Private)
    }

    pub fn is_icann(&self) -> bool {
        self.section == Section::Icann
    }

    pub fn is_private(&self) -> bool {
        self.section == Section::Private
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub(crate) fn into_host(self) -> Host {
        self.host
    }

    pub fn content(&self) -> Option<&str> {
        self.host.content()
    }

    pub fn count(&self) -> usize {
        self.host.count()
    }

    pub fn labels(&self) -> &[String] {
        self.host.labels()
    }

    pub fn label_at(&self, key: i32) -> Option<&str> {
        self.host.label_at(key)
    }

    /// The suffix in A-label form, section preserved.
    pub fn to_ascii(&self) -> Result<Self> {
        Ok(Suffix {
            host: self.host.to_ascii()?,
            section: self.section,
        })
    }

    /// The suffix in U-label form, section preserved.
    pub fn to_unicode(&self) -> Result<Self> {
        Ok(Suffix {
            host: self.host.to_unicode()?,
            section: self.section,
        })
    }

    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        Ok(Suffix {
            host: self.host.with_ascii_idna_option(options)?,
            section: self.section,
        })
    }

    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        Ok(Suffix {
            host: self.host.with_unicode_idna_option(options)?,
            section: self.section,
        })
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_suffix() {
        let suffix = Suffix::none();
        assert_eq!(suffix.content(), None);
        assert_eq!(suffix.section(), Section::None);
        assert!(!suffix.is_known());
    }

    #[test]
    fn test_bare_string_is_unknown() {
        let suffix = Suffix::parse("github.io").unwrap();
        assert_eq!(suffix.section(), Section::Unknown);
        assert!(!suffix.is_known());
        assert_eq!(suffix.content(), Some("github.io"));
        assert_eq!(suffix.count(), 2);
    }

    #[test]
    fn test_section_predicates() {
        let icann = Suffix::from_icann(Host::parse("ac.be").unwrap()).unwrap();
        assert!(icann.is_known());
        assert!(icann.is_icann());
        assert!(!icann.is_private());

        let private = Suffix::from_private(Host::parse("github.io").unwrap()).unwrap();
        assert!(private.is_known());
        assert!(private.is_private());
    }

    #[test]
    fn test_tagged_suffix_rejects_degenerate_hosts() {
        assert!(Suffix::from_icann(Host::null()).is_err());
        assert!(Suffix::from_icann(Host::parse("").unwrap()).is_err());
        assert!(Suffix::from_icann(Host::parse("com.").unwrap()).is_err());
    }

    #[test]
    fn test_conversion_preserves_section() {
        let suffix = Suffix::from_icann(Host::parse("公司.cn").unwrap()).unwrap();
        let ascii = suffix.to_ascii().unwrap();
        assert_eq!(ascii.content(), Some("xn--55qx5d.cn"));
        assert_eq!(ascii.section(), Section::Icann);
        assert_eq!(ascii.to_unicode().unwrap(), suffix);
    }
}

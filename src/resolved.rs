//! The composite result of a resolution: host, suffix, registrable domain
//! and sub-domain, kept consistent through every mutation.

use std::fmt;

use crate::error::{Error, Result};
use crate::host::{DomainInput, Host};
use crate::idna::IdnaOptions;
use crate::suffix::{Section, Suffix};

/// A host decomposed relative to the Public Suffix List.
///
/// The four slots always agree: the host's labels are the sub-domain labels
/// followed by the registrable labels, and the registrable labels are one
/// label on top of the suffix. Mutators return a new value and recompute
/// the decomposition, so the invariant survives every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDomain {
    host: Host,
    suffix: Suffix,
    registrable: Option<Host>,
    sub: Option<Host>,
}

impl ResolvedDomain {
    /// Decomposes `host` after a match of `suffix_len` labels. The caller
    /// guarantees `suffix_len < host.count()` and no trailing dot.
    pub(crate) fn compose(host: Host, suffix_len: usize, section: Section) -> Self {
        debug_assert!(suffix_len < host.count());
        let ascii_options = host.ascii_options();
        let unicode_options = host.unicode_options();
        let slice = |labels: &[String]| {
            Host::from_reversed_labels(labels.to_vec(), ascii_options, unicode_options)
        };

        let suffix = Suffix::with_section(slice(&host.labels()[..suffix_len]), section);
        let registrable = slice(&host.labels()[..=suffix_len]);
        let sub_labels = &host.labels()[suffix_len + 1..];
        let sub = if sub_labels.is_empty() {
            None
        } else {
            Some(slice(sub_labels))
        };
        ResolvedDomain {
            host,
            suffix,
            registrable: Some(registrable),
            sub,
        }
    }

    /// A domain that carries no suffix at all.
    pub(crate) fn unresolved(host: Host) -> Self {
        ResolvedDomain {
            host,
            suffix: Suffix::none(),
            registrable: None,
            sub: None,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn suffix(&self) -> &Suffix {
        &self.suffix
    }

    /// The public suffix plus one label, when the host extends beyond its
    /// suffix.
    pub fn registrable_domain(&self) -> Option<&Host> {
        self.registrable.as_ref()
    }

    /// The labels above the registrable domain, if any.
    pub fn sub_domain(&self) -> Option<&Host> {
        self.sub.as_ref()
    }

    /// The single label between the sub-domain and the suffix.
    pub fn second_level_domain(&self) -> Option<&str> {
        self.registrable.as_ref()?;
        self.host.label_at(self.suffix.count() as i32)
    }

    /// Replaces the public suffix, keeping `suffix`'s section tag.
    ///
    /// `suffix` must already be a suffix of the host, except for the
    /// single-label host, which is extended by it. A null `suffix` strips
    /// the decomposition entirely.
    pub fn with_public_suffix(&self, suffix: Suffix) -> Result<Self> {
        if self.host.has_trailing_dot() {
            return Err(Error::UnableToResolveDomain(format!(
                "`{}` carries a trailing dot",
                self.host
            )));
        }
        if suffix.content().is_none() {
            return Ok(Self::unresolved(self.host.clone()));
        }
        let suffix_len = suffix.count();

        match self.host.count() {
            0 => Err(Error::invalid_domain("the null host cannot take a suffix")),
            1 if self.host.content() == Some("") => {
                Err(Error::invalid_domain("the empty host cannot take a suffix"))
            }
            1 => {
                // extend: single label + new suffix becomes the new host
                let mut labels = suffix.labels().to_vec();
                labels.extend(self.host.labels().iter().cloned());
                let host = Host::from_reversed_labels(
                    labels,
                    self.host.ascii_options(),
                    self.host.unicode_options(),
                );
                Ok(Self::compose(host, suffix_len, suffix.section()))
            }
            count => {
                if suffix_len >= count {
                    return Err(Error::UnableToResolveDomain(format!(
                        "suffix `{suffix}` covers the whole of `{}`",
                        self.host
                    )));
                }
                let host_ascii = self.host.to_ascii()?;
                let suffix_ascii = suffix.to_ascii()?;
                if host_ascii.labels()[..suffix_len] != *suffix_ascii.labels() {
                    return Err(Error::UnableToResolveDomain(format!(
                        "`{}` does not end with `{suffix}`",
                        self.host
                    )));
                }
                Ok(Self::compose(
                    self.host.clone(),
                    suffix_len,
                    suffix.section(),
                ))
            }
        }
    }

    /// Attaches an explicit suffix, typically to re-classify the current
    /// one between sections without consulting the rules again. Attaching
    /// the suffix the domain already carries changes nothing.
    pub fn resolve(&self, suffix: Suffix) -> Result<Self> {
        if suffix == self.suffix {
            return Ok(self.clone());
        }
        self.with_public_suffix(suffix)
    }

    /// Replaces the sub-domain portion. The replacement inherits the IDNA
    /// form of the host: Unicode if the host is Unicode anywhere, ASCII
    /// otherwise. A null input clears the sub-domain.
    pub fn with_sub_domain(&self, input: DomainInput) -> Result<Self> {
        let registrable = self.registrable.as_ref().ok_or_else(|| {
            Error::UnableToResolveSubDomain(format!(
                "`{}` has no registrable domain",
                self.host
            ))
        })?;
        let sub = input.into_host(self.host.ascii_options(), self.host.unicode_options())?;
        match sub.content() {
            Some("") => {
                return Err(Error::invalid_domain(
                    "the sub-domain cannot be the empty string",
                ))
            }
            Some(_) if sub.has_trailing_dot() => {
                return Err(Error::invalid_domain(
                    "the sub-domain cannot carry a trailing dot",
                ))
            }
            _ => {}
        }

        let host = match sub.content() {
            None => registrable.clone(),
            Some(_) => {
                let sub = if self.host.is_ascii() {
                    sub.to_ascii()?
                } else {
                    sub.to_unicode()?
                };
                let mut labels = registrable.labels().to_vec();
                labels.extend(sub.labels().iter().cloned());
                Host::from_reversed_labels(
                    labels,
                    self.host.ascii_options(),
                    self.host.unicode_options(),
                )
            }
        };
        Ok(Self::compose(host, self.suffix.count(), self.suffix.section()))
    }

    /// The whole composite in A-label form, host and suffix converted in
    /// lockstep.
    pub fn to_ascii(&self) -> Result<Self> {
        self.converted(self.host.to_ascii()?)
    }

    /// The whole composite in U-label form.
    pub fn to_unicode(&self) -> Result<Self> {
        self.converted(self.host.to_unicode()?)
    }

    /// Propagates new ASCII conversion options to both halves.
    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        self.converted(self.host.with_ascii_idna_option(options)?)
    }

    /// Propagates new Unicode conversion options to both halves.
    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        self.converted(self.host.with_unicode_idna_option(options)?)
    }

    fn converted(&self, host: Host) -> Result<Self> {
        match self.registrable {
            None => Ok(ResolvedDomain {
                suffix: self.suffix.clone(),
                registrable: None,
                sub: None,
                host,
            }),
            Some(_) => Ok(Self::compose(
                host,
                self.suffix.count(),
                self.suffix.section(),
            )),
        }
    }
}

impl fmt::Display for ResolvedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host.content().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Policy;
    use crate::rules::RuleSet;

    const LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
be
ac.be
com
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
github.io
// ===END PRIVATE DOMAINS===
";

    fn resolved(host: &str) -> ResolvedDomain {
        let rules = RuleSet::from_text(LIST).unwrap();
        rules
            .resolve(&Host::parse(host).unwrap(), Policy::Cookie)
            .unwrap()
    }

    fn assert_decomposition(domain: &ResolvedDomain) {
        let mut expected: Vec<String> = domain
            .registrable_domain()
            .map(|r| r.labels().to_vec())
            .unwrap_or_default();
        if let Some(sub) = domain.sub_domain() {
            expected.extend(sub.labels().iter().cloned());
        }
        assert_eq!(domain.host().labels(), expected.as_slice());

        if let Some(registrable) = domain.registrable_domain() {
            assert_eq!(
                &registrable.labels()[..domain.suffix().count()],
                domain.suffix().labels()
            );
            assert_eq!(registrable.count(), domain.suffix().count() + 1);
        }
    }

    #[test]
    fn test_slots_agree() {
        let domain = resolved("www.ulb.ac.be");
        assert_eq!(domain.host().content(), Some("www.ulb.ac.be"));
        assert_eq!(domain.suffix().content(), Some("ac.be"));
        assert_eq!(
            domain.registrable_domain().unwrap().content(),
            Some("ulb.ac.be")
        );
        assert_eq!(domain.sub_domain().unwrap().content(), Some("www"));
        assert_eq!(domain.second_level_domain(), Some("ulb"));
        assert_decomposition(&domain);
    }

    #[test]
    fn test_no_sub_domain() {
        let domain = resolved("ulb.ac.be");
        assert_eq!(domain.sub_domain(), None);
        assert_decomposition(&domain);
    }

    #[test]
    fn test_with_sub_domain_replace() {
        let domain = resolved("www.ulb.ac.be");
        let swapped = domain
            .with_sub_domain(DomainInput::from_string("mail.intra"))
            .unwrap();
        assert_eq!(swapped.host().content(), Some("mail.intra.ulb.ac.be"));
        assert_eq!(swapped.sub_domain().unwrap().content(), Some("mail.intra"));
        assert_eq!(swapped.suffix(), domain.suffix());
        assert_decomposition(&swapped);
        // the receiver is unchanged
        assert_eq!(domain.host().content(), Some("www.ulb.ac.be"));
    }

    #[test]
    fn test_with_sub_domain_clears_on_null() {
        let domain = resolved("www.ulb.ac.be");
        let cleared = domain
            .with_sub_domain(DomainInput::from_host(Host::null()))
            .unwrap();
        assert_eq!(cleared.host().content(), Some("ulb.ac.be"));
        assert_eq!(cleared.sub_domain(), None);
        assert_decomposition(&cleared);
    }

    #[test]
    fn test_with_sub_domain_rejects_empty_string() {
        let domain = resolved("www.ulb.ac.be");
        assert!(matches!(
            domain
                .with_sub_domain(DomainInput::from_string(""))
                .unwrap_err(),
            Error::InvalidDomain { .. }
        ));
    }

    #[test]
    fn test_with_sub_domain_without_registrable() {
        let domain = ResolvedDomain::unresolved(Host::parse("example.com").unwrap());
        assert!(matches!(
            domain
                .with_sub_domain(DomainInput::from_string("www"))
                .unwrap_err(),
            Error::UnableToResolveSubDomain(_)
        ));
    }

    #[test]
    fn test_sub_domain_inherits_unicode_form() {
        let rules = RuleSet::from_text(
            "\
// ===BEGIN ICANN DOMAINS===
de
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
// ===END PRIVATE DOMAINS===
",
        )
        .unwrap();
        let domain = rules
            .resolve(&Host::parse("bücher.de").unwrap(), Policy::Cookie)
            .unwrap();
        let with_sub = domain
            .with_sub_domain(DomainInput::from_string("xn--bb-bjab"))
            .unwrap();
        // the host is Unicode, so the ACE sub-domain converts to match
        assert_eq!(with_sub.host().content(), Some("bébé.bücher.de"));

        let ascii = domain.to_ascii().unwrap();
        let with_sub = ascii
            .with_sub_domain(DomainInput::from_string("bébé"))
            .unwrap();
        assert_eq!(
            with_sub.host().content(),
            Some("xn--bb-bjab.xn--bcher-kva.de")
        );
    }

    #[test]
    fn test_with_public_suffix_reclassifies() {
        let domain = resolved("www.ulb.ac.be");
        let suffix = Suffix::parse("ac.be").unwrap();
        let reclassified = domain.with_public_suffix(suffix).unwrap();
        assert_eq!(reclassified.suffix().section(), Section::Unknown);
        assert_eq!(reclassified.host(), domain.host());
        assert_decomposition(&reclassified);

        let shorter = domain.with_public_suffix(Suffix::parse("be").unwrap()).unwrap();
        assert_eq!(
            shorter.registrable_domain().unwrap().content(),
            Some("ac.be")
        );
        assert_eq!(shorter.sub_domain().unwrap().content(), Some("www.ulb"));
        assert_decomposition(&shorter);
    }

    #[test]
    fn test_with_public_suffix_requires_matching_tail() {
        let domain = resolved("www.ulb.ac.be");
        assert!(matches!(
            domain
                .with_public_suffix(Suffix::parse("com").unwrap())
                .unwrap_err(),
            Error::UnableToResolveDomain(_)
        ));
    }

    #[test]
    fn test_with_public_suffix_cannot_cover_the_host() {
        let domain = resolved("ulb.ac.be");
        assert!(matches!(
            domain
                .with_public_suffix(Suffix::parse("ulb.ac.be").unwrap())
                .unwrap_err(),
            Error::UnableToResolveDomain(_)
        ));
    }

    #[test]
    fn test_with_public_suffix_extends_single_label_host() {
        let domain = ResolvedDomain::unresolved(Host::parse("example").unwrap());
        let extended = domain
            .with_public_suffix(Suffix::parse("co.uk").unwrap())
            .unwrap();
        assert_eq!(extended.host().content(), Some("example.co.uk"));
        assert_eq!(
            extended.registrable_domain().unwrap().content(),
            Some("example.co.uk")
        );
        assert_eq!(extended.sub_domain(), None);
        assert_decomposition(&extended);
    }

    #[test]
    fn test_with_null_suffix_strips_decomposition() {
        let domain = resolved("www.ulb.ac.be");
        let stripped = domain.with_public_suffix(Suffix::none()).unwrap();
        assert_eq!(stripped.suffix().section(), Section::None);
        assert_eq!(stripped.registrable_domain(), None);
        assert_eq!(stripped.sub_domain(), None);
        assert_eq!(stripped.host(), domain.host());
    }

    #[test]
    fn test_resolve_with_current_suffix_is_identity() {
        let domain = resolved("www.ulb.ac.be");
        let same = domain.resolve(domain.suffix().clone()).unwrap();
        assert_eq!(same, domain);
    }

    #[test]
    fn test_ascii_unicode_lockstep() {
        let rules = RuleSet::from_text(
            "\
// ===BEGIN ICANN DOMAINS===
cn
公司.cn
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
// ===END PRIVATE DOMAINS===
",
        )
        .unwrap();
        let domain = rules
            .resolve(&Host::parse("www.食狮.公司.cn").unwrap(), Policy::Cookie)
            .unwrap();
        assert_eq!(domain.suffix().content(), Some("公司.cn"));

        let ascii = domain.to_ascii().unwrap();
        assert_eq!(
            ascii.host().content(),
            Some("www.xn--85x722f.xn--55qx5d.cn")
        );
        assert_eq!(ascii.suffix().content(), Some("xn--55qx5d.cn"));
        assert_eq!(
            ascii.registrable_domain().unwrap().content(),
            Some("xn--85x722f.xn--55qx5d.cn")
        );
        assert_decomposition(&ascii);

        assert_eq!(ascii.to_unicode().unwrap(), domain);
    }

    #[test]
    fn test_idna_option_mutators_propagate() {
        let domain = resolved("www.ulb.ac.be");
        let same = domain
            .with_ascii_idna_option(domain.host().ascii_options())
            .unwrap();
        assert_eq!(same, domain);

        let relaxed = domain
            .with_ascii_idna_option(IdnaOptions::NONTRANSITIONAL_TO_ASCII)
            .unwrap();
        assert_eq!(
            relaxed.host().ascii_options(),
            IdnaOptions::NONTRANSITIONAL_TO_ASCII
        );
        assert_eq!(
            relaxed.suffix().host().ascii_options(),
            IdnaOptions::NONTRANSITIONAL_TO_ASCII
        );
    }
}

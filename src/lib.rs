//! domainsplit - host name resolution against the Mozilla Public Suffix List
//!
//! This crate splits a host name into its structural parts relative to the
//! Public Suffix List: the *public suffix*, the *registrable domain*
//! (suffix plus one label) and the *sub-domain*, and tells you which list
//! section (ICANN or PRIVATE) the suffix came from.
//!
//! # Features
//!
//! - **Longest-match engine**: the full PSL algorithm with wildcard (`*.`)
//!   and exception (`!`) rules across both list sections
//! - **IDNA-faithful values**: every host keeps its ASCII (Punycode) and
//!   Unicode forms interchangeable under UTS #46 conversion
//! - **Immutable values**: every mutation returns a new value, so a parsed
//!   rule set can serve concurrent resolutions without locks
//! - **Cacheable rules**: the parsed list serializes to a lossless snapshot
//!   for round-trips through any key/value store
//!
//! # Quick Start
//!
//! ```
//! use domainsplit::{Host, Policy, RuleSet};
//!
//! let list = "\
//! // ===BEGIN ICANN DOMAINS===
//! com
//! // ===END ICANN DOMAINS===
//! // ===BEGIN PRIVATE DOMAINS===
//! github.io
//! // ===END PRIVATE DOMAINS===
//! ";
//! let rules = RuleSet::from_text(list)?;
//!
//! let host = Host::parse("www.example.com")?;
//! let resolved = rules.resolve(&host, Policy::Cookie)?;
//! assert_eq!(resolved.suffix().content(), Some("com"));
//! assert_eq!(resolved.registrable_domain().unwrap().content(), Some("example.com"));
//! assert_eq!(resolved.sub_domain().unwrap().content(), Some("www"));
//!
//! let host = Host::parse("www.example.github.io")?;
//! let resolved = rules.resolve(&host, Policy::Cookie)?;
//! assert!(resolved.suffix().is_private());
//! assert_eq!(resolved.registrable_domain().unwrap().content(), Some("example.github.io"));
//! # Ok::<(), domainsplit::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Hosts with too few
//! labels or a trailing dot cannot be resolved; hosts that fail IDNA
//! validation cannot be constructed at all, with the offending labels
//! reported as an aggregated flag set.

pub use error::{Error, Result};
pub use host::{DomainInput, Host};
pub use idna::{
    host_to_ascii, host_to_unicode, is_transitionally_different, IdnaOptions, LabelErrors,
};
pub use resolved::ResolvedDomain;
pub use resolver::Policy;
pub use rules::RuleSet;
pub use source::{load_rules, ListSource, MemoryCache, SnapshotCache};
pub use suffix::{Section, Suffix};

pub mod error;
pub mod host;
pub mod idna;
pub mod resolved;
pub mod resolver;
pub mod rules;
pub mod source;
pub mod suffix;

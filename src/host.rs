//! The immutable, label-indexed host value.
//!
//! A [`Host`] stores its labels in reverse DNS order (TLD first) together
//! with the IDNA options used to convert it. Every constructor and mutation
//! revalidates, so a `Host` that exists is IDNA-valid by construction.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};
use crate::idna::{
    host_to_ascii, host_to_unicode, is_transitionally_different, validate_ascii_label,
    IdnaOptions, LabelErrors,
};
use crate::suffix::Suffix;

const MAX_HOST_OCTETS: usize = 253;
const MAX_LABELS: usize = 127;

/// A host name as an ordered sequence of labels.
///
/// Three shapes exist: the *null* host (no content), the *empty* host
/// (content `""`, a single empty label) and regular hosts of one or more
/// labels. A single trailing dot is preserved in the content string but
/// excluded from label-count semantics.
///
/// All mutations return a new value; the receiver is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Reversed label sequence: index 0 is the TLD, the last entry is the
    /// leftmost label of the forward form.
    labels: Vec<String>,
    content: Option<String>,
    trailing_dot: bool,
    ascii_options: IdnaOptions,
    unicode_options: IdnaOptions,
}

impl Host {
    /// The null host: no content, no labels.
    pub fn null() -> Self {
        Self::null_with(IdnaOptions::default_ascii(), IdnaOptions::default_unicode())
    }

    fn null_with(ascii_options: IdnaOptions, unicode_options: IdnaOptions) -> Self {
        Host {
            labels: Vec::new(),
            content: None,
            trailing_dot: false,
            ascii_options,
            unicode_options,
        }
    }

    /// Parses a host with the default IDNA options.
    pub fn parse(content: &str) -> Result<Self> {
        Self::new(
            Some(content),
            IdnaOptions::default_ascii(),
            IdnaOptions::default_unicode(),
        )
    }

    /// Builds a host from nullable content and explicit IDNA options.
    ///
    /// The content string is URL-decoded once when it carries `%XX` escape
    /// sequences, ASCII-lowercased, then split on `.`. Hosts containing
    /// characters outside `U+0020..U+007F` are validated through IDNA and
    /// stored in their Unicode form; pure ASCII content is left as given.
    pub fn new(
        content: Option<&str>,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Result<Self> {
        let content = match content {
            None => return Ok(Self::null_with(ascii_options, unicode_options)),
            Some(content) => content,
        };
        if content.is_empty() {
            return Ok(Host {
                labels: vec![String::new()],
                content: Some(String::new()),
                trailing_dot: false,
                ascii_options,
                unicode_options,
            });
        }

        let decoded = if content.contains('%') {
            percent_decode_str(content)
                .decode_utf8()
                .map_err(|_| {
                    Error::invalid_domain(format!("`{content}` is not valid percent-encoded UTF-8"))
                })?
                .into_owned()
        } else {
            content.to_string()
        };
        let lowered = decoded.to_ascii_lowercase();

        let (body, trailing_dot) = match lowered.strip_suffix('.') {
            Some("") => {
                return Err(Error::idna_domain(
                    format!("`{content}` contains no label"),
                    LabelErrors::EMPTY_LABEL,
                ))
            }
            Some(body) => (body.to_string(), true),
            None => (lowered, false),
        };

        let stored = if body.is_ascii() {
            validate_ascii_host(&body, ascii_options)?;
            body
        } else {
            // One ASCII conversion pass validates every label under the
            // caller's options; the Unicode form is what gets stored.
            let ascii = host_to_ascii(&body, ascii_options)?;
            validate_ascii_host(&ascii, ascii_options)?;
            host_to_unicode(&body, unicode_options)?
        };

        let labels: Vec<String> = stored.split('.').rev().map(str::to_string).collect();
        let mut rendered = stored;
        if trailing_dot {
            rendered.push('.');
        }
        Ok(Host {
            labels,
            content: Some(rendered),
            trailing_dot,
            ascii_options,
            unicode_options,
        })
    }

    /// Builds a host from already-validated reversed labels. Callers must
    /// guarantee the labels came out of an existing `Host`.
    pub(crate) fn from_reversed_labels(
        labels: Vec<String>,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Self {
        if labels.is_empty() {
            return Self::null_with(ascii_options, unicode_options);
        }
        let content = join_forward(&labels);
        Host {
            labels,
            content: Some(content),
            trailing_dot: false,
            ascii_options,
            unicode_options,
        }
    }

    /// The canonical dot-joined form, `None` for the null host.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Number of labels: 0 for the null host, 1 for the empty host. A
    /// trailing empty label does not count.
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// The labels in reverse DNS order (TLD first).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The label at a signed offset: `0` is the TLD, negative offsets count
    /// from the leftmost label (`-1` is the leftmost). Out of range yields
    /// `None`, never an error.
    pub fn label_at(&self, key: i32) -> Option<&str> {
        let idx = self.normalize_key(key)?;
        self.labels.get(idx).map(String::as_str)
    }

    /// All offsets whose label equals `label`.
    pub fn keys(&self, label: &str) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether the content is entirely within `U+0020..U+007F`. The null
    /// host is vacuously ASCII.
    pub fn is_ascii(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_ascii)
    }

    /// Whether this host carries a trailing dot in its content form.
    pub fn has_trailing_dot(&self) -> bool {
        self.trailing_dot
    }

    /// Whether transitional and non-transitional IDNA processing disagree
    /// on this host's ASCII form.
    pub fn is_transitionally_different(&self) -> bool {
        self.content
            .as_deref()
            .map_or(false, is_transitionally_different)
    }

    pub fn ascii_options(&self) -> IdnaOptions {
        self.ascii_options
    }

    pub fn unicode_options(&self) -> IdnaOptions {
        self.unicode_options
    }

    /// Replaces the label at `key` with `value`, returning the new host.
    ///
    /// `key == count` adds a new leftmost label; `key == -count - 1` adds a
    /// new label on the TLD side. `value` may contain interior dots, in
    /// which case each segment becomes a label substituted in place; a
    /// leading or trailing dot in `value` is rejected as an empty label.
    pub fn with_label(&self, key: i32, value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::invalid_label(value, LabelErrors::EMPTY_LABEL));
        }
        let segments = split_label_value(value)?;
        let reversed: Vec<String> = segments.into_iter().rev().collect();
        let count = self.labels.len() as i32;

        let mut labels = self.labels.clone();
        if key == count {
            labels.extend(reversed);
        } else if key == -count - 1 {
            labels.splice(0..0, reversed);
        } else {
            let idx = self.normalize_key(key).ok_or(Error::InvalidLabelKey {
                key,
                count: self.labels.len(),
            })?;
            labels.splice(idx..=idx, reversed);
        }
        self.rebuild(labels)
    }

    /// Removes the labels at the given offsets. Offsets are normalized to
    /// positive, deduplicated and validated first; removing every label
    /// yields the null host.
    pub fn without_label(&self, keys: &[i32]) -> Result<Self> {
        let mut normalized = Vec::with_capacity(keys.len());
        for &key in keys {
            let idx = self.normalize_key(key).ok_or(Error::InvalidLabelKey {
                key,
                count: self.labels.len(),
            })?;
            normalized.push(idx);
        }
        normalized.sort_unstable();
        normalized.dedup();

        let labels: Vec<String> = self
            .labels
            .iter()
            .enumerate()
            .filter(|(i, _)| normalized.binary_search(i).is_err())
            .map(|(_, l)| l.clone())
            .collect();
        self.rebuild(labels)
    }

    /// Adds `value` as the new leftmost label(s): `"example.com"` prepended
    /// with `"www"` becomes `"www.example.com"`.
    pub fn prepend(&self, value: &str) -> Result<Self> {
        self.with_label(self.labels.len() as i32, value)
    }

    /// Adds `value` on the TLD side: `"example"` appended with `"com"`
    /// becomes `"example.com"`.
    pub fn append(&self, value: &str) -> Result<Self> {
        self.with_label(-(self.labels.len() as i32) - 1, value)
    }

    /// The whole host converted to its A-label form. Hosts that are already
    /// ASCII come back unchanged.
    pub fn to_ascii(&self) -> Result<Self> {
        match self.content.as_deref() {
            None => Ok(self.clone()),
            Some(content) if content.is_ascii() => Ok(self.clone()),
            Some(content) => {
                let ascii = host_to_ascii(content, self.ascii_options)?;
                Self::new(Some(&ascii), self.ascii_options, self.unicode_options)
            }
        }
    }

    /// The whole host converted to its U-label form. ACE (`xn--`) labels
    /// are decoded; hosts without any come back unchanged.
    pub fn to_unicode(&self) -> Result<Self> {
        match self.content.as_deref() {
            None => Ok(self.clone()),
            Some(content) if !content.contains("xn--") => Ok(self.clone()),
            Some(content) => {
                let unicode = host_to_unicode(content, self.unicode_options)?;
                Self::new(Some(&unicode), self.ascii_options, self.unicode_options)
            }
        }
    }

    /// Returns a host with the given ASCII conversion options, revalidating
    /// the content under them. Equal options return an unchanged value.
    pub fn with_ascii_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.ascii_options {
            return Ok(self.clone());
        }
        Self::new(self.content.as_deref(), options, self.unicode_options)
    }

    /// Returns a host with the given Unicode conversion options.
    pub fn with_unicode_idna_option(&self, options: IdnaOptions) -> Result<Self> {
        if options == self.unicode_options {
            return Ok(self.clone());
        }
        Self::new(self.content.as_deref(), self.ascii_options, options)
    }

    fn normalize_key(&self, key: i32) -> Option<usize> {
        let count = self.labels.len() as i32;
        let idx = if key < 0 { key + count } else { key };
        if (0..count).contains(&idx) {
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Reassembles a mutated label sequence into a validated host,
    /// preserving the trailing dot and both option sets.
    fn rebuild(&self, labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Ok(Self::null_with(self.ascii_options, self.unicode_options));
        }
        let mut content = join_forward(&labels);
        if self.trailing_dot {
            content.push('.');
        }
        Self::new(Some(&content), self.ascii_options, self.unicode_options)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content.as_deref().unwrap_or(""))
    }
}

/// Input accepted by mutators that take either raw text, a [`Host`] or a
/// [`Suffix`]. Callers tag the variant explicitly instead of the library
/// guessing from the payload.
#[derive(Debug, Clone)]
pub enum DomainInput {
    Text(String),
    Host(Host),
    Suffix(Suffix),
}

impl DomainInput {
    pub fn from_string(value: impl Into<String>) -> Self {
        DomainInput::Text(value.into())
    }

    pub fn from_host(host: Host) -> Self {
        DomainInput::Host(host)
    }

    pub fn from_suffix(suffix: Suffix) -> Self {
        DomainInput::Suffix(suffix)
    }

    pub(crate) fn into_host(
        self,
        ascii_options: IdnaOptions,
        unicode_options: IdnaOptions,
    ) -> Result<Host> {
        match self {
            DomainInput::Text(text) => Host::new(Some(&text), ascii_options, unicode_options),
            DomainInput::Host(host) => Ok(host),
            DomainInput::Suffix(suffix) => Ok(suffix.into_host()),
        }
    }
}

fn join_forward(reversed: &[String]) -> String {
    let mut parts: Vec<&str> = reversed.iter().map(String::as_str).collect();
    parts.reverse();
    parts.join(".")
}

fn split_label_value(value: &str) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    for segment in value.split('.') {
        if segment.is_empty() {
            return Err(Error::invalid_label(value, LabelErrors::EMPTY_LABEL));
        }
        segments.push(segment.to_string());
    }
    Ok(segments)
}

/// Host-level validation of an ASCII form: per-label structure plus the
/// whole-host limits (253 octets, 127 labels, no all-numeric top label on
/// multi-label hosts).
fn validate_ascii_host(ascii: &str, options: IdnaOptions) -> Result<()> {
    if ascii.len() > MAX_HOST_OCTETS {
        return Err(Error::invalid_domain(format!(
            "host exceeds {MAX_HOST_OCTETS} octets"
        )));
    }
    let labels: Vec<&str> = ascii.split('.').collect();
    if labels.len() > MAX_LABELS {
        return Err(Error::invalid_domain(format!(
            "host exceeds {MAX_LABELS} labels"
        )));
    }

    let mut aggregated = LabelErrors::empty();
    for label in &labels {
        aggregated |= validate_ascii_label(label, options);
    }
    if !aggregated.is_empty() {
        return Err(Error::idna_domain(
            format!("`{ascii}` failed label validation"),
            aggregated,
        ));
    }

    // The split above is in forward order, so the top label is last.
    if labels.len() >= 2 {
        let tld = labels[labels.len() - 1];
        if tld.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_domain(format!(
                "top label `{tld}` of `{ascii}` is all-numeric"
            )));
        }
    }
    Ok(())
}

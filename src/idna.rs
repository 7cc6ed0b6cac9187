//! IDNA (UTS #46) conversion between the ASCII (A-label) and Unicode
//! (U-label) forms of host names.
//!
//! Conversion is defined per label and for whole dot-joined hosts. Failures
//! are reported as per-label flag sets so a caller can see every offending
//! label of a host in one pass instead of stopping at the first.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{Error, Result};

/// IDNA processing options, threaded through every [`Host`](crate::Host) as
/// a bitmask. Only the six enumerated flags are valid; any other bit is
/// rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdnaOptions(u32);

impl IdnaOptions {
    /// Apply the transitional processing of UTS #46 (deviation characters
    /// such as `ß` are mapped, e.g. to `ss`).
    pub const TRANSITIONAL: IdnaOptions = IdnaOptions(0x01);
    /// Non-transitional processing when converting to ASCII.
    pub const NONTRANSITIONAL_TO_ASCII: IdnaOptions = IdnaOptions(0x02);
    /// Non-transitional processing when converting to Unicode.
    pub const NONTRANSITIONAL_TO_UNICODE: IdnaOptions = IdnaOptions(0x04);
    /// Check the Bidi constraints of RFC 5893.
    pub const CHECK_BIDI: IdnaOptions = IdnaOptions(0x08);
    /// Check the CONTEXTJ constraints of RFC 5892 (ZWJ, ZWNJ).
    pub const CHECK_CONTEXTJ: IdnaOptions = IdnaOptions(0x10);
    /// Restrict labels to letters, digits and hyphens (STD3).
    pub const USE_STD3_ASCII_RULES: IdnaOptions = IdnaOptions(0x20);

    const ALL: u32 = 0x3f;

    /// The default option set for conversions to ASCII:
    /// non-transitional with every check enabled.
    pub fn default_ascii() -> Self {
        Self::NONTRANSITIONAL_TO_ASCII
            | Self::CHECK_BIDI
            | Self::CHECK_CONTEXTJ
            | Self::USE_STD3_ASCII_RULES
    }

    /// The default option set for conversions to Unicode.
    pub fn default_unicode() -> Self {
        Self::NONTRANSITIONAL_TO_UNICODE
            | Self::CHECK_BIDI
            | Self::CHECK_CONTEXTJ
            | Self::USE_STD3_ASCII_RULES
    }

    /// The transitional counterpart of [`IdnaOptions::default_ascii`], used
    /// to detect deviation characters.
    pub fn transitional() -> Self {
        Self::TRANSITIONAL | Self::CHECK_BIDI | Self::CHECK_CONTEXTJ | Self::USE_STD3_ASCII_RULES
    }

    /// Builds an option set from a raw bitmask.
    ///
    /// # Errors
    ///
    /// Fails when a bit outside the six enumerated flags is set, or when
    /// `TRANSITIONAL` is combined with a non-transitional flag.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !Self::ALL != 0 {
            return Err(Error::invalid_domain(format!(
                "unknown IDNA option bits: {:#x}",
                bits & !Self::ALL
            )));
        }
        let options = IdnaOptions(bits);
        if options.contains(Self::TRANSITIONAL)
            && (options.contains(Self::NONTRANSITIONAL_TO_ASCII)
                || options.contains(Self::NONTRANSITIONAL_TO_UNICODE))
        {
            return Err(Error::invalid_domain(
                "transitional and non-transitional IDNA processing are mutually exclusive",
            ));
        }
        Ok(options)
    }

    /// The raw bitmask.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag of `other` is set in `self`.
    pub fn contains(self, other: IdnaOptions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IdnaOptions {
    type Output = IdnaOptions;

    fn bitor(self, rhs: IdnaOptions) -> IdnaOptions {
        IdnaOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for IdnaOptions {
    fn bitor_assign(&mut self, rhs: IdnaOptions) {
        self.0 |= rhs.0;
    }
}

/// Per-label conversion error flags.
///
/// A single label can raise several flags at once; host-level conversion
/// aggregates the flags of every label into one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LabelErrors(u32);

impl LabelErrors {
    pub const EMPTY_LABEL: LabelErrors = LabelErrors(0x01);
    pub const LABEL_TOO_LONG: LabelErrors = LabelErrors(0x02);
    pub const DISALLOWED_CHARACTER: LabelErrors = LabelErrors(0x04);
    pub const HYPHEN_MISUSE: LabelErrors = LabelErrors(0x08);
    pub const BIDI_ERROR: LabelErrors = LabelErrors(0x10);
    pub const CONTEXTJ_ERROR: LabelErrors = LabelErrors(0x20);
    pub const PUNYCODE_ERROR: LabelErrors = LabelErrors(0x40);
    pub const INVALID_ACE_LABEL: LabelErrors = LabelErrors(0x80);

    /// The empty flag set.
    pub const fn empty() -> Self {
        LabelErrors(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: LabelErrors) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LabelErrors {
    type Output = LabelErrors;

    fn bitor(self, rhs: LabelErrors) -> LabelErrors {
        LabelErrors(self.0 | rhs.0)
    }
}

impl BitOrAssign for LabelErrors {
    fn bitor_assign(&mut self, rhs: LabelErrors) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for LabelErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(LabelErrors, &str); 8] = [
            (LabelErrors::EMPTY_LABEL, "empty label"),
            (LabelErrors::LABEL_TOO_LONG, "label too long"),
            (LabelErrors::DISALLOWED_CHARACTER, "disallowed character"),
            (LabelErrors::HYPHEN_MISUSE, "hyphen misuse"),
            (LabelErrors::BIDI_ERROR, "bidi error"),
            (LabelErrors::CONTEXTJ_ERROR, "contextJ error"),
            (LabelErrors::PUNYCODE_ERROR, "punycode error"),
            (LabelErrors::INVALID_ACE_LABEL, "invalid ACE label"),
        ];
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

fn uts46_config(options: IdnaOptions) -> idna::Config {
    idna::Config::default()
        .use_std3_ascii_rules(options.contains(IdnaOptions::USE_STD3_ASCII_RULES))
        .transitional_processing(options.contains(IdnaOptions::TRANSITIONAL))
        .check_hyphens(true)
        .verify_dns_length(false)
}

/// Converts a single label to its A-label form.
pub fn label_to_ascii(
    label: &str,
    options: IdnaOptions,
) -> std::result::Result<String, LabelErrors> {
    if label.is_empty() {
        return Err(LabelErrors::EMPTY_LABEL);
    }
    match uts46_config(options).to_ascii(label) {
        Ok(ascii) => {
            let mut errors = LabelErrors::empty();
            if ascii.is_empty() {
                errors |= LabelErrors::EMPTY_LABEL;
            }
            if ascii.len() > 63 {
                errors |= LabelErrors::LABEL_TOO_LONG;
            }
            if errors.is_empty() {
                Ok(ascii)
            } else {
                Err(errors)
            }
        }
        Err(_) => Err(classify_failure(label)),
    }
}

/// Converts a single label to its U-label form.
pub fn label_to_unicode(
    label: &str,
    options: IdnaOptions,
) -> std::result::Result<String, LabelErrors> {
    if label.is_empty() {
        return Err(LabelErrors::EMPTY_LABEL);
    }
    let (unicode, outcome) = uts46_config(options).to_unicode(label);
    match outcome {
        Ok(()) => Ok(unicode),
        Err(_) => Err(classify_failure(label)),
    }
}

/// Names the reason a label was rejected by the UTS #46 engine.
///
/// The engine reports failures as an opaque set, so the flags here are
/// recovered from the shape of the input label itself.
fn classify_failure(label: &str) -> LabelErrors {
    let mut errors = LabelErrors::empty();
    if label.starts_with('-') || label.ends_with('-') {
        errors |= LabelErrors::HYPHEN_MISUSE;
    }
    let lowered = label.to_ascii_lowercase();
    if let Some(ace) = lowered.strip_prefix("xn--") {
        errors |= LabelErrors::INVALID_ACE_LABEL;
        if idna::punycode::decode_to_string(ace).is_none() {
            errors |= LabelErrors::PUNYCODE_ERROR;
        }
    }
    if label.chars().any(|c| matches!(c, '\u{200C}' | '\u{200D}')) {
        errors |= LabelErrors::CONTEXTJ_ERROR;
    }
    if label.chars().any(is_rtl) {
        errors |= LabelErrors::BIDI_ERROR;
    }
    if errors.is_empty() {
        errors |= LabelErrors::DISALLOWED_CHARACTER;
    }
    errors
}

// Hebrew, Arabic, Syriac, Thaana, NKo plus the Arabic presentation forms.
fn is_rtl(c: char) -> bool {
    matches!(c,
        '\u{0590}'..='\u{08FF}' | '\u{FB1D}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Structural validation of a label that is already in ASCII form, without
/// running it through the UTS #46 engine. Used for hosts whose content never
/// leaves the ASCII range.
pub(crate) fn validate_ascii_label(label: &str, options: IdnaOptions) -> LabelErrors {
    if label.is_empty() {
        return LabelErrors::EMPTY_LABEL;
    }
    let mut errors = LabelErrors::empty();
    if label.len() > 63 {
        errors |= LabelErrors::LABEL_TOO_LONG;
    }
    if label.starts_with('-') || label.ends_with('-') {
        errors |= LabelErrors::HYPHEN_MISUSE;
    }
    let std3 = options.contains(IdnaOptions::USE_STD3_ASCII_RULES);
    for c in label.chars() {
        let allowed = if std3 {
            c.is_ascii_alphanumeric() || c == '-'
        } else {
            c.is_ascii_graphic() && c != '.'
        };
        if !allowed {
            errors |= LabelErrors::DISALLOWED_CHARACTER;
            break;
        }
    }
    if let Some(ace) = label.strip_prefix("xn--") {
        if idna::punycode::decode_to_string(ace).is_none() {
            errors |= LabelErrors::PUNYCODE_ERROR | LabelErrors::INVALID_ACE_LABEL;
        }
    }
    errors
}

/// Converts a whole dot-joined host to its A-label form.
///
/// The empty host passes through unchanged and a single trailing dot is
/// preserved. Per-label failures are aggregated into one
/// [`Error::InvalidDomain`].
pub fn host_to_ascii(host: &str, options: IdnaOptions) -> Result<String> {
    convert_host(host, options, label_to_ascii)
}

/// Converts a whole dot-joined host to its U-label form.
pub fn host_to_unicode(host: &str, options: IdnaOptions) -> Result<String> {
    convert_host(host, options, label_to_unicode)
}

fn convert_host(
    host: &str,
    options: IdnaOptions,
    convert: fn(&str, IdnaOptions) -> std::result::Result<String, LabelErrors>,
) -> Result<String> {
    if host.is_empty() {
        return Ok(String::new());
    }
    let (body, trailing_dot) = match host.strip_suffix('.') {
        Some("") => {
            return Err(Error::idna_domain(
                format!("`{host}` contains no label"),
                LabelErrors::EMPTY_LABEL,
            ))
        }
        Some(body) => (body, true),
        None => (host, false),
    };

    let mut converted = Vec::new();
    let mut aggregated = LabelErrors::empty();
    for label in body.split('.') {
        match convert(label, options) {
            Ok(label) => converted.push(label),
            Err(errors) => aggregated |= errors,
        }
    }
    if !aggregated.is_empty() {
        return Err(Error::idna_domain(
            format!("IDNA conversion of `{host}` failed"),
            aggregated,
        ));
    }

    let mut joined = converted.join(".");
    if trailing_dot {
        joined.push('.');
    }
    Ok(joined)
}

/// Whether transitional and non-transitional processing disagree on the
/// ASCII form of `host` (UTS #46 deviation characters: `ß`, `ς`, ZWJ, ZWNJ).
pub fn is_transitionally_different(host: &str) -> bool {
    match (
        host_to_ascii(host, IdnaOptions::transitional()),
        host_to_ascii(host, IdnaOptions::default_ascii()),
    ) {
        (Ok(transitional), Ok(nontransitional)) => transitional != nontransitional,
        _ => false,
    }
}

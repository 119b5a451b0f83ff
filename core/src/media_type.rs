//! Media type value type and content-negotiation ordering.
//!
//! Covers the minimal subset the consumes/produces conditions need: parsing
//! of `type/subtype;param=value` strings, wildcard compatibility, and the
//! specificity-then-quality ordering used to rank producible types against
//! an `Accept` list.
//!
//! # Ordering
//!
//! `audio/basic` is more specific than `audio/*`, which is more specific
//! than `*/*`. Between equally concrete types, a higher `q` value sorts
//! first, then a type with more parameters.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Parse failure for a media type string.
///
/// Raised eagerly for mapping construction input, and surfaced as a
/// client-error diagnostic when a request carries an unparseable
/// `Content-Type` or `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid media type \"{value}\": {detail}")]
pub struct InvalidMediaType {
    /// The offending input string.
    pub value: String,
    /// What was wrong with it.
    pub detail: String,
}

impl InvalidMediaType {
    fn new(value: &str, detail: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            detail: detail.into(),
        }
    }
}

/// A media type: type, subtype, and parameters (including quality).
///
/// Type and subtype are stored lowercase; parameter names are lowercase and
/// kept in a sorted map so that structural equality and hashing are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaType {
    kind: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// The quality parameter name.
    pub const PARAM_QUALITY: &'static str = "q";

    /// Create a media type with no parameters.
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    /// `*/*`
    #[must_use]
    pub fn all() -> Self {
        Self::new("*", "*")
    }

    /// `application/octet-stream`, the assumed type for request bodies with
    /// no declared `Content-Type`.
    #[must_use]
    pub fn application_octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Add a parameter, returning the modified type.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Parse a single `type/subtype;param=value` string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMediaType`] for empty input, a missing or empty
    /// type/subtype, a wildcard type with a concrete subtype, or a
    /// malformed quality value.
    pub fn parse(input: &str) -> Result<Self, InvalidMediaType> {
        let input_trimmed = input.trim();
        if input_trimmed.is_empty() {
            return Err(InvalidMediaType::new(input, "empty media type"));
        }

        let mut parts = input_trimmed.split(';');
        let full_type = parts.next().unwrap_or("").trim();

        // "*" is shorthand for "*/*" (lenient, as Accept headers in the wild use it)
        let full_type = if full_type == "*" { "*/*" } else { full_type };

        let Some((kind, subtype)) = full_type.split_once('/') else {
            return Err(InvalidMediaType::new(input, "missing '/' separator"));
        };
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() {
            return Err(InvalidMediaType::new(input, "empty type"));
        }
        if subtype.is_empty() {
            return Err(InvalidMediaType::new(input, "empty subtype"));
        }
        if kind == "*" && subtype != "*" {
            return Err(InvalidMediaType::new(
                input,
                "wildcard type with concrete subtype",
            ));
        }

        let mut media_type = MediaType::new(kind, subtype);
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((name, value)) = param.split_once('=') else {
                return Err(InvalidMediaType::new(
                    input,
                    format!("parameter \"{param}\" is missing '='"),
                ));
            };
            let (name, value) = (name.trim().to_ascii_lowercase(), value.trim());
            let value = value.trim_matches('"');
            if name == Self::PARAM_QUALITY {
                let q: f64 = value.parse().map_err(|_| {
                    InvalidMediaType::new(input, format!("malformed quality value \"{value}\""))
                })?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(InvalidMediaType::new(
                        input,
                        format!("quality value {q} outside [0.0, 1.0]"),
                    ));
                }
            }
            media_type.params.insert(name, value.to_string());
        }
        Ok(media_type)
    }

    /// Parse a comma-separated list, as found in an `Accept` header.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvalidMediaType`] encountered.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, InvalidMediaType> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// The primary type, e.g. `application` (or `*`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The subtype, e.g. `json` (or `*`).
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// A parameter value by (case-insensitive) name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the primary type is the wildcard `*`.
    #[must_use]
    pub fn is_wildcard_type(&self) -> bool {
        self.kind == "*"
    }

    /// Whether the subtype is the wildcard `*`.
    #[must_use]
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == "*"
    }

    /// Whether neither type nor subtype is a wildcard.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard_type() && !self.is_wildcard_subtype()
    }

    /// The quality value: the `q` parameter, defaulting to `1.0`.
    ///
    /// Construction validates `q`, so this never fails after `parse`.
    #[must_use]
    pub fn quality(&self) -> f64 {
        self.param(Self::PARAM_QUALITY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0)
    }

    /// Whether this type includes `other`: `*/*` includes everything,
    /// `text/*` includes `text/plain`, and a concrete type includes only
    /// itself. Parameters other than quality are ignored.
    #[must_use]
    pub fn includes(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() {
            return true;
        }
        if self.kind != other.kind {
            return false;
        }
        self.is_wildcard_subtype() || self.subtype == other.subtype
    }

    /// Symmetric compatibility: either side includes the other.
    #[must_use]
    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        self.includes(other) || other.includes(self)
    }

    /// Whether type and subtype are equal, ignoring parameters.
    #[must_use]
    pub fn equals_type_and_subtype(&self, other: &MediaType) -> bool {
        self.kind == other.kind && self.subtype == other.subtype
    }

    /// Compare by specificity only: concrete before subtype-wildcard before
    /// `*/*`; among equally concrete types, more parameters first. Equal
    /// specificity yields `Ordering::Equal`.
    #[must_use]
    pub fn specificity_cmp(&self, other: &MediaType) -> Ordering {
        match (self.is_wildcard_type(), other.is_wildcard_type()) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        if self.kind == other.kind {
            match (self.is_wildcard_subtype(), other.is_wildcard_subtype()) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                _ => {}
            }
            if self.subtype == other.subtype {
                return other.params.len().cmp(&self.params.len());
            }
        }
        Ordering::Equal
    }

    /// Compare by quality first (higher first), then specificity.
    #[must_use]
    pub fn quality_and_specificity_cmp(&self, other: &MediaType) -> Ordering {
        other
            .quality()
            .partial_cmp(&self.quality())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.specificity_cmp(other))
    }

    /// Sort a list most-specific first, with quality taking precedence.
    /// The sort is stable, so equally ranked types keep their declared order.
    pub fn sort_by_specificity_and_quality(types: &mut [MediaType]) {
        types.sort_by(|a, b| a.quality_and_specificity_cmp(b));
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

//! Pattern-based field extraction over reconstructed PDF text.
//!
//! A [`PatternRegistry`] holds named regular expressions in registration
//! order. [`extract_fields`] runs each one once against the full document
//! text and records the first capture group, or [`NOT_FOUND`] when the
//! pattern does not match.

use regex::{Regex, RegexBuilder};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Value recorded for a field whose pattern did not match.
pub const NOT_FOUND: &str = "Not found";

/// Reserved field name carrying the source file name.
pub const FILENAME_FIELD: &str = "filename";

/// Upper bound on the compiled size of a single pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A named extraction pattern.
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    /// Field name the captured value is stored under
    pub name: String,
    /// Compiled pattern
    pub regex: Regex,
    /// Capture group holding the value
    pub capture_group: usize,
}

impl ExtractionPattern {
    /// Compile and validate a case-insensitive pattern.
    ///
    /// The pattern must compile within the size limit and define at least
    /// one capture group.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| Error::InvalidPattern {
            name: name.clone(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("field name is empty".to_string()));
        }
        if name == FILENAME_FIELD {
            return Err(invalid(format!("'{}' is reserved", FILENAME_FIELD)));
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .dfa_size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() < 2 {
            return Err(invalid("pattern has no capture group".to_string()));
        }

        Ok(Self {
            name,
            regex,
            capture_group: 1,
        })
    }

    /// Run the pattern once, returning the trimmed capture.
    pub fn find(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(self.capture_group))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Ordered set of extraction patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<ExtractionPattern>,
}

impl PatternRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in registry: `lote` and `total`.
    pub fn standard() -> &'static PatternRegistry {
        static STANDARD: OnceLock<PatternRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            PatternRegistry::new()
                .with_pattern("lote", r"Lote\s*N?°?:\s*(\S+)")
                .and_then(|r| r.with_pattern("total", r"Total.*?:?\s*\$?([\d,.-]+)"))
                .expect("built-in patterns are valid")
        })
    }

    /// Build a registry from `(name, pattern)` pairs, in order.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = Self::new();
        for (name, pattern) in pairs {
            registry.register(name, pattern)?;
        }
        Ok(registry)
    }

    /// Add a pattern (builder form).
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: &str) -> Result<Self> {
        self.register(name, pattern)?;
        Ok(self)
    }

    /// Add a pattern. Field names must be unique.
    pub fn register(&mut self, name: impl Into<String>, pattern: &str) -> Result<()> {
        let compiled = ExtractionPattern::new(name, pattern)?;
        if self.patterns.iter().any(|p| p.name == compiled.name) {
            return Err(Error::InvalidPattern {
                name: compiled.name,
                reason: "field name registered twice".to_string(),
            });
        }
        self.patterns.push(compiled);
        Ok(())
    }

    /// Patterns in registration order.
    pub fn patterns(&self) -> &[ExtractionPattern] {
        &self.patterns
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Field values extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Source file name
    pub filename: String,
    /// `(field, value)` pairs in registration order
    pub values: Vec<(String, String)>,
}

impl ExtractedFields {
    /// Look up a field. `"filename"` always answers.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name == FILENAME_FIELD {
            return Some(&self.filename);
        }
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over extracted fields, excluding the file name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields that matched.
    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|(_, v)| v != NOT_FOUND).count()
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(FILENAME_FIELD, &self.filename)?;
        for (key, value) in &self.values {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Run every registered pattern once against `text`.
///
/// # Example
///
/// ```
/// use docmark::extract::{extract_fields, PatternRegistry, NOT_FOUND};
///
/// let fields = extract_fields("Lote N°: A-123", "x.pdf", PatternRegistry::standard());
/// assert_eq!(fields.get("lote"), Some("A-123"));
/// assert_eq!(fields.get("total"), Some(NOT_FOUND));
/// assert_eq!(fields.get("filename"), Some("x.pdf"));
/// ```
pub fn extract_fields(text: &str, filename: &str, registry: &PatternRegistry) -> ExtractedFields {
    let values = registry
        .patterns()
        .iter()
        .map(|pattern| {
            let value = pattern.find(text).unwrap_or_else(|| {
                log::debug!("field '{}' not found", pattern.name);
                NOT_FOUND.to_string()
            });
            (pattern.name.clone(), value)
        })
        .collect();

    ExtractedFields {
        filename: filename.to_string(),
        values,
    }
}

//! Opt-in text repair for Markdown produced from PDF text.
//!
//! PDF producers often emit presentation forms (ligature glyphs),
//! decomposed accents, or U+FFFD for glyphs without a Unicode mapping.
//! The pipeline undoes the common cases; it never changes line structure,
//! so heading markers survive it.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Unicode NFC normalization only
    Minimal,
    /// NFC + ligature repair + replacement-character removal
    #[default]
    Standard,
}

/// Which repairs a [`CleanupPipeline`] performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Compose to Unicode NFC
    pub normalize_unicode: bool,
    /// Expand Latin ligature code points (U+FB00..U+FB06)
    pub fix_ligatures: bool,
    /// Drop U+FFFD
    pub remove_replacement_char: bool,
    /// Shorten runs of 3+ spaces to two
    pub normalize_whitespace: bool,
}

impl CleanupOptions {
    /// Options for a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        let full = preset == CleanupPreset::Standard;
        Self {
            normalize_unicode: true,
            fix_ligatures: full,
            remove_replacement_char: full,
            normalize_whitespace: full,
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::from_preset(CleanupPreset::default())
    }
}

/// Expansion of a Latin ligature code point.
fn expand_ligature(c: char) -> Option<&'static str> {
    match c {
        '\u{FB00}' => Some("ff"),
        '\u{FB01}' => Some("fi"),
        '\u{FB02}' => Some("fl"),
        '\u{FB03}' => Some("ffi"),
        '\u{FB04}' => Some("ffl"),
        '\u{FB05}' | '\u{FB06}' => Some("st"),
        _ => None,
    }
}

/// Text cleanup pipeline.
#[derive(Debug, Clone, Default)]
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// The options in effect.
    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    /// Apply the enabled repairs in order: NFC, then per-character fixes,
    /// then whitespace.
    pub fn process(&self, text: &str) -> String {
        let opts = &self.options;

        let text: Cow<'_, str> = if opts.normalize_unicode {
            Cow::Owned(text.nfc().collect())
        } else {
            Cow::Borrowed(text)
        };

        let text: Cow<'_, str> = if opts.fix_ligatures || opts.remove_replacement_char {
            let mut out = String::with_capacity(text.len());
            for c in text.chars() {
                if opts.remove_replacement_char && c == char::REPLACEMENT_CHARACTER {
                    continue;
                }
                match expand_ligature(c).filter(|_| opts.fix_ligatures) {
                    Some(expanded) => out.push_str(expanded),
                    None => out.push(c),
                }
            }
            Cow::Owned(out)
        } else {
            text
        };

        if !opts.normalize_whitespace {
            return text.into_owned();
        }

        // two trailing spaces are a Markdown hard break; keep pairs
        static SPACE_RUN: OnceLock<Regex> = OnceLock::new();
        SPACE_RUN
            .get_or_init(|| Regex::new(r" {3,}").expect("valid regex"))
            .replace_all(&text, "  ")
            .into_owned()
    }
}

//! Rendering options and configuration.

use super::{CleanupOptions, CleanupPreset};

/// Options for rendering Markdown output.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Escape special Markdown characters in literal text
    pub escape_special_chars: bool,

    /// Text cleanup options
    pub cleanup: Option<CleanupOptions>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable escaping of Markdown syntax characters.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert!(!options.escape_special_chars);
        assert!(options.cleanup.is_none());
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_escape(true)
            .with_cleanup_preset(CleanupPreset::Standard);
        assert!(options.escape_special_chars);
        assert!(options.cleanup.is_some());
    }
}

//! Parse option flags and presets.

use bitflags::bitflags;
use pulldown_cmark::Options as TokenizerOptions;

bitflags! {
    /// Extension set handed to [`crate::parse`] and the incremental parser.
    ///
    /// Flags mirror the tokenizer contract's unsigned-integer passthrough.
    /// `PERMISSIVE_ATX_HEADERS` is accepted for contract parity but the
    /// bundled tokenizer keeps CommonMark's space-after-`#` requirement, so
    /// `#foo` stays a paragraph either way.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseOptions: u32 {
        const PERMISSIVE_ATX_HEADERS = 1 << 0;
        const PERMISSIVE_URL_AUTOLINKS = 1 << 1;
        const PERMISSIVE_EMAIL_AUTOLINKS = 1 << 2;
        const PERMISSIVE_WWW_AUTOLINKS = 1 << 3;
        const TABLES = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
        const TASK_LISTS = 1 << 6;
        /// Treat soft breaks as hard breaks.
        const HARD_SOFT_BREAKS = 1 << 7;
        /// Deliver HTML blocks as literal paragraph text.
        const NO_HTML_BLOCKS = 1 << 8;
        /// Deliver inline HTML as literal text.
        const NO_HTML_SPANS = 1 << 9;
        const WIKILINKS = 1 << 10;
        const LATEX_MATH = 1 << 11;
    }
}

impl ParseOptions {
    /// Strict CommonMark: no extensions.
    pub fn commonmark() -> Self {
        Self::empty()
    }

    /// The GitHub-flavored subset: autolinks, tables, strikethrough and
    /// task lists.
    pub fn gfm_subset() -> Self {
        Self::PERMISSIVE_URL_AUTOLINKS
            | Self::PERMISSIVE_EMAIL_AUTOLINKS
            | Self::PERMISSIVE_WWW_AUTOLINKS
            | Self::TABLES
            | Self::STRIKETHROUGH
            | Self::TASK_LISTS
    }

    pub(crate) fn autolinks(self) -> bool {
        self.intersects(
            Self::PERMISSIVE_URL_AUTOLINKS
                | Self::PERMISSIVE_EMAIL_AUTOLINKS
                | Self::PERMISSIVE_WWW_AUTOLINKS,
        )
    }

    pub(crate) fn tokenizer_options(self) -> TokenizerOptions {
        let mut opts = TokenizerOptions::empty();
        if self.contains(Self::TABLES) {
            opts.insert(TokenizerOptions::ENABLE_TABLES);
        }
        if self.contains(Self::STRIKETHROUGH) {
            opts.insert(TokenizerOptions::ENABLE_STRIKETHROUGH);
        }
        if self.contains(Self::TASK_LISTS) {
            opts.insert(TokenizerOptions::ENABLE_TASKLISTS);
        }
        if self.contains(Self::WIKILINKS) {
            opts.insert(TokenizerOptions::ENABLE_WIKILINKS);
        }
        if self.contains(Self::LATEX_MATH) {
            opts.insert(TokenizerOptions::ENABLE_MATH);
        }
        opts
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::gfm_subset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_gfm_subset() {
        assert_eq!(ParseOptions::default(), ParseOptions::gfm_subset());
        assert!(ParseOptions::default().contains(ParseOptions::TABLES));
        assert!(!ParseOptions::default().contains(ParseOptions::NO_HTML_BLOCKS));
    }

    #[test]
    fn commonmark_is_empty() {
        assert!(ParseOptions::commonmark().is_empty());
        assert!(ParseOptions::commonmark().tokenizer_options().is_empty());
    }

    #[test]
    fn tokenizer_mapping_tracks_flags() {
        let opts = ParseOptions::TABLES | ParseOptions::LATEX_MATH;
        let tok = opts.tokenizer_options();
        assert!(tok.contains(TokenizerOptions::ENABLE_TABLES));
        assert!(tok.contains(TokenizerOptions::ENABLE_MATH));
        assert!(!tok.contains(TokenizerOptions::ENABLE_STRIKETHROUGH));
    }
}

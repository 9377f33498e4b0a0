//! Toolkit-free styled text: the output model of highlighting and
//! rendering. A view layer maps runs onto its own text format.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorRgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Proportional,
    Monospace,
    Named(Arc<str>),
}

/// One run of uniformly styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub size: f32,
    pub font: FontFamily,
    pub color: Option<ColorRgb>,
    pub background: Option<ColorRgb>,
    pub bold: bool,
    pub italics: bool,
    pub strikethrough: bool,
    pub underline: bool,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            size,
            font: FontFamily::Proportional,
            color: None,
            background: None,
            bold: false,
            italics: false,
            strikethrough: false,
            underline: false,
        }
    }
}

/// Styled text as an ordered list of runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledText {
    pub runs: Vec<StyledRun>,
}

impl StyledText {
    /// Append a run, merging with the previous one when the style matches.
    pub fn push(&mut self, run: StyledRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.size.to_bits() == run.size.to_bits()
                && last.font == run.font
                && last.color == run.color
                && last.background == run.background
                && last.bold == run.bold
                && last.italics == run.italics
                && last.strikethrough == run.strikethrough
                && last.underline == run.underline
            {
                last.text.push_str(&run.text);
                return;
            }
        }
        self.runs.push(run);
    }

    /// Concatenated text of every run.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Style inputs for [`crate::CachedRenderer`].
///
/// Identity is whole-value: every field participates in equality and
/// hashing (floats by bit pattern), so two styles differing in any field
/// occupy distinct cache entries.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub body_size: f32,
    pub mono_size: f32,
    pub heading_sizes: [f32; 6],
    pub text_color: ColorRgb,
    pub code_color: ColorRgb,
    pub code_background: ColorRgb,
    pub link_color: ColorRgb,
    pub quote_color: ColorRgb,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            body_size: 14.0,
            mono_size: 13.0,
            heading_sizes: [24.0, 20.0, 18.0, 16.0, 14.0, 12.0],
            text_color: ColorRgb::new(0xD5, 0xCE, 0xC4),
            code_color: ColorRgb::new(0xD4, 0xA5, 0x74),
            code_background: ColorRgb::new(0x2A, 0x28, 0x24),
            link_color: ColorRgb::new(100, 149, 237),
            quote_color: ColorRgb::new(0xA0, 0x96, 0x88),
        }
    }
}

impl PartialEq for RenderStyle {
    fn eq(&self, other: &Self) -> bool {
        self.body_size.to_bits() == other.body_size.to_bits()
            && self.mono_size.to_bits() == other.mono_size.to_bits()
            && self
                .heading_sizes
                .iter()
                .zip(&other.heading_sizes)
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self.text_color == other.text_color
            && self.code_color == other.code_color
            && self.code_background == other.code_background
            && self.link_color == other.link_color
            && self.quote_color == other.quote_color
    }
}

impl Eq for RenderStyle {}

impl Hash for RenderStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.body_size.to_bits().hash(state);
        self.mono_size.to_bits().hash(state);
        for size in &self.heading_sizes {
            size.to_bits().hash(state);
        }
        self.text_color.hash(state);
        self.code_color.hash(state);
        self.code_background.hash(state);
        self.link_color.hash(state);
        self.quote_color.hash(state);
    }
}

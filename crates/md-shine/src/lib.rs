//! Cached highlighting and styled-text rendering beside the markdown IR.
//!
//! Two surfaces, both bounded by LRU caches:
//!
//! - [`CodeHighlighter`]: an actor serializing access to a syntax
//!   highlighter, with results content-addressed by (theme, language,
//!   exact code bytes).
//! - [`CachedRenderer`]: composes toolkit-free [`StyledText`] from an
//!   [`md_ir::Document`], cached per (document identity, style value).

mod highlight;
mod lru;
mod render;
mod styled;

pub use highlight::{
    CodeHighlighter, Highlight, HighlightKey, HighlighterConfig, SyntectHighlighter,
    DEFAULT_THEME,
};
pub use lru::LruCache;
pub use render::CachedRenderer;
pub use styled::{ColorRgb, FontFamily, RenderStyle, StyledRun, StyledText};

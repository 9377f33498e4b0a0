//! Markdown IR - the stable output of parsing.
//!
//! A tagged tree of blocks and inline spans. Leaves reference the document
//! source by byte range (see [`crate::TextContent`]); every block-like node
//! carries a [`BlockId`] so a view layer can diff successive documents
//! cheaply.

use std::sync::Arc;

use uuid::Uuid;

use crate::entity;
use crate::range::{ByteRange, TextContent};

/// Identifies one parse session to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Block kind discriminants carried inside [`BlockId::kind`].
pub mod kind {
    pub const PARAGRAPH: u8 = 1;
    pub const HEADING: u8 = 2;
    pub const CODE_BLOCK: u8 = 3;
    pub const HTML_BLOCK: u8 = 4;
    pub const BLOCK_QUOTE: u8 = 5;
    pub const LIST: u8 = 6;
    pub const LIST_ITEM: u8 = 7;
    pub const TABLE: u8 = 8;
    pub const TABLE_ROW: u8 = 9;
    pub const TABLE_CELL: u8 = 10;
    pub const THEMATIC_BREAK: u8 = 11;
}

/// Stable identity for a block, list item, table row or cell.
///
/// Two ids are equal iff all four fields are equal. Ordinals are unique
/// within one parse session but not stable across re-parses; diffing across
/// re-parses should key on `(kind, start, end)` plus structural position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub kind: u8,
    pub start: u32,
    pub end: u32,
    pub ordinal: u32,
}

impl BlockId {
    pub(crate) fn shift(&mut self, delta: usize) {
        let delta = u32::try_from(delta).unwrap_or(u32::MAX);
        self.start = self.start.saturating_add(delta);
        self.end = self.end.saturating_add(delta);
    }
}

/// Column alignment for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// A top-level structural unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Heading(Heading),
    Code(CodeBlock),
    Html(HtmlBlock),
    Quote(BlockQuote),
    List(List),
    Table(Table),
    Rule(ThematicBreak),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub id: BlockId,
    pub spans: Vec<Span>,
    pub range: ByteRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub id: BlockId,
    /// 1 through 6.
    pub level: u8,
    pub spans: Vec<Span>,
    pub range: ByteRange,
}

/// A fenced or indented code block.
///
/// `content` concatenates every emitted code-text fragment in order,
/// newlines included.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub id: BlockId,
    pub info: Option<TextContent>,
    pub language: Option<TextContent>,
    pub content: TextContent,
    pub fence_char: Option<char>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlBlock {
    pub id: BlockId,
    pub content: TextContent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockQuote {
    pub id: BlockId,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub id: BlockId,
    pub ordered: bool,
    pub start: u32,
    /// `.` or `)` for ordered lists, recovered from the source bytes.
    pub delimiter: Option<char>,
    pub tight: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: BlockId,
    pub children: Vec<Block>,
    pub is_task: bool,
    pub is_checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub id: BlockId,
    pub alignments: Vec<Alignment>,
    pub header_rows: Vec<TableRow>,
    pub body_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub id: BlockId,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub id: BlockId,
    pub spans: Vec<Span>,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThematicBreak {
    pub id: BlockId,
    pub range: ByteRange,
}

/// An inline unit inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Text(TextContent),
    Emphasis(Vec<Span>),
    Strong(Vec<Span>),
    Strikethrough(Vec<Span>),
    /// Reserved for tokenizers with an underline extension; the bundled
    /// tokenizer never produces it.
    Underline(Vec<Span>),
    /// Raw code-span text, joined from fragments if split.
    Code(TextContent),
    Link(Link),
    Image(Image),
    LineBreak,
    SoftBreak,
    /// Raw inline HTML.
    Html(TextContent),
    WikiLink(WikiLink),
    LatexInline(TextContent),
    LatexDisplay(TextContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub children: Vec<Span>,
    pub destination: Option<TextContent>,
    pub title: Option<TextContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub alt: Vec<Span>,
    pub source: Option<TextContent>,
    pub title: Option<TextContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikiLink {
    pub target: TextContent,
    pub children: Vec<Span>,
}

impl Block {
    pub fn id(&self) -> BlockId {
        match self {
            Block::Paragraph(b) => b.id,
            Block::Heading(b) => b.id,
            Block::Code(b) => b.id,
            Block::Html(b) => b.id,
            Block::Quote(b) => b.id,
            Block::List(b) => b.id,
            Block::Table(b) => b.id,
            Block::Rule(b) => b.id,
        }
    }

    /// Flatten to literal text. Soft and hard breaks become newlines;
    /// entity references inside raw HTML payloads are decoded.
    pub fn plain_text(&self, source: &str, out: &mut String) {
        match self {
            Block::Paragraph(b) => spans_plain_text(&b.spans, source, out),
            Block::Heading(b) => spans_plain_text(&b.spans, source, out),
            Block::Code(b) => out.push_str(&b.content.resolve(source)),
            Block::Html(b) => {
                out.push_str(&entity::decode_references(&b.content.resolve(source)))
            }
            Block::Quote(b) => blocks_plain_text(&b.children, source, out),
            Block::List(b) => {
                for item in &b.items {
                    blocks_plain_text(&item.children, source, out);
                }
            }
            Block::Table(b) => {
                for row in b.header_rows.iter().chain(&b.body_rows) {
                    for cell in &row.cells {
                        spans_plain_text(&cell.spans, source, out);
                        out.push(' ');
                    }
                    push_newline(out);
                }
            }
            Block::Rule(_) => {}
        }
    }

    pub(crate) fn shift(&mut self, delta: usize) {
        match self {
            Block::Paragraph(b) => {
                b.id.shift(delta);
                b.range = b.range.shifted(delta);
                shift_spans(&mut b.spans, delta);
            }
            Block::Heading(b) => {
                b.id.shift(delta);
                b.range = b.range.shifted(delta);
                shift_spans(&mut b.spans, delta);
            }
            Block::Code(b) => {
                b.id.shift(delta);
                if let Some(info) = &mut b.info {
                    info.shift(delta);
                }
                if let Some(lang) = &mut b.language {
                    lang.shift(delta);
                }
                b.content.shift(delta);
            }
            Block::Html(b) => {
                b.id.shift(delta);
                b.content.shift(delta);
            }
            Block::Quote(b) => {
                b.id.shift(delta);
                for child in &mut b.children {
                    child.shift(delta);
                }
            }
            Block::List(b) => {
                b.id.shift(delta);
                for item in &mut b.items {
                    item.id.shift(delta);
                    for child in &mut item.children {
                        child.shift(delta);
                    }
                }
            }
            Block::Table(b) => {
                b.id.shift(delta);
                for row in b.header_rows.iter_mut().chain(&mut b.body_rows) {
                    row.id.shift(delta);
                    for cell in &mut row.cells {
                        cell.id.shift(delta);
                        shift_spans(&mut cell.spans, delta);
                    }
                }
            }
            Block::Rule(b) => {
                b.id.shift(delta);
                b.range = b.range.shifted(delta);
            }
        }
    }
}

impl Span {
    pub fn plain_text(&self, source: &str, out: &mut String) {
        match self {
            Span::Text(c) | Span::Code(c) | Span::LatexInline(c) | Span::LatexDisplay(c) => {
                out.push_str(&c.resolve(source))
            }
            Span::Html(c) => out.push_str(&entity::decode_references(&c.resolve(source))),
            Span::Emphasis(children)
            | Span::Strong(children)
            | Span::Strikethrough(children)
            | Span::Underline(children) => spans_plain_text(children, source, out),
            Span::Link(l) => spans_plain_text(&l.children, source, out),
            Span::WikiLink(w) => {
                if w.children.is_empty() {
                    out.push_str(&w.target.resolve(source));
                } else {
                    spans_plain_text(&w.children, source, out);
                }
            }
            Span::Image(i) => spans_plain_text(&i.alt, source, out),
            Span::LineBreak | Span::SoftBreak => out.push('\n'),
        }
    }

    pub(crate) fn shift(&mut self, delta: usize) {
        match self {
            Span::Text(c)
            | Span::Code(c)
            | Span::Html(c)
            | Span::LatexInline(c)
            | Span::LatexDisplay(c) => c.shift(delta),
            Span::Emphasis(children)
            | Span::Strong(children)
            | Span::Strikethrough(children)
            | Span::Underline(children) => shift_spans(children, delta),
            Span::Link(l) => {
                shift_spans(&mut l.children, delta);
                if let Some(d) = &mut l.destination {
                    d.shift(delta);
                }
                if let Some(t) = &mut l.title {
                    t.shift(delta);
                }
            }
            Span::Image(i) => {
                shift_spans(&mut i.alt, delta);
                if let Some(s) = &mut i.source {
                    s.shift(delta);
                }
                if let Some(t) = &mut i.title {
                    t.shift(delta);
                }
            }
            Span::WikiLink(w) => {
                w.target.shift(delta);
                shift_spans(&mut w.children, delta);
            }
            Span::LineBreak | Span::SoftBreak => {}
        }
    }

    /// Merge `(min_start, max_end)` over every byte range reachable from
    /// this span, attributes included.
    pub(crate) fn bounds(&self, acc: &mut Option<(usize, usize)>) {
        match self {
            Span::Text(c)
            | Span::Code(c)
            | Span::Html(c)
            | Span::LatexInline(c)
            | Span::LatexDisplay(c) => merge_bounds(acc, c.bounds()),
            Span::Emphasis(children)
            | Span::Strong(children)
            | Span::Strikethrough(children)
            | Span::Underline(children) => {
                for s in children {
                    s.bounds(acc);
                }
            }
            Span::Link(l) => {
                for s in &l.children {
                    s.bounds(acc);
                }
                merge_bounds(acc, l.destination.as_ref().and_then(TextContent::bounds));
                merge_bounds(acc, l.title.as_ref().and_then(TextContent::bounds));
            }
            Span::Image(i) => {
                for s in &i.alt {
                    s.bounds(acc);
                }
                merge_bounds(acc, i.source.as_ref().and_then(TextContent::bounds));
                merge_bounds(acc, i.title.as_ref().and_then(TextContent::bounds));
            }
            Span::WikiLink(w) => {
                merge_bounds(acc, w.target.bounds());
                for s in &w.children {
                    s.bounds(acc);
                }
            }
            Span::LineBreak | Span::SoftBreak => {}
        }
    }
}

pub(crate) fn merge_bounds(acc: &mut Option<(usize, usize)>, other: Option<(usize, usize)>) {
    if let Some((lo, hi)) = other {
        *acc = Some(match *acc {
            None => (lo, hi),
            Some((alo, ahi)) => (lo.min(alo), hi.max(ahi)),
        });
    }
}

fn shift_spans(spans: &mut [Span], delta: usize) {
    for s in spans {
        s.shift(delta);
    }
}

fn spans_plain_text(spans: &[Span], source: &str, out: &mut String) {
    for s in spans {
        s.plain_text(source, out);
    }
}

fn blocks_plain_text(blocks: &[Block], source: &str, out: &mut String) {
    for b in blocks {
        b.plain_text(source, out);
        push_newline(out);
    }
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// A parsed document: the owned source buffer plus its block tree.
///
/// Immutable after construction, cheap to clone, safe to send across
/// threads. Every range inside `blocks` indexes into `source`.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    source: Arc<str>,
    blocks: Vec<Block>,
}

impl Document {
    pub(crate) fn new(id: DocumentId, source: Arc<str>, blocks: Vec<Block>) -> Self {
        Self { id, source, blocks }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for b in &self.blocks {
            b.plain_text(&self.source, &mut out);
            push_newline(&mut out);
        }
        out
    }
}

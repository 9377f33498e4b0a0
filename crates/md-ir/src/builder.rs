//! Tokenizer-event adapter: builds the block/span IR on a stack.
//!
//! Drives the pulldown-cmark offset iterator and folds its enter/leave/text
//! events into [`Block`] trees. Two stacks are maintained: transient block
//! frames and an inline-container stack with a root sentinel that is open
//! whenever a paragraph, heading or table cell is collecting spans.
//!
//! The adapter tolerates unbalanced leave events (no-op) and drops text
//! events whose offsets fall outside the source buffer; it must never panic
//! on tokenizer output.

use pulldown_cmark::{
    Alignment as TokAlignment, CodeBlockKind, CowStr, Event, LinkType, Parser, Tag, TagEnd,
};
use tracing::{trace, warn};

use crate::autolink;
use crate::element::{
    kind, merge_bounds, Alignment, Block, BlockId, BlockQuote, CodeBlock, Heading, HtmlBlock,
    Image, Link, List, ListItem, Paragraph, Span, Table, TableCell, TableRow, ThematicBreak,
    WikiLink,
};
use crate::options::ParseOptions;
use crate::range::{ByteRange, ByteRangeSeq, TextContent};

/// Parse `source` into top-level blocks, assigning ordinals starting at
/// `first_ordinal`. Returns the blocks and the next unused ordinal.
pub(crate) fn build(
    source: &str,
    options: ParseOptions,
    first_ordinal: u32,
) -> (Vec<Block>, u32) {
    let mut builder = TreeBuilder::new(source, options, first_ordinal);
    let tokenizer = Parser::new_ext(source, options.tokenizer_options());
    for (event, range) in tokenizer.into_offset_iter() {
        builder.handle(event, ByteRange::new(range.start, range.end));
    }
    builder.finish()
}

/// Transient state for one block under construction.
enum Frame {
    Quote {
        children: Vec<Block>,
    },
    List {
        ordered: bool,
        start: u32,
        delimiter: Option<char>,
        tight: bool,
        items: Vec<ListItem>,
    },
    Item {
        children: Vec<Block>,
        is_task: bool,
        is_checked: bool,
    },
    Paragraph,
    Heading {
        level: u8,
    },
    Code {
        info: Option<TextContent>,
        language: Option<TextContent>,
        fence_char: Option<char>,
        fragments: ByteRangeSeq,
        owned: Option<String>,
    },
    HtmlBlock {
        fragments: ByteRangeSeq,
        owned: Option<String>,
        as_text: bool,
    },
    Table {
        alignments: Vec<Alignment>,
        header_rows: Vec<TableRow>,
        body_rows: Vec<TableRow>,
    },
    Row {
        cells: Vec<TableCell>,
    },
    Cell {
        alignment: Alignment,
    },
    /// Container the IR has no counterpart for; children splice upward.
    Passthrough {
        children: Vec<Block>,
    },
}

/// One open inline container.
struct InlineFrame {
    kind: InlineKind,
    children: Vec<Span>,
}

enum InlineKind {
    Root,
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        destination: Option<TextContent>,
        title: Option<TextContent>,
        wiki: bool,
    },
    Image {
        source: Option<TextContent>,
        title: Option<TextContent>,
    },
    /// Unsupported container; children splice into the parent.
    Transparent,
}

struct TreeBuilder<'a> {
    source: &'a str,
    options: ParseOptions,
    document: Vec<Block>,
    frames: Vec<Frame>,
    inline: Vec<InlineFrame>,
    next_ordinal: u32,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, options: ParseOptions, first_ordinal: u32) -> Self {
        Self {
            source,
            options,
            document: Vec::new(),
            frames: Vec::new(),
            inline: Vec::new(),
            next_ordinal: first_ordinal,
        }
    }

    fn finish(mut self) -> (Vec<Block>, u32) {
        if !self.frames.is_empty() || !self.inline.is_empty() {
            trace!(
                frames = self.frames.len(),
                inline = self.inline.len(),
                "unbalanced frames at end of event stream"
            );
        }
        (self.document, self.next_ordinal)
    }

    fn handle(&mut self, event: Event<'_>, range: ByteRange) {
        match event {
            Event::Start(tag) => self.start_tag(tag, range),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(cow) => self.on_text(cow, range),
            Event::Code(cow) => self.on_code_span(&cow, range),
            Event::InlineMath(cow) => self.on_math(&cow, range, false),
            Event::DisplayMath(cow) => self.on_math(&cow, range, true),
            Event::Html(cow) => self.on_html(cow, range),
            Event::InlineHtml(cow) => self.on_html(cow, range),
            Event::FootnoteReference(cow) => {
                // Footnotes are not enabled; keep the reference readable.
                self.push_text(TextContent::owned(format!("[^{cow}]")));
            }
            Event::SoftBreak => {
                if self.options.contains(ParseOptions::HARD_SOFT_BREAKS) {
                    self.push_span(Span::LineBreak);
                } else {
                    self.push_span(Span::SoftBreak);
                }
            }
            Event::HardBreak => self.push_span(Span::LineBreak),
            Event::Rule => {
                self.flush_item_inline();
                let range = range.clamped(self.source.len());
                let id = self.make_id(kind::THEMATIC_BREAK, Some((range.start, range.end)));
                self.push_block(Block::Rule(ThematicBreak { id, range }));
            }
            Event::TaskListMarker(checked) => self.on_task_marker(checked),
        }
    }

    // ---- enter events ----

    fn start_tag(&mut self, tag: Tag<'_>, range: ByteRange) {
        match tag {
            Tag::Paragraph => {
                self.flush_item_inline();
                self.mark_parent_list_loose();
                self.frames.push(Frame::Paragraph);
                self.open_inline();
            }
            Tag::Heading { level, .. } => {
                self.flush_item_inline();
                self.frames.push(Frame::Heading { level: level as u8 });
                self.open_inline();
            }
            Tag::BlockQuote(_) => {
                self.flush_item_inline();
                self.frames.push(Frame::Quote {
                    children: Vec::new(),
                });
            }
            Tag::CodeBlock(code_kind) => {
                self.flush_item_inline();
                let (info, language, fence_char) = match code_kind {
                    CodeBlockKind::Indented => (None, None, None),
                    CodeBlockKind::Fenced(info_cow) => {
                        let fence_char = self.detect_fence_char(range);
                        let info_str: &str = &info_cow;
                        let language = info_str
                            .split_whitespace()
                            .next()
                            .map(|lang| self.derived_content(lang));
                        let info = (!info_str.is_empty())
                            .then(|| self.derived_content(info_str.trim()));
                        (info, language, fence_char)
                    }
                };
                self.frames.push(Frame::Code {
                    info,
                    language,
                    fence_char,
                    fragments: ByteRangeSeq::new(),
                    owned: None,
                });
            }
            Tag::HtmlBlock => {
                self.flush_item_inline();
                self.frames.push(Frame::HtmlBlock {
                    fragments: ByteRangeSeq::new(),
                    owned: None,
                    as_text: self.options.contains(ParseOptions::NO_HTML_BLOCKS),
                });
            }
            Tag::List(start) => {
                self.flush_item_inline();
                self.frames.push(Frame::List {
                    ordered: start.is_some(),
                    start: start
                        .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
                        .unwrap_or(1),
                    delimiter: None,
                    tight: true,
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                if let Some(Frame::List {
                    ordered: true,
                    delimiter: delimiter @ None,
                    ..
                }) = self.frames.last_mut()
                {
                    *delimiter = detect_delimiter(self.source, range);
                }
                self.frames.push(Frame::Item {
                    children: Vec::new(),
                    is_task: false,
                    is_checked: false,
                });
            }
            Tag::Table(alignments) => {
                self.flush_item_inline();
                self.frames.push(Frame::Table {
                    alignments: alignments.into_iter().map(convert_alignment).collect(),
                    header_rows: Vec::new(),
                    body_rows: Vec::new(),
                });
            }
            // Header cells arrive without a row wrapper; synthesize one.
            Tag::TableHead | Tag::TableRow => self.frames.push(Frame::Row { cells: Vec::new() }),
            Tag::TableCell => {
                let alignment = self.cell_alignment();
                self.frames.push(Frame::Cell { alignment });
                self.open_inline();
            }
            Tag::Emphasis => self.open_container(InlineKind::Emphasis),
            Tag::Strong => self.open_container(InlineKind::Strong),
            Tag::Strikethrough => self.open_container(InlineKind::Strikethrough),
            Tag::Superscript | Tag::Subscript => self.open_container(InlineKind::Transparent),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let wiki = matches!(link_type, LinkType::WikiLink { .. });
                self.open_container(InlineKind::Link {
                    destination: self.attribute_content(&dest_url),
                    title: self.attribute_content(&title),
                    wiki,
                });
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.open_container(InlineKind::Image {
                    source: self.attribute_content(&dest_url),
                    title: self.attribute_content(&title),
                });
            }
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => {
                self.frames.push(Frame::Passthrough {
                    children: Vec::new(),
                });
            }
        }
    }

    // ---- leave events ----

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                let spans = self.drain_inline();
                if self.pop_expect(|f| matches!(f, Frame::Paragraph)).is_none() {
                    return;
                }
                let block = self.make_paragraph(spans);
                self.push_block(block);
            }
            TagEnd::Heading(_) => {
                let spans = self.drain_inline();
                let Some(Frame::Heading { level }) =
                    self.pop_expect(|f| matches!(f, Frame::Heading { .. }))
                else {
                    return;
                };
                let bounds = spans_bounds(&spans);
                let id = self.make_id(kind::HEADING, bounds);
                let range = bounds_range(bounds);
                self.push_block(Block::Heading(Heading {
                    id,
                    level,
                    spans,
                    range,
                }));
            }
            TagEnd::CodeBlock => {
                let Some(Frame::Code {
                    info,
                    language,
                    fence_char,
                    fragments,
                    owned,
                }) = self.pop_expect(|f| matches!(f, Frame::Code { .. }))
                else {
                    return;
                };
                let content = match owned {
                    Some(text) => TextContent::owned(text),
                    None => TextContent::Seq(fragments),
                };
                let mut bounds = content.bounds();
                merge_bounds(&mut bounds, info.as_ref().and_then(TextContent::bounds));
                let id = self.make_id(kind::CODE_BLOCK, bounds);
                self.push_block(Block::Code(CodeBlock {
                    id,
                    info,
                    language,
                    content,
                    fence_char,
                }));
            }
            TagEnd::HtmlBlock => {
                let Some(Frame::HtmlBlock {
                    fragments,
                    owned,
                    as_text,
                }) = self.pop_expect(|f| matches!(f, Frame::HtmlBlock { .. }))
                else {
                    return;
                };
                let content = match owned {
                    Some(text) => TextContent::owned(text),
                    None => TextContent::Seq(fragments),
                };
                if as_text {
                    // HTML blocks disabled: deliver the markup as literal text.
                    let block = self.make_paragraph(vec![Span::Text(content)]);
                    self.push_block(block);
                } else {
                    let id = self.make_id(kind::HTML_BLOCK, content.bounds());
                    self.push_block(Block::Html(HtmlBlock { id, content }));
                }
            }
            TagEnd::BlockQuote(_) => {
                let Some(Frame::Quote { children }) =
                    self.pop_expect(|f| matches!(f, Frame::Quote { .. }))
                else {
                    return;
                };
                let id = self.make_id(kind::BLOCK_QUOTE, blocks_bounds(&children));
                self.push_block(Block::Quote(BlockQuote { id, children }));
            }
            TagEnd::List(_) => {
                let Some(Frame::List {
                    ordered,
                    start,
                    delimiter,
                    tight,
                    items,
                }) = self.pop_expect(|f| matches!(f, Frame::List { .. }))
                else {
                    return;
                };
                let bounds = ids_bounds(items.iter().map(|i| i.id));
                let id = self.make_id(kind::LIST, bounds);
                self.push_block(Block::List(List {
                    id,
                    ordered,
                    start,
                    delimiter,
                    tight,
                    items,
                }));
            }
            TagEnd::Item => {
                self.flush_item_inline();
                let Some(Frame::Item {
                    children,
                    is_task,
                    is_checked,
                }) = self.pop_expect(|f| matches!(f, Frame::Item { .. }))
                else {
                    return;
                };
                let id = self.make_id(kind::LIST_ITEM, blocks_bounds(&children));
                let item = ListItem {
                    id,
                    children,
                    is_task,
                    is_checked,
                };
                if let Some(Frame::List { items, .. }) = self.frames.last_mut() {
                    items.push(item);
                } else {
                    trace!("list item closed outside a list; dropped");
                }
            }
            TagEnd::Table => {
                let Some(Frame::Table {
                    alignments,
                    header_rows,
                    body_rows,
                }) = self.pop_expect(|f| matches!(f, Frame::Table { .. }))
                else {
                    return;
                };
                let bounds = ids_bounds(
                    header_rows
                        .iter()
                        .chain(&body_rows)
                        .map(|r| r.id),
                );
                let id = self.make_id(kind::TABLE, bounds);
                self.push_block(Block::Table(Table {
                    id,
                    alignments,
                    header_rows,
                    body_rows,
                }));
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let Some(Frame::Row { cells }) =
                    self.pop_expect(|f| matches!(f, Frame::Row { .. }))
                else {
                    return;
                };
                let id = self.make_id(kind::TABLE_ROW, ids_bounds(cells.iter().map(|c| c.id)));
                let row = TableRow { id, cells };
                let into_head = matches!(tag, TagEnd::TableHead);
                if let Some(Frame::Table {
                    header_rows,
                    body_rows,
                    ..
                }) = self.frames.last_mut()
                {
                    if into_head {
                        header_rows.push(row);
                    } else {
                        body_rows.push(row);
                    }
                } else {
                    trace!("table row closed outside a table; dropped");
                }
            }
            TagEnd::TableCell => {
                let spans = self.drain_inline();
                let Some(Frame::Cell { alignment }) =
                    self.pop_expect(|f| matches!(f, Frame::Cell { .. }))
                else {
                    return;
                };
                let id = self.make_id(kind::TABLE_CELL, spans_bounds(&spans));
                let cell = TableCell {
                    id,
                    spans,
                    alignment,
                };
                if let Some(Frame::Row { cells }) = self.frames.last_mut() {
                    cells.push(cell);
                } else {
                    trace!("table cell closed outside a row; dropped");
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link
            | TagEnd::Image => self.close_container(),
            TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::MetadataBlock(_) => {
                let Some(Frame::Passthrough { children }) =
                    self.pop_expect(|f| matches!(f, Frame::Passthrough { .. }))
                else {
                    return;
                };
                for child in children {
                    self.push_block(child);
                }
            }
        }
    }

    // ---- text events ----

    fn on_text(&mut self, cow: CowStr<'_>, range: ByteRange) {
        if !self.valid_range(range) {
            warn!(
                start = range.start,
                end = range.end,
                len = self.source.len(),
                "dropping text event outside the source buffer"
            );
            return;
        }
        if matches!(
            self.frames.last(),
            Some(Frame::Code { .. } | Frame::HtmlBlock { .. })
        ) {
            self.append_fragment(&cow, range);
        } else {
            let content = self.event_content(&cow, range);
            self.push_text(content);
        }
    }

    /// Append raw text to the leaf block on top of the stack. Falls back to
    /// owned accumulation if the tokenizer ever hands out synthesized text.
    fn append_fragment(&mut self, cow: &CowStr<'_>, range: ByteRange) {
        let fragment = match cow {
            CowStr::Borrowed(s) => ByteRange::locate(self.source, s).or(Some(range)),
            _ => None,
        };
        let fragment = fragment.filter(|r| self.valid_range(*r));
        let source = self.source;
        let (fragments, owned) = match self.frames.last_mut() {
            Some(Frame::Code {
                fragments, owned, ..
            })
            | Some(Frame::HtmlBlock {
                fragments, owned, ..
            }) => (fragments, owned),
            _ => return,
        };
        match (fragment, owned.as_mut()) {
            (Some(r), None) => fragments.push(r),
            (Some(r), Some(acc)) => acc.push_str(&r.resolve(source)),
            (None, Some(acc)) => acc.push_str(cow),
            (None, None) => {
                let mut acc = fragments.resolve(source).into_owned();
                acc.push_str(cow);
                *owned = Some(acc);
            }
        }
    }

    fn on_code_span(&mut self, cow: &CowStr<'_>, _range: ByteRange) {
        // The event range covers the backtick delimiters; only pointer
        // location recovers the inner content range.
        let content = self.derived_content(cow);
        self.push_span(Span::Code(content));
    }

    fn on_math(&mut self, cow: &CowStr<'_>, _range: ByteRange, display: bool) {
        let content = self.derived_content(cow);
        self.push_span(if display {
            Span::LatexDisplay(content)
        } else {
            Span::LatexInline(content)
        });
    }

    fn on_html(&mut self, cow: CowStr<'_>, range: ByteRange) {
        if matches!(self.frames.last(), Some(Frame::HtmlBlock { .. })) {
            if self.valid_range(range) {
                self.append_fragment(&cow, range);
            }
            return;
        }
        let content = self.event_content(&cow, range);
        if self.options.contains(ParseOptions::NO_HTML_SPANS) {
            self.push_text(content);
        } else {
            self.push_span(Span::Html(content));
        }
    }

    fn on_task_marker(&mut self, checked: bool) {
        for frame in self.frames.iter_mut().rev() {
            if let Frame::Item {
                is_task,
                is_checked,
                ..
            } = frame
            {
                *is_task = true;
                *is_checked = checked;
                return;
            }
        }
        trace!("task marker outside a list item; ignored");
    }

    // ---- inline plumbing ----

    fn open_inline(&mut self) {
        if !self.inline.is_empty() {
            trace!("inline collection already open; reusing");
            return;
        }
        self.inline.push(InlineFrame {
            kind: InlineKind::Root,
            children: Vec::new(),
        });
    }

    /// Make sure an inline collection is live. Tight list items get an
    /// implicit one; anywhere else a stray inline event is dropped.
    fn ensure_inline(&mut self) -> bool {
        if !self.inline.is_empty() {
            return true;
        }
        if matches!(self.frames.last(), Some(Frame::Item { .. })) {
            self.open_inline();
            return true;
        }
        false
    }

    fn open_container(&mut self, kind: InlineKind) {
        if !self.ensure_inline() {
            trace!("inline container outside inline context; dropped");
            return;
        }
        self.inline.push(InlineFrame {
            kind,
            children: Vec::new(),
        });
    }

    fn close_container(&mut self) {
        if self.inline.len() < 2 {
            trace!("inline leave without matching enter; ignored");
            return;
        }
        let frame = self.inline.pop().expect("checked non-empty");
        let spans = seal(frame);
        self.inline
            .last_mut()
            .expect("root sentinel present")
            .children
            .extend(spans);
    }

    fn drain_inline(&mut self) -> Vec<Span> {
        while self.inline.len() > 1 {
            let frame = self.inline.pop().expect("checked length");
            let spans = seal(frame);
            self.inline
                .last_mut()
                .expect("checked length")
                .children
                .extend(spans);
        }
        self.inline.pop().map(|f| f.children).unwrap_or_default()
    }

    fn in_link(&self) -> bool {
        self.inline
            .iter()
            .any(|f| matches!(f.kind, InlineKind::Link { .. } | InlineKind::Image { .. }))
    }

    fn push_text(&mut self, content: TextContent) {
        if !self.ensure_inline() {
            trace!("dropping text outside inline context");
            return;
        }
        if self.options.autolinks() && !self.in_link() {
            let spans = autolink::split_spans(self.source, content, self.options);
            self.inline
                .last_mut()
                .expect("inline ensured")
                .children
                .extend(spans);
        } else {
            self.inline
                .last_mut()
                .expect("inline ensured")
                .children
                .push(Span::Text(content));
        }
    }

    fn push_span(&mut self, span: Span) {
        if !self.ensure_inline() {
            trace!("dropping span outside inline context");
            return;
        }
        self.inline
            .last_mut()
            .expect("inline ensured")
            .children
            .push(span);
    }

    // ---- block plumbing ----

    fn push_block(&mut self, block: Block) {
        for frame in self.frames.iter_mut().rev() {
            match frame {
                Frame::Quote { children }
                | Frame::Item { children, .. }
                | Frame::Passthrough { children } => {
                    children.push(block);
                    return;
                }
                _ => {}
            }
        }
        self.document.push(block);
    }

    fn pop_expect(&mut self, pred: impl FnOnce(&Frame) -> bool) -> Option<Frame> {
        match self.frames.last() {
            Some(f) if pred(f) => self.frames.pop(),
            _ => {
                trace!("unbalanced leave event; ignored");
                None
            }
        }
    }

    /// Wrap spans collected directly inside a tight list item into a
    /// synthesized paragraph. Without this, tight items render empty.
    fn flush_item_inline(&mut self) {
        if self.inline.is_empty() || !matches!(self.frames.last(), Some(Frame::Item { .. })) {
            return;
        }
        let spans = self.drain_inline();
        if spans.is_empty() {
            return;
        }
        let block = self.make_paragraph(spans);
        if let Some(Frame::Item { children, .. }) = self.frames.last_mut() {
            children.push(block);
        }
    }

    /// An explicit paragraph inside an item means the enclosing list is
    /// loose.
    fn mark_parent_list_loose(&mut self) {
        let n = self.frames.len();
        if n >= 2
            && matches!(self.frames[n - 1], Frame::Item { .. })
        {
            if let Frame::List { tight, .. } = &mut self.frames[n - 2] {
                *tight = false;
            }
        }
    }

    fn make_paragraph(&mut self, spans: Vec<Span>) -> Block {
        let bounds = spans_bounds(&spans);
        let id = self.make_id(kind::PARAGRAPH, bounds);
        Block::Paragraph(Paragraph {
            id,
            spans,
            range: bounds_range(bounds),
        })
    }

    fn make_id(&mut self, kind: u8, bounds: Option<(usize, usize)>) -> BlockId {
        let (start, end) = bounds.unwrap_or((0, 0));
        let id = BlockId {
            kind,
            start: clamp_u32(start),
            end: clamp_u32(end),
            ordinal: self.next_ordinal,
        };
        self.next_ordinal = self.next_ordinal.saturating_add(1);
        id
    }

    // ---- content helpers ----

    fn valid_range(&self, r: ByteRange) -> bool {
        r.start <= r.end && r.end <= self.source.len()
    }

    /// Payload of a text-like event. Borrowed payloads keep their source
    /// offsets; synthesized ones (decoded entities, smart constructs) are
    /// stored owned.
    fn event_content(&self, cow: &CowStr<'_>, range: ByteRange) -> TextContent {
        if let CowStr::Borrowed(s) = cow {
            if let Some(r) = ByteRange::locate(self.source, s) {
                return TextContent::Bytes(r);
            }
            if range.len() == s.len() && self.source.get(range.start..range.end) == Some(*s) {
                return TextContent::Bytes(range);
            }
        }
        TextContent::owned(&**cow)
    }

    /// Map a string the tokenizer derived from the input back to a source
    /// range by pointer subtraction, or fall back to an owned copy when the
    /// string was synthesized. Bounds are validated by construction.
    fn derived_content(&self, piece: &str) -> TextContent {
        match ByteRange::locate(self.source, piece) {
            Some(r) => TextContent::Bytes(r),
            None => TextContent::owned(piece),
        }
    }

    fn attribute_content(&self, cow: &CowStr<'_>) -> Option<TextContent> {
        if cow.is_empty() {
            return None;
        }
        Some(self.derived_content(cow))
    }

    fn detect_fence_char(&self, range: ByteRange) -> Option<char> {
        let bytes = self.source.as_bytes();
        let end = range.end.min(bytes.len());
        for &b in bytes.get(range.start.min(end)..end)? {
            match b {
                b'`' => return Some('`'),
                b'~' => return Some('~'),
                b'\n' => return None,
                _ => {}
            }
        }
        None
    }

    fn cell_alignment(&self) -> Alignment {
        let mut column = None;
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Row { cells } if column.is_none() => column = Some(cells.len()),
                Frame::Table { alignments, .. } => {
                    return column
                        .and_then(|c| alignments.get(c))
                        .copied()
                        .unwrap_or_default();
                }
                _ => {}
            }
        }
        Alignment::None
    }
}

fn seal(frame: InlineFrame) -> Vec<Span> {
    match frame.kind {
        InlineKind::Root | InlineKind::Transparent => frame.children,
        InlineKind::Emphasis => vec![Span::Emphasis(frame.children)],
        InlineKind::Strong => vec![Span::Strong(frame.children)],
        InlineKind::Strikethrough => vec![Span::Strikethrough(frame.children)],
        InlineKind::Link {
            destination,
            title,
            wiki: false,
        } => vec![Span::Link(Link {
            children: frame.children,
            destination,
            title,
        })],
        InlineKind::Link {
            destination,
            wiki: true,
            ..
        } => vec![Span::WikiLink(WikiLink {
            target: destination.unwrap_or_else(TextContent::empty),
            children: frame.children,
        })],
        InlineKind::Image { source, title } => vec![Span::Image(Image {
            alt: frame.children,
            source,
            title,
        })],
    }
}

fn detect_delimiter(source: &str, range: ByteRange) -> Option<char> {
    let bytes = source.as_bytes();
    let mut i = range.start.min(bytes.len());
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    match bytes.get(i) {
        Some(b'.') => Some('.'),
        Some(b')') => Some(')'),
        _ => None,
    }
}

fn convert_alignment(a: TokAlignment) -> Alignment {
    match a {
        TokAlignment::None => Alignment::None,
        TokAlignment::Left => Alignment::Left,
        TokAlignment::Center => Alignment::Center,
        TokAlignment::Right => Alignment::Right,
    }
}

fn spans_bounds(spans: &[Span]) -> Option<(usize, usize)> {
    let mut acc = None;
    for s in spans {
        s.bounds(&mut acc);
    }
    acc
}

fn blocks_bounds(blocks: &[Block]) -> Option<(usize, usize)> {
    ids_bounds(blocks.iter().map(|b| b.id()))
}

fn ids_bounds(ids: impl Iterator<Item = BlockId>) -> Option<(usize, usize)> {
    let mut acc = None;
    for id in ids {
        if id.start != id.end {
            merge_bounds(&mut acc, Some((id.start as usize, id.end as usize)));
        }
    }
    acc
}

fn bounds_range(bounds: Option<(usize, usize)>) -> ByteRange {
    bounds
        .map(|(s, e)| ByteRange::new(s, e))
        .unwrap_or_default()
}

fn clamp_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

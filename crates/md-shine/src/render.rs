//! Style-aware document rendering with a bounded result cache.
//!
//! Composes a [`StyledText`] from a document's IR. Results are cached per
//! (document identity, style value); any style field change lands in a
//! fresh entry, and per-document invalidation drops stale renders when a
//! stream replaces its content.

use std::sync::Arc;

use md_ir::{Block, Document, DocumentId, Span};

use crate::lru::LruCache;
use crate::styled::{FontFamily, RenderStyle, StyledRun, StyledText};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderKey {
    doc: DocumentId,
    style: RenderStyle,
}

pub struct CachedRenderer {
    cache: LruCache<RenderKey, Arc<StyledText>>,
}

impl CachedRenderer {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    pub fn render(&mut self, doc: &Document, style: &RenderStyle) -> Arc<StyledText> {
        let key = RenderKey {
            doc: doc.id(),
            style: style.clone(),
        };
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let styled = Arc::new(compose(doc, style));
        self.cache.put(key, styled.clone());
        styled
    }

    /// Drop every cached render of `doc`, across all styles.
    pub fn invalidate(&mut self, doc: DocumentId) {
        let stale: Vec<RenderKey> = self
            .cache
            .keys()
            .filter(|key| key.doc == doc)
            .cloned()
            .collect();
        for key in stale {
            self.cache.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for CachedRenderer {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Inline style state threaded through span composition.
#[derive(Clone, Copy)]
struct RunState {
    size: f32,
    bold: bool,
    italics: bool,
    strikethrough: bool,
    underline: bool,
}

fn compose(doc: &Document, style: &RenderStyle) -> StyledText {
    let mut out = StyledText::default();
    for block in doc.blocks() {
        compose_block(block, doc.source(), style, 0, &mut out);
    }
    out
}

fn compose_block(
    block: &Block,
    source: &str,
    style: &RenderStyle,
    depth: usize,
    out: &mut StyledText,
) {
    match block {
        Block::Paragraph(p) => {
            let state = RunState::body(style);
            compose_spans(&p.spans, source, style, state, out);
            out.push(StyledRun::plain("\n", style.body_size));
        }
        Block::Heading(h) => {
            let index = usize::from(h.level.clamp(1, 6)) - 1;
            let state = RunState {
                size: style.heading_sizes[index],
                bold: true,
                ..RunState::body(style)
            };
            compose_spans(&h.spans, source, style, state, out);
            out.push(StyledRun::plain("\n", style.body_size));
        }
        Block::Code(c) => {
            if let Some(lang) = &c.language {
                out.push(StyledRun {
                    color: Some(style.quote_color),
                    font: FontFamily::Monospace,
                    ..StyledRun::plain(format!("{}\n", lang.resolve(source)), style.mono_size)
                });
            }
            let mut body = c.content.resolve(source).into_owned();
            if !body.ends_with('\n') {
                body.push('\n');
            }
            out.push(StyledRun {
                color: Some(style.code_color),
                background: Some(style.code_background),
                font: FontFamily::Monospace,
                ..StyledRun::plain(body, style.mono_size)
            });
        }
        Block::Html(h) => {
            out.push(StyledRun {
                color: Some(style.quote_color),
                font: FontFamily::Monospace,
                ..StyledRun::plain(h.content.resolve(source).into_owned(), style.mono_size)
            });
            out.push(StyledRun::plain("\n", style.body_size));
        }
        Block::Quote(q) => {
            for child in &q.children {
                out.push(StyledRun {
                    color: Some(style.quote_color),
                    ..StyledRun::plain("> ", style.body_size)
                });
                compose_block(child, source, style, depth, out);
            }
        }
        Block::List(l) => {
            for (index, item) in l.items.iter().enumerate() {
                let marker = if item.is_task {
                    if item.is_checked {
                        "[x] ".to_string()
                    } else {
                        "[ ] ".to_string()
                    }
                } else if l.ordered {
                    let delim = l.delimiter.unwrap_or('.');
                    format!("{}{} ", l.start.saturating_add(index as u32), delim)
                } else {
                    "\u{2022} ".to_string()
                };
                out.push(StyledRun::plain(
                    format!("{}{}", "  ".repeat(depth), marker),
                    style.body_size,
                ));
                for child in &item.children {
                    compose_block(child, source, style, depth + 1, out);
                }
            }
        }
        Block::Table(t) => {
            for (rows, bold) in [(&t.header_rows, true), (&t.body_rows, false)] {
                for row in rows.iter() {
                    for (index, cell) in row.cells.iter().enumerate() {
                        if index > 0 {
                            out.push(StyledRun::plain(" | ", style.body_size));
                        }
                        let state = RunState {
                            bold,
                            ..RunState::body(style)
                        };
                        compose_spans(&cell.spans, source, style, state, out);
                    }
                    out.push(StyledRun::plain("\n", style.body_size));
                }
            }
        }
        Block::Rule(_) => {
            out.push(StyledRun {
                color: Some(style.quote_color),
                ..StyledRun::plain("\u{2500}\u{2500}\u{2500}\n", style.body_size)
            });
        }
    }
}

fn compose_spans(
    spans: &[Span],
    source: &str,
    style: &RenderStyle,
    state: RunState,
    out: &mut StyledText,
) {
    for span in spans {
        match span {
            Span::Text(c) => out.push(state.run(c.resolve(source).into_owned(), style)),
            Span::Code(c) | Span::LatexInline(c) | Span::LatexDisplay(c) => {
                out.push(StyledRun {
                    color: Some(style.code_color),
                    background: Some(style.code_background),
                    font: FontFamily::Monospace,
                    bold: state.bold,
                    italics: state.italics,
                    ..StyledRun::plain(c.resolve(source).into_owned(), style.mono_size)
                });
            }
            Span::Html(c) => {
                out.push(StyledRun {
                    font: FontFamily::Monospace,
                    ..state.run(c.resolve(source).into_owned(), style)
                });
            }
            Span::Emphasis(children) => {
                let inner = RunState {
                    italics: true,
                    ..state
                };
                compose_spans(children, source, style, inner, out);
            }
            Span::Strong(children) => {
                let inner = RunState { bold: true, ..state };
                compose_spans(children, source, style, inner, out);
            }
            Span::Strikethrough(children) => {
                let inner = RunState {
                    strikethrough: true,
                    ..state
                };
                compose_spans(children, source, style, inner, out);
            }
            Span::Underline(children) => {
                let inner = RunState {
                    underline: true,
                    ..state
                };
                compose_spans(children, source, style, inner, out);
            }
            Span::Link(l) => {
                let inner = RunState {
                    underline: true,
                    ..state
                };
                let mut link_text = StyledText::default();
                compose_spans(&l.children, source, style, inner, &mut link_text);
                for mut run in link_text.runs {
                    run.color = Some(style.link_color);
                    out.push(run);
                }
            }
            Span::WikiLink(w) => {
                let text = if w.children.is_empty() {
                    w.target.resolve(source).into_owned()
                } else {
                    let mut inner = StyledText::default();
                    compose_spans(&w.children, source, style, state, &mut inner);
                    inner.text()
                };
                out.push(StyledRun {
                    color: Some(style.link_color),
                    underline: true,
                    ..StyledRun::plain(text, state.size)
                });
            }
            Span::Image(i) => {
                let mut alt = String::new();
                for s in &i.alt {
                    s.plain_text(source, &mut alt);
                }
                out.push(StyledRun {
                    color: Some(style.link_color),
                    ..StyledRun::plain(format!("[image: {alt}]"), state.size)
                });
            }
            Span::LineBreak | Span::SoftBreak => {
                out.push(state.run("\n".to_string(), style));
            }
        }
    }
}

impl RunState {
    fn body(style: &RenderStyle) -> Self {
        Self {
            size: style.body_size,
            bold: false,
            italics: false,
            strikethrough: false,
            underline: false,
        }
    }

    fn run(self, text: String, style: &RenderStyle) -> StyledRun {
        StyledRun {
            text,
            size: self.size,
            font: FontFamily::Proportional,
            color: Some(style.text_color),
            background: None,
            bold: self.bold,
            italics: self.italics,
            strikethrough: self.strikethrough,
            underline: self.underline,
        }
    }
}

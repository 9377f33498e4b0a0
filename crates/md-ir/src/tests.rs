//! Tests for one-shot parsing and streaming behavior.

use crate::{
    parse, Alignment, Block, BlockId, ByteRangeSeq, Document, IncrementalParser, ParseOptions,
    Span, TextContent,
};

fn parse_default(text: &str) -> Document {
    parse(text, ParseOptions::default()).expect("parse")
}

fn kinds(doc: &Document) -> Vec<u8> {
    doc.blocks().iter().map(|b| b.id().kind).collect()
}

fn collect_ids(blocks: &[Block], out: &mut Vec<BlockId>) {
    for block in blocks {
        out.push(block.id());
        match block {
            Block::Quote(q) => collect_ids(&q.children, out),
            Block::List(l) => {
                for item in &l.items {
                    out.push(item.id);
                    collect_ids(&item.children, out);
                }
            }
            Block::Table(t) => {
                for row in t.header_rows.iter().chain(&t.body_rows) {
                    out.push(row.id);
                    for cell in &row.cells {
                        out.push(cell.id);
                    }
                }
            }
            _ => {}
        }
    }
}

fn check_content(content: &TextContent, len: usize) {
    let check_seq = |seq: &ByteRangeSeq| {
        for r in seq.ranges() {
            assert!(r.start <= r.end && r.end <= len, "range {r:?} out of {len}");
        }
    };
    match content {
        TextContent::Bytes(r) => {
            assert!(r.start <= r.end && r.end <= len, "range {r:?} out of {len}")
        }
        TextContent::Seq(seq) => check_seq(seq),
        TextContent::Owned(_) => {}
    }
}

fn check_spans(spans: &[Span], len: usize) {
    for span in spans {
        match span {
            Span::Text(c)
            | Span::Code(c)
            | Span::Html(c)
            | Span::LatexInline(c)
            | Span::LatexDisplay(c) => check_content(c, len),
            Span::Emphasis(children)
            | Span::Strong(children)
            | Span::Strikethrough(children)
            | Span::Underline(children) => check_spans(children, len),
            Span::Link(l) => {
                check_spans(&l.children, len);
                if let Some(d) = &l.destination {
                    check_content(d, len);
                }
                if let Some(t) = &l.title {
                    check_content(t, len);
                }
            }
            Span::Image(i) => {
                check_spans(&i.alt, len);
                if let Some(s) = &i.source {
                    check_content(s, len);
                }
            }
            Span::WikiLink(w) => {
                check_content(&w.target, len);
                check_spans(&w.children, len);
            }
            Span::LineBreak | Span::SoftBreak => {}
        }
    }
}

fn check_ranges(blocks: &[Block], len: usize) {
    for block in blocks {
        let id = block.id();
        assert!(id.start <= id.end && (id.end as usize) <= len);
        match block {
            Block::Paragraph(p) => check_spans(&p.spans, len),
            Block::Heading(h) => check_spans(&h.spans, len),
            Block::Code(c) => check_content(&c.content, len),
            Block::Html(h) => check_content(&h.content, len),
            Block::Quote(q) => check_ranges(&q.children, len),
            Block::List(l) => {
                for item in &l.items {
                    check_ranges(&item.children, len);
                }
            }
            Block::Table(t) => {
                for row in t.header_rows.iter().chain(&t.body_rows) {
                    for cell in &row.cells {
                        check_spans(&cell.spans, len);
                    }
                }
            }
            Block::Rule(_) => {}
        }
    }
}

// ---- one-shot parsing ----

#[test]
fn test_heading_with_emphasis() {
    let doc = parse_default("# Hello *world*");
    assert_eq!(doc.blocks().len(), 1);
    let Block::Heading(h) = &doc.blocks()[0] else {
        panic!("expected heading, got {:?}", doc.blocks());
    };
    assert_eq!(h.level, 1);
    assert_eq!(h.spans.len(), 2);
    let Span::Text(first) = &h.spans[0] else {
        panic!("expected text span");
    };
    assert_eq!(first.resolve(doc.source()), "Hello ");
    let Span::Emphasis(inner) = &h.spans[1] else {
        panic!("expected emphasis span");
    };
    let Span::Text(word) = &inner[0] else {
        panic!("expected text inside emphasis");
    };
    assert_eq!(word.resolve(doc.source()), "world");
}

#[test]
fn test_heading_range_covers_spans() {
    let doc = parse_default("# Hi");
    let Block::Heading(h) = &doc.blocks()[0] else {
        panic!("expected heading");
    };
    assert_eq!(h.range.resolve(doc.source()), "Hi");
    assert_eq!(h.id.start as usize, h.range.start);
    assert_eq!(h.id.end as usize, h.range.end);
}

#[test]
fn test_task_list() {
    let doc = parse_default("- [x] Done\n- [ ] Todo");
    assert_eq!(doc.blocks().len(), 1);
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list, got {:?}", doc.blocks());
    };
    assert!(!list.ordered);
    assert!(list.tight);
    assert_eq!(list.items.len(), 2);
    assert!(list.items[0].is_task && list.items[0].is_checked);
    assert!(list.items[1].is_task && !list.items[1].is_checked);
    // Tight items wrap their bare inline content in a synthesized
    // paragraph.
    for (item, expected) in list.items.iter().zip(["Done", "Todo"]) {
        let Some(Block::Paragraph(p)) = item.children.first() else {
            panic!("expected synthesized paragraph in {item:?}");
        };
        let mut text = String::new();
        for s in &p.spans {
            s.plain_text(doc.source(), &mut text);
        }
        assert_eq!(text, expected);
    }
}

#[test]
fn test_tight_and_loose_lists() {
    let doc = parse_default("- a\n- b\n");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert!(list.tight);

    let doc = parse_default("- a\n\n- b\n");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list, got {:?}", doc.blocks());
    };
    assert!(!list.tight);
    assert_eq!(list.items.len(), 2);
}

#[test]
fn test_ordered_list_start_and_delimiter() {
    let doc = parse_default("3. x\n4. y\n");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert!(list.ordered);
    assert_eq!(list.start, 3);
    assert_eq!(list.delimiter, Some('.'));

    let doc = parse_default("1) x\n");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert_eq!(list.delimiter, Some(')'));
}

#[test]
fn test_nested_list_in_tight_item() {
    let doc = parse_default("- outer\n  - inner\n");
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected list");
    };
    assert_eq!(list.items.len(), 1);
    let children = &list.items[0].children;
    assert!(
        matches!(children.first(), Some(Block::Paragraph(_))),
        "bare item text should come first: {children:?}"
    );
    assert!(matches!(children.get(1), Some(Block::List(_))));
}

#[test]
fn test_fenced_code_block() {
    let doc = parse_default("```swift\nlet value = 1\n```");
    assert_eq!(doc.blocks().len(), 1);
    let Block::Code(code) = &doc.blocks()[0] else {
        panic!("expected code block, got {:?}", doc.blocks());
    };
    let lang = code.language.as_ref().expect("language");
    assert_eq!(lang.resolve(doc.source()), "swift");
    assert!(code
        .content
        .resolve(doc.source())
        .contains("let value = 1"));
    assert_eq!(code.fence_char, Some('`'));
}

#[test]
fn test_indented_code_block() {
    let doc = parse_default("    indented line\n");
    let Block::Code(code) = &doc.blocks()[0] else {
        panic!("expected code block, got {:?}", doc.blocks());
    };
    assert!(code.language.is_none());
    assert!(code.fence_char.is_none());
    assert!(code.content.resolve(doc.source()).contains("indented line"));
}

#[test]
fn test_code_block_content_keeps_line_order() {
    let doc = parse_default("```\nfirst\nsecond\nthird\n```\n");
    let Block::Code(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    let content = code.content.resolve(doc.source());
    let first = content.find("first").unwrap();
    let second = content.find("second").unwrap();
    let third = content.find("third").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_entity_decoding() {
    let doc = parse_default("Fish &amp; Chips");
    assert_eq!(doc.blocks().len(), 1);
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let mut text = String::new();
    for s in &p.spans {
        s.plain_text(doc.source(), &mut text);
    }
    assert_eq!(text, "Fish & Chips");
    // The decoded ampersand is synthesized text, not a source range.
    assert!(p
        .spans
        .iter()
        .any(|s| matches!(s, Span::Text(TextContent::Owned(_)))));
}

#[test]
fn test_paragraph_roundtrip_plain_text() {
    let doc = parse_default("Hello *world* and `code`!");
    let mut text = String::new();
    doc.blocks()[0].plain_text(doc.source(), &mut text);
    assert_eq!(text, "Hello world and code!");
}

#[test]
fn test_strikethrough() {
    let doc = parse_default("some ~~gone~~ text");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(p
        .spans
        .iter()
        .any(|s| matches!(s, Span::Strikethrough(_))));
}

#[test]
fn test_inline_link() {
    let doc = parse_default("check [this](https://example.com \"Title\") out");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let link = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::Link(l) => Some(l),
            _ => None,
        })
        .expect("link span");
    assert_eq!(
        link.destination.as_ref().unwrap().resolve(doc.source()),
        "https://example.com"
    );
    assert_eq!(
        link.title.as_ref().unwrap().resolve(doc.source()),
        "Title"
    );
}

#[test]
fn test_image() {
    let doc = parse_default("see ![alt text](img.png) here");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let image = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::Image(i) => Some(i),
            _ => None,
        })
        .expect("image span");
    assert_eq!(
        image.source.as_ref().unwrap().resolve(doc.source()),
        "img.png"
    );
    let mut alt = String::new();
    for s in &image.alt {
        s.plain_text(doc.source(), &mut alt);
    }
    assert_eq!(alt, "alt text");
}

#[test]
fn test_autolink_url() {
    let doc = parse_default("go to https://example.com now");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let link = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::Link(l) => Some(l),
            _ => None,
        })
        .expect("autolink");
    assert_eq!(
        link.destination.as_ref().unwrap().resolve(doc.source()),
        "https://example.com"
    );
}

#[test]
fn test_autolinks_off_in_commonmark_preset() {
    let doc = parse("go to https://example.com now", ParseOptions::commonmark()).unwrap();
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(!p.spans.iter().any(|s| matches!(s, Span::Link(_))));
}

#[test]
fn test_table() {
    let doc = parse_default("| a | b |\n|---|:-:|\n| 1 | 2 |\n");
    let Block::Table(table) = &doc.blocks()[0] else {
        panic!("expected table, got {:?}", doc.blocks());
    };
    assert_eq!(table.alignments, vec![Alignment::None, Alignment::Center]);
    assert_eq!(table.header_rows.len(), 1);
    assert_eq!(table.body_rows.len(), 1);
    let header = &table.header_rows[0];
    assert_eq!(header.cells.len(), 2);
    let mut text = String::new();
    for s in &header.cells[0].spans {
        s.plain_text(doc.source(), &mut text);
    }
    assert_eq!(text, "a");
    assert_eq!(header.cells[1].alignment, Alignment::Center);
    assert_eq!(table.body_rows[0].cells[1].alignment, Alignment::Center);
}

#[test]
fn test_block_quote_nesting() {
    let doc = parse_default("> # H\n> text\n");
    let Block::Quote(quote) = &doc.blocks()[0] else {
        panic!("expected quote");
    };
    assert!(matches!(quote.children[0], Block::Heading(_)));
    assert!(matches!(quote.children[1], Block::Paragraph(_)));
}

#[test]
fn test_thematic_break() {
    let doc = parse_default("a\n\n---\n\nb\n");
    assert!(doc
        .blocks()
        .iter()
        .any(|b| matches!(b, Block::Rule(_))));
}

#[test]
fn test_html_block() {
    let doc = parse_default("<div>\nhi\n</div>\n");
    let Block::Html(html) = &doc.blocks()[0] else {
        panic!("expected html block, got {:?}", doc.blocks());
    };
    assert!(html.content.resolve(doc.source()).contains("<div>"));
}

#[test]
fn test_no_html_blocks_flag() {
    let opts = ParseOptions::default() | ParseOptions::NO_HTML_BLOCKS;
    let doc = parse("<div>\nhi\n</div>\n", opts).unwrap();
    assert!(matches!(doc.blocks()[0], Block::Paragraph(_)));
}

#[test]
fn test_inline_html_and_flag() {
    let doc = parse_default("a <b>x</b> c");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(p.spans.iter().any(|s| matches!(s, Span::Html(_))));

    let opts = ParseOptions::default() | ParseOptions::NO_HTML_SPANS;
    let doc = parse("a <b>x</b> c", opts).unwrap();
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(!p.spans.iter().any(|s| matches!(s, Span::Html(_))));
    let mut text = String::new();
    doc.blocks()[0].plain_text(doc.source(), &mut text);
    assert!(text.contains("<b>"));
}

#[test]
fn test_soft_break_modes() {
    let doc = parse_default("a\nb");
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(p.spans.iter().any(|s| matches!(s, Span::SoftBreak)));

    let opts = ParseOptions::default() | ParseOptions::HARD_SOFT_BREAKS;
    let doc = parse("a\nb", opts).unwrap();
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    assert!(p.spans.iter().any(|s| matches!(s, Span::LineBreak)));
    assert!(!p.spans.iter().any(|s| matches!(s, Span::SoftBreak)));
}

#[test]
fn test_wikilink() {
    let opts = ParseOptions::default() | ParseOptions::WIKILINKS;
    let doc = parse("see [[Target]] page", opts).unwrap();
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let wiki = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::WikiLink(w) => Some(w),
            _ => None,
        })
        .expect("wikilink span");
    assert_eq!(wiki.target.resolve(doc.source()), "Target");
}

#[test]
fn test_latex_math() {
    let opts = ParseOptions::default() | ParseOptions::LATEX_MATH;
    let doc = parse("inline $x^2$ and display $$y_1$$", opts).unwrap();
    let Block::Paragraph(p) = &doc.blocks()[0] else {
        panic!("expected paragraph");
    };
    let inline = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::LatexInline(c) => Some(c),
            _ => None,
        })
        .expect("inline math");
    assert_eq!(inline.resolve(doc.source()), "x^2");
    let display = p
        .spans
        .iter()
        .find_map(|s| match s {
            Span::LatexDisplay(c) => Some(c),
            _ => None,
        })
        .expect("display math");
    assert_eq!(display.resolve(doc.source()), "y_1");
}

// ---- universal invariants ----

const MIXED: &str = "# Title\n\npara text with *emph* and `code`\n\n- a\n- b\n\n```rust\nfn x() {}\n```\n\n> quote\n\n| h |\n|---|\n| c |\n\nend\n";

#[test]
fn test_all_ranges_within_source() {
    let doc = parse_default(MIXED);
    check_ranges(doc.blocks(), doc.source().len());
}

#[test]
fn test_source_retained_byte_exact() {
    let doc = parse_default(MIXED);
    assert_eq!(doc.source(), MIXED);
}

#[test]
fn test_ordinals_unique_within_parse() {
    let doc = parse_default(MIXED);
    let mut ids = Vec::new();
    collect_ids(doc.blocks(), &mut ids);
    let mut ordinals: Vec<u32> = ids.iter().map(|id| id.ordinal).collect();
    ordinals.sort_unstable();
    let before = ordinals.len();
    ordinals.dedup();
    assert_eq!(before, ordinals.len(), "duplicate ordinals");
}

#[test]
fn test_reparse_yields_same_kind_start_end() {
    let a = parse_default(MIXED);
    let b = parse_default(MIXED);
    let mut ids_a = Vec::new();
    let mut ids_b = Vec::new();
    collect_ids(a.blocks(), &mut ids_a);
    collect_ids(b.blocks(), &mut ids_b);
    let key = |ids: &[BlockId]| -> Vec<(u8, u32, u32)> {
        ids.iter().map(|id| (id.kind, id.start, id.end)).collect()
    };
    assert_eq!(key(&ids_a), key(&ids_b));
}

// ---- streaming ----

#[test]
fn test_incremental_heading_then_paragraph() {
    let parser = IncrementalParser::default();
    parser.append("# Hel").unwrap();
    parser.append("lo\n\nWor").unwrap();
    assert_eq!(parser.stable_block_count(), 1);
    parser.append("ld\n").unwrap();
    let doc = parser.finalize().unwrap();

    assert_eq!(doc.blocks().len(), 2);
    let Block::Heading(h) = &doc.blocks()[0] else {
        panic!("expected heading");
    };
    let mut text = String::new();
    for s in &h.spans {
        s.plain_text(doc.source(), &mut text);
    }
    assert_eq!(text, "Hello");
    let mut text = String::new();
    doc.blocks()[1].plain_text(doc.source(), &mut text);
    assert_eq!(text, "World");

    let oneshot = parse_default("# Hello\n\nWorld\n");
    assert_eq!(kinds(&doc), kinds(&oneshot));
    assert_eq!(doc.plain_text(), oneshot.plain_text());
}

#[test]
fn test_incremental_fenced_code_across_chunks() {
    let parser = IncrementalParser::default();
    for chunk in ["```swift\n", "let x = 1\n", "let y = 2\n"] {
        parser.append(chunk).unwrap();
        // Nothing freezes until the closing fence arrives.
        assert_eq!(parser.stable_block_count(), 0);
    }
    parser.append("```\n").unwrap();
    assert_eq!(parser.stable_block_count(), 1);
    let doc = parser.finalize().unwrap();

    assert_eq!(doc.blocks().len(), 1);
    let Block::Code(code) = &doc.blocks()[0] else {
        panic!("expected code block");
    };
    let content = code.content.resolve(doc.source());
    let x = content.find("let x = 1").expect("first assignment");
    let y = content.find("let y = 2").expect("second assignment");
    assert!(x < y);
}

#[test]
fn test_incremental_matches_one_shot_for_byte_chunks() {
    let parser = IncrementalParser::default();
    for ch in MIXED.chars() {
        parser.append(ch.to_string().as_str()).unwrap();
    }
    let doc = parser.finalize().unwrap();
    let oneshot = parse_default(MIXED);

    assert_eq!(doc.source(), oneshot.source());
    assert_eq!(kinds(&doc), kinds(&oneshot));
    assert_eq!(doc.plain_text(), oneshot.plain_text());
    check_ranges(doc.blocks(), doc.source().len());

    let mut ids = Vec::new();
    collect_ids(doc.blocks(), &mut ids);
    let mut ordinals: Vec<u32> = ids.iter().map(|id| id.ordinal).collect();
    ordinals.sort_unstable();
    let before = ordinals.len();
    ordinals.dedup();
    assert_eq!(before, ordinals.len(), "duplicate ordinals across segments");
}

#[test]
fn test_incremental_lazy_continuation_not_split() {
    let parser = IncrementalParser::default();
    parser.append("- first line\nwrapped with no indent\n\n").unwrap();
    parser.append("- second item\n").unwrap();
    let doc = parser.finalize().unwrap();
    let oneshot = parse_default("- first line\nwrapped with no indent\n\n- second item\n");
    assert_eq!(kinds(&doc), kinds(&oneshot));
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected single list, got {:?}", kinds(&doc));
    };
    assert_eq!(list.items.len(), 2);
    assert_eq!(doc.plain_text(), oneshot.plain_text());
}

#[test]
fn test_incremental_loose_list_not_split() {
    let parser = IncrementalParser::default();
    parser.append("- a\n\n").unwrap();
    parser.append("- b\n\n").unwrap();
    parser.append("tail\n").unwrap();
    let doc = parser.finalize().unwrap();
    let oneshot = parse_default("- a\n\n- b\n\ntail\n");
    assert_eq!(kinds(&doc), kinds(&oneshot));
    let Block::List(list) = &doc.blocks()[0] else {
        panic!("expected single list, got {:?}", kinds(&doc));
    };
    assert_eq!(list.items.len(), 2);
    assert!(!list.tight);
}

#[test]
fn test_append_empty_is_idempotent() {
    let parser = IncrementalParser::default();
    parser.append("# Title\n\nbody").unwrap();
    let before = parser.snapshot();
    let after = parser.append("").unwrap();
    assert_eq!(before.source(), after.source());
    assert_eq!(kinds(&before), kinds(&after));
    assert_eq!(parser.pending_content(), "body");
}

#[test]
fn test_snapshot_is_independent_of_later_appends() {
    let parser = IncrementalParser::default();
    parser.append("first\n\n").unwrap();
    let snap = parser.snapshot();
    let count = snap.blocks().len();
    parser.append("second\n\n").unwrap();
    assert_eq!(snap.blocks().len(), count);
    assert_eq!(snap.source(), "first\n\n");
}

#[test]
fn test_append_after_finalize_is_ignored() {
    let parser = IncrementalParser::default();
    parser.append("done\n").unwrap();
    let doc = parser.finalize().unwrap();
    let after = parser.append("more\n").unwrap();
    assert_eq!(after.source(), doc.source());
    assert_eq!(kinds(&after), kinds(&doc));
}

#[test]
fn test_reset_starts_a_new_document() {
    let parser = IncrementalParser::default();
    parser.append("# a\n\n").unwrap();
    let id_before = parser.document_id();
    assert_eq!(parser.stable_block_count(), 1);
    parser.reset();
    assert_ne!(parser.document_id(), id_before);
    assert_eq!(parser.stable_block_count(), 0);
    assert_eq!(parser.pending_content(), "");
    let doc = parser.finalize().unwrap();
    assert!(doc.blocks().is_empty());
}

#[test]
fn test_pump_drains_a_stream() {
    let parser = IncrementalParser::default();
    let chunks = futures::stream::iter(
        ["# Strea", "ming\n\nto", "kens here\n"]
            .into_iter()
            .map(String::from),
    );
    let doc = futures::executor::block_on(crate::pump(&parser, chunks)).unwrap();
    let oneshot = parse_default("# Streaming\n\ntokens here\n");
    assert_eq!(kinds(&doc), kinds(&oneshot));
    assert_eq!(doc.plain_text(), oneshot.plain_text());
}

#[test]
fn test_streamed_token_chunks() {
    // Token-sized chunks splitting mid-word, mid-fence and mid-marker,
    // the way a model delivers them.
    let parser = IncrementalParser::default();
    let chunks = [
        "Circle",
        " area",
        " in",
        " two lines:\n\n",
        "``",
        "`py",
        "\n",
        "def ",
        "area(r):\n",
        "    return 3.14 * r * r\n",
        "```",
        "\n\nCall",
        " it with `area(2)`",
        ".",
    ];
    for chunk in chunks {
        parser.append(chunk).unwrap();
    }
    let doc = parser.finalize().unwrap();

    // Paragraph, code block, paragraph.
    let full: String = chunks.concat();
    let oneshot = parse_default(&full);
    assert_eq!(kinds(&doc), kinds(&oneshot));
    assert!(doc
        .blocks()
        .iter()
        .any(|b| matches!(b, Block::Code(_))));
    assert_eq!(doc.plain_text(), oneshot.plain_text());
}

//! Zero-copy markdown IR for streaming LLM output.
//!
//! Parses CommonMark+GFM into a block/span tree whose leaves reference the
//! source buffer by byte offset, designed for chat interfaces that render
//! progressively and diff incrementally.
//!
//! - [`parse`] is the one-shot entry point: bytes in, [`Document`] out.
//! - [`IncrementalParser`] consumes append-only streams, freezing blocks
//!   as soon as their bytes can no longer change so a view layer can diff
//!   against stable [`BlockId`]s.
//! - [`pump`] drains any async chunk stream into an incremental parser.

mod autolink;
mod builder;
mod element;
mod entity;
mod error;
mod options;
mod range;
mod stream;

pub use element::{
    kind, Alignment, Block, BlockId, BlockQuote, CodeBlock, Document, DocumentId, Heading,
    HtmlBlock, Image, Link, List, ListItem, Paragraph, Span, Table, TableCell, TableRow,
    ThematicBreak, WikiLink,
};
pub use entity::{decode as decode_entity, decode_references};
pub use error::ParseError;
pub use options::ParseOptions;
pub use range::{ByteRange, ByteRangeSeq, TextContent};
pub use stream::{pump, IncrementalParser};

use std::sync::Arc;

/// Parse a complete document in one shot.
///
/// Pure: no shared state, safe to call concurrently. The returned document
/// retains `source` byte-exact.
pub fn parse(source: &str, options: ParseOptions) -> Result<Document, ParseError> {
    let (blocks, _) = builder::build(source, options, 0);
    Ok(Document::new(DocumentId::new(), Arc::from(source), blocks))
}

/// Parse raw bytes, converting lossily to UTF-8 at the boundary.
pub fn parse_bytes(bytes: &[u8], options: ParseOptions) -> Result<Document, ParseError> {
    parse(&String::from_utf8_lossy(bytes), options)
}

#[cfg(test)]
mod tests;

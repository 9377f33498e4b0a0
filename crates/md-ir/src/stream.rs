//! Incremental parsing of append-only streams.
//!
//! Designed for chat interfaces where markdown arrives token-by-token: the
//! engine buffers incoming chunks, freezes the prefix that can no longer
//! change, and re-parses only the pending tail on each append. Frozen
//! blocks keep their identities, so a view layer diffing successive
//! snapshots touches O(changed) nodes.

use std::sync::{Arc, Mutex};

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::builder;
use crate::element::{Block, Document, DocumentId};
use crate::error::ParseError;
use crate::options::ParseOptions;

/// Streaming parser over an append-only byte stream.
///
/// Logically single-writer: all operations serialize on an internal mutex
/// and never suspend while holding it. Snapshots are independent immutable
/// [`Document`] values, safe to hand to other threads.
pub struct IncrementalParser {
    options: ParseOptions,
    state: Mutex<EngineState>,
}

struct EngineState {
    document_id: DocumentId,
    /// Blocks whose bytes and structure are frozen; ranges reference the
    /// global buffer.
    stable_blocks: Vec<Block>,
    /// Concatenation of all frozen chunks.
    stable_data: String,
    /// Buffered tail whose IR is re-derived on every append.
    pending: String,
    finalized: bool,
    next_ordinal: u32,
}

impl IncrementalParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            state: Mutex::new(EngineState::new()),
        }
    }

    /// Append a chunk and return a snapshot of the resulting document.
    ///
    /// Appends after [`finalize`](Self::finalize) are ignored. Amortized
    /// cost is linear in the chunk length: at most one boundary scan runs
    /// per call and frozen bytes are never re-parsed.
    pub fn append(&self, chunk: &str) -> Result<Document, ParseError> {
        let mut state = self.state.lock().expect("incremental parser poisoned");
        if !state.finalized && !chunk.is_empty() {
            state.pending.push_str(chunk);
            state.advance_boundary(self.options);
        }
        Ok(state.snapshot(self.options))
    }

    /// Append raw bytes, converting lossily at the boundary.
    pub fn append_bytes(&self, chunk: &[u8]) -> Result<Document, ParseError> {
        self.append(&String::from_utf8_lossy(chunk))
    }

    /// Mark the stream complete, absorbing the pending tail into the
    /// stable prefix, and return the final document.
    pub fn finalize(&self) -> Result<Document, ParseError> {
        let mut state = self.state.lock().expect("incremental parser poisoned");
        if !state.finalized {
            state.finalized = true;
            if !state.pending.is_empty() {
                let end = state.pending.len();
                state.freeze_prefix(end, self.options);
            }
        }
        Ok(state.snapshot(self.options))
    }

    /// Clear all state and start a new document identity.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("incremental parser poisoned");
        *state = EngineState::new();
    }

    /// A consistent view of the current state: frozen blocks followed by a
    /// transient parse of the pending tail. Later appends do not affect the
    /// returned value.
    pub fn snapshot(&self) -> Document {
        self.state
            .lock()
            .expect("incremental parser poisoned")
            .snapshot(self.options)
    }

    /// The buffered unfrozen tail. Debugging aid.
    pub fn pending_content(&self) -> String {
        self.state
            .lock()
            .expect("incremental parser poisoned")
            .pending
            .clone()
    }

    pub fn stable_block_count(&self) -> usize {
        self.state
            .lock()
            .expect("incremental parser poisoned")
            .stable_blocks
            .len()
    }

    pub fn document_id(&self) -> DocumentId {
        self.state
            .lock()
            .expect("incremental parser poisoned")
            .document_id
    }
}

impl Default for IncrementalParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl EngineState {
    fn new() -> Self {
        Self {
            document_id: DocumentId::new(),
            stable_blocks: Vec::new(),
            stable_data: String::new(),
            pending: String::new(),
            finalized: false,
            next_ordinal: 0,
        }
    }

    /// Freeze the largest pending prefix that ends at a block boundary.
    ///
    /// One scan per append; boundaries that accumulate later cascade on
    /// subsequent appends.
    fn advance_boundary(&mut self, options: ParseOptions) {
        if let Some(cut) = find_boundary(&self.pending) {
            debug!(cut, pending = self.pending.len(), "freezing stable prefix");
            self.freeze_prefix(cut, options);
        }
    }

    fn freeze_prefix(&mut self, cut: usize, options: ParseOptions) {
        let (blocks, next_ordinal) =
            builder::build(&self.pending[..cut], options, self.next_ordinal);
        self.next_ordinal = next_ordinal;
        let delta = self.stable_data.len();
        for mut block in blocks {
            block.shift(delta);
            self.stable_blocks.push(block);
        }
        self.stable_data.push_str(&self.pending[..cut]);
        self.pending.drain(..cut);
    }

    fn snapshot(&self, options: ParseOptions) -> Document {
        let mut blocks = self.stable_blocks.clone();
        if !self.pending.is_empty() {
            // The tail parse is transient; its ordinals continue past the
            // frozen ones but are not persisted.
            let (tail, _) = builder::build(&self.pending, options, self.next_ordinal);
            let delta = self.stable_data.len();
            for mut block in tail {
                block.shift(delta);
                blocks.push(block);
            }
        }
        let mut source = String::with_capacity(self.stable_data.len() + self.pending.len());
        source.push_str(&self.stable_data);
        source.push_str(&self.pending);
        Document::new(self.document_id, Arc::from(source), blocks)
    }
}

/// Drive an asynchronous chunk source into `parser` and finalize.
///
/// Cancellation is cooperative: dropping the future keeps every chunk that
/// was already appended; nothing rolls back.
pub async fn pump<S>(parser: &IncrementalParser, chunks: S) -> Result<Document, ParseError>
where
    S: Stream<Item = String>,
{
    let mut chunks = std::pin::pin!(chunks);
    while let Some(chunk) = chunks.next().await {
        parser.append(&chunk)?;
    }
    parser.finalize()
}

/// Find the largest prefix of `pending` ending at a safe block boundary.
///
/// Boundaries, in priority order: the end of a fenced code block whose
/// closing fence arrived (including its trailing newline), and a blank
/// line outside any fence. A blank line is suppressed as a boundary while
/// a list is open and the content after the blank still belongs to it, so
/// loose lists never split across a freeze; such input defers freezing
/// until finalize. List context is tracked across lines: a marker line
/// opens it, and both indented and lazy (unindented, wrap-style)
/// continuation lines keep it open.
fn find_boundary(pending: &str) -> Option<usize> {
    let mut best: Option<usize> = None;
    // (fence char, fence length) while inside a fenced code block.
    let mut fence: Option<(u8, usize)> = None;
    let mut list_open = false;
    let mut after_blank = false;
    let mut pos = 0;

    while pos < pending.len() {
        let (line_end, complete) = match pending[pos..].find('\n') {
            Some(i) => (pos + i + 1, true),
            None => (pending.len(), false),
        };
        let line = &pending[pos..line_end];
        let trimmed_line = line.trim_end_matches(['\n', '\r']);
        let stripped = trimmed_line.trim_start();
        let indent = trimmed_line.len() - stripped.len();

        match fence {
            Some((fence_char, fence_len)) => {
                let run = stripped
                    .bytes()
                    .take_while(|&b| b == fence_char)
                    .count();
                // A run indented four or more columns is fence content,
                // not a closer.
                if indent <= 3 && run >= fence_len && stripped[run..].trim().is_empty() {
                    fence = None;
                    after_blank = false;
                    if complete {
                        best = Some(line_end);
                    }
                }
            }
            None => {
                if stripped.is_empty() {
                    if complete {
                        if !list_open {
                            best = Some(line_end);
                        } else if let Some(next) = next_content_line(pending, line_end) {
                            if !line_continues_list(next) {
                                best = Some(line_end);
                                list_open = false;
                            }
                        }
                        // Otherwise the list may continue; defer.
                    }
                    after_blank = true;
                } else if indent <= 3 && opens_fence(stripped) {
                    let first = stripped.as_bytes()[0];
                    let run = stripped.bytes().take_while(|&b| b == first).count();
                    fence = Some((first, run));
                    // A fence start is never a lazy continuation.
                    list_open = false;
                    after_blank = false;
                } else {
                    if indent <= 3 && is_list_marker(stripped) {
                        list_open = true;
                    } else if list_open && after_blank && indent < 2 {
                        // A plain line after a blank closes the list;
                        // without the blank it is a lazy continuation and
                        // the list stays open.
                        list_open = false;
                    }
                    after_blank = false;
                }
            }
        }
        pos = line_end;
        if !complete {
            break;
        }
    }
    best
}

fn opens_fence(stripped: &str) -> bool {
    let Some(&first) = stripped.as_bytes().first() else {
        return false;
    };
    if first != b'`' && first != b'~' {
        return false;
    }
    let run = stripped.bytes().take_while(|&b| b == first).count();
    // A backtick info string may not contain backticks.
    run >= 3 && (first == b'~' || !stripped[run..].contains('`'))
}

/// Whether a stripped line starts with a bullet or ordered-list marker.
fn is_list_marker(stripped: &str) -> bool {
    let bytes = stripped.as_bytes();
    match bytes.first() {
        Some(b'-' | b'+' | b'*') => matches!(bytes.get(1), Some(b' ' | b'\t')),
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            digits <= 9
                && matches!(bytes.get(digits), Some(b'.' | b')'))
                && matches!(bytes.get(digits + 1), Some(b' ' | b'\t') | None)
        }
        _ => false,
    }
}

/// Whether a line after a blank keeps an open list going: another item
/// marker or indented continuation content.
fn line_continues_list(line: &str) -> bool {
    let trimmed = line.trim_start_matches('\n');
    let stripped = trimmed.trim_start();
    let indent = trimmed.len() - stripped.len();
    if indent >= 2 && !stripped.is_empty() {
        return true;
    }
    is_list_marker(stripped)
}

/// First complete non-blank line at or after `from`, if any has arrived.
fn next_content_line(pending: &str, from: usize) -> Option<&str> {
    let mut pos = from;
    while pos < pending.len() {
        let line_end = pending[pos..].find('\n').map(|i| pos + i + 1)?;
        let line = &pending[pos..line_end];
        if !line.trim().is_empty() {
            return Some(line);
        }
        pos = line_end;
    }
    None
}

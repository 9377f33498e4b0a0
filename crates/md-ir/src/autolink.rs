//! Permissive autolink detection for plain text runs.
//!
//! Turns bare `http(s)://`, `www.` and email occurrences into link spans
//! when the corresponding option flags are set. Runs over text the
//! tokenizer already classified as plain, so there is no interaction with
//! code spans or explicit links.

use std::sync::Arc;

use crate::element::{Link, Span};
use crate::options::ParseOptions;
use crate::range::{ByteRange, TextContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AutolinkKind {
    Url,
    Www,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AutolinkMatch {
    pub start: usize,
    pub end: usize,
    pub kind: AutolinkKind,
}

/// Split a plain text payload into text and link spans.
pub(crate) fn split_spans(
    source: &str,
    content: TextContent,
    options: ParseOptions,
) -> Vec<Span> {
    match content {
        TextContent::Bytes(range) => {
            let clamped = range.clamped(source.len());
            let Some(text) = source.get(clamped.start..clamped.end) else {
                return vec![Span::Text(TextContent::Bytes(range))];
            };
            let matches = find_autolinks(text, options);
            if matches.is_empty() {
                return vec![Span::Text(TextContent::Bytes(range))];
            }
            let mut out = Vec::new();
            let mut cursor = 0;
            for m in matches {
                if m.start > cursor {
                    out.push(Span::Text(TextContent::Bytes(ByteRange::new(
                        clamped.start + cursor,
                        clamped.start + m.start,
                    ))));
                }
                let link_range = ByteRange::new(clamped.start + m.start, clamped.start + m.end);
                out.push(make_link(
                    TextContent::Bytes(link_range),
                    &text[m.start..m.end],
                    m.kind,
                ));
                cursor = m.end;
            }
            if cursor < text.len() {
                out.push(Span::Text(TextContent::Bytes(ByteRange::new(
                    clamped.start + cursor,
                    clamped.end,
                ))));
            }
            out
        }
        TextContent::Owned(text) => {
            let matches = find_autolinks(&text, options);
            if matches.is_empty() {
                return vec![Span::Text(TextContent::Owned(text))];
            }
            let mut out = Vec::new();
            let mut cursor = 0;
            for m in matches {
                if m.start > cursor {
                    out.push(Span::Text(TextContent::owned(&text[cursor..m.start])));
                }
                let piece = &text[m.start..m.end];
                out.push(make_link(TextContent::owned(piece), piece, m.kind));
                cursor = m.end;
            }
            if cursor < text.len() {
                out.push(Span::Text(TextContent::owned(&text[cursor..])));
            }
            out
        }
        seq => vec![Span::Text(seq)],
    }
}

fn make_link(content: TextContent, text: &str, kind: AutolinkKind) -> Span {
    let destination = match kind {
        AutolinkKind::Url => content.clone(),
        AutolinkKind::Www => TextContent::Owned(Arc::from(format!("http://{text}"))),
        AutolinkKind::Email => TextContent::Owned(Arc::from(format!("mailto:{text}"))),
    };
    Span::Link(Link {
        children: vec![Span::Text(content)],
        destination: Some(destination),
        title: None,
    })
}

/// Find autolink candidates, left to right, non-overlapping.
pub(crate) fn find_autolinks(text: &str, options: ParseOptions) -> Vec<AutolinkMatch> {
    let url = options.contains(ParseOptions::PERMISSIVE_URL_AUTOLINKS);
    let www = options.contains(ParseOptions::PERMISSIVE_WWW_AUTOLINKS);
    let email = options.contains(ParseOptions::PERMISSIVE_EMAIL_AUTOLINKS);

    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    let mut last_end = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii() {
            i += 1;
            continue;
        }
        if word_start(bytes, i, last_end) {
            let rest = &text[i..];
            let scheme = if url && rest.starts_with("http://") {
                Some(7)
            } else if url && rest.starts_with("https://") {
                Some(8)
            } else if www && rest.starts_with("www.") {
                Some(4)
            } else {
                None
            };
            if let Some(scheme_len) = scheme {
                if let Some(len) = scan_url_tail(&rest[scheme_len..]) {
                    let end = i + scheme_len + len;
                    let kind = if scheme_len == 4 {
                        AutolinkKind::Www
                    } else {
                        AutolinkKind::Url
                    };
                    found.push(AutolinkMatch {
                        start: i,
                        end,
                        kind,
                    });
                    last_end = end;
                    i = end;
                    continue;
                }
            }
        }
        if email && b == b'@' {
            if let Some((start, end)) = scan_email(text, i, last_end) {
                found.push(AutolinkMatch {
                    start,
                    end,
                    kind: AutolinkKind::Email,
                });
                last_end = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    found
}

fn word_start(bytes: &[u8], i: usize, last_end: usize) -> bool {
    if i < last_end {
        return false;
    }
    i == 0
        || matches!(
            bytes[i - 1],
            b' ' | b'\t' | b'\n' | b'\r' | b'(' | b'*' | b'_' | b'~'
        )
}

/// Length of the URL body after the scheme, or `None` if there is none.
/// Trailing punctuation is excluded, and a trailing `)` only counts while
/// the match contains an unmatched `(`.
fn scan_url_tail(rest: &str) -> Option<usize> {
    let mut len = 0;
    for c in rest.chars() {
        if c.is_whitespace() || c == '<' {
            break;
        }
        len += c.len_utf8();
    }
    let mut tail = &rest[..len];
    loop {
        let Some(last) = tail.chars().last() else {
            return None;
        };
        match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '*' | '_' | '~' | '\'' | '"' => {
                tail = &tail[..tail.len() - last.len_utf8()];
            }
            ')' => {
                let opens = tail.matches('(').count();
                let closes = tail.matches(')').count();
                if closes > opens {
                    tail = &tail[..tail.len() - 1];
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    (!tail.is_empty()).then_some(tail.len())
}

/// Validate an email around the `@` at `at`. Returns absolute byte bounds.
fn scan_email(text: &str, at: usize, last_end: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();

    // Local part: alphanumerics plus . _ + - walking backwards.
    let mut start = at;
    while start > last_end {
        let b = bytes[start - 1];
        if b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'+' | b'-') {
            start -= 1;
        } else {
            break;
        }
    }
    if start == at || !word_start(bytes, start, last_end) {
        return None;
    }

    // Domain: alphanumerics plus . and -, at least one dot, ending on an
    // alphanumeric.
    let mut end = at + 1;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'-' {
            end += 1;
        } else {
            break;
        }
    }
    while end > at + 1 && matches!(bytes[end - 1], b'.' | b'-') {
        end -= 1;
    }
    let domain = &text[at + 1..end];
    if domain.is_empty() || !domain.contains('.') {
        return None;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> ParseOptions {
        ParseOptions::PERMISSIVE_URL_AUTOLINKS
            | ParseOptions::PERMISSIVE_EMAIL_AUTOLINKS
            | ParseOptions::PERMISSIVE_WWW_AUTOLINKS
    }

    fn single(text: &str) -> AutolinkMatch {
        let found = find_autolinks(text, all());
        assert_eq!(found.len(), 1, "expected one match in {text:?}: {found:?}");
        found[0]
    }

    #[test]
    fn bare_url() {
        let text = "see https://example.com for details";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], "https://example.com");
        assert_eq!(m.kind, AutolinkKind::Url);
    }

    #[test]
    fn trailing_punctuation_is_trimmed() {
        let text = "go to https://example.com/a.";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], "https://example.com/a");
    }

    #[test]
    fn balanced_parens_are_kept() {
        let text = "https://en.wikipedia.org/wiki/Rust_(film)";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], text);
    }

    #[test]
    fn unbalanced_close_paren_is_trimmed() {
        let text = "(see https://example.com)";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], "https://example.com");
    }

    #[test]
    fn www_prefix() {
        let text = "visit www.commonmark.org today";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], "www.commonmark.org");
        assert_eq!(m.kind, AutolinkKind::Www);
    }

    #[test]
    fn email_address() {
        let text = "mail me at someone+tag@example.co.uk please";
        let m = single(text);
        assert_eq!(&text[m.start..m.end], "someone+tag@example.co.uk");
        assert_eq!(m.kind, AutolinkKind::Email);
    }

    #[test]
    fn email_needs_domain_dot() {
        assert!(find_autolinks("a@b", all()).is_empty());
    }

    #[test]
    fn mid_word_scheme_is_not_linked() {
        assert!(find_autolinks("xhttp://example.com", all()).is_empty());
    }

    #[test]
    fn disabled_flags_find_nothing() {
        let text = "https://example.com www.example.com a@b.com";
        assert!(find_autolinks(text, ParseOptions::empty()).is_empty());
        let urls = find_autolinks(text, ParseOptions::PERMISSIVE_URL_AUTOLINKS);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].kind, AutolinkKind::Url);
    }

    #[test]
    fn multiple_matches_in_order() {
        let text = "https://a.example and b@c.org and www.d.net";
        let found = find_autolinks(text, all());
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].kind, AutolinkKind::Url);
        assert_eq!(found[1].kind, AutolinkKind::Email);
        assert_eq!(found[2].kind, AutolinkKind::Www);
    }

    #[test]
    fn split_spans_preserves_surrounding_text() {
        let source = "see https://example.com now";
        let spans = split_spans(
            source,
            TextContent::Bytes(ByteRange::new(0, source.len())),
            all(),
        );
        assert_eq!(spans.len(), 3);
        let Span::Link(link) = &spans[1] else {
            panic!("expected link, got {spans:?}");
        };
        assert_eq!(
            link.destination.as_ref().unwrap().resolve(source),
            "https://example.com"
        );
    }

    #[test]
    fn www_destination_gains_scheme() {
        let source = "www.example.com";
        let spans = split_spans(
            source,
            TextContent::Bytes(ByteRange::new(0, source.len())),
            all(),
        );
        let Span::Link(link) = &spans[0] else {
            panic!("expected link");
        };
        assert_eq!(
            link.destination.as_ref().unwrap().resolve(source),
            "http://www.example.com"
        );
    }
}

//! HTML entity decoding.
//!
//! The tokenizer resolves entity references in normal text on its own
//! (those surface in the IR as owned strings). This module covers the
//! payloads the tokenizer leaves raw - inline HTML and HTML blocks - and
//! is the single place numeric and named references are interpreted.

use std::borrow::Cow;

/// Named entities, sorted by name for binary search.
///
/// A common subset; the full HTML5 table is external data and absent names
/// simply pass through verbatim.
static NAMED: &[(&str, &str)] = &[
    ("AElig", "\u{C6}"),
    ("Alpha", "\u{391}"),
    ("Beta", "\u{392}"),
    ("Dagger", "\u{2021}"),
    ("Delta", "\u{394}"),
    ("Gamma", "\u{393}"),
    ("Lambda", "\u{39B}"),
    ("Omega", "\u{3A9}"),
    ("Phi", "\u{3A6}"),
    ("Pi", "\u{3A0}"),
    ("Prime", "\u{2033}"),
    ("Psi", "\u{3A8}"),
    ("Sigma", "\u{3A3}"),
    ("Theta", "\u{398}"),
    ("Xi", "\u{39E}"),
    ("aelig", "\u{E6}"),
    ("alpha", "\u{3B1}"),
    ("amp", "&"),
    ("apos", "'"),
    ("asymp", "\u{2248}"),
    ("beta", "\u{3B2}"),
    ("brvbar", "\u{A6}"),
    ("bull", "\u{2022}"),
    ("cap", "\u{2229}"),
    ("cedil", "\u{B8}"),
    ("cent", "\u{A2}"),
    ("chi", "\u{3C7}"),
    ("copy", "\u{A9}"),
    ("cup", "\u{222A}"),
    ("curren", "\u{A4}"),
    ("dagger", "\u{2020}"),
    ("darr", "\u{2193}"),
    ("deg", "\u{B0}"),
    ("delta", "\u{3B4}"),
    ("divide", "\u{F7}"),
    ("empty", "\u{2205}"),
    ("epsilon", "\u{3B5}"),
    ("equiv", "\u{2261}"),
    ("eta", "\u{3B7}"),
    ("exist", "\u{2203}"),
    ("forall", "\u{2200}"),
    ("frac12", "\u{BD}"),
    ("frac14", "\u{BC}"),
    ("frac34", "\u{BE}"),
    ("gamma", "\u{3B3}"),
    ("ge", "\u{2265}"),
    ("gt", ">"),
    ("harr", "\u{2194}"),
    ("hellip", "\u{2026}"),
    ("iexcl", "\u{A1}"),
    ("infin", "\u{221E}"),
    ("int", "\u{222B}"),
    ("iota", "\u{3B9}"),
    ("iquest", "\u{BF}"),
    ("isin", "\u{2208}"),
    ("kappa", "\u{3BA}"),
    ("lambda", "\u{3BB}"),
    ("laquo", "\u{AB}"),
    ("larr", "\u{2190}"),
    ("ldquo", "\u{201C}"),
    ("le", "\u{2264}"),
    ("lsquo", "\u{2018}"),
    ("lt", "<"),
    ("macr", "\u{AF}"),
    ("mdash", "\u{2014}"),
    ("micro", "\u{B5}"),
    ("middot", "\u{B7}"),
    ("minus", "\u{2212}"),
    ("mu", "\u{3BC}"),
    ("nabla", "\u{2207}"),
    ("nbsp", "\u{A0}"),
    ("ndash", "\u{2013}"),
    ("ne", "\u{2260}"),
    ("ni", "\u{220B}"),
    ("not", "\u{AC}"),
    ("notin", "\u{2209}"),
    ("nsub", "\u{2284}"),
    ("nu", "\u{3BD}"),
    ("omega", "\u{3C9}"),
    ("oplus", "\u{2295}"),
    ("ordf", "\u{AA}"),
    ("ordm", "\u{BA}"),
    ("otimes", "\u{2297}"),
    ("para", "\u{B6}"),
    ("part", "\u{2202}"),
    ("permil", "\u{2030}"),
    ("perp", "\u{22A5}"),
    ("phi", "\u{3C6}"),
    ("pi", "\u{3C0}"),
    ("plusmn", "\u{B1}"),
    ("pound", "\u{A3}"),
    ("prime", "\u{2032}"),
    ("prod", "\u{220F}"),
    ("prop", "\u{221D}"),
    ("psi", "\u{3C8}"),
    ("quot", "\""),
    ("radic", "\u{221A}"),
    ("raquo", "\u{BB}"),
    ("rarr", "\u{2192}"),
    ("rdquo", "\u{201D}"),
    ("reg", "\u{AE}"),
    ("rho", "\u{3C1}"),
    ("rsquo", "\u{2019}"),
    ("sect", "\u{A7}"),
    ("shy", "\u{AD}"),
    ("sigma", "\u{3C3}"),
    ("sim", "\u{223C}"),
    ("sub", "\u{2282}"),
    ("sube", "\u{2286}"),
    ("sum", "\u{2211}"),
    ("sup", "\u{2283}"),
    ("sup1", "\u{B9}"),
    ("sup2", "\u{B2}"),
    ("sup3", "\u{B3}"),
    ("supe", "\u{2287}"),
    ("tau", "\u{3C4}"),
    ("theta", "\u{3B8}"),
    ("tilde", "\u{2DC}"),
    ("times", "\u{D7}"),
    ("trade", "\u{2122}"),
    ("uarr", "\u{2191}"),
    ("uml", "\u{A8}"),
    ("upsilon", "\u{3C5}"),
    ("xi", "\u{3BE}"),
    ("yen", "\u{A5}"),
    ("zeta", "\u{3B6}"),
];

fn named_table() -> &'static [(&'static str, &'static str)] {
    debug_assert!(!NAMED.is_empty(), "entity table missing");
    NAMED
}

/// Decode a single `&...;` token.
///
/// Decimal (`&#65;`), hex (`&#x41;` / `&#X41;`) and named (`&amp;`) forms
/// are resolved; anything invalid or unknown is returned verbatim. Pure and
/// deterministic.
pub fn decode(token: &str) -> Cow<'_, str> {
    let Some(inner) = token
        .strip_prefix('&')
        .and_then(|t| t.strip_suffix(';'))
        .filter(|t| !t.is_empty())
    else {
        return Cow::Borrowed(token);
    };

    if let Some(num) = inner.strip_prefix('#') {
        return match decode_numeric(num) {
            Some(ch) => Cow::Owned(ch.to_string()),
            None => Cow::Borrowed(token),
        };
    }

    match named_table().binary_search_by_key(&inner, |&(name, _)| name) {
        Ok(idx) => Cow::Borrowed(named_table()[idx].1),
        Err(_) => Cow::Borrowed(token),
    }
}

fn decode_numeric(num: &str) -> Option<char> {
    let value = if let Some(hex) = num.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        num.parse::<u32>().ok()?
    };
    if value == 0 {
        return Some('\u{FFFD}');
    }
    char::from_u32(value)
}

/// Rewrite every embedded `&...;` reference in `text`.
///
/// Borrows the input when nothing decodes. Candidate tokens must be short
/// and contain no whitespace or a second `&`, so stray ampersands survive
/// untouched.
pub fn decode_references(text: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut emitted = 0; // bytes of `text` already copied out
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('&') {
        let amp = pos + rel;
        let mut end = None;
        for (i, c) in text[amp + 1..].char_indices().take(32) {
            if c == ';' {
                end = Some(amp + 1 + i + 1);
                break;
            }
            if c == '&' || c.is_whitespace() {
                break;
            }
        }
        let Some(end) = end else {
            pos = amp + 1;
            continue;
        };

        let token = &text[amp..end];
        let decoded = decode(token);
        if matches!(&decoded, Cow::Borrowed(same) if *same == token) {
            pos = end;
            continue;
        }
        let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
        buf.push_str(&text[emitted..amp]);
        buf.push_str(&decoded);
        emitted = end;
        pos = end;
    }

    match out {
        None => Cow::Borrowed(text),
        Some(mut buf) => {
            buf.push_str(&text[emitted..]);
            Cow::Owned(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_for_binary_search() {
        for pair in NAMED.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn named_entities() {
        assert_eq!(decode("&amp;"), "&");
        assert_eq!(decode("&lt;"), "<");
        assert_eq!(decode("&mdash;"), "\u{2014}");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(decode("&notarealentity;"), "&notarealentity;");
    }

    #[test]
    fn decimal_and_hex() {
        assert_eq!(decode("&#65;"), "A");
        assert_eq!(decode("&#x41;"), "A");
        assert_eq!(decode("&#X41;"), "A");
        assert_eq!(decode("&#128512;"), "\u{1F600}");
    }

    #[test]
    fn invalid_scalars_pass_through() {
        // Surrogate range and out-of-range values are not scalar values.
        assert_eq!(decode("&#55296;"), "&#55296;");
        assert_eq!(decode("&#x110000;"), "&#x110000;");
        assert_eq!(decode("&#99999999999999;"), "&#99999999999999;");
    }

    #[test]
    fn nul_becomes_replacement() {
        assert_eq!(decode("&#0;"), "\u{FFFD}");
    }

    #[test]
    fn malformed_tokens_pass_through() {
        assert_eq!(decode("&;"), "&;");
        assert_eq!(decode("amp"), "amp");
        assert_eq!(decode("&amp"), "&amp");
    }

    #[test]
    fn reference_sweep_borrows_when_clean() {
        let text = "no entities here & none there";
        assert!(matches!(decode_references(text), Cow::Borrowed(_)));
    }

    #[test]
    fn reference_sweep_decodes_embedded() {
        assert_eq!(
            decode_references("<b>Fish &amp; Chips &copy; 2025</b>"),
            "<b>Fish & Chips \u{A9} 2025</b>"
        );
    }

    #[test]
    fn reference_sweep_keeps_unknowns() {
        assert_eq!(
            decode_references("a &bogus; b &amp; c"),
            "a &bogus; b & c"
        );
    }
}

//! Serialized syntax-highlighting surface.
//!
//! The underlying highlighter is not assumed thread-safe; a spawned actor
//! task owns it together with the result cache, and a channel handle
//! serializes every operation. Callers may issue requests from any number
//! of concurrent contexts; each request is atomic with respect to cache
//! state, and dropping a reply future never corrupts the cache.

use std::sync::Arc;

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::lru::LruCache;
use crate::styled::{ColorRgb, FontFamily, StyledRun, StyledText};

/// Theme applied when a requested theme is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// The engine behind the cache surface. The one dynamic-dispatch boundary
/// in the crate.
pub trait Highlight: Send {
    fn highlight(&mut self, code: &str, language: Option<&str>) -> StyledText;

    /// Themes the engine advertises.
    fn themes(&self) -> Vec<String>;

    /// Switch themes; returns false (state unchanged) for unknown names.
    fn set_theme(&mut self, name: &str) -> bool;

    fn theme(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct HighlighterConfig {
    pub theme: String,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub cache_capacity: usize,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            font_name: None,
            font_size: None,
            cache_capacity: 128,
        }
    }
}

/// Cache key: content-addressed by the full code bytes, never a digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightKey {
    pub theme: Arc<str>,
    pub language: Option<String>,
    pub code: Arc<str>,
}

enum Command {
    Highlight {
        code: Arc<str>,
        language: Option<String>,
        resp: oneshot::Sender<Arc<StyledText>>,
    },
    SetTheme {
        name: String,
        resp: oneshot::Sender<String>,
    },
    Themes {
        resp: oneshot::Sender<Vec<String>>,
    },
}

/// Handle to the highlight actor. Cheap to clone and share.
#[derive(Clone)]
pub struct CodeHighlighter {
    tx: mpsc::Sender<Command>,
}

impl CodeHighlighter {
    /// Spawn the actor with the bundled syntect engine. Requires a running
    /// tokio runtime.
    pub fn new(config: HighlighterConfig) -> Self {
        let engine = SyntectHighlighter::new(&config);
        Self::with_engine(config, Box::new(engine))
    }

    /// Spawn the actor around a caller-provided engine.
    pub fn with_engine(config: HighlighterConfig, mut engine: Box<dyn Highlight>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Command>(32);
        tokio::spawn(async move {
            let mut cache: LruCache<HighlightKey, Arc<StyledText>> =
                LruCache::new(config.cache_capacity);
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Highlight {
                        code,
                        language,
                        resp,
                    } => {
                        let key = HighlightKey {
                            theme: Arc::from(engine.theme()),
                            language: language.clone(),
                            code: code.clone(),
                        };
                        let styled = match cache.get(&key) {
                            Some(hit) => hit.clone(),
                            None => {
                                let fresh =
                                    Arc::new(engine.highlight(&code, language.as_deref()));
                                cache.put(key, fresh.clone());
                                fresh
                            }
                        };
                        // The caller may have gone away; the cache stays
                        // consistent either way.
                        let _ = resp.send(styled);
                    }
                    Command::SetTheme { name, resp } => {
                        if !engine.set_theme(&name) {
                            warn!(theme = %name, "unknown theme, falling back to default");
                            engine.set_theme(DEFAULT_THEME);
                        }
                        cache.clear();
                        let _ = resp.send(engine.theme().to_string());
                    }
                    Command::Themes { resp } => {
                        let _ = resp.send(engine.themes());
                    }
                }
            }
        });
        Self { tx }
    }

    /// Highlight `code`, hitting the cache when the exact (theme, language,
    /// code) content was highlighted before.
    pub async fn highlight(&self, code: impl Into<Arc<str>>, language: Option<&str>) -> Arc<StyledText> {
        let (resp, rx) = oneshot::channel();
        let command = Command::Highlight {
            code: code.into(),
            language: language.map(str::to_string),
            resp,
        };
        if self.tx.send(command).await.is_err() {
            return Arc::new(StyledText::default());
        }
        rx.await.unwrap_or_default()
    }

    /// Switch themes, invalidating the cache. Unknown names coerce to
    /// [`DEFAULT_THEME`]; returns the theme actually applied.
    pub async fn set_theme(&self, name: &str) -> String {
        let (resp, rx) = oneshot::channel();
        let command = Command::SetTheme {
            name: name.to_string(),
            resp,
        };
        if self.tx.send(command).await.is_err() {
            return DEFAULT_THEME.to_string();
        }
        rx.await.unwrap_or_else(|_| DEFAULT_THEME.to_string())
    }

    /// Themes the underlying engine advertises.
    pub async fn themes(&self) -> Vec<String> {
        let (resp, rx) = oneshot::channel();
        if self.tx.send(Command::Themes { resp }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}

/// Syntect-backed engine using the bundled syntax and theme sets.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    theme: String,
    font: FontFamily,
    font_size: f32,
}

impl SyntectHighlighter {
    pub fn new(config: &HighlighterConfig) -> Self {
        let mut highlighter = Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
            theme: DEFAULT_THEME.to_string(),
            font: config
                .font_name
                .as_deref()
                .map(|name| FontFamily::Named(Arc::from(name)))
                .unwrap_or(FontFamily::Monospace),
            font_size: config.font_size.unwrap_or(13.0),
        };
        if !highlighter.set_theme(&config.theme) {
            warn!(theme = %config.theme, "unknown theme, using default");
        }
        highlighter
    }
}

impl Highlight for SyntectHighlighter {
    fn highlight(&mut self, code: &str, language: Option<&str>) -> StyledText {
        let syntax = language
            .and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());
        let theme = &self.themes.themes[&self.theme];
        let mut lines = HighlightLines::new(syntax, theme);
        let mut out = StyledText::default();
        for line in LinesWithEndings::from(code) {
            match lines.highlight_line(line, &self.syntaxes) {
                Ok(regions) => {
                    for (style, piece) in regions {
                        out.push(StyledRun {
                            text: piece.to_string(),
                            size: self.font_size,
                            font: self.font.clone(),
                            color: Some(ColorRgb::new(
                                style.foreground.r,
                                style.foreground.g,
                                style.foreground.b,
                            )),
                            background: None,
                            bold: style.font_style.contains(FontStyle::BOLD),
                            italics: style.font_style.contains(FontStyle::ITALIC),
                            strikethrough: false,
                            underline: style.font_style.contains(FontStyle::UNDERLINE),
                        });
                    }
                }
                Err(err) => {
                    warn!(error = %err, "highlight failed, emitting plain run");
                    out.push(StyledRun {
                        font: self.font.clone(),
                        ..StyledRun::plain(line, self.font_size)
                    });
                }
            }
        }
        out
    }

    fn themes(&self) -> Vec<String> {
        self.themes.themes.keys().cloned().collect()
    }

    fn set_theme(&mut self, name: &str) -> bool {
        if self.themes.themes.contains_key(name) {
            self.theme = name.to_string();
            true
        } else {
            false
        }
    }

    fn theme(&self) -> &str {
        &self.theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts engine invocations so cache behavior is observable.
    struct CountingEngine {
        calls: Arc<AtomicUsize>,
        theme: String,
    }

    impl Highlight for CountingEngine {
        fn highlight(&mut self, code: &str, _language: Option<&str>) -> StyledText {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut out = StyledText::default();
            out.push(StyledRun::plain(code, 13.0));
            out
        }

        fn themes(&self) -> Vec<String> {
            vec!["light".to_string(), "dark".to_string()]
        }

        fn set_theme(&mut self, name: &str) -> bool {
            if name == "light" || name == "dark" {
                self.theme = name.to_string();
                true
            } else {
                false
            }
        }

        fn theme(&self) -> &str {
            &self.theme
        }
    }

    fn counting_highlighter(capacity: usize) -> (CodeHighlighter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine {
            calls: calls.clone(),
            theme: "dark".to_string(),
        };
        let config = HighlighterConfig {
            theme: "dark".to_string(),
            cache_capacity: capacity,
            ..Default::default()
        };
        (
            CodeHighlighter::with_engine(config, Box::new(engine)),
            calls,
        )
    }

    #[tokio::test]
    async fn cache_hit_returns_same_styled_text() {
        let (hl, calls) = counting_highlighter(8);
        let a = hl.highlight("let x = 1;", Some("rust")).await;
        let b = hl.highlight("let x = 1;", Some("rust")).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_language_is_a_different_key() {
        let (hl, calls) = counting_highlighter(8);
        hl.highlight("print(1)", Some("python")).await;
        hl.highlight("print(1)", Some("ruby")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn equal_prefix_codes_are_distinct_entries() {
        let (hl, calls) = counting_highlighter(8);
        let long_a = format!("{}a", "x".repeat(4096));
        let long_b = format!("{}b", "x".repeat(4096));
        let a = hl.highlight(long_a.as_str(), None).await;
        let b = hl.highlight(long_b.as_str(), None).await;
        assert_ne!(a.text(), b.text());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_theme_falls_back_to_default_name() {
        let (hl, _calls) = counting_highlighter(8);
        let applied = hl.set_theme("light").await;
        assert_eq!(applied, "light");
        // Unknown themes coerce; the counting engine rejects the default
        // name too, so it reports whatever stayed applied.
        let applied = hl.set_theme("no-such-theme").await;
        assert_eq!(applied, "light");
    }

    #[tokio::test]
    async fn set_theme_invalidates_cache() {
        let (hl, calls) = counting_highlighter(8);
        hl.highlight("code", None).await;
        hl.set_theme("light").await;
        hl.highlight("code", None).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn eviction_respects_capacity() {
        let (hl, calls) = counting_highlighter(2);
        hl.highlight("a", None).await;
        hl.highlight("b", None).await;
        hl.highlight("c", None).await;
        // "a" was evicted; highlighting it again re-invokes the engine.
        hl.highlight("a", None).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // "c" is still cached.
        hl.highlight("c", None).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn syntect_engine_advertises_default_theme() {
        let engine = SyntectHighlighter::new(&HighlighterConfig::default());
        assert!(engine.themes().iter().any(|t| t == DEFAULT_THEME));
        assert_eq!(engine.theme(), DEFAULT_THEME);
    }

    #[test]
    fn syntect_highlights_known_language() {
        let mut engine = SyntectHighlighter::new(&HighlighterConfig::default());
        let styled = engine.highlight("fn main() {}\n", Some("rust"));
        assert_eq!(styled.text(), "fn main() {}\n");
        assert!(styled.runs.len() > 1, "expected multiple styled regions");
    }
}

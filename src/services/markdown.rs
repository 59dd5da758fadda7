//! Markdown rendering service
//!
//! Blog post bodies are stored as Markdown and rendered to HTML with
//! pulldown-cmark when served.
//!
//! # Example
//!
//! ```
//! use sawavo::services::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Hello World\n\nThis is **bold** text.");
//! assert!(html.contains("<h1>"));
//! assert!(html.contains("<strong>"));
//! ```

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Words read per minute when estimating read time
const WORDS_PER_MINUTE: usize = 200;

/// A stateless Markdown renderer.
///
/// Supports headings, lists, links, images, blockquotes, code blocks (with a
/// `language-*` class when fenced with a language), tables, task lists,
/// strikethrough and smart punctuation.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

// `Options` does not implement `Default` in pulldown-cmark 0.10; this matches
// what the derive would produce (no extensions enabled).
impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self { options: Options::empty() }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        Self { options }
    }

    /// Renders Markdown text to HTML.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let events = process_code_blocks(parser);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Text content only, with block boundaries collapsed to single spaces.
    ///
    /// Used for word counts and as a fallback excerpt.
    pub fn plain_text(&self, markdown: &str) -> String {
        let mut out = String::new();
        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Text(text) | Event::Code(text) => out.push_str(&text),
                Event::SoftBreak
                | Event::HardBreak
                | Event::End(
                    TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::TableCell | TagEnd::CodeBlock,
                ) => out.push(' '),
                _ => {}
            }
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Estimated minutes to read, at least one
    pub fn read_time_minutes(&self, markdown: &str) -> usize {
        let words = self.plain_text(markdown).split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE).max(1)
    }
}

/// Human read-time label in the locale, e.g. "8 min read" / "8 دقائق قراءة"
pub fn read_time_label(minutes: usize, locale: &str) -> String {
    if locale.eq_ignore_ascii_case("ar") {
        format!("{} دقائق قراءة", minutes)
    } else {
        format!("{} min read", minutes)
    }
}

/// Replace code blocks with pre-rendered HTML so fenced languages carry a class
fn process_code_blocks(parser: Parser<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut in_code_block = false;
    let mut code_lang: Option<String> = None;
    let mut code_content = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_content.clear();
                code_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                let block = match code_lang.take() {
                    Some(lang) => format!(
                        "<pre><code class=\"language-{}\">{}</code></pre>",
                        html_escape(&lang),
                        html_escape(&code_content)
                    ),
                    None => format!("<pre><code>{}</code></pre>", html_escape(&code_content)),
                };
                events.push(Event::Html(block.into()));
            }
            Event::Text(text) if in_code_block => code_content.push_str(&text),
            _ => events.push(event),
        }
    }

    events
}

/// Escapes HTML special characters in a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

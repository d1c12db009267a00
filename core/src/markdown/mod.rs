//! Plain-text extraction from markdown post bodies.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::enrich::truncate_chars;

fn parser(content: &str) -> Parser<'_> {
    let parser_options: Options = [
        Options::ENABLE_GFM,
        Options::ENABLE_TABLES,
        Options::ENABLE_STRIKETHROUGH,
    ]
    .into_iter()
    .collect();

    Parser::new_ext(content, parser_options)
}

/// Strips markdown syntax, keeping the readable text.
///
/// Block elements are separated by newlines. Code blocks and inline code are kept; HTML is
/// dropped.
pub fn plain_text(content: &str) -> String {
    let mut text = String::with_capacity(content.len());

    for event in parser(content) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => ensure_newline(&mut text),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::CodeBlock
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => ensure_newline(&mut text),
            Event::End(TagEnd::TableCell) => text.push(' '),
            _ => {}
        }
    }

    text.trim().to_string()
}

/// Plain text of `content`, cut to at most `max_chars` characters.
pub fn sample(content: &str, max_chars: usize) -> String {
    truncate_chars(&plain_text(content), max_chars).to_string()
}

fn ensure_newline(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting() {
        let md = "# Title\n\nSome *emphasis* and a [link](https://example.com).\n\n- one\n- two\n";
        assert_eq!(plain_text(md), "Title\nSome emphasis and a link.\none\ntwo");
    }

    #[test]
    fn keeps_code() {
        let md = "Use `cargo`:\n\n```sh\ncargo build\n```\n";
        assert_eq!(plain_text(md), "Use cargo:\ncargo build");
    }

    #[test]
    fn drops_html() {
        assert_eq!(plain_text("<div>raw</div>\n\nText"), "Text");
    }

    #[test]
    fn sample_is_cut_to_length() {
        assert_eq!(sample("**Hello** world", 5), "Hello");
        assert_eq!(sample("", 5), "");
    }
}

//! Token stream → owned block nodes.
//!
//! Block elements map to block kinds, everything else is flattened into
//! the text of the enclosing block. Documents are flat, so a block element
//! nested inside a bubble or quote (for example a `<p>` that some editors
//! emit inside `<blockquote>`) only contributes its text.

use std::sync::OnceLock;

use hypewriter_engine::editing::{
    BlockKind, BubblePosition, Document, EditError, IndentOptions, Node, QuoteStyle, RuleStyle,
};
use log::debug;
use regex::Regex;

use crate::lexer::{TokenKind, lex};

/// A start tag split into its name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Tag {
    /// Parse the source of a start tag such as `<p class="x">`.
    pub fn parse(source: &str) -> Option<Tag> {
        static NAME: OnceLock<Regex> = OnceLock::new();
        static ATTR: OnceLock<Regex> = OnceLock::new();
        let name_re = NAME.get_or_init(|| {
            Regex::new(r"^</?([a-zA-Z][a-zA-Z0-9]*)").expect("Invalid tag name regex")
        });
        let attr_re = ATTR.get_or_init(|| {
            Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`/]+)))?"#)
                .expect("Invalid attribute regex")
        });

        let name_match = name_re.captures(source)?;
        let name = name_match[1].to_ascii_lowercase();
        let rest = &source[name_match[0].len()..];
        let attrs = attr_re
            .captures_iter(rest)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or("", |m| m.as_str());
                (
                    caps[1].to_ascii_lowercase(),
                    html_escape::decode_html_entities(value).into_owned(),
                )
            })
            .collect();
        Some(Tag { name, attrs })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Indent level encoded in a `style="margin-left: Nem"` attribute.
pub fn indent_from_style(style: Option<&str>, options: &IndentOptions) -> u8 {
    static MARGIN: OnceLock<Regex> = OnceLock::new();
    let margin_re = MARGIN.get_or_init(|| {
        Regex::new(r"margin-left\s*:\s*(\d+(?:\.\d+)?)").expect("Invalid margin regex")
    });

    let Some(margin) = style
        .and_then(|style| margin_re.captures(style))
        .and_then(|caps| caps[1].parse::<f32>().ok())
    else {
        return 0;
    };
    if options.indent_size <= 0.0 {
        return 0;
    }
    let level = (margin / options.indent_size).round();
    options.clamp(level.clamp(0.0, f32::from(u8::MAX)) as u8)
}

/// Block kind for a start tag, if the tag opens a block.
fn block_kind(tag: &Tag, options: &IndentOptions) -> Option<BlockKind> {
    let indent = || indent_from_style(tag.attr("style"), options);
    let kind = match tag.name.as_str() {
        "p" => BlockKind::Paragraph { indent: indent() },
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading {
            level: tag.name[1..].parse().unwrap_or(1),
            indent: indent(),
        },
        "div" if tag.attr("data-type") == Some("bubble") => {
            BlockKind::bubble(BubblePosition::from_attr(tag.attr("data-position")))
        }
        "blockquote" => BlockKind::Blockquote {
            style: QuoteStyle::from(tag.attr("data-type").unwrap_or("line")),
            indent: indent(),
        },
        "hr" => BlockKind::horizontal_rule(RuleStyle::from(tag.attr("data-type").unwrap_or("solid"))),
        _ => return None,
    };
    Some(kind)
}

struct OpenBlock {
    kind: BlockKind,
    /// Closing tag name; `None` for text that appeared outside any block.
    tag: Option<String>,
    /// Unclosed elements of the same name nested inside.
    nested: usize,
    text: String,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Node>,
    open: Option<OpenBlock>,
}

impl Builder {
    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            self.blocks.push(Node::textblock(open.kind, &open.text));
        }
    }

    fn start_tag(&mut self, tag: Tag, options: &IndentOptions) {
        if let Some(open) = &mut self.open
            && open.tag.as_deref() == Some(tag.name.as_str())
        {
            open.nested += 1;
            return;
        }
        let Some(kind) = block_kind(&tag, options) else {
            return;
        };
        if kind.is_leaf() {
            self.close();
            self.blocks.push(Node::block(kind, Vec::new()));
            return;
        }
        // Flat content: a container swallows nested block elements.
        let in_container = self.open.as_ref().is_some_and(|open| {
            open.tag.is_some() && (open.kind.is_bubble() || open.kind.is_blockquote())
        });
        if in_container {
            return;
        }
        self.close();
        self.open = Some(OpenBlock {
            kind,
            tag: Some(tag.name),
            nested: 0,
            text: String::new(),
        });
    }

    fn end_tag(&mut self, name: &str) {
        let Some(open) = &mut self.open else {
            return;
        };
        if open.tag.as_deref() != Some(name) {
            return;
        }
        if open.nested > 0 {
            open.nested -= 1;
        } else {
            self.close();
        }
    }

    fn text(&mut self, raw: &str) {
        let text = html_escape::decode_html_entities(raw);
        if let Some(open) = &mut self.open {
            open.text.push_str(&text);
            return;
        }
        if text.trim().is_empty() {
            return;
        }
        debug!("wrapping stray text in a paragraph");
        self.open = Some(OpenBlock {
            kind: BlockKind::paragraph(),
            tag: None,
            nested: 0,
            text: text.into_owned(),
        });
    }
}

/// Parse chapter HTML into top-level block nodes.
pub fn parse_nodes(input: &str, options: &IndentOptions) -> Vec<Node> {
    let mut builder = Builder::default();
    for token in lex(input) {
        match token.kind {
            TokenKind::StartTag => match Tag::parse(token.text) {
                Some(tag) => builder.start_tag(tag, options),
                None => builder.text(token.text),
            },
            TokenKind::EndTag => {
                if let Some(tag) = Tag::parse(token.text) {
                    builder.end_tag(&tag.name);
                }
            }
            TokenKind::Comment => {}
            TokenKind::Text => builder.text(token.text),
        }
    }
    builder.close();
    builder.blocks
}

/// Parse chapter HTML into a document.
pub fn parse_html(input: &str, options: &IndentOptions) -> Result<Document, EditError> {
    Document::from_nodes(parse_nodes(input, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(input: &str) -> Vec<Node> {
        parse_nodes(input, &IndentOptions::default())
    }

    #[test]
    fn tag_attributes() {
        let tag = Tag::parse(r#"<DIV data-type="bubble" data-position='right' hidden class=x>"#).unwrap();
        assert_eq!(tag.name, "div");
        assert_eq!(tag.attr("data-type"), Some("bubble"));
        assert_eq!(tag.attr("data-position"), Some("right"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert_eq!(tag.attr("class"), Some("x"));
        assert_eq!(tag.attr("style"), None);
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some("margin-left: 4em"), 2)]
    #[case(Some("color: red; margin-left:2em"), 1)]
    #[case(Some("margin-left: 3em"), 2)]
    #[case(Some("margin-left: 100em"), 8)]
    #[case(Some("margin-left: auto"), 0)]
    fn indent_from_margin(#[case] style: Option<&str>, #[case] expected: u8) {
        assert_eq!(indent_from_style(style, &IndentOptions::default()), expected);
    }

    #[test]
    fn parses_every_block_kind() {
        let html = concat!(
            r#"<h2>Title</h2>"#,
            r#"<p style="margin-left: 2em">Hello &amp; welcome</p>"#,
            r#"<div data-type="bubble" data-position="right" class="bubble bubble-right">Hi</div>"#,
            r#"<blockquote data-type="bubble-left" class="blockquote blockquote-bubble-left">Quote</blockquote>"#,
            r#"<hr data-type="solid">"#,
            r#"<p></p>"#,
        );
        assert_eq!(
            parse(html),
            vec![
                Node::textblock(BlockKind::Heading { level: 2, indent: 0 }, "Title"),
                Node::textblock(BlockKind::Paragraph { indent: 1 }, "Hello & welcome"),
                Node::textblock(BlockKind::bubble(BubblePosition::Right), "Hi"),
                Node::textblock(BlockKind::blockquote(QuoteStyle::BubbleLeft), "Quote"),
                Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
                Node::paragraph(""),
            ]
        );
    }

    #[test]
    fn missing_attributes_use_defaults() {
        assert_eq!(
            parse(r#"<div data-type="bubble">a</div><blockquote>b</blockquote><hr>"#),
            vec![
                Node::textblock(BlockKind::bubble(BubblePosition::Left), "a"),
                Node::textblock(BlockKind::blockquote(QuoteStyle::Line), "b"),
                Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
            ]
        );
    }

    #[test]
    fn inline_markup_is_flattened() {
        assert_eq!(
            parse("<p>Hello <strong>bold</strong> <em>world</em><br></p>"),
            vec![Node::paragraph("Hello bold world")]
        );
    }

    #[test]
    fn paragraph_inside_quote_contributes_text() {
        assert_eq!(
            parse("<blockquote><p>Inner</p></blockquote><p>After</p>"),
            vec![
                Node::textblock(BlockKind::blockquote(QuoteStyle::Line), "Inner"),
                Node::paragraph("After"),
            ]
        );
    }

    #[test]
    fn nested_divs_close_at_the_right_tag() {
        assert_eq!(
            parse(r#"<div data-type="bubble">a<div>b</div>c</div><p>d</p>"#),
            vec![
                Node::textblock(BlockKind::bubble(BubblePosition::Left), "abc"),
                Node::paragraph("d"),
            ]
        );
    }

    #[test]
    fn stray_text_becomes_a_paragraph() {
        assert_eq!(
            parse("\n  loose text<!-- note --><p>x</p>\n"),
            vec![Node::paragraph("\n  loose text"), Node::paragraph("x")]
        );
    }

    #[test]
    fn unclosed_block_is_closed_at_the_end() {
        assert_eq!(parse("<p>never closed"), vec![Node::paragraph("never closed")]);
        assert_eq!(parse(""), vec![]);
    }

    #[test]
    fn parse_html_builds_a_document() {
        let doc = parse_html("<p>a</p><hr>", &IndentOptions::default()).unwrap();
        assert_eq!(doc.size(), 4);
    }
}

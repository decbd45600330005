//! Document → chapter HTML.

use std::fmt::Write;

use hypewriter_engine::editing::{BlockKind, Document, IndentOptions, NodeId};

/// `style` attribute for an indented block, empty at level zero.
fn indent_style(indent: u8, options: &IndentOptions) -> String {
    if indent == 0 {
        return String::new();
    }
    let margin = f32::from(indent) * options.indent_size;
    format!(r#" style="margin-left: {margin}em""#)
}

fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

fn render_block(out: &mut String, doc: &Document, id: NodeId, options: &IndentOptions) {
    let Some(kind) = doc.kind(id) else {
        return;
    };
    let text = doc.text_content(id);
    let text = html_escape::encode_text(&text);
    // Writing into a String cannot fail.
    let _ = match kind {
        BlockKind::Doc => Ok(()),
        BlockKind::Paragraph { indent } => {
            write!(out, "<p{}>{text}</p>", indent_style(*indent, options))
        }
        BlockKind::Heading { level, indent } => {
            let level = (*level).clamp(1, 6);
            write!(
                out,
                "<h{level}{}>{text}</h{level}>",
                indent_style(*indent, options)
            )
        }
        BlockKind::Bubble { position } => write!(
            out,
            r#"<div data-type="bubble" data-position="{position}" class="bubble bubble-{position}">{text}</div>"#
        ),
        BlockKind::Blockquote { style, indent } => {
            let style = attr(style.as_str());
            write!(
                out,
                r#"<blockquote data-type="{style}" class="blockquote blockquote-{style}"{}>{text}</blockquote>"#,
                indent_style(*indent, options)
            )
        }
        BlockKind::HorizontalRule { style } => {
            write!(out, r#"<hr data-type="{}">"#, attr(style.as_str()))
        }
    };
}

/// Serialize a document as chapter HTML, one element per top-level block.
pub fn to_html(doc: &Document, options: &IndentOptions) -> String {
    let mut out = String::new();
    for &block in doc.top_level() {
        render_block(&mut out, doc, block, options);
    }
    out
}

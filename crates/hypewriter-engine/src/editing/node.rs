//! Owned node values and block attributes.
//!
//! [`Node`] is the detached, owned form of a document subtree. It is what
//! commands build before inserting, what the markup layer produces when
//! loading a chapter, and what [`Document::to_nodes`] hands back for export.
//! The live tree is stored in an arena (see [`crate::editing::document`]).
//!
//! [`Document::to_nodes`]: crate::editing::Document::to_nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side a speech bubble is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubblePosition {
    #[default]
    Left,
    Right,
}

impl BubblePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            BubblePosition::Left => "left",
            BubblePosition::Right => "right",
        }
    }

    /// Parse a `data-position` value. Anything other than `right` is `left`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("right") => BubblePosition::Right,
            _ => BubblePosition::Left,
        }
    }
}

impl fmt::Display for BubblePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual variant of a blockquote. Unknown names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuoteStyle {
    #[default]
    Line,
    BubbleLeft,
    BubbleRight,
    Other(String),
}

impl QuoteStyle {
    pub fn as_str(&self) -> &str {
        match self {
            QuoteStyle::Line => "line",
            QuoteStyle::BubbleLeft => "bubble-left",
            QuoteStyle::BubbleRight => "bubble-right",
            QuoteStyle::Other(name) => name,
        }
    }
}

impl From<&str> for QuoteStyle {
    fn from(value: &str) -> Self {
        match value {
            "" | "line" => QuoteStyle::Line,
            "bubble-left" => QuoteStyle::BubbleLeft,
            "bubble-right" => QuoteStyle::BubbleRight,
            other => QuoteStyle::Other(other.to_string()),
        }
    }
}

impl From<String> for QuoteStyle {
    fn from(value: String) -> Self {
        QuoteStyle::from(value.as_str())
    }
}

impl From<QuoteStyle> for String {
    fn from(value: QuoteStyle) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line style of a horizontal rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleStyle {
    #[default]
    Solid,
    Other(String),
}

impl RuleStyle {
    pub fn as_str(&self) -> &str {
        match self {
            RuleStyle::Solid => "solid",
            RuleStyle::Other(name) => name,
        }
    }
}

impl From<&str> for RuleStyle {
    fn from(value: &str) -> Self {
        match value {
            "" | "solid" => RuleStyle::Solid,
            other => RuleStyle::Other(other.to_string()),
        }
    }
}

impl From<String> for RuleStyle {
    fn from(value: String) -> Self {
        RuleStyle::from(value.as_str())
    }
}

impl From<RuleStyle> for String {
    fn from(value: RuleStyle) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RuleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute-free node type, used for matching and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Bubble,
    Blockquote,
    HorizontalRule,
    Text,
}

impl NodeType {
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Bubble => "bubble",
            NodeType::Blockquote => "blockquote",
            NodeType::HorizontalRule => "horizontalRule",
            NodeType::Text => "text",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

/// A block node type together with its attributes.
///
/// `indent` exists only on the indentable kinds (paragraph, heading,
/// blockquote). Paragraph, heading, bubble and blockquote are textblocks:
/// their content is plain text and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "camelCase")]
pub enum BlockKind {
    Doc,
    Paragraph {
        #[serde(default, skip_serializing_if = "is_zero")]
        indent: u8,
    },
    Heading {
        level: u8,
        #[serde(default, skip_serializing_if = "is_zero")]
        indent: u8,
    },
    Bubble {
        #[serde(default)]
        position: BubblePosition,
    },
    Blockquote {
        #[serde(default, rename = "type")]
        style: QuoteStyle,
        #[serde(default, skip_serializing_if = "is_zero")]
        indent: u8,
    },
    HorizontalRule {
        #[serde(default, rename = "type")]
        style: RuleStyle,
    },
}

impl BlockKind {
    /// The default block: an unindented paragraph.
    pub fn paragraph() -> Self {
        BlockKind::Paragraph { indent: 0 }
    }

    pub fn bubble(position: BubblePosition) -> Self {
        BlockKind::Bubble { position }
    }

    pub fn blockquote(style: QuoteStyle) -> Self {
        BlockKind::Blockquote { style, indent: 0 }
    }

    pub fn horizontal_rule(style: RuleStyle) -> Self {
        BlockKind::HorizontalRule { style }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            BlockKind::Doc => NodeType::Doc,
            BlockKind::Paragraph { .. } => NodeType::Paragraph,
            BlockKind::Heading { .. } => NodeType::Heading,
            BlockKind::Bubble { .. } => NodeType::Bubble,
            BlockKind::Blockquote { .. } => NodeType::Blockquote,
            BlockKind::HorizontalRule { .. } => NodeType::HorizontalRule,
        }
    }

    pub fn name(&self) -> &'static str {
        self.node_type().name()
    }

    /// Block that holds plain text content.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph { .. }
                | BlockKind::Heading { .. }
                | BlockKind::Bubble { .. }
                | BlockKind::Blockquote { .. }
        )
    }

    /// Atom block without content. Occupies a single position.
    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockKind::HorizontalRule { .. })
    }

    pub fn is_bubble(&self) -> bool {
        matches!(self, BlockKind::Bubble { .. })
    }

    pub fn is_blockquote(&self) -> bool {
        matches!(self, BlockKind::Blockquote { .. })
    }

    /// Current indent level, or `None` for kinds that cannot be indented.
    pub fn indent(&self) -> Option<u8> {
        match self {
            BlockKind::Paragraph { indent }
            | BlockKind::Heading { indent, .. }
            | BlockKind::Blockquote { indent, .. } => Some(*indent),
            _ => None,
        }
    }

    /// Same kind and attributes with a different indent level.
    pub fn with_indent(&self, level: u8) -> Option<BlockKind> {
        let mut kind = self.clone();
        match &mut kind {
            BlockKind::Paragraph { indent }
            | BlockKind::Heading { indent, .. }
            | BlockKind::Blockquote { indent, .. } => *indent = level,
            _ => return None,
        }
        Some(kind)
    }
}

impl fmt::Display for BlockKind {
    /// `name[attr=value,...]`, omitting default-valued indent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        let mut attrs = Vec::new();
        match self {
            BlockKind::Doc => {}
            BlockKind::Paragraph { .. } => {}
            BlockKind::Heading { level, .. } => attrs.push(format!("level={level}")),
            BlockKind::Bubble { position } => attrs.push(format!("position={position}")),
            BlockKind::Blockquote { style, .. } => attrs.push(format!("type={style}")),
            BlockKind::HorizontalRule { style } => attrs.push(format!("type={style}")),
        }
        if let Some(indent) = self.indent()
            && indent > 0
        {
            attrs.push(format!("indent={indent}"));
        }
        if !attrs.is_empty() {
            write!(f, "[{}]", attrs.join(","))?;
        }
        Ok(())
    }
}

/// An owned, detached document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum Node {
    Block {
        kind: BlockKind,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Text {
        text: String,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn block(kind: BlockKind, content: Vec<Node>) -> Self {
        Node::Block { kind, content }
    }

    /// A textblock holding `text`, or no content at all when `text` is empty.
    pub fn textblock(kind: BlockKind, text: &str) -> Self {
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(text)]
        };
        Node::Block { kind, content }
    }

    pub fn paragraph(text: &str) -> Self {
        Node::textblock(BlockKind::paragraph(), text)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block { .. })
    }

    pub fn kind(&self) -> Option<&BlockKind> {
        match self {
            Node::Block { kind, .. } => Some(kind),
            Node::Text { .. } => None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Block { kind, .. } => kind.node_type(),
            Node::Text { .. } => NodeType::Text,
        }
    }

    /// Number of positions the node occupies in its parent.
    pub fn size(&self) -> usize {
        match self {
            Node::Text { text } => text.chars().count(),
            Node::Block { kind, .. } if kind.is_leaf() => 1,
            Node::Block { content, .. } => 2 + content.iter().map(Node::size).sum::<usize>(),
        }
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text { text } => text.clone(),
            Node::Block { content, .. } => content.iter().map(Node::text_content).collect(),
        }
    }
}

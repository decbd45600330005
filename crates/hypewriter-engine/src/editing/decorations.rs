use serde::Serialize;

use crate::editing::document::Document;
use crate::editing::selection::Selection;

/// A highlighted range, boundaries included. Never part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub class: String,
}

impl Decoration {
    pub fn contains(&self, pos: usize) -> bool {
        self.from <= pos && pos <= self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    /// Decorations covering `pos`.
    pub fn find(&self, pos: usize) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter().filter(move |d| d.contains(pos))
    }
}

/// Highlight the innermost block around the selection head.
pub fn line_highlight(doc: &Document, selection: Selection, class: &str) -> DecorationSet {
    let Ok(rp) = doc.resolve(selection.head) else {
        return DecorationSet::empty();
    };
    let block = (1..=rp.depth())
        .rev()
        .find(|&depth| doc.kind(rp.node(depth)).is_some());
    match block {
        Some(depth) => DecorationSet {
            decorations: vec![Decoration {
                from: rp.before(depth),
                to: rp.after(depth),
                class: class.to_string(),
            }],
        },
        None => DecorationSet::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{BlockKind, BubblePosition, Node, RuleStyle};
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        Document::from_nodes(vec![
            Node::paragraph("Hello"),
            Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
            Node::textblock(BlockKind::bubble(BubblePosition::Left), "Hi"),
        ])
        .unwrap()
    }

    #[test]
    fn highlights_the_block_around_the_cursor() {
        let set = line_highlight(&sample(), Selection::cursor(10), "line-highlight");
        assert_eq!(
            set.iter().cloned().collect::<Vec<_>>(),
            vec![Decoration {
                from: 8,
                to: 12,
                class: "line-highlight".to_string()
            }]
        );
    }

    #[test]
    fn follows_the_head_of_a_range() {
        let set = line_highlight(&sample(), Selection::range(10, 3), "hl");
        let decoration = set.iter().next().unwrap();
        assert_eq!((decoration.from, decoration.to), (0, 7));
    }

    #[test]
    fn nothing_between_blocks() {
        assert!(line_highlight(&sample(), Selection::cursor(7), "hl").is_empty());
        assert!(line_highlight(&sample(), Selection::cursor(99), "hl").is_empty());
    }

    #[test]
    fn decoration_contains_the_head_for_every_position() {
        let doc = sample();
        for pos in 0..=doc.size() {
            let set = line_highlight(&doc, Selection::cursor(pos), "hl");
            assert!(set.iter().all(|d| d.contains(pos)), "head {pos}");
            assert!(set.iter().count() <= 1);
        }
    }

    #[test]
    fn find_filters_by_position() {
        let set = line_highlight(&sample(), Selection::cursor(2), "hl");
        assert_eq!(set.find(5).count(), 1);
        assert_eq!(set.find(9).count(), 0);
    }
}

use serde::{Deserialize, Serialize};

use crate::editing::document::Document;
use crate::editing::error::EditError;
use crate::editing::mapping::{Assoc, Mapping};

/// Cursor or range, stored as plain document offsets.
///
/// `anchor` is where the selection started and `head` is where it ends
/// (the end that moves). A selection never refers to nodes, so it stays
/// meaningful across edits once mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn map(&self, mapping: &Mapping) -> Self {
        Self {
            anchor: mapping.map(self.anchor, Assoc::Right),
            head: mapping.map(self.head, Assoc::Right),
        }
    }

    /// Both ends must lie within `doc`.
    pub fn validate(&self, doc: &Document) -> Result<(), EditError> {
        let size = doc.size();
        match [self.anchor, self.head].into_iter().find(|&pos| pos > size) {
            Some(pos) => Err(EditError::OutOfRange { pos, size }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// First position at or beyond `pos` (in `dir`) where text can be typed.
pub fn nearest_text_position(doc: &Document, pos: usize, dir: Direction) -> Option<usize> {
    let size = doc.size();
    let pos = pos.min(size);
    let is_text_position = |p: usize| doc.resolve(p).is_ok_and(|rp| rp.in_textblock(doc));
    match dir {
        Direction::Forward => (pos..=size).find(|&p| is_text_position(p)),
        Direction::Backward => (0..=pos).rev().find(|&p| is_text_position(p)),
    }
}

/// Closest typing position to `pos`, looking forward first.
pub fn snap_to_text(doc: &Document, pos: usize) -> Option<usize> {
    nearest_text_position(doc, pos, Direction::Forward)
        .or_else(|| nearest_text_position(doc, pos, Direction::Backward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{BlockKind, Node, RuleStyle};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Document {
        // 0 <p> 1..3 "ab" 3 </p> 4 <hr> 5 <p> 6..8 "cd" 8 </p> 9
        Document::from_nodes(vec![
            Node::paragraph("ab"),
            Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
            Node::paragraph("cd"),
        ])
        .unwrap()
    }

    #[test]
    fn range_orders_its_ends() {
        let sel = Selection::range(6, 2);
        assert_eq!((sel.from(), sel.to()), (2, 6));
        assert!(!sel.is_empty());
        assert!(Selection::cursor(3).is_empty());
    }

    #[test]
    fn validate_rejects_positions_past_the_end() {
        let doc = sample();
        assert_eq!(Selection::range(1, 9).validate(&doc), Ok(()));
        assert_eq!(
            Selection::range(1, 10).validate(&doc),
            Err(EditError::OutOfRange { pos: 10, size: 9 })
        );
    }

    #[rstest]
    #[case(0, Direction::Forward, Some(1))]
    #[case(4, Direction::Forward, Some(6))]
    #[case(4, Direction::Backward, Some(3))]
    #[case(9, Direction::Forward, None)]
    #[case(9, Direction::Backward, Some(8))]
    #[case(2, Direction::Forward, Some(2))]
    fn finds_nearest_text_position(
        #[case] pos: usize,
        #[case] dir: Direction,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(nearest_text_position(&sample(), pos, dir), expected);
    }

    #[test]
    fn snap_falls_back_to_backward_search() {
        let doc = sample();
        assert_eq!(snap_to_text(&doc, 9), Some(8));
        assert_eq!(snap_to_text(&Document::new(), 0), None);
    }
}

//! Resolving absolute offsets into ancestor chains.
//!
//! Offsets follow the usual rich-text scheme: the root has no boundary
//! tokens, every other block contributes one position for its opening and
//! one for its closing boundary, a leaf block (horizontal rule) is a single
//! position and every character of text is one position.
//!
//! ```text
//!   0   1 2 3 4 5 6   7   8
//!   <p> H e l l o </p> <hr>
//! ```
//!
//! A [`ResolvedPos`] is a snapshot: it holds node handles and integers only
//! and must be recomputed after any edit.

use crate::editing::document::{Document, NodeId};
use crate::editing::error::EditError;
use crate::editing::node::BlockKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Level {
    node: NodeId,
    /// Child index the position points into (or sits in front of).
    index: usize,
    /// Offset of the first content position of `node`.
    start: usize,
    content_size: usize,
}

/// An offset together with its ancestor chain, depth 0 being the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<Level>,
}

/// Resolve `pos` against `doc`.
pub fn resolve(doc: &Document, pos: usize) -> Result<ResolvedPos, EditError> {
    let size = doc.size();
    if pos > size {
        return Err(EditError::OutOfRange { pos, size });
    }

    let mut path = Vec::new();
    let mut node = doc.root();
    let mut start = 0;
    loop {
        let children = doc.children(node);
        let mut offset = start;
        let mut index = children.len();
        let mut descend = None;

        for (i, &child) in children.iter().enumerate() {
            let end = offset + doc.node_size(child);
            if pos == offset {
                index = i;
                break;
            }
            if pos < end {
                index = i;
                let enterable = doc.kind(child).is_some_and(|kind| !kind.is_leaf());
                if enterable {
                    descend = Some((child, offset + 1));
                }
                break;
            }
            offset = end;
        }

        path.push(Level {
            node,
            index,
            start,
            content_size: doc.content_size(node),
        });

        match descend {
            Some((child, child_start)) => {
                node = child;
                start = child_start;
            }
            None => break,
        }
    }

    Ok(ResolvedPos { pos, path })
}

impl ResolvedPos {
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Depth of the innermost node containing the position.
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    fn level(&self, depth: usize) -> &Level {
        &self.path[depth.min(self.depth())]
    }

    pub fn node(&self, depth: usize) -> NodeId {
        self.level(depth).node
    }

    pub fn parent(&self) -> NodeId {
        self.node(self.depth())
    }

    pub fn index(&self, depth: usize) -> usize {
        self.level(depth).index
    }

    /// First content position inside the node at `depth`.
    pub fn start(&self, depth: usize) -> usize {
        self.level(depth).start
    }

    /// Last content position inside the node at `depth`.
    pub fn end(&self, depth: usize) -> usize {
        let level = self.level(depth);
        level.start + level.content_size
    }

    /// Position of the node's opening boundary. The root has none, so depth
    /// 0 yields 0.
    pub fn before(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.start(depth) - 1
        }
    }

    /// Position right after the node's closing boundary. For the root this
    /// is the end of the document.
    pub fn after(&self, depth: usize) -> usize {
        if depth == 0 {
            self.end(0)
        } else {
            self.end(depth) + 1
        }
    }

    /// Offset of the position inside its innermost parent.
    pub fn parent_offset(&self) -> usize {
        self.pos - self.start(self.depth())
    }

    /// The child directly after the position, if the position sits on a
    /// child boundary or inside a text node (which is then returned).
    pub fn node_after(&self, doc: &Document) -> Option<NodeId> {
        doc.children(self.parent())
            .get(self.index(self.depth()))
            .copied()
    }

    /// The child directly before the position.
    pub fn node_before(&self, doc: &Document) -> Option<NodeId> {
        let children = doc.children(self.parent());
        let index = self.index(self.depth());
        let mut offset = self.start(self.depth());
        for &child in children.iter().take(index) {
            offset += doc.node_size(child);
        }
        if offset < self.pos {
            // Inside a text node: the text itself is before the position.
            children.get(index).copied()
        } else if index > 0 {
            children.get(index - 1).copied()
        } else {
            None
        }
    }

    /// Innermost non-root ancestor whose kind matches, scanning from the
    /// deepest level outwards.
    pub fn find_ancestor(
        &self,
        doc: &Document,
        mut pred: impl FnMut(&BlockKind) -> bool,
    ) -> Option<usize> {
        (1..=self.depth())
            .rev()
            .find(|&depth| doc.kind(self.node(depth)).is_some_and(&mut pred))
    }

    /// True when the innermost parent holds text.
    pub fn in_textblock(&self, doc: &Document) -> bool {
        doc.kind(self.parent()).is_some_and(BlockKind::is_textblock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{BubblePosition, Node, RuleStyle};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Document {
        // 0 <p> 1..6 "Hello" 6 </p> 7 <hr> 8 <bubble> 9..11 "Hi" 11 </bubble> 12
        Document::from_nodes(vec![
            Node::paragraph("Hello"),
            Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]),
            Node::textblock(BlockKind::bubble(BubblePosition::Left), "Hi"),
        ])
        .unwrap()
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 1, 0)]
    #[case(3, 1, 2)]
    #[case(6, 1, 5)]
    #[case(7, 0, 7)]
    #[case(8, 0, 8)]
    #[case(9, 1, 0)]
    #[case(11, 1, 2)]
    #[case(12, 0, 12)]
    fn resolves_depth_and_parent_offset(
        #[case] pos: usize,
        #[case] depth: usize,
        #[case] parent_offset: usize,
    ) {
        let doc = sample();
        let rp = resolve(&doc, pos).unwrap();
        assert_eq!(rp.depth(), depth);
        assert_eq!(rp.parent_offset(), parent_offset);
        assert_eq!(rp.node(0), doc.root());
    }

    #[test]
    fn boundaries_of_the_containing_block() {
        let doc = sample();
        let rp = resolve(&doc, 10).unwrap();
        assert_eq!(rp.depth(), 1);
        assert_eq!(rp.start(1), 9);
        assert_eq!(rp.end(1), 11);
        assert_eq!(rp.before(1), 8);
        assert_eq!(rp.after(1), 12);
        assert_eq!(rp.index(0), 2);
    }

    #[test]
    fn every_position_lies_within_its_ancestors() {
        let doc = sample();
        for pos in 0..=doc.size() {
            let rp = resolve(&doc, pos).unwrap();
            assert_eq!(rp.node(0), doc.root());
            for depth in 0..=rp.depth() {
                assert!(rp.start(depth) <= pos, "start at {pos}/{depth}");
                assert!(pos <= rp.end(depth), "end at {pos}/{depth}");
            }
        }
    }

    #[test]
    fn out_of_range_is_an_error() {
        let doc = sample();
        assert_eq!(
            resolve(&doc, 13),
            Err(EditError::OutOfRange { pos: 13, size: 12 })
        );
    }

    #[test]
    fn empty_document_resolves_to_root() {
        let doc = Document::new();
        let rp = resolve(&doc, 0).unwrap();
        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.node_after(&doc), None);
    }

    #[test]
    fn nodes_around_a_boundary() {
        let doc = sample();
        let rp = resolve(&doc, 7).unwrap();
        let after = rp.node_after(&doc).unwrap();
        let before = rp.node_before(&doc).unwrap();
        assert!(doc.kind(after).is_some_and(BlockKind::is_leaf));
        assert_eq!(doc.text_content(before), "Hello");
    }

    #[test]
    fn text_node_is_before_a_position_inside_it() {
        let doc = sample();
        let rp = resolve(&doc, 3).unwrap();
        let before = rp.node_before(&doc).unwrap();
        assert!(doc.is_text(before));
    }

    #[test]
    fn finds_nearest_ancestor_by_kind() {
        let doc = sample();
        let inside_bubble = resolve(&doc, 10).unwrap();
        assert_eq!(inside_bubble.find_ancestor(&doc, BlockKind::is_bubble), Some(1));

        let inside_paragraph = resolve(&doc, 2).unwrap();
        assert_eq!(inside_paragraph.find_ancestor(&doc, BlockKind::is_bubble), None);

        let at_root = resolve(&doc, 7).unwrap();
        assert_eq!(at_root.find_ancestor(&doc, |_| true), None);
    }
}

use std::fmt;
use std::ops::Range;

use crate::editing::error::EditError;
use crate::editing::mapping::StepMap;
use crate::editing::node::{BlockKind, Node};
use crate::editing::position::{ResolvedPos, resolve};

/// Stable handle of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Arena entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Block {
        kind: BlockKind,
        children: Vec<NodeId>,
    },
    Text(String),
}

/// The document tree.
///
/// Nodes live in an arena and refer to their children by [`NodeId`]; a
/// node is owned by exactly one parent. The content model is flat: the
/// root holds blocks, textblocks hold at most one non-empty text node and
/// horizontal rules hold nothing. [`Document::check`] verifies this.
///
/// Mutation happens only through transaction steps (see
/// [`crate::editing::Transaction`]).
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<NodeData>>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.to_nodes() == other.to_nodes()
    }
}

impl Eq for Document {}

impl Document {
    /// An empty document: a root without blocks.
    pub fn new() -> Self {
        Self {
            slots: vec![Some(NodeData::Block {
                kind: BlockKind::Doc,
                children: Vec::new(),
            })],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Build a document from top-level block nodes.
    pub fn from_nodes(blocks: Vec<Node>) -> Result<Self, EditError> {
        for block in &blocks {
            validate_block(block)?;
        }
        let mut doc = Self::new();
        let ids: Vec<NodeId> = blocks.iter().map(|block| doc.build(block)).collect();
        let root = doc.root;
        doc.children_mut(root)?.extend(ids);
        Ok(doc)
    }

    /// Detached copy of the top-level blocks.
    pub fn to_nodes(&self) -> Vec<Node> {
        self.top_level()
            .iter()
            .filter_map(|&id| self.to_node(id))
            .collect()
    }

    /// Detached copy of a subtree, `None` for a released handle.
    pub fn to_node(&self, id: NodeId) -> Option<Node> {
        let node = match self.get(id)? {
            NodeData::Text(text) => Node::text(text.clone()),
            NodeData::Block { kind, children } => Node::block(
                kind.clone(),
                children
                    .iter()
                    .filter_map(|&child| self.to_node(child))
                    .collect(),
            ),
        };
        Some(node)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn top_level(&self) -> &[NodeId] {
        self.children(self.root)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(NodeData::Block { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<&BlockKind> {
        match self.get(id) {
            Some(NodeData::Block { kind, .. }) => Some(kind),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(NodeData::Text(_)))
    }

    /// Positions the node occupies inside its parent.
    pub fn node_size(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(NodeData::Text(text)) => text.chars().count(),
            Some(NodeData::Block { kind, .. }) if kind.is_leaf() => 1,
            Some(NodeData::Block { .. }) => 2 + self.content_size(id),
            None => 0,
        }
    }

    pub fn content_size(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| self.node_size(child))
            .sum()
    }

    /// Largest valid position.
    pub fn size(&self) -> usize {
        self.content_size(self.root)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id) {
            Some(NodeData::Text(text)) => text.clone(),
            Some(NodeData::Block { children, .. }) => children
                .iter()
                .map(|&child| self.text_content(child))
                .collect(),
            None => String::new(),
        }
    }

    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, EditError> {
        resolve(self, pos)
    }

    /// Plain text between two positions, blocks joined without separator.
    pub fn text_between(&self, from: usize, to: usize) -> Result<String, EditError> {
        self.check_range(from, to)?;
        let mut out = String::new();
        self.collect_text(self.root, 0, from, to, &mut out);
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, content_start: usize, from: usize, to: usize, out: &mut String) {
        let mut pos = content_start;
        for &child in self.children(id) {
            if pos >= to {
                break;
            }
            let size = self.node_size(child);
            let end = pos + size;
            if end > from {
                match self.get(child) {
                    Some(NodeData::Text(text)) => {
                        let start = from.saturating_sub(pos);
                        let stop = (to - pos).min(size);
                        out.push_str(&char_slice(text, start..stop));
                    }
                    Some(NodeData::Block { kind, .. }) if !kind.is_leaf() => {
                        self.collect_text(child, pos + 1, from, to, out);
                    }
                    _ => {}
                }
            }
            pos = end;
        }
    }

    /// Block nodes overlapping `from..to`, with the position of their
    /// opening boundary, in document order.
    pub fn blocks_between(&self, from: usize, to: usize) -> Vec<(usize, NodeId)> {
        let mut found = Vec::new();
        self.collect_blocks(self.root, 0, from, to, &mut found);
        found
    }

    fn collect_blocks(
        &self,
        id: NodeId,
        content_start: usize,
        from: usize,
        to: usize,
        found: &mut Vec<(usize, NodeId)>,
    ) {
        let mut pos = content_start;
        for &child in self.children(id) {
            if pos >= to {
                break;
            }
            let end = pos + self.node_size(child);
            if end > from
                && let Some(kind) = self.kind(child)
            {
                found.push((pos, child));
                if !kind.is_leaf() {
                    self.collect_blocks(child, pos + 1, from, to, found);
                }
            }
            pos = end;
        }
    }

    /// The block whose opening boundary is at `pos`.
    pub fn block_at(&self, pos: usize) -> Result<NodeId, EditError> {
        let rp = self.resolve(pos)?;
        rp.node_after(self)
            .filter(|&id| self.kind(id).is_some())
            .ok_or(EditError::NoNodeAt { pos })
    }

    /// Verify the tree invariants.
    pub fn check(&self) -> Result<(), EditError> {
        let violation = |msg: String| Err(EditError::InvariantViolation(msg));

        if self.kind(self.root) != Some(&BlockKind::Doc) {
            return violation("root is not a doc node".to_string());
        }
        let mut seen = vec![false; self.slots.len()];
        seen[self.root.slot()] = true;

        for &block in self.top_level() {
            let Some(kind) = self.kind(block) else {
                return violation(format!("text node {block:?} directly under the root"));
            };
            if *kind == BlockKind::Doc {
                return violation(format!("nested doc node {block:?}"));
            }
            if std::mem::replace(&mut seen[block.slot()], true) {
                return violation(format!("node {block:?} has two parents"));
            }
            let children = self.children(block);
            if kind.is_leaf() && !children.is_empty() {
                return violation(format!("{} {block:?} has content", kind.name()));
            }
            if children.len() > 1 {
                return violation(format!("{} {block:?} holds unmerged text", kind.name()));
            }
            for &child in children {
                match self.get(child) {
                    Some(NodeData::Text(text)) if text.is_empty() => {
                        return violation(format!("empty text node in {block:?}"));
                    }
                    Some(NodeData::Text(_)) => {}
                    _ => {
                        return violation(format!(
                            "{} {block:?} contains a non-text node",
                            kind.name()
                        ));
                    }
                }
                if std::mem::replace(&mut seen[child.slot()], true) {
                    return violation(format!("node {child:?} has two parents"));
                }
            }
        }
        Ok(())
    }

    fn check_range(&self, from: usize, to: usize) -> Result<(), EditError> {
        let size = self.size();
        if to > size {
            return Err(EditError::OutOfRange { pos: to, size });
        }
        if from > to {
            return Err(EditError::InvalidRange { from, to });
        }
        Ok(())
    }

    // Arena management

    fn alloc(&mut self, data: NodeData) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.slot()] = Some(data);
            return id;
        }
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(data));
        id
    }

    fn release(&mut self, id: NodeId) {
        let Some(data) = self.slots.get_mut(id.slot()).and_then(Option::take) else {
            return;
        };
        if let NodeData::Block { children, .. } = data {
            for child in children {
                self.release(child);
            }
        }
        self.free.push(id);
    }

    fn build(&mut self, node: &Node) -> NodeId {
        match node {
            Node::Text { text } => self.alloc(NodeData::Text(text.clone())),
            Node::Block { kind, content } if kind.is_textblock() => {
                let text: String = content.iter().map(Node::text_content).collect();
                let children = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![self.alloc(NodeData::Text(text))]
                };
                self.alloc(NodeData::Block {
                    kind: kind.clone(),
                    children,
                })
            }
            Node::Block { kind, content } => {
                let children = content.iter().map(|child| self.build(child)).collect();
                self.alloc(NodeData::Block {
                    kind: kind.clone(),
                    children,
                })
            }
        }
    }

    fn children_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, EditError> {
        match self.slots.get_mut(id.slot()) {
            Some(Some(NodeData::Block { children, .. })) => Ok(children),
            _ => Err(EditError::InvariantViolation(format!(
                "{id:?} is not a live block"
            ))),
        }
    }

    fn set_text(&mut self, block: NodeId, text: String) -> Result<(), EditError> {
        let old = std::mem::take(self.children_mut(block)?);
        for child in old {
            self.release(child);
        }
        if !text.is_empty() {
            let child = self.alloc(NodeData::Text(text));
            self.children_mut(block)?.push(child);
        }
        Ok(())
    }

    fn remove_children(&mut self, parent: NodeId, range: Range<usize>) -> Result<(), EditError> {
        let children = self.children_mut(parent)?;
        if range.start > range.end || range.end > children.len() {
            return Err(EditError::InvariantViolation(format!(
                "child range {range:?} outside {} children",
                children.len()
            )));
        }
        let removed: Vec<NodeId> = children.drain(range).collect();
        for id in removed {
            self.release(id);
        }
        Ok(())
    }

    fn insert_children(&mut self, parent: NodeId, index: usize, nodes: &[Node]) -> Result<(), EditError> {
        let ids: Vec<NodeId> = nodes.iter().map(|node| self.build(node)).collect();
        let children = self.children_mut(parent)?;
        let index = index.min(children.len());
        children.splice(index..index, ids);
        Ok(())
    }

    // Primitive edits. Each returns the map of positions it moved.

    /// Remove everything between `from` and `to`.
    ///
    /// Crossing from one textblock into another joins the remainder of the
    /// second into the first. A block only partly covered by the range is
    /// never removed, and nothing is created to fill emptied blocks.
    pub(crate) fn delete_range(&mut self, from: usize, to: usize) -> Result<StepMap, EditError> {
        self.check_range(from, to)?;
        if from == to {
            return Ok(StepMap::empty());
        }
        let rf = self.resolve(from)?;
        let rt = self.resolve(to)?;
        if rf.depth() > 1 || rt.depth() > 1 {
            return Err(EditError::InvariantViolation(
                "position nested deeper than one block".to_string(),
            ));
        }

        if rf.depth() == rt.depth() && rf.parent() == rt.parent() {
            if rf.depth() == 0 {
                self.remove_children(self.root, rf.index(0)..rt.index(0))?;
            } else {
                let block = rf.parent();
                let text = self.text_content(block);
                let kept = remove_chars(&text, rf.parent_offset()..rt.parent_offset());
                self.set_text(block, kept)?;
            }
            return Ok(StepMap::new(from, to - from, 0));
        }

        let root = self.root;
        let mut reopened = 0;
        let left = (rf.depth() == 1).then(|| rf.parent());
        let first_removed = match left {
            Some(block) => {
                let text = self.text_content(block);
                let (head, _) = split_chars(&text, rf.parent_offset());
                self.set_text(block, head)?;
                rf.index(0) + 1
            }
            None => rf.index(0),
        };

        let removed_end = if rt.depth() == 1 {
            let right = rt.parent();
            let text = self.text_content(right);
            let (_, tail) = split_chars(&text, rt.parent_offset());
            match left {
                Some(block) => {
                    let joined = self.text_content(block) + &tail;
                    self.set_text(block, joined)?;
                    rt.index(0) + 1
                }
                None => {
                    self.set_text(right, tail)?;
                    reopened = 1;
                    rt.index(0)
                }
            }
        } else {
            if left.is_some() {
                reopened = 1;
            }
            rt.index(0)
        };

        self.remove_children(root, first_removed..removed_end)?;
        Ok(StepMap::new(from, to - from, reopened))
    }

    /// Insert text or blocks at `pos`, returning where the content starts.
    ///
    /// Blocks inserted inside a textblock split it; a side of the split
    /// that would be an empty textblock is dropped.
    pub(crate) fn insert(&mut self, pos: usize, nodes: &[Node]) -> Result<(usize, StepMap), EditError> {
        let rp = self.resolve(pos)?;
        if nodes.is_empty() {
            return Ok((pos, StepMap::empty()));
        }
        let parent_kind = self
            .kind(rp.parent())
            .cloned()
            .ok_or_else(|| EditError::InvariantViolation("position inside a text node".to_string()))?;

        if nodes.iter().all(Node::is_text) {
            if !parent_kind.is_textblock() {
                return Err(EditError::ContentMismatch {
                    parent: parent_kind.name(),
                    content: "text",
                });
            }
            let inserted: String = nodes.iter().map(Node::text_content).collect();
            let added = inserted.chars().count();
            let block = rp.parent();
            let (head, tail) = split_chars(&self.text_content(block), rp.parent_offset());
            self.set_text(block, head + &inserted + &tail)?;
            return Ok((pos, StepMap::new(pos, 0, added)));
        }

        for node in nodes {
            validate_block(node)?;
        }
        let added: usize = nodes.iter().map(Node::size).sum();
        let root = self.root;

        if rp.depth() == 0 {
            self.insert_children(root, rp.index(0), nodes)?;
            return Ok((pos, StepMap::new(pos, 0, added)));
        }
        if rp.depth() > 1 {
            return Err(EditError::InvariantViolation(
                "position nested deeper than one block".to_string(),
            ));
        }

        let block = rp.parent();
        let index = rp.index(0);
        let before = rp.before(1);
        let (head, tail) = split_chars(&self.text_content(block), rp.parent_offset());

        match (head.is_empty(), tail.is_empty()) {
            (false, false) => {
                self.set_text(block, head)?;
                let mut content = nodes.to_vec();
                content.push(Node::textblock(parent_kind, &tail));
                self.insert_children(root, index + 1, &content)?;
                Ok((pos + 1, StepMap::new(pos, 0, added + 2)))
            }
            (true, false) => {
                self.insert_children(root, index, nodes)?;
                Ok((before, StepMap::new(before, 0, added)))
            }
            (false, true) => {
                self.insert_children(root, index + 1, nodes)?;
                Ok((pos + 1, StepMap::new(pos + 1, 0, added)))
            }
            (true, true) => {
                self.remove_children(root, index..index + 1)?;
                self.insert_children(root, index, nodes)?;
                Ok((before, StepMap::new(before, 2, added)))
            }
        }
    }

    /// Replace the kind and attributes of the block starting at `pos`,
    /// keeping its content. Returns whether anything changed.
    pub(crate) fn set_kind(&mut self, pos: usize, kind: BlockKind) -> Result<bool, EditError> {
        let id = self.block_at(pos)?;
        let slot = self.slots.get_mut(id.slot()).and_then(Option::as_mut);
        let Some(NodeData::Block { kind: current, .. }) = slot else {
            return Err(EditError::NoNodeAt { pos });
        };
        if kind == BlockKind::Doc || current.is_leaf() != kind.is_leaf() {
            return Err(EditError::IncompatibleKind {
                from: current.name(),
                to: kind.name(),
            });
        }
        if *current == kind {
            return Ok(false);
        }
        *current = kind;
        Ok(true)
    }
}

impl fmt::Display for Document {
    /// One line per top-level block: `kind[attrs] "text"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &block in self.top_level() {
            let Some(kind) = self.kind(block) else {
                continue;
            };
            if kind.is_leaf() {
                writeln!(f, "{kind}")?;
            } else {
                writeln!(f, "{kind} {:?}", self.text_content(block))?;
            }
        }
        Ok(())
    }
}

fn validate_block(node: &Node) -> Result<(), EditError> {
    let Node::Block { kind, content } = node else {
        return Err(EditError::ContentMismatch {
            parent: "doc",
            content: "text",
        });
    };
    if *kind == BlockKind::Doc {
        return Err(EditError::ContentMismatch {
            parent: "doc",
            content: "doc",
        });
    }
    let misplaced = if kind.is_leaf() {
        content.first()
    } else {
        content.iter().find(|child| !child.is_text())
    };
    match misplaced {
        Some(child) => Err(EditError::ContentMismatch {
            parent: kind.name(),
            content: child.node_type().name(),
        }),
        None => Ok(()),
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| offset)
}

fn char_slice(text: &str, range: Range<usize>) -> String {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end);
    text[start..end.max(start)].to_string()
}

fn split_chars(text: &str, at: usize) -> (String, String) {
    let (head, tail) = text.split_at(byte_offset(text, at));
    (head.to_string(), tail.to_string())
}

fn remove_chars(text: &str, range: Range<usize>) -> String {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end).max(start);
    let mut kept = String::with_capacity(text.len() - (end - start));
    kept.push_str(&text[..start]);
    kept.push_str(&text[end..]);
    kept
}

//! Atomic batches of tree edits.
//!
//! Steps are evaluated in emission order, each one against the document as
//! already modified by the steps before it. [`Transaction::apply`] replays
//! them on a copy of the document, so a failing step leaves the caller's
//! tree and selection untouched.

use log::{debug, warn};

use crate::editing::document::Document;
use crate::editing::error::EditError;
use crate::editing::mapping::{Mapping, StepMap};
use crate::editing::node::{BlockKind, Node};
use crate::editing::selection::Selection;

/// One primitive edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    DeleteRange { from: usize, to: usize },
    Insert { at: usize, content: Vec<Node> },
    SetAttributes { at: usize, kind: BlockKind },
}

struct Applied {
    map: StepMap,
    changed: bool,
    /// Where inserted content begins, for insert steps.
    inserted_at: Option<usize>,
}

impl Step {
    fn apply(&self, doc: &mut Document) -> Result<Applied, EditError> {
        match self {
            Step::DeleteRange { from, to } => {
                let map = doc.delete_range(*from, *to)?;
                Ok(Applied {
                    changed: !map.is_empty(),
                    map,
                    inserted_at: None,
                })
            }
            Step::Insert { at, content } => {
                let (start, map) = doc.insert(*at, content)?;
                Ok(Applied {
                    changed: !map.is_empty(),
                    map,
                    inserted_at: Some(start),
                })
            }
            Step::SetAttributes { at, kind } => {
                let changed = doc.set_kind(*at, kind.clone())?;
                Ok(Applied {
                    map: StepMap::empty(),
                    changed,
                    inserted_at: None,
                })
            }
        }
    }
}

/// Ordered steps plus the selection to install afterwards.
///
/// When no selection is declared the previous one is mapped through the
/// steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    steps: Vec<Step>,
    selection: Option<Selection>,
}

/// Result of [`Transaction::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No step changed the document. Nothing, not even the selection, is
    /// installed.
    Unchanged,
    Changed {
        doc: Document,
        selection: Selection,
        mapping: Mapping,
    },
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete_range(mut self, from: usize, to: usize) -> Self {
        self.steps.push(Step::DeleteRange { from, to });
        self
    }

    pub fn insert(mut self, at: usize, content: Vec<Node>) -> Self {
        self.steps.push(Step::Insert { at, content });
        self
    }

    pub fn set_attributes(mut self, at: usize, kind: BlockKind) -> Self {
        self.steps.push(Step::SetAttributes { at, kind });
        self
    }

    pub fn set_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply all steps to a copy of `doc`.
    ///
    /// Any failing step, an invalid resulting tree or a selection outside
    /// the resulting document rejects the whole transaction.
    pub fn apply(&self, doc: &Document, selection: Selection) -> Result<ApplyOutcome, EditError> {
        self.replay(doc, selection).inspect_err(|err| {
            warn!("transaction rejected ({} steps): {err}", self.steps.len());
        })
    }

    fn replay(&self, doc: &Document, selection: Selection) -> Result<ApplyOutcome, EditError> {
        let mut next = doc.clone();
        let mut mapping = Mapping::new();
        let mut changed = false;
        for step in &self.steps {
            let applied = step.apply(&mut next)?;
            changed |= applied.changed;
            mapping.push(applied.map);
        }
        if !changed {
            debug!("transaction left the document unchanged");
            return Ok(ApplyOutcome::Unchanged);
        }

        let checked = next.check();
        debug_assert!(checked.is_ok(), "transaction broke the document: {checked:?}");
        checked?;

        let selection = self
            .selection
            .unwrap_or_else(|| selection.map(&mapping));
        selection.validate(&next)?;

        debug!("applied transaction with {} steps", self.steps.len());
        Ok(ApplyOutcome::Changed {
            doc: next,
            selection,
            mapping,
        })
    }
}

/// Builds a [`Transaction`] while tracking the document it will produce.
///
/// Commands use this to learn where content lands (an insert inside a
/// textblock may move to a block boundary) before declaring the selection.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    scratch: Document,
    mapping: Mapping,
    transaction: Transaction,
}

impl TransactionBuilder {
    pub fn new(doc: &Document) -> Self {
        Self {
            scratch: doc.clone(),
            mapping: Mapping::new(),
            transaction: Transaction::new(),
        }
    }

    /// The document as modified by the steps so far.
    pub fn doc(&self) -> &Document {
        &self.scratch
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    fn push(&mut self, step: Step) -> Result<Applied, EditError> {
        let applied = step.apply(&mut self.scratch)?;
        self.mapping.push(applied.map);
        self.transaction.steps.push(step);
        Ok(applied)
    }

    pub fn delete_range(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.push(Step::DeleteRange { from, to })?;
        Ok(())
    }

    /// Returns the position where the inserted content begins.
    pub fn insert(&mut self, at: usize, content: Vec<Node>) -> Result<usize, EditError> {
        let applied = self.push(Step::Insert { at, content })?;
        Ok(applied.inserted_at.unwrap_or(at))
    }

    /// Returns whether the block's kind or attributes changed.
    pub fn set_attributes(&mut self, at: usize, kind: BlockKind) -> Result<bool, EditError> {
        Ok(self.push(Step::SetAttributes { at, kind })?.changed)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.transaction.selection = Some(selection);
    }

    pub fn build(self) -> Transaction {
        self.transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::node::{BubblePosition, RuleStyle};
    use pretty_assertions::assert_eq;

    fn doc(nodes: Vec<Node>) -> Document {
        Document::from_nodes(nodes).unwrap()
    }

    fn changed(outcome: ApplyOutcome) -> (Document, Selection) {
        match outcome {
            ApplyOutcome::Changed { doc, selection, .. } => (doc, selection),
            ApplyOutcome::Unchanged => panic!("expected a change"),
        }
    }

    #[test]
    fn steps_see_the_document_left_by_earlier_steps() {
        // Delete "Hello" then insert at the same position: the insert is
        // expressed against the already shortened paragraph.
        let start = doc(vec![Node::paragraph("Hello world")]);
        let bubble = Node::textblock(BlockKind::bubble(BubblePosition::Left), "Hello");
        let tr = Transaction::new()
            .delete_range(1, 6)
            .insert(1, vec![bubble.clone()])
            .set_selection(Selection::cursor(1));

        let (next, selection) = changed(tr.apply(&start, Selection::range(1, 6)).unwrap());
        assert_eq!(next.to_nodes(), vec![bubble, Node::paragraph(" world")]);
        assert_eq!(selection, Selection::cursor(1));
    }

    #[test]
    fn failing_step_rejects_everything() {
        let start = doc(vec![Node::paragraph("Hello")]);
        let tr = Transaction::new().delete_range(1, 3).insert(40, vec![Node::paragraph("x")]);

        assert_eq!(
            tr.apply(&start, Selection::cursor(1)),
            Err(EditError::OutOfRange { pos: 40, size: 5 })
        );
        assert_eq!(start.to_nodes(), vec![Node::paragraph("Hello")]);
    }

    #[test]
    fn no_content_change_is_unchanged() {
        let start = doc(vec![Node::paragraph("Hello")]);
        let tr = Transaction::new()
            .delete_range(3, 3)
            .set_attributes(0, BlockKind::paragraph())
            .set_selection(Selection::cursor(2));
        assert_eq!(tr.apply(&start, Selection::cursor(4)), Ok(ApplyOutcome::Unchanged));
        assert_eq!(Transaction::new().apply(&start, Selection::cursor(4)), Ok(ApplyOutcome::Unchanged));
    }

    #[test]
    fn selection_is_mapped_when_not_declared() {
        let start = doc(vec![Node::paragraph("Hello")]);
        let tr = Transaction::new().insert(1, vec![Node::text(">> ")]);
        let (_, selection) = changed(tr.apply(&start, Selection::range(1, 6)).unwrap());
        assert_eq!(selection, Selection::range(4, 9));
    }

    #[test]
    fn declared_selection_outside_the_result_is_rejected() {
        let start = doc(vec![Node::paragraph("Hello")]);
        let tr = Transaction::new()
            .delete_range(1, 6)
            .set_selection(Selection::cursor(5));
        assert_eq!(
            tr.apply(&start, Selection::cursor(1)),
            Err(EditError::OutOfRange { pos: 5, size: 2 })
        );
    }

    #[test]
    fn builder_reports_where_blocks_land() {
        let start = doc(vec![Node::paragraph("Hello")]);
        let mut builder = TransactionBuilder::new(&start);
        let hr = Node::block(BlockKind::horizontal_rule(RuleStyle::Solid), vec![]);
        let at = builder.insert(6, vec![hr]).unwrap();
        assert_eq!(at, 7);
        assert_eq!(builder.doc().size(), 8);
        assert_eq!(builder.mapping().len(), 1);

        let tr = builder.build();
        assert_eq!(tr.steps().len(), 1);
        assert_eq!(tr.selection(), None);
        // The scratch copy never leaks into the source document.
        assert_eq!(start.size(), 7);
    }
}

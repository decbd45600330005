//! Block commands.
//!
//! A command reads the document and selection and returns a
//! [`Transaction`] to apply, or [`CommandResult::NotApplicable`] when the
//! cursor is in the wrong place for it. Commands never mutate anything;
//! `Err` is reserved for positions that do not exist in the document.

use log::debug;

use crate::editing::document::Document;
use crate::editing::error::EditError;
use crate::editing::node::{BlockKind, BubblePosition, Node, QuoteStyle, RuleStyle};
use crate::editing::options::{EditorOptions, IndentOptions};
use crate::editing::selection::Selection;
use crate::editing::transaction::{Transaction, TransactionBuilder};

/// Editing commands understood by [`crate::editing::Editor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertBubble { position: BubblePosition },
    RemoveBubble,
    SetBlockquote { style: QuoteStyle },
    ToggleBlockquote { style: QuoteStyle },
    UnsetBlockquote,
    SetHorizontalRule { style: RuleStyle },
    Indent,
    Outdent,
    /// Replace the selection with text (textblocks only).
    InsertText { text: String },
    /// Delete the selection or the position before the cursor.
    DeleteBackward,
    /// Split the textblock at the cursor.
    SplitBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Apply(Transaction),
    NotApplicable,
}

impl CommandResult {
    pub fn is_applicable(&self) -> bool {
        matches!(self, CommandResult::Apply(_))
    }
}

impl Cmd {
    /// Turn the command into a transaction for the given state.
    pub fn compile(
        &self,
        doc: &Document,
        selection: Selection,
        options: &EditorOptions,
    ) -> Result<CommandResult, EditError> {
        let result = match self {
            Cmd::InsertBubble { position } => insert_bubble(doc, selection, *position),
            Cmd::RemoveBubble => remove_bubble(doc, selection),
            Cmd::SetBlockquote { style } => set_blockquote(doc, selection, style.clone()),
            Cmd::ToggleBlockquote { style } => toggle_blockquote(doc, selection, style.clone()),
            Cmd::UnsetBlockquote => unset_blockquote(doc, selection),
            Cmd::SetHorizontalRule { style } => set_horizontal_rule(doc, selection, style.clone()),
            Cmd::Indent => indent(doc, selection, &options.indent),
            Cmd::Outdent => outdent(doc, selection, &options.indent),
            Cmd::InsertText { text } => insert_text(doc, selection, text),
            Cmd::DeleteBackward => delete_backward(doc, selection),
            Cmd::SplitBlock => split_block(doc, selection),
        }?;
        if !result.is_applicable() {
            debug!("{self:?} not applicable at {selection:?}");
        }
        Ok(result)
    }
}

/// Move the selected text into a new block of `kind` and put the cursor
/// at its first content position.
pub fn wrap_in_block(
    doc: &Document,
    selection: Selection,
    kind: BlockKind,
) -> Result<CommandResult, EditError> {
    let (from, to) = (selection.from(), selection.to());
    let text = doc.text_between(from, to)?;

    let mut tr = TransactionBuilder::new(doc);
    tr.delete_range(from, to)?;
    let at = tr.insert(from, vec![Node::textblock(kind, &text)])?;
    tr.set_selection(Selection::cursor(at + 1));
    Ok(CommandResult::Apply(tr.build()))
}

/// Remove the nearest enclosing block matching `pred`. Its text, if any,
/// survives in a plain paragraph.
pub fn unwrap_block(
    doc: &Document,
    selection: Selection,
    pred: impl FnMut(&BlockKind) -> bool,
) -> Result<CommandResult, EditError> {
    let rp = doc.resolve(selection.from())?;
    let Some(depth) = rp.find_ancestor(doc, pred) else {
        return Ok(CommandResult::NotApplicable);
    };
    let before = rp.before(depth);
    let text = doc.text_content(rp.node(depth));

    let mut tr = TransactionBuilder::new(doc);
    tr.delete_range(before, rp.after(depth))?;
    if text.is_empty() {
        tr.set_selection(Selection::cursor(before));
    } else {
        let offset = (selection.from() - rp.start(depth)).min(text.chars().count());
        let at = tr.insert(before, vec![Node::paragraph(&text)])?;
        tr.set_selection(Selection::cursor(at + 1 + offset));
    }
    Ok(CommandResult::Apply(tr.build()))
}

pub fn insert_bubble(
    doc: &Document,
    selection: Selection,
    position: BubblePosition,
) -> Result<CommandResult, EditError> {
    wrap_in_block(doc, selection, BlockKind::bubble(position))
}

pub fn remove_bubble(doc: &Document, selection: Selection) -> Result<CommandResult, EditError> {
    unwrap_block(doc, selection, BlockKind::is_bubble)
}

pub fn set_blockquote(
    doc: &Document,
    selection: Selection,
    style: QuoteStyle,
) -> Result<CommandResult, EditError> {
    wrap_in_block(doc, selection, BlockKind::blockquote(style))
}

pub fn unset_blockquote(doc: &Document, selection: Selection) -> Result<CommandResult, EditError> {
    unwrap_block(doc, selection, BlockKind::is_blockquote)
}

pub fn toggle_blockquote(
    doc: &Document,
    selection: Selection,
    style: QuoteStyle,
) -> Result<CommandResult, EditError> {
    let rp = doc.resolve(selection.from())?;
    if rp.find_ancestor(doc, BlockKind::is_blockquote).is_some() {
        unset_blockquote(doc, selection)
    } else {
        set_blockquote(doc, selection, style)
    }
}

/// Insert a horizontal rule at the cursor, replacing any selected content.
///
/// At the very start of a block the rule goes in front of that block
/// instead of splitting it. The cursor ends up in the textblock following
/// the rule; an empty paragraph is appended when nothing follows.
pub fn set_horizontal_rule(
    doc: &Document,
    selection: Selection,
    style: RuleStyle,
) -> Result<CommandResult, EditError> {
    let from = selection.from();
    let mut tr = TransactionBuilder::new(doc);
    tr.delete_range(from, selection.to())?;

    let rp = tr.doc().resolve(from)?;
    let pos = if rp.depth() > 0 && rp.parent_offset() == 0 {
        rp.before(rp.depth())
    } else {
        from
    };
    let rule = Node::block(BlockKind::horizontal_rule(style), Vec::new());
    let rule_end = tr.insert(pos, vec![rule])? + 1;

    let next = tr.doc().resolve(rule_end)?.node_after(tr.doc());
    let next_is_textblock = next
        .and_then(|id| tr.doc().kind(id))
        .map(BlockKind::is_textblock);
    match next_is_textblock {
        Some(true) => {
            tr.set_selection(Selection::cursor(rule_end + 1));
        }
        Some(false) => {}
        None => {
            tr.insert(rule_end, vec![Node::paragraph("")])?;
            tr.set_selection(Selection::cursor(rule_end + 1));
        }
    }
    Ok(CommandResult::Apply(tr.build()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentDirection {
    In,
    Out,
}

fn shift_indent(
    doc: &Document,
    selection: Selection,
    options: &IndentOptions,
    direction: IndentDirection,
) -> Result<CommandResult, EditError> {
    let mut tr = TransactionBuilder::new(doc);
    let mut changed = false;
    for (pos, id) in doc.blocks_between(selection.from(), selection.to()) {
        let Some(kind) = doc.kind(id) else { continue };
        let Some(level) = kind.indent() else { continue };
        let next = match direction {
            IndentDirection::In if level < options.max_level => level + 1,
            IndentDirection::Out if level > options.min_level => level - 1,
            _ => continue,
        };
        if let Some(kind) = kind.with_indent(next) {
            changed |= tr.set_attributes(pos, kind)?;
        }
    }
    if changed {
        Ok(CommandResult::Apply(tr.build()))
    } else {
        Ok(CommandResult::NotApplicable)
    }
}

/// Raise the indent of every indentable block touched by the selection.
pub fn indent(
    doc: &Document,
    selection: Selection,
    options: &IndentOptions,
) -> Result<CommandResult, EditError> {
    shift_indent(doc, selection, options, IndentDirection::In)
}

pub fn outdent(
    doc: &Document,
    selection: Selection,
    options: &IndentOptions,
) -> Result<CommandResult, EditError> {
    shift_indent(doc, selection, options, IndentDirection::Out)
}

pub fn insert_text(
    doc: &Document,
    selection: Selection,
    text: &str,
) -> Result<CommandResult, EditError> {
    let from = selection.from();
    if text.is_empty() && selection.is_empty() {
        return Ok(CommandResult::NotApplicable);
    }
    let mut tr = TransactionBuilder::new(doc);
    tr.delete_range(from, selection.to())?;
    if !tr.doc().resolve(from)?.in_textblock(tr.doc()) {
        return Ok(CommandResult::NotApplicable);
    }
    if !text.is_empty() {
        tr.insert(from, vec![Node::text(text)])?;
    }
    tr.set_selection(Selection::cursor(from + text.chars().count()));
    Ok(CommandResult::Apply(tr.build()))
}

pub fn delete_backward(doc: &Document, selection: Selection) -> Result<CommandResult, EditError> {
    let mut tr = TransactionBuilder::new(doc);
    if !selection.is_empty() {
        tr.delete_range(selection.from(), selection.to())?;
        tr.set_selection(Selection::cursor(selection.from()));
        return Ok(CommandResult::Apply(tr.build()));
    }

    let pos = selection.head;
    let rp = doc.resolve(pos)?;
    let previous = if rp.depth() == 0 {
        rp.node_before(doc)
    } else if rp.parent_offset() > 0 {
        tr.delete_range(pos - 1, pos)?;
        tr.set_selection(Selection::cursor(pos - 1));
        return Ok(CommandResult::Apply(tr.build()));
    } else {
        doc.resolve(rp.before(1))?.node_before(doc)
    };
    let Some(previous) = previous.and_then(|id| doc.kind(id)) else {
        return Ok(CommandResult::NotApplicable);
    };

    let boundary = if rp.depth() == 0 { pos } else { rp.before(1) };
    if previous.is_leaf() {
        tr.delete_range(boundary - 1, boundary)?;
    } else if rp.depth() > 0 && previous.is_textblock() {
        // Join into the previous textblock.
        tr.delete_range(boundary - 1, boundary + 1)?;
        tr.set_selection(Selection::cursor(boundary - 1));
    } else {
        return Ok(CommandResult::NotApplicable);
    }
    Ok(CommandResult::Apply(tr.build()))
}

/// Split the textblock at the cursor. The new block keeps the kind of the
/// old one, except that a heading split at its end continues as a
/// paragraph.
pub fn split_block(doc: &Document, selection: Selection) -> Result<CommandResult, EditError> {
    let from = selection.from();
    let mut tr = TransactionBuilder::new(doc);
    tr.delete_range(from, selection.to())?;

    let rp = tr.doc().resolve(from)?;
    if !rp.in_textblock(tr.doc()) {
        if rp.depth() > 0 {
            return Ok(CommandResult::NotApplicable);
        }
        tr.insert(from, vec![Node::paragraph("")])?;
        tr.set_selection(Selection::cursor(from + 1));
        return Ok(CommandResult::Apply(tr.build()));
    }

    let Some(kind) = tr.doc().kind(rp.parent()).cloned() else {
        return Ok(CommandResult::NotApplicable);
    };
    let end = rp.end(rp.depth());
    let tail = tr.doc().text_between(from, end)?;
    let kind = match kind {
        BlockKind::Heading { .. } if tail.is_empty() => BlockKind::paragraph(),
        kind => kind,
    };

    tr.delete_range(from, end)?;
    let at = tr.insert(from + 1, vec![Node::textblock(kind, &tail)])?;
    tr.set_selection(Selection::cursor(at + 1));
    Ok(CommandResult::Apply(tr.build()))
}

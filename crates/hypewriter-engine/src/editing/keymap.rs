use crate::editing::commands::{self, CommandResult};
use crate::editing::document::Document;
use crate::editing::error::EditError;
use crate::editing::node::{BlockKind, Node};
use crate::editing::options::IndentOptions;
use crate::editing::selection::Selection;
use crate::editing::transaction::{Transaction, TransactionBuilder};

/// Keys with block-aware behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    ShiftTab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled(Transaction),
    /// The host should run its default editing for the key.
    NotHandled,
}

impl From<CommandResult> for KeyOutcome {
    fn from(result: CommandResult) -> Self {
        match result {
            CommandResult::Apply(tr) => KeyOutcome::Handled(tr),
            CommandResult::NotApplicable => KeyOutcome::NotHandled,
        }
    }
}

fn is_container(kind: &BlockKind) -> bool {
    kind.is_bubble() || kind.is_blockquote()
}

/// Dispatch a key press based on the blocks around the cursor.
pub fn handle_key(
    doc: &Document,
    selection: Selection,
    key: Key,
    options: &IndentOptions,
) -> Result<KeyOutcome, EditError> {
    match key {
        Key::Enter => exit_container(doc, selection),
        Key::Backspace => unwrap_empty_container(doc, selection),
        Key::Tab => Ok(commands::indent(doc, selection, options)?.into()),
        Key::ShiftTab => Ok(commands::outdent(doc, selection, options)?.into()),
    }
}

/// Enter inside a bubble or quote: continue in a new paragraph after it.
fn exit_container(doc: &Document, selection: Selection) -> Result<KeyOutcome, EditError> {
    let rp = doc.resolve(selection.from())?;
    let Some(depth) = rp.find_ancestor(doc, is_container) else {
        return Ok(KeyOutcome::NotHandled);
    };
    let after = rp.after(depth);

    let mut tr = TransactionBuilder::new(doc);
    tr.insert(after, vec![Node::paragraph("")])?;
    tr.set_selection(Selection::cursor(after + 1));
    Ok(KeyOutcome::Handled(tr.build()))
}

/// Backspace in an empty bubble or quote removes the block.
fn unwrap_empty_container(doc: &Document, selection: Selection) -> Result<KeyOutcome, EditError> {
    if !selection.is_empty() {
        return Ok(KeyOutcome::NotHandled);
    }
    let rp = doc.resolve(selection.head)?;
    let Some(depth) = rp.find_ancestor(doc, is_container) else {
        return Ok(KeyOutcome::NotHandled);
    };
    let node = rp.node(depth);
    // Text content only; these blocks never hold anything else.
    if !doc.text_content(node).is_empty() {
        return Ok(KeyOutcome::NotHandled);
    }
    let result = match doc.kind(node) {
        Some(kind) if kind.is_bubble() => commands::remove_bubble(doc, selection)?,
        Some(_) => commands::unset_blockquote(doc, selection)?,
        None => CommandResult::NotApplicable,
    };
    Ok(result.into())
}

use log::debug;

use crate::editing::commands::{Cmd, CommandResult};
use crate::editing::decorations::{DecorationSet, line_highlight};
use crate::editing::document::Document;
use crate::editing::error::EditError;
use crate::editing::keymap::{Key, KeyOutcome, handle_key};
use crate::editing::options::EditorOptions;
use crate::editing::patch::Patch;
use crate::editing::selection::{Selection, snap_to_text};
use crate::editing::transaction::{ApplyOutcome, Transaction};

/// Owner of one document and its selection.
///
/// Every change goes through [`Editor::apply`]; a rejected transaction
/// leaves document, selection and version as they were.
#[derive(Debug, Clone)]
pub struct Editor {
    doc: Document,
    selection: Selection,
    options: EditorOptions,
    version: u64,
}

impl Editor {
    /// Start with the cursor at the first typing position.
    pub fn new(doc: Document, options: EditorOptions) -> Self {
        let selection = Selection::cursor(snap_to_text(&doc, 0).unwrap_or(0));
        Self {
            doc,
            selection,
            options,
            version: 0,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditError> {
        selection.validate(&self.doc)?;
        self.selection = selection;
        Ok(())
    }

    /// Apply a transaction. `Ok(None)` means nothing changed.
    pub fn apply(&mut self, tr: &Transaction) -> Result<Option<Patch>, EditError> {
        match tr.apply(&self.doc, self.selection)? {
            ApplyOutcome::Unchanged => Ok(None),
            ApplyOutcome::Changed {
                doc,
                selection,
                mapping,
            } => {
                self.doc = doc;
                self.selection = selection;
                self.version += 1;
                debug!("document now at version {}", self.version);
                Ok(Some(Patch {
                    changed: mapping.changed_ranges(),
                    new_selection: selection,
                    version: self.version,
                }))
            }
        }
    }

    /// Run a command. Returns whether the document changed.
    pub fn execute(&mut self, cmd: Cmd) -> Result<bool, EditError> {
        match cmd.compile(&self.doc, self.selection, &self.options)? {
            CommandResult::Apply(tr) => Ok(self.apply(&tr)?.is_some()),
            CommandResult::NotApplicable => Ok(false),
        }
    }

    /// Dispatch a key. Returns `false` when the host should fall back to
    /// its default editing.
    pub fn handle_key(&mut self, key: Key) -> Result<bool, EditError> {
        match handle_key(&self.doc, self.selection, key, &self.options.indent)? {
            KeyOutcome::Handled(tr) => Ok(self.apply(&tr)?.is_some()),
            KeyOutcome::NotHandled => Ok(false),
        }
    }

    /// Current decorations, recomputed on every call.
    pub fn decorations(&self) -> DecorationSet {
        line_highlight(&self.doc, self.selection, &self.options.highlight_class)
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

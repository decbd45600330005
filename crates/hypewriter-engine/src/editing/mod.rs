/*!
 * # Block Editing Core
 *
 * Structural editing for chapter documents: speech bubbles, quotes with
 * visual variants, horizontal rules, per-block indent and the line
 * highlight that follows the cursor.
 *
 * ## Architecture Overview
 *
 * ### 1. Arena Document
 * - The tree lives in a **`Document`** arena; nodes are addressed by
 *   `NodeId` handles and every block owns its children exclusively
 * - The content model is flat: the root holds blocks, textblocks hold
 *   plain text, horizontal rules hold nothing
 * - `Document::check` verifies this after every transaction
 *
 * ### 2. Positions
 * - A position is an integer offset that counts block boundaries and
 *   characters (see [`position`])
 * - **`ResolvedPos`** turns an offset into its ancestor chain with
 *   start/end/before/after per depth
 * - Resolved positions hold handles and integers only and are recomputed
 *   after every edit
 *
 * ### 3. Transactions
 * - A **`Transaction`** is a list of `Step`s (delete range, insert,
 *   set attributes) plus an optional selection
 * - Steps apply in order against the progressively modified document
 * - `Transaction::apply` works on a copy: any failing step rejects the
 *   whole transaction and the caller's state is untouched
 * - Each step yields a `StepMap`; the previous selection is mapped
 *   through them when the transaction declares none
 *
 * ### 4. Commands and Keys
 * - **`Cmd`** values compile to a `Transaction` or report
 *   `CommandResult::NotApplicable`; they never mutate
 * - `keymap::handle_key` dispatches Enter/Backspace/Tab by looking at the
 *   blocks around the cursor
 * - Options such as indent bounds are passed in explicitly
 *   (`EditorOptions`)
 *
 * ### 5. Decorations
 * - `decorations::line_highlight` is a pure function of document and
 *   selection, recomputed on every render
 *
 * ## Module Structure
 *
 * - **`node`**: owned `Node` values, `BlockKind` and block attributes
 * - **`document`**: the arena and the primitive edits
 * - **`position`**: `resolve` and `ResolvedPos`
 * - **`mapping`**: `StepMap`, `Mapping`
 * - **`transaction`**: `Step`, `Transaction`, `TransactionBuilder`
 * - **`selection`**: `Selection` and text-position search
 * - **`commands`**: `Cmd` and the block commands
 * - **`keymap`**: key dispatch
 * - **`decorations`**: the line highlight
 * - **`editor`**: `Editor`, the owner of document, selection and version
 * - **`patch`**: result metadata of an applied transaction
 *
 * ## Usage Pattern
 *
 * ```rust
 * use hypewriter_engine::editing::*;
 *
 * // 1. Build a document from owned nodes
 * let doc = Document::from_nodes(vec![Node::paragraph("Hello world")]).unwrap();
 * let mut editor = Editor::new(doc, EditorOptions::default());
 *
 * // 2. Select "Hello" and wrap it in a bubble
 * editor.set_selection(Selection::range(1, 6)).unwrap();
 * editor.execute(Cmd::InsertBubble { position: BubblePosition::Left }).unwrap();
 *
 * // 3. Ask for the highlight to render
 * let decorations = editor.decorations();
 * assert!(!decorations.is_empty());
 * ```
 */

pub mod commands;
pub mod decorations;
pub mod document;
pub mod editor;
pub mod error;
pub mod keymap;
pub mod mapping;
pub mod node;
pub mod options;
pub mod patch;
pub mod position;
pub mod selection;
pub mod transaction;

pub use commands::{Cmd, CommandResult};
pub use decorations::{Decoration, DecorationSet, line_highlight};
pub use document::{Document, NodeData, NodeId};
pub use editor::Editor;
pub use error::EditError;
pub use keymap::{Key, KeyOutcome, handle_key};
pub use mapping::{Assoc, Mapping, StepMap};
pub use node::{BlockKind, BubblePosition, Node, NodeType, QuoteStyle, RuleStyle};
pub use options::{EditorOptions, IndentOptions};
pub use patch::Patch;
pub use position::ResolvedPos;
pub use selection::{Direction, Selection, nearest_text_position, snap_to_text};
pub use transaction::{ApplyOutcome, Step, Transaction, TransactionBuilder};

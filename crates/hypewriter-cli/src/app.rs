use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use hypewriter_engine::editing::{
    BlockKind, BubblePosition, Cmd, Direction, Document, Editor, EditorOptions, Key, Node,
    NodeId, QuoteStyle, RuleStyle, Selection, nearest_text_position, snap_to_text,
};
use hypewriter_engine::{Project, io};
use hypewriter_markup::{parse_html, to_html};
use log::{debug, warn};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListState,
};
use std::path::PathBuf;

/// What the main loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub path: PathBuf,
    pub project: Project,
    pub chapter_list_state: ListState,
    pub editor: Editor,
    pub status: String,
    options: EditorOptions,
    dirty: bool,
}

/// Load chapter HTML into a document. An empty chapter gets one empty
/// paragraph so there is somewhere to type.
fn load_chapter(html: &str, options: &EditorOptions) -> Result<Document> {
    let doc = parse_html(html, &options.indent)?;
    if doc.top_level().is_empty() {
        return Ok(Document::from_nodes(vec![Node::paragraph("")])?);
    }
    Ok(doc)
}

impl App {
    pub fn new(path: PathBuf, project: Project, options: EditorOptions) -> Result<Self> {
        let content = project
            .chapters
            .first()
            .map(|chapter| chapter.content.as_str())
            .unwrap_or_default();
        let editor = Editor::new(load_chapter(content, &options)?, options.clone());

        let mut chapter_list_state = ListState::default();
        if !project.chapters.is_empty() {
            chapter_list_state.select(Some(0));
        }

        Ok(Self {
            path,
            project,
            chapter_list_state,
            editor,
            status: String::new(),
            options,
            dirty: false,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the editor's document back into the selected chapter.
    fn store_current(&mut self) {
        let Some(index) = self.chapter_list_state.selected() else {
            return;
        };
        let Some(id) = self.project.chapters.get(index).map(|chapter| chapter.id) else {
            return;
        };
        let html = to_html(self.editor.doc(), &self.options.indent);
        if self.project.chapters[index].content != html {
            self.project.update_chapter_content(id, html);
        }
    }

    pub fn select_chapter(&mut self, index: usize) -> Result<()> {
        if index >= self.project.chapters.len() {
            return Ok(());
        }
        self.store_current();
        let doc = load_chapter(&self.project.chapters[index].content, &self.options)?;
        self.editor = Editor::new(doc, self.options.clone());
        self.chapter_list_state.select(Some(index));
        debug!("switched to chapter {index}");
        Ok(())
    }

    pub fn next_chapter(&mut self) -> Result<()> {
        let count = self.project.chapters.len();
        if count == 0 {
            return Ok(());
        }
        let next = match self.chapter_list_state.selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.select_chapter(next)
    }

    pub fn previous_chapter(&mut self) -> Result<()> {
        let count = self.project.chapters.len();
        if count == 0 {
            return Ok(());
        }
        let previous = match self.chapter_list_state.selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.select_chapter(previous)
    }

    pub fn new_chapter(&mut self) -> Result<()> {
        let title = format!("Chapter {}", self.project.chapters.len() + 1);
        self.project.add_chapter(title);
        self.dirty = true;
        self.select_chapter(self.project.chapters.len() - 1)
    }

    pub fn save(&mut self) -> Result<()> {
        self.store_current();
        io::write_project(&self.path, &mut self.project)?;
        self.dirty = false;
        self.status = format!("Saved {}", self.path.display());
        Ok(())
    }

    fn run(&mut self, cmd: Cmd) {
        match self.editor.execute(cmd) {
            Ok(true) => self.dirty = true,
            Ok(false) => {}
            Err(e) => {
                warn!("command failed: {e}");
                self.status = format!("Error: {e}");
            }
        }
    }

    /// Block-aware key first, `fallback` when the keymap declines.
    fn run_key(&mut self, key: Key, fallback: Option<Cmd>) {
        match self.editor.handle_key(key) {
            Ok(true) => self.dirty = true,
            Ok(false) => {
                if let Some(cmd) = fallback {
                    self.run(cmd);
                }
            }
            Err(e) => {
                warn!("key {key:?} failed: {e}");
                self.status = format!("Error: {e}");
            }
        }
    }

    /// Typing needs a cursor inside a textblock. A cursor left between
    /// blocks moves to the nearest text, or an empty document gets a
    /// fresh paragraph.
    fn ensure_text_cursor(&mut self) {
        let selection = self.editor.selection();
        if !selection.is_empty() {
            return;
        }
        let doc = self.editor.doc();
        if doc
            .resolve(selection.head)
            .is_ok_and(|rp| rp.in_textblock(doc))
        {
            return;
        }
        match snap_to_text(doc, selection.head) {
            Some(pos) => {
                debug!("cursor {} is between blocks, moving to {pos}", selection.head);
                if let Err(e) = self.editor.set_selection(Selection::cursor(pos)) {
                    warn!("cursor snap rejected: {e}");
                }
            }
            None => self.run(Cmd::SplitBlock),
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let doc = self.editor.doc();
        let head = self.editor.selection().head;
        let target = match code {
            KeyCode::Left => head
                .checked_sub(1)
                .and_then(|pos| nearest_text_position(doc, pos, Direction::Backward)),
            KeyCode::Right => nearest_text_position(doc, head + 1, Direction::Forward),
            KeyCode::Up | KeyCode::Down => {
                let Ok(rp) = doc.resolve(head) else {
                    return;
                };
                if rp.depth() == 0 {
                    return;
                }
                if code == KeyCode::Up {
                    rp.before(1)
                        .checked_sub(1)
                        .and_then(|pos| nearest_text_position(doc, pos, Direction::Backward))
                } else {
                    nearest_text_position(doc, rp.after(1) + 1, Direction::Forward)
                }
            }
            _ => None,
        };
        if let Some(pos) = target
            && let Err(e) = self.editor.set_selection(Selection::cursor(pos))
        {
            warn!("cursor move rejected: {e}");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Flow> {
        if key.kind != KeyEventKind::Press {
            return Ok(Flow::Continue);
        }
        self.status.clear();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Ok(Flow::Quit),
            KeyCode::Char(c) if ctrl => match c {
                's' => self.save()?,
                'n' => self.new_chapter()?,
                'l' => self.run(Cmd::InsertBubble {
                    position: BubblePosition::Left,
                }),
                'r' => self.run(Cmd::InsertBubble {
                    position: BubblePosition::Right,
                }),
                'u' => self.run(Cmd::RemoveBubble),
                'q' => self.run(Cmd::ToggleBlockquote {
                    style: QuoteStyle::Line,
                }),
                'd' => self.run(Cmd::SetHorizontalRule {
                    style: RuleStyle::Solid,
                }),
                _ => {}
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.ensure_text_cursor();
                self.run(Cmd::InsertText {
                    text: c.to_string(),
                })
            }
            KeyCode::Enter => self.run_key(Key::Enter, Some(Cmd::SplitBlock)),
            KeyCode::Backspace => self.run_key(Key::Backspace, Some(Cmd::DeleteBackward)),
            KeyCode::Tab => self.run_key(Key::Tab, None),
            KeyCode::BackTab => self.run_key(Key::ShiftTab, None),
            KeyCode::PageDown => self.next_chapter()?,
            KeyCode::PageUp => self.previous_chapter()?,
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                self.move_cursor(key.code)
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// One styled line per top-level block, with the cursor and the line
    /// highlight drawn in.
    pub fn content_lines(&self) -> Vec<Line<'static>> {
        let doc = self.editor.doc();
        let head = self.editor.selection().head;
        let decorations = self.editor.decorations();
        let mut lines = Vec::new();
        let mut offset = 0;

        for &block in doc.top_level() {
            let highlighted = decorations.iter().any(|d| d.from == offset);
            let cursor = (head > offset && head < offset + doc.node_size(block))
                .then(|| head - offset - 1);
            let mut line = render_block(doc, block, cursor);
            if highlighted {
                line = line.style(Style::default().bg(Color::DarkGray));
            }
            lines.push(line);
            offset += doc.node_size(block);
        }

        lines
    }
}

fn render_block(doc: &Document, block: NodeId, cursor: Option<usize>) -> Line<'static> {
    let Some(kind) = doc.kind(block) else {
        return Line::default();
    };
    let indent = "  ".repeat(usize::from(kind.indent().unwrap_or(0)));
    let prefix = match kind {
        BlockKind::Heading { level, .. } => format!("{} ", "#".repeat(usize::from(*level))),
        BlockKind::Bubble { .. } => "💬 ".to_string(),
        BlockKind::Blockquote { style, .. } => format!("│{style}│ "),
        BlockKind::HorizontalRule { .. } => return Line::from("────────────────"),
        BlockKind::Paragraph { .. } | BlockKind::Doc => String::new(),
    };

    let text = doc.text_content(block);
    let mut spans = vec![Span::raw(format!("{indent}{prefix}"))];
    match cursor {
        Some(at) => {
            let before: String = text.chars().take(at).collect();
            let under = text.chars().nth(at).unwrap_or(' ');
            let after: String = text.chars().skip(at + 1).collect();
            spans.push(Span::raw(before));
            spans.push(Span::styled(
                under.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
            spans.push(Span::raw(after));
        }
        None => spans.push(Span::raw(text)),
    }

    let line = Line::from(spans);
    if matches!(
        kind,
        BlockKind::Bubble {
            position: BubblePosition::Right
        }
    ) {
        line.right_aligned()
    } else {
        line
    }
}

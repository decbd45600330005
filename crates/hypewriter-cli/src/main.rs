mod app;

use anyhow::Result;
use app::{App, Flow};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hypewriter_config::Config;
use hypewriter_engine::editing::EditorOptions;
use hypewriter_engine::io::{self, PROJECT_EXTENSION};
use log::info;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

fn main() -> Result<()> {
    env_logger::init();

    // Determine the project file from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let (project_path, options) = if args.len() == 2 {
        let options = match Config::load() {
            Ok(Some(config)) => config.editor_options(),
            _ => EditorOptions::default(),
        };
        (PathBuf::from(&args[1]), options)
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => (
                config
                    .projects_path
                    .join(format!("untitled.{PROJECT_EXTENSION}")),
                config.editor_options(),
            ),
            Ok(None) => {
                eprintln!("Error: No project file provided and no config file found");
                eprintln!("Usage: {} <project.{PROJECT_EXTENSION}>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <project.{PROJECT_EXTENSION}>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [project.{PROJECT_EXTENSION}]", args[0]);
        process::exit(1);
    };

    let project = match io::open_or_create_project(&project_path) {
        Ok(project) => project,
        Err(e) => {
            eprintln!(
                "Error: Cannot open project '{}': {e}",
                project_path.display()
            );
            process::exit(1);
        }
    };
    info!(
        "opened '{}' with {} chapters",
        project.metadata.title,
        project.chapters.len()
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(project_path, project, options)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }
    if app.is_dirty() {
        println!("Unsaved changes were discarded");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && app.handle_key(key)? == Flow::Quit
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);

    // Chapter list panel
    let chapter_items: Vec<ListItem> = app
        .project
        .chapters
        .iter()
        .map(|chapter| ListItem::new(Line::from(Span::raw(chapter.title.clone()))))
        .collect();

    let title = if app.is_dirty() {
        format!("{} *", app.project.metadata.title)
    } else {
        app.project.metadata.title.clone()
    };
    let chapter_list = List::new(chapter_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(chapter_list, chunks[0], &mut app.chapter_list_state);

    // Editor panel
    let content = Paragraph::new(app.content_lines())
        .block(Block::default().borders(Borders::ALL).title("Chapter"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    // Status line, or key help when there is nothing to report
    let status = if app.status.is_empty() {
        "Esc: Quit | ^S: Save | ^N: New chapter | PgUp/PgDn: Chapter | \
         ^L/^R: Bubble | ^U: Unbubble | ^Q: Quote | ^D: Rule | Tab/⇧Tab: Indent"
            .to_string()
    } else {
        app.status.clone()
    };
    f.render_widget(Paragraph::new(Line::from(status)), rows[1]);
}

//! Main TUI application state and logic

use crate::error::Error;
use crate::interpreter::Context;
use crate::memory::value::{to_string, Value};
use crate::parser::{parse, tokens, Token};
use crate::ui::highlight::highlight_source;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    text::Line,
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Tokens,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Tokens,
            FocusedPane::Tokens => FocusedPane::Source,
        }
    }
}

/// Result of running the program once, as shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub text: String,
    pub ok: bool,
    /// Line of the error, when it has one
    pub error_line: Option<usize>,
}

impl RunOutcome {
    pub fn from_result(result: &Result<Value, Error>) -> Self {
        match result {
            Ok(value) => RunOutcome {
                text: to_string(value, true),
                ok: true,
                error_line: None,
            },
            Err(e) => RunOutcome {
                text: e.to_string(),
                ok: false,
                error_line: match e {
                    Error::Parse(e) => Some(e.position.line),
                    Error::Runtime(e) => e.location().map(|pos| pos.line),
                },
            },
        }
    }
}

/// The main application state
pub struct App {
    /// Highlighted source, one entry per line
    pub lines: Vec<Line<'static>>,

    /// Tokens of the parsed program (empty when parsing failed)
    pub tokens: Vec<Token>,

    pub outcome: RunOutcome,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub tokens_scroll: usize,

    pub should_quit: bool,
}

impl App {
    /// Parse and run `source` once, then build the view state
    pub fn load(source: &str, timeout: Duration) -> Self {
        let (listing, result) = match parse(source) {
            Ok(program) => {
                let listed = program
                    .as_callable()
                    .map(|callable| tokens(callable).collect())
                    .unwrap_or_default();
                let result = Context::new(timeout)
                    .call(&program, Vec::new())
                    .map_err(Error::from);
                (listed, result)
            }
            Err(e) => (Vec::new(), Err(Error::from(e))),
        };
        App::new(source, listing, RunOutcome::from_result(&result))
    }

    pub fn new(source: &str, tokens: Vec<Token>, outcome: RunOutcome) -> Self {
        App {
            lines: highlight_source(source),
            tokens,
            outcome,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            tokens_scroll: 0,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, status bar at the bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        super::panes::render_source_pane(
            frame,
            columns[0],
            &self.lines,
            self.outcome.error_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_tokens_pane(
            frame,
            columns[1],
            &self.tokens,
            self.focused_pane == FocusedPane::Tokens,
            &mut self.tokens_scroll,
        );

        super::panes::render_status_bar(frame, main_chunks[1], &self.outcome);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            // Panes clamp the offsets when they render
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(10);
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Tokens => &mut self.tokens_scroll,
        }
    }
}

//! Terminal demo: a single hashtag field with pill overlays

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use hashpill::{
    Color, Config, GridLayout, HashtagField, OverlayHost, OverlayStyle, Rect, Result, Verdict,
    VisualHandle,
};

use crate::terminal::{TermEvent, Terminal};

/// Overlay host for a character grid
///
/// Keeps the live overlays; the renderer paints every cell an overlay
/// covers with the overlay's color before drawing the glyph on top. Corner
/// radius has no effect on a cell grid.
#[derive(Default)]
pub struct CellOverlays {
    next: u64,
    live: BTreeMap<VisualHandle, (Rect, OverlayStyle)>,
}

impl CellOverlays {
    /// Background color for the cell at (row, col), if any overlay covers it
    fn background_at(&self, row: usize, col: usize) -> Option<Color> {
        let (x, y) = (col as f32 + 0.5, row as f32 + 0.5);
        self.live
            .values()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, style)| style.color)
    }
}

impl OverlayHost for CellOverlays {
    fn create_overlay(&mut self, rect: Rect, style: &OverlayStyle) -> VisualHandle {
        let handle = VisualHandle(self.next);
        self.next += 1;
        self.live.insert(handle, (rect, *style));
        handle
    }

    fn remove_overlay(&mut self, handle: VisualHandle) {
        self.live.remove(&handle);
    }
}

/// Demo state and main loop
pub struct App {
    terminal: Terminal,
    field: HashtagField<CellOverlays>,
    /// Configured wrap width, before capping to the terminal
    wrap_width: usize,
    /// First layout row shown on screen
    top_row: usize,
    message: Option<String>,
    running: bool,
}

impl App {
    pub fn new(terminal: Terminal, config: &Config, initial: Option<&str>) -> Result<Self> {
        let wrap_width = config.wrap_width;
        let config = Config {
            wrap_width: text_columns(&terminal, wrap_width),
            ..config.clone()
        };
        let mut field = HashtagField::new(CellOverlays::default(), &config)?;
        if let Some(text) = initial {
            field.set_text(text);
        }
        Ok(Self {
            terminal,
            field,
            wrap_width,
            top_row: 0,
            message: None,
            running: true,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        info!("hashpill demo started");
        self.terminal.clear_screen()?;
        while self.running {
            self.render()?;
            match self.terminal.read_event()? {
                TermEvent::Key(key) => self.handle_key(key)?,
                TermEvent::Resize(cols, _) => {
                    debug!(cols, "terminal resized");
                    self.field.resize(text_columns(&self.terminal, self.wrap_width));
                    self.terminal.clear_screen()?;
                }
            }
        }
        info!(tokens = self.field.matched_tokens().len(), "hashpill demo finished");
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.message = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('t') if ctrl => {
                let restricted = !self.field.is_restricted();
                self.field.set_restricted(restricted);
                self.message = Some(if restricted {
                    "hashtag-first input on".to_string()
                } else {
                    "hashtag-first input off".to_string()
                });
            }
            KeyCode::Char(ch) if !ctrl => {
                let verdict = self.field.insert_at_caret(&ch.to_string())?;
                self.report(verdict)?;
            }
            KeyCode::Enter => {
                let verdict = self.field.insert_at_caret("\n")?;
                self.report(verdict)?;
            }
            KeyCode::Backspace => {
                self.field.delete_backward();
            }
            KeyCode::Delete => {
                self.field.delete_forward();
            }
            KeyCode::Left => self.field.move_caret_left(),
            KeyCode::Right => self.field.move_caret_right(),
            KeyCode::Home => self.field.move_caret_to(0),
            KeyCode::End => self.field.move_caret_to(usize::MAX),
            _ => {}
        }
        Ok(())
    }

    fn report(&mut self, verdict: Verdict) -> Result<()> {
        if !verdict.is_accepted() {
            self.message = Some(format!("rejected: {}", verdict.reason()));
            self.terminal.beep()?;
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let rows = self.terminal.rows().max(2) as usize;
        let text_rows = rows - 1;
        let layout: &GridLayout = self.field.layout();

        // Keep the caret row on screen
        let (caret_row, caret_col) = layout.caret_position(self.field.caret());
        if caret_row < self.top_row {
            self.top_row = caret_row;
        } else if caret_row >= self.top_row + text_rows {
            self.top_row = caret_row + 1 - text_rows;
        }

        let mut lines: Vec<Vec<(char, Option<Color>)>> = vec![Vec::new(); text_rows];
        let overlays = self.field.host();
        for (idx, ch) in self.field.text().chars().enumerate() {
            let Some(cell) = layout.cell(idx) else {
                break;
            };
            if cell.width == 0 || cell.row < self.top_row {
                continue;
            }
            let Some(line) = lines.get_mut(cell.row - self.top_row) else {
                break;
            };
            line.push((ch, overlays.background_at(cell.row, cell.col)));
        }

        self.terminal.set_cursor_visible(false)?;
        for (row, line) in lines.iter().enumerate() {
            self.terminal.move_cursor(row as u16, 0)?;
            let mut current: Option<Color> = None;
            for &(ch, bg) in line {
                if bg != current {
                    match bg {
                        Some(color) => self.terminal.set_background(color)?,
                        None => self.terminal.reset_colors()?,
                    }
                    current = bg;
                }
                self.terminal.write_char(ch)?;
            }
            self.terminal.reset_colors()?;
            self.terminal.clear_to_eol()?;
        }

        self.render_status_line(rows - 1)?;

        self.terminal.move_cursor(
            (caret_row - self.top_row) as u16,
            caret_col as u16,
        )?;
        self.terminal.set_cursor_visible(true)?;
        self.terminal.flush()
    }

    fn render_status_line(&mut self, row: usize) -> Result<()> {
        let status = match &self.message {
            Some(msg) => msg.clone(),
            None => {
                let mode = if self.field.is_restricted() { "#-first" } else { "free" };
                let tokens: Vec<&str> = self
                    .field
                    .matched_tokens()
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect();
                format!("[{}] {}", mode, tokens.join(" "))
            }
        };
        let cols = self.terminal.cols() as usize;
        let status: String = status.chars().take(cols).collect();
        self.terminal.move_cursor(row as u16, 0)?;
        self.terminal.write_str(&status)?;
        self.terminal.clear_to_eol()
    }
}

/// Wrap width for the field: the configured width capped by the terminal
fn text_columns(terminal: &Terminal, wanted: usize) -> usize {
    wanted.min(terminal.cols() as usize).max(1)
}

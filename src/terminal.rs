//! Terminal abstraction using crossterm

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor},
    terminal::{self, ClearType},
};

use hashpill::{Color, Result};

/// Input the demo reacts to
pub enum TermEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Terminal wrapper for cross-platform terminal I/O
pub struct Terminal {
    /// Terminal width in columns
    cols: u16,
    /// Terminal height in rows
    rows: u16,
}

impl Terminal {
    /// Create a new terminal instance and enter raw mode
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;

        let term = Self { cols, rows };
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        Ok(term)
    }

    /// Get terminal width
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Get terminal height
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Clear the entire screen
    pub fn clear_screen(&mut self) -> Result<()> {
        queue!(io::stdout(), terminal::Clear(ClearType::All))?;
        Ok(())
    }

    /// Clear from cursor to end of line
    pub fn clear_to_eol(&mut self) -> Result<()> {
        queue!(io::stdout(), terminal::Clear(ClearType::UntilNewLine))?;
        Ok(())
    }

    /// Move cursor to position (0-indexed)
    pub fn move_cursor(&mut self, row: u16, col: u16) -> Result<()> {
        queue!(io::stdout(), cursor::MoveTo(col, row))?;
        Ok(())
    }

    /// Write a string at current cursor position
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        queue!(io::stdout(), Print(s))?;
        Ok(())
    }

    /// Write a single character
    pub fn write_char(&mut self, ch: char) -> Result<()> {
        queue!(io::stdout(), Print(ch))?;
        Ok(())
    }

    /// Set the background color for following output
    pub fn set_background(&mut self, color: Color) -> Result<()> {
        queue!(io::stdout(), SetBackgroundColor(term_color(color)))?;
        Ok(())
    }

    /// Reset colors
    pub fn reset_colors(&mut self) -> Result<()> {
        queue!(io::stdout(), ResetColor)?;
        Ok(())
    }

    /// Set cursor visibility
    pub fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
        if visible {
            queue!(io::stdout(), cursor::Show)?;
        } else {
            queue!(io::stdout(), cursor::Hide)?;
        }
        Ok(())
    }

    /// Flush output buffer to terminal
    pub fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    /// Read the next key press or resize (blocking)
    pub fn read_event(&mut self) -> Result<TermEvent> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(TermEvent::Key(key))
                }
                Event::Resize(cols, rows) => {
                    self.cols = cols;
                    self.rows = rows;
                    return Ok(TermEvent::Resize(cols, rows));
                }
                _ => {
                    // Ignore other events (mouse, focus, key release, etc.)
                }
            }
        }
    }

    /// Sound the bell
    pub fn beep(&mut self) -> Result<()> {
        queue!(io::stdout(), Print('\x07'))?;
        self.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = execute!(
            io::stdout(),
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::White,
        Color::Gray => TermColor::DarkGrey,
        Color::DarkGray => TermColor::Rgb { r: 60, g: 60, b: 60 },
        Color::LightGray => TermColor::Grey,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}

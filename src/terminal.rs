use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

/// Rectangle of cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.width && row >= self.y && row < self.y + self.height
    }
}

/// Off-screen grid of cells that effects draw into
#[derive(Clone, Debug)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); width as usize * height as usize];
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Set a character at position, keeping any background already there
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if let Some(i) = self.index(x, y) {
            let cell = &mut self.cells[i];
            cell.ch = ch;
            cell.fg = fg;
            cell.bold = bold;
        }
    }

    pub fn set_bg(&mut self, x: i32, y: i32, bg: Option<Color>) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].bg = bg;
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Text content of a row, for tests and print mode
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x as i32, y as i32))
            .map(|c| c.ch)
            .collect()
    }

    pub fn non_blank_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.ch != ' ' || c.bg.is_some()).count()
    }

    /// Write the buffer with ANSI colours (for print mode)
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = &self.cells[y as usize * self.width as usize + x as usize];
                if cell.ch == ' ' && cell.bg.is_none() {
                    write!(out, " ")?;
                    continue;
                }
                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.fg {
                    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?;
                }
                if let Some(Color::Rgb { r, g, b }) = cell.bg {
                    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)?;
                }
                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Terminal abstraction for rendering
pub struct Terminal {
    back: Buffer,
    front: Option<Buffer>,
    alternate_screen: bool,
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide, EnableMouseCapture)?;
        }

        Ok(Self {
            back: Buffer::new(width, height),
            front: None,
            alternate_screen,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        self.back.size()
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.back
    }

    /// Clear the back buffer
    pub fn clear(&mut self) {
        self.back.clear();
    }

    /// Clear the actual terminal and force a full redraw
    pub fn clear_screen(&mut self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        self.front = None;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.back.resize(width, height);
        self.front = None;
    }

    /// Draw the cells that changed since the last present
    pub fn present(&mut self) -> io::Result<()> {
        let mut out = stdout();
        let (width, height) = self.back.size();

        for y in 0..height {
            let mut cursor_at: Option<u16> = None;
            for x in 0..width {
                let idx = y as usize * width as usize + x as usize;
                let cell = &self.back.cells[idx];
                if let Some(front) = &self.front {
                    if front.cells.get(idx) == Some(cell) {
                        cursor_at = None;
                        continue;
                    }
                }
                if cursor_at != Some(x) {
                    queue!(out, MoveTo(x, y))?;
                }
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }
                match cell.fg {
                    Some(color) => queue!(out, SetForegroundColor(color), Print(cell.ch))?,
                    None => queue!(out, Print(cell.ch))?,
                }
                queue!(out, ResetColor)?;
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
                cursor_at = Some(x + 1);
            }
        }

        out.flush()?;
        self.front = Some(self.back.clone());
        Ok(())
    }

    /// Next pending terminal event (non-blocking)
    pub fn next_event(&self) -> io::Result<Option<Event>> {
        if poll(Duration::from_millis(0))? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut buf = Buffer::new(4, 2);
        buf.set(-1, 0, 'x', None, false);
        buf.set(4, 1, 'x', None, false);
        buf.set(1, 1, 'y', None, false);
        assert_eq!(buf.row_text(0), "    ");
        assert_eq!(buf.row_text(1), " y  ");
    }

    #[test]
    fn set_keeps_background() {
        let mut buf = Buffer::new(2, 1);
        buf.set_bg(0, 0, Some(Color::Rgb { r: 1, g: 2, b: 3 }));
        buf.set(0, 0, '*', None, true);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.ch, '*');
        assert!(cell.bg.is_some());
    }

    #[test]
    fn ansi_output_has_one_line_per_row() {
        let mut buf = Buffer::new(3, 2);
        buf.set_str(0, 0, "ab", Some(Color::Rgb { r: 255, g: 0, b: 0 }), false);
        let mut out = Vec::new();
        buf.write_ansi(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\x1b[38;2;255;0;0m"));
    }
}

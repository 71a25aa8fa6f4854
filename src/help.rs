use crate::terminal::Buffer;
use crossterm::style::Color;

pub const HELP: &str = "\
FOLIOVIZ
─────────────────
q/Esc    Quit
Space    Pause
1-9      Speed (1 fast)
Tab      Next globe
!@#$%^&) Theme
?        Close help";

/// Draw a centered help box over whatever is already in the buffer.
pub fn render_help_overlay(buf: &mut Buffer, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = buf.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border = Some(Color::White);
    let text = Some(Color::Grey);
    let (x0, y0) = (start_x as i32, start_y as i32);
    let (x1, y1) = (x0 + box_width as i32 - 1, y0 + box_height as i32 - 1);

    // Blank the box first so braille behind it does not bleed through
    for y in y0..=y1 {
        for x in x0..=x1 {
            buf.set(x, y, ' ', None, false);
            buf.set_bg(x, y, None);
        }
    }

    buf.set(x0, y0, '┌', border, false);
    buf.set(x1, y0, '┐', border, false);
    buf.set(x0, y1, '└', border, false);
    buf.set(x1, y1, '┘', border, false);
    for x in x0 + 1..x1 {
        buf.set(x, y0, '─', border, false);
        buf.set(x, y1, '─', border, false);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        buf.set(x0, y, '│', border, false);
        buf.set_str(x0 + 2, y, line, text, i == 0);
        buf.set(x1, y, '│', border, false);
    }
}

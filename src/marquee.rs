//! Endless scrolling rows of technology names.

use crate::canvas::Viewport;
use crate::colors::{Rgb, Theme};
use crate::config::MarqueeConfig;
use crate::stage::Effect;
use crate::terminal::{Buffer, Rect};
use rand::RngCore;

const BULLET: char = '◆';
const GAP: usize = 4;
/// Columns over which text fades in at either edge
const EDGE_FADE: f32 = 6.0;
const TEXT: Rgb = Rgb::new(0.82, 0.84, 0.86);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Left,
    Right,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TechItem {
    pub name: String,
    /// Bullet colour; `None` takes one from the theme
    pub color: Option<Rgb>,
}

impl TechItem {
    pub fn new(name: impl Into<String>, color: Option<Rgb>) -> Self {
        Self { name: name.into(), color }
    }

    fn branded(name: &str, hex: &str) -> Self {
        Self::new(name, Rgb::from_hex(hex))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarqueeRow {
    pub items: Vec<TechItem>,
    pub direction: Direction,
    /// Seconds for one full loop
    pub duration: f32,
}

impl MarqueeRow {
    pub fn new(items: Vec<TechItem>, direction: Direction, duration: f32) -> Self {
        Self { items, direction, duration }
    }

    /// Width in columns of one copy of the items
    pub fn strip_width(&self) -> usize {
        self.items.iter().map(|item| item.name.chars().count() + 2 + GAP).sum()
    }

    /// Horizontal offset of the doubled strip at `time`, in columns.
    ///
    /// Runs over half the doubled strip: 0 to -width moving left, or
    /// -width back to 0 moving right.
    pub fn offset(&self, time: f32) -> f32 {
        let width = self.strip_width() as f32;
        if width == 0.0 || self.duration <= 0.0 {
            return 0.0;
        }
        let p = (time / self.duration).rem_euclid(1.0);
        match self.direction {
            Direction::Left => -p * width,
            Direction::Right => -width + p * width,
        }
    }

    /// One copy of the strip as (glyph, colour) pairs
    fn glyphs(&self, theme: &Theme) -> Vec<(char, Rgb)> {
        let palette = [theme.primary, theme.secondary, theme.accent];
        let mut out = Vec::with_capacity(self.strip_width());
        for (i, item) in self.items.iter().enumerate() {
            let bullet = item.color.unwrap_or(palette[i % palette.len()]);
            out.push((BULLET, bullet));
            out.push((' ', TEXT));
            out.extend(item.name.chars().map(|c| (c, TEXT)));
            out.extend(std::iter::repeat((' ', TEXT)).take(GAP));
        }
        out
    }
}

pub fn default_rows() -> Vec<MarqueeRow> {
    vec![
        MarqueeRow::new(
            vec![
                TechItem::branded("React", "#61DAFB"),
                TechItem::branded("Next.js", "#FFFFFF"),
                TechItem::branded("TypeScript", "#3178C6"),
                TechItem::branded("JavaScript", "#F7DF1E"),
                TechItem::branded("Node.js", "#339933"),
                TechItem::branded("Tailwind CSS", "#06B6D4"),
                TechItem::branded("PostgreSQL", "#4169E1"),
                TechItem::branded("MongoDB", "#47A248"),
            ],
            Direction::Left,
            30.0,
        ),
        MarqueeRow::new(
            vec![
                TechItem::branded("Prisma", "#2D3748"),
                TechItem::branded("Git", "#F05032"),
                TechItem::branded("Docker", "#2496ED"),
                TechItem::branded("Figma", "#F24E1E"),
                TechItem::branded("Express", "#FFFFFF"),
                TechItem::branded("Vercel", "#FFFFFF"),
                TechItem::branded("Redis", "#DC382D"),
                TechItem::branded("GraphQL", "#E10098"),
            ],
            Direction::Right,
            35.0,
        ),
    ]
}

pub struct Marquee {
    rows: Vec<MarqueeRow>,
    theme: Theme,
    time: f32,
    viewport: Option<Viewport>,
}

impl Marquee {
    pub fn new(config: &MarqueeConfig, theme: Theme) -> Self {
        Self {
            rows: config.rows.clone(),
            theme,
            time: 0.0,
            viewport: None,
        }
    }

    pub fn rows(&self) -> &[MarqueeRow] {
        &self.rows
    }

    /// Screen line for row `i`, spreading rows out when there is room
    fn line_of(&self, i: usize, region: Rect) -> Option<u16> {
        let n = self.rows.len() as u16;
        let step = if n > 1 && region.height >= 2 * n - 1 { 2 } else { 1 };
        let line = i as u16 * step;
        (line < region.height).then_some(region.y + line)
    }

    fn draw_row(&self, buf: &mut Buffer, region: Rect, row: &MarqueeRow, y: u16) {
        let glyphs = row.glyphs(&self.theme);
        if glyphs.is_empty() {
            return;
        }
        let offset = row.offset(self.time).round() as i64;
        let width = region.width as f32;
        for col in 0..region.width {
            let idx = (col as i64 - offset).rem_euclid(glyphs.len() as i64) as usize;
            let (ch, color) = glyphs[idx];
            if ch == ' ' {
                continue;
            }
            let edge = (col as f32 + 0.5).min(width - col as f32 - 0.5);
            let fade = (edge / EDGE_FADE).clamp(0.0, 1.0);
            buf.set(
                (region.x + col) as i32,
                y as i32,
                ch,
                Some(color.scale(0.25 + 0.75 * fade).to_color()),
                ch == BULLET,
            );
        }
    }
}

impl Effect for Marquee {
    fn name(&self) -> &'static str {
        "marquee"
    }

    fn resize(&mut self, viewport: Viewport, _rng: &mut dyn RngCore) {
        self.viewport = (!viewport.is_empty()).then_some(viewport);
    }

    fn update(&mut self, dt: f32, _rng: &mut dyn RngCore) {
        self.time += dt;
    }

    fn render(&self, buf: &mut Buffer, region: Rect) {
        if self.viewport.is_none() {
            return;
        }
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(y) = self.line_of(i, region) {
                self.draw_row(buf, region, row, y);
            }
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::THEMES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn row(direction: Direction) -> MarqueeRow {
        MarqueeRow::new(vec![TechItem::new("Rust", None), TechItem::new("Git", None)], direction, 10.0)
    }

    #[test]
    fn default_rows_match_the_site() {
        let rows = default_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].items.len(), 8);
        assert_eq!(rows[0].items[0].name, "React");
        assert_eq!(rows[0].direction, Direction::Left);
        assert_eq!(rows[0].duration, 30.0);
        assert_eq!(rows[1].direction, Direction::Right);
        assert_eq!(rows[1].duration, 35.0);
        assert!(rows.iter().flat_map(|r| &r.items).all(|i| i.color.is_some()));
    }

    #[test]
    fn left_rows_run_from_zero_to_minus_half() {
        let r = row(Direction::Left);
        let w = r.strip_width() as f32;
        assert_eq!(r.offset(0.0), 0.0);
        assert!((r.offset(5.0) + w / 2.0).abs() < 1e-4);
        assert!((r.offset(10.0)).abs() < 1e-4);
    }

    #[test]
    fn right_rows_run_from_minus_half_to_zero() {
        let r = row(Direction::Right);
        let w = r.strip_width() as f32;
        assert!((r.offset(0.0) + w).abs() < 1e-4);
        assert!((r.offset(7.5) + w / 4.0).abs() < 1e-4);
    }

    #[test]
    fn strip_width_counts_bullets_and_gaps() {
        assert_eq!(row(Direction::Left).strip_width(), (4 + 2 + GAP) + (3 + 2 + GAP));
    }

    #[test]
    fn renders_names_on_separate_lines() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = MarqueeConfig { rows: default_rows() };
        let mut marquee = Marquee::new(&config, THEMES[0]);
        let mut buf = Buffer::new(60, 3);
        let area = buf.area();
        marquee.render(&mut buf, area);
        assert_eq!(buf.non_blank_cells(), 0);

        marquee.resize(Viewport::new(60, 3), &mut rng);
        let area = buf.area();
        marquee.render(&mut buf, area);
        assert!(buf.row_text(0).contains("React"));
        assert!(buf.row_text(1).trim().is_empty());
        assert!(buf.row_text(2).contains("Prisma"));
    }
}

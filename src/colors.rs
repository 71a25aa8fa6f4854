use crossterm::event::KeyCode;
use crossterm::style::Color;

/// Linear RGB colour with channels in 0..=1
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_u8(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Per-channel blend: `t = 0` gives `self`, `t = 1` gives `other`
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r * (1.0 - t) + other.r * t,
            self.g * (1.0 - t) + other.g * t,
            self.b * (1.0 - t) + other.b * t,
        )
    }

    pub fn scale(self, k: f32) -> Rgb {
        Rgb::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn add(self, other: Rgb) -> Rgb {
        Rgb::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn clamped(self) -> Rgb {
        Rgb::new(self.r.clamp(0.0, 1.0), self.g.clamp(0.0, 1.0), self.b.clamp(0.0, 1.0))
    }

    pub fn max_channel(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    pub fn to_color(self) -> Color {
        let c = self.clamped();
        Color::Rgb {
            r: (c.r * 255.0).round() as u8,
            g: (c.g * 255.0).round() as u8,
            b: (c.b * 255.0).round() as u8,
        }
    }
}

/// Palette shared by the globes, the crystal and the particle effects
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub deep: Rgb,
}

pub const THEMES: [Theme; 8] = [
    Theme {
        name: "violet",
        primary: Rgb::new(0.545, 0.361, 0.965),   // #8b5cf6
        secondary: Rgb::new(0.024, 0.714, 0.831), // #06b6d4
        accent: Rgb::new(0.133, 0.827, 0.933),    // #22d3ee
        deep: Rgb::new(0.486, 0.227, 0.929),      // #7c3aed
    },
    Theme {
        name: "fire",
        primary: Rgb::new(0.937, 0.267, 0.267),
        secondary: Rgb::new(0.984, 0.749, 0.141),
        accent: Rgb::new(0.992, 0.878, 0.278),
        deep: Rgb::new(0.600, 0.106, 0.106),
    },
    Theme {
        name: "ice",
        primary: Rgb::new(0.231, 0.510, 0.965),
        secondary: Rgb::new(0.647, 0.953, 0.988),
        accent: Rgb::new(0.878, 0.949, 0.996),
        deep: Rgb::new(0.118, 0.227, 0.541),
    },
    Theme {
        name: "pink",
        primary: Rgb::new(0.925, 0.282, 0.600),
        secondary: Rgb::new(0.957, 0.447, 0.714),
        accent: Rgb::new(0.984, 0.812, 0.910),
        deep: Rgb::new(0.616, 0.090, 0.302),
    },
    Theme {
        name: "gold",
        primary: Rgb::new(0.851, 0.467, 0.024),
        secondary: Rgb::new(0.980, 0.800, 0.082),
        accent: Rgb::new(0.996, 0.941, 0.541),
        deep: Rgb::new(0.471, 0.208, 0.059),
    },
    Theme {
        name: "electric",
        primary: Rgb::new(0.024, 0.714, 0.831),
        secondary: Rgb::new(0.647, 0.953, 0.988),
        accent: Rgb::WHITE,
        deep: Rgb::new(0.055, 0.455, 0.565),
    },
    Theme {
        name: "mono",
        primary: Rgb::new(0.639, 0.639, 0.639),
        secondary: Rgb::new(0.898, 0.898, 0.898),
        accent: Rgb::WHITE,
        deep: Rgb::new(0.322, 0.322, 0.322),
    },
    Theme {
        name: "neon",
        primary: Rgb::new(0.145, 0.388, 0.922),
        secondary: Rgb::new(0.851, 0.275, 0.937),
        accent: Rgb::new(0.941, 0.671, 0.988),
        deep: Rgb::new(0.118, 0.106, 0.294),
    },
];

/// Theme selection driven by Shift+digit keys
#[derive(Clone, Copy, Debug, Default)]
pub struct ThemeState {
    pub index: usize,
}

impl ThemeState {
    pub fn new(index: usize) -> Self {
        Self { index: index.min(THEMES.len() - 1) }
    }

    pub fn theme(&self) -> Theme {
        THEMES[self.index]
    }

    /// Handle theme key input. Returns true if the theme changed.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let next = match code {
            KeyCode::Char(')') => 0, // Shift+0: violet
            KeyCode::Char('!') => 1, // Shift+1: fire
            KeyCode::Char('@') => 2, // Shift+2: ice
            KeyCode::Char('#') => 3, // Shift+3: pink
            KeyCode::Char('$') => 4, // Shift+4: gold
            KeyCode::Char('%') => 5, // Shift+5: electric
            KeyCode::Char('^') => 6, // Shift+6: mono
            KeyCode::Char('&') => 7, // Shift+7: neon
            _ => return false,
        };
        let changed = next != self.index;
        self.index = next;
        changed
    }

    pub fn by_name(name: &str) -> Option<Self> {
        THEMES
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        let violet = Rgb::from_hex("#8b5cf6").unwrap();
        assert!((violet.r - 0.545).abs() < 0.01);
        assert!((violet.b - 0.965).abs() < 0.01);
        assert!(Rgb::from_hex("8b5cf").is_none());
        assert!(Rgb::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = THEMES[0].primary;
        let b = THEMES[0].secondary;
        assert_eq!(a.lerp(b, 0.0), a);
        let end = a.lerp(b, 1.0);
        assert!((end.g - b.g).abs() < 1e-6);
    }

    #[test]
    fn theme_keys() {
        let mut state = ThemeState::default();
        assert!(state.handle_key(KeyCode::Char('@')));
        assert_eq!(state.theme().name, "ice");
        assert!(!state.handle_key(KeyCode::Char('@')));
        assert!(!state.handle_key(KeyCode::Char('x')));
        assert_eq!(ThemeState::by_name("NEON").unwrap().index, 7);
    }
}

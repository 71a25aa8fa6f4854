use crate::colors::{Rgb, ThemeState};
use crate::globe::markers::{ArcPair, Marker, ARC_PAIRS, MARKERS};
use crate::globe::GlobeVariant;
use crate::marquee::{default_rows, Direction, MarqueeRow, TechItem};
use crate::settings::Settings;
use std::path::PathBuf;
use tracing::warn;

/// Largest marker size accepted from settings, in globe radii
pub const MAX_MARKER_SIZE: f32 = 0.5;

/// Which effects a run mounts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneKind {
    Starfield,
    #[default]
    Globe,
    Crystal,
    Particles,
    Marquee,
    /// Starfield backdrop with the globe on the left and the marquee below
    Showcase,
}

/// Configuration for the starfield
#[derive(Clone, Debug, PartialEq)]
pub struct StarfieldConfig {
    /// Multiplier on every layer's star count
    pub density: f32,
    /// Chance per frame of launching a shooting star
    pub shooting_star_chance: f64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            shooting_star_chance: 0.003,
        }
    }
}

/// Configuration for the globe
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeConfig {
    pub variant: GlobeVariant,
    pub rotation_speed: f32,
    /// Point-cloud gradient; `None` follows the theme
    pub color_a: Option<Rgb>,
    pub color_b: Option<Rgb>,
    pub markers: Vec<Marker>,
    pub arcs: Vec<ArcPair>,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            variant: GlobeVariant::default(),
            rotation_speed: 1.0,
            color_a: None,
            color_b: None,
            markers: MARKERS.to_vec(),
            arcs: ARC_PAIRS.to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrystalConfig {
    pub speed: f32,
}

impl Default for CrystalConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticlesConfig {
    pub count: usize,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self { count: 30 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarqueeConfig {
    pub rows: Vec<MarqueeRow>,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self { rows: default_rows() }
    }
}

impl MarqueeConfig {
    /// A single row built from plain names
    pub fn from_names(names: &[String], reverse: bool) -> Self {
        let items = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| TechItem::new(n, None))
            .collect();
        let direction = if reverse { Direction::Right } else { Direction::Left };
        Self { rows: vec![MarqueeRow::new(items, direction, 30.0)] }
    }
}

/// Everything one run needs, after settings and CLI flags are merged
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub scene: SceneKind,
    /// Seconds between frames
    pub time_step: f32,
    pub seed: Option<u64>,
    pub print: bool,
    /// Frames simulated before printing
    pub frames: u32,
    pub theme: ThemeState,
    pub log_file: Option<PathBuf>,
    pub starfield: StarfieldConfig,
    pub globe: GlobeConfig,
    pub crystal: CrystalConfig,
    pub particles: ParticlesConfig,
    pub marquee: MarqueeConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scene: SceneKind::default(),
            time_step: 0.03,
            seed: None,
            print: false,
            frames: 120,
            theme: ThemeState::default(),
            log_file: None,
            starfield: StarfieldConfig::default(),
            globe: GlobeConfig::default(),
            crystal: CrystalConfig::default(),
            particles: ParticlesConfig::default(),
            marquee: MarqueeConfig::default(),
        }
    }
}

impl RunConfig {
    /// Defaults overridden by whatever the settings file provides
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::default();

        let sf = &settings.starfield;
        if let Some(density) = sf.density {
            config.starfield.density = density.max(0.0);
        }
        if let Some(chance) = sf.shooting_star_chance {
            config.starfield.shooting_star_chance = chance.clamp(0.0, 1.0);
        }

        let globe = &settings.globe;
        if let Some(name) = &globe.variant {
            match name.parse() {
                Ok(variant) => config.globe.variant = variant,
                Err(e) => warn!("settings: {}", e),
            }
        }
        if let Some(speed) = globe.rotation_speed {
            config.globe.rotation_speed = speed;
        }
        config.globe.color_a = globe.color_a.as_deref().and_then(|hex| parse_color("globe.color_a", hex));
        config.globe.color_b = globe.color_b.as_deref().and_then(|hex| parse_color("globe.color_b", hex));
        if let Some(markers) = &globe.markers {
            config.globe.markers = markers
                .iter()
                .map(|m| Marker {
                    name: m.name.clone().into(),
                    lat: m.lat.clamp(-90.0, 90.0),
                    lon: m.lon,
                    size: m.size.unwrap_or(0.05).clamp(0.0, MAX_MARKER_SIZE),
                })
                .collect();
        }
        if let Some(arcs) = &globe.arcs {
            config.globe.arcs = arcs.iter().map(|[from, to]| ArcPair::new(*from, *to)).collect();
        }

        if let Some(speed) = settings.crystal.speed {
            config.crystal.speed = speed;
        }
        if let Some(name) = &settings.theme {
            match ThemeState::by_name(name) {
                Some(theme) => config.theme = theme,
                None => warn!(theme = %name, "settings: unknown theme"),
            }
        }
        config.log_file = settings.log.file.clone();

        config
    }
}

fn parse_color(key: &str, hex: &str) -> Option<Rgb> {
    let color = Rgb::from_hex(hex);
    if color.is_none() {
        warn!(key, value = hex, "settings: not a #rrggbb colour, using the theme");
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_give_defaults() {
        let config = RunConfig::from_settings(&Settings::default());
        assert_eq!(config.starfield, StarfieldConfig::default());
        assert_eq!(config.globe, GlobeConfig::default());
        assert_eq!(config.scene, SceneKind::Globe);
    }

    #[test]
    fn settings_override_defaults() {
        let settings = Settings::parse(
            r##"
            theme = "ice"

            [starfield]
            density = 0.5
            shooting_star_chance = 2.0

            [globe]
            variant = "holo"
            color_a = "#ff0000"
            color_b = "nope"
            markers = [
                { name = "Home", lat = 10.0, lon = 20.0 },
                { name = "Away", lat = -10.0, lon = -20.0, size = 0.07 },
            ]
            arcs = [[0, 1], [1, 5]]

            [crystal]
            speed = 2.0
            "##,
        );
        let config = RunConfig::from_settings(&settings);
        assert_eq!(config.starfield.density, 0.5);
        assert_eq!(config.starfield.shooting_star_chance, 1.0);
        assert_eq!(config.globe.variant, GlobeVariant::Holo);
        assert_eq!(config.globe.color_a, Some(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!(config.globe.color_b, None);
        assert_eq!(config.globe.markers.len(), 2);
        assert_eq!(config.globe.markers[0].size, 0.05);
        assert_eq!(config.globe.arcs.len(), 2);
        assert_eq!(config.globe.markers[1].size, 0.07);
        assert_eq!(config.crystal.speed, 2.0);
        assert_eq!(config.theme.theme().name, "ice");
    }

    #[test]
    fn oversized_markers_are_clamped() {
        let settings = Settings::parse(
            r#"
            [globe]
            markers = [
                { name = "Huge", lat = 0.0, lon = 0.0, size = 1000.0 },
                { name = "Negative", lat = 0.0, lon = 10.0, size = -2.0 },
            ]
            "#,
        );
        let config = RunConfig::from_settings(&settings);
        assert_eq!(config.globe.markers[0].size, MAX_MARKER_SIZE);
        assert_eq!(config.globe.markers[1].size, 0.0);
    }

    #[test]
    fn marquee_names_become_one_row() {
        let names = vec!["Rust".to_string(), " ".to_string(), "Tokio".to_string()];
        let config = MarqueeConfig::from_names(&names, true);
        assert_eq!(config.rows.len(), 1);
        assert_eq!(config.rows[0].items.len(), 2);
        assert_eq!(config.rows[0].direction, Direction::Right);
    }
}

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub theme: Option<String>,
    #[serde(default)]
    pub starfield: StarfieldSettings,
    #[serde(default)]
    pub globe: GlobeSettings,
    #[serde(default)]
    pub crystal: CrystalSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct StarfieldSettings {
    pub density: Option<f32>,
    pub shooting_star_chance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobeSettings {
    pub variant: Option<String>,
    pub rotation_speed: Option<f32>,
    /// `#rrggbb`
    pub color_a: Option<String>,
    pub color_b: Option<String>,
    pub markers: Option<Vec<MarkerSettings>>,
    /// Index pairs into `markers`
    pub arcs: Option<Vec<[usize; 2]>>,
}

#[derive(Debug, Deserialize)]
pub struct MarkerSettings {
    pub name: String,
    pub lat: f32,
    pub lon: f32,
    pub size: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CrystalSettings {
    pub speed: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    /// Tracing filter directive, e.g. "debug"
    pub level: Option<String>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading settings");
                Self::parse(&content)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a settings file; anything malformed falls back to defaults
    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_else(|e| {
            warn!(error = %e, "malformed settings, using defaults");
            Self::default()
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folioviz")
            .join("config.toml")
    }
}

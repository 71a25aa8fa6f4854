use clap::{Parser, Subcommand};
use folioviz::app;
use folioviz::colors::ThemeState;
use folioviz::config::{MarqueeConfig, RunConfig, SceneKind};
use folioviz::globe::GlobeVariant;
use folioviz::settings::Settings;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folioviz")]
#[command(version = "0.1.0")]
#[command(about = "Portfolio visual effects in the terminal: starfield, globes, crystal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Animation speed (seconds per frame)
    #[arg(short, long, global = true)]
    time: Option<f32>,

    /// Random seed for reproducibility
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Print a single frame to stdout (no interactive display)
    #[arg(long, global = true)]
    print: bool,

    /// Frames to simulate before printing
    #[arg(long, global = true)]
    frames: Option<u32>,

    /// Colour theme: violet, fire, ice, pink, gold, electric, mono, neon
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Layered starfield with nebulae and shooting stars
    Starfield {
        /// Star count multiplier
        #[arg(short, long)]
        density: Option<f32>,
    },

    /// Rotating globe with city markers and arcs
    Globe {
        /// Style: wireframe, pulse, particles, holo, cobe (or 1-5)
        #[arg(short, long)]
        variant: Option<GlobeVariant>,
    },

    /// Floating wireframe crystal
    Crystal,

    /// Slowly drifting motes
    Particles {
        /// Number of motes
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Scrolling rows of technology names
    Marquee {
        /// Items to scroll (comma-separated)
        #[arg(long, value_delimiter = ',')]
        items: Vec<String>,

        /// Scroll to the right
        #[arg(long)]
        reverse: bool,
    },

    /// Everything at once: starfield, globe, crystal and marquee
    Showcase {
        /// Globe style
        #[arg(short, long)]
        variant: Option<GlobeVariant>,
    },
}

/// Install a file logger; stdout belongs to the alternate screen
fn init_logging(path: &Path, level: Option<&str>) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("folioviz: cannot open log file {}: {}", path.display(), e);
            return;
        }
    };
    let filter = EnvFilter::try_from_env("FOLIOVIZ_LOG")
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    let log_file = cli.log_file.clone().or_else(|| settings.log.file.clone());
    if let Some(path) = &log_file {
        init_logging(path, settings.log.level.as_deref());
    }

    let mut config = RunConfig::from_settings(&settings);
    config.log_file = log_file;

    match cli.command {
        Commands::Starfield { density } => {
            config.scene = SceneKind::Starfield;
            if let Some(density) = density {
                config.starfield.density = density.max(0.0);
            }
        }
        Commands::Globe { variant } => {
            config.scene = SceneKind::Globe;
            if let Some(variant) = variant {
                config.globe.variant = variant;
            }
        }
        Commands::Crystal => config.scene = SceneKind::Crystal,
        Commands::Particles { count } => {
            config.scene = SceneKind::Particles;
            if let Some(count) = count {
                config.particles.count = count;
            }
        }
        Commands::Marquee { items, reverse } => {
            config.scene = SceneKind::Marquee;
            if !items.is_empty() {
                config.marquee = MarqueeConfig::from_names(&items, reverse);
            } else if reverse {
                for row in &mut config.marquee.rows {
                    row.direction = row.direction.reversed();
                }
            }
        }
        Commands::Showcase { variant } => {
            config.scene = SceneKind::Showcase;
            if let Some(variant) = variant {
                config.globe.variant = variant;
            }
        }
    }

    if let Some(time) = cli.time {
        config.time_step = time.clamp(0.001, 1.0);
    }
    config.seed = cli.seed;
    config.print = cli.print;
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(name) = &cli.theme {
        match ThemeState::by_name(name) {
            Some(theme) => config.theme = theme,
            None => eprintln!("Unknown theme: {}. Using {}.", name, config.theme.theme().name),
        }
    }

    app::run(config)
}

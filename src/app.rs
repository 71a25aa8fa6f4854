//! Interactive session and print mode.

use crate::colors::ThemeState;
use crate::config::{RunConfig, SceneKind};
use crate::crystal::Crystal;
use crate::globe::{Globe, GlobeScene, GlobeVariant};
use crate::help::{render_help_overlay, HELP};
use crate::marquee::Marquee;
use crate::particles::FloatingParticles;
use crate::stage::{Mount, Placement, PointerKind, Stage, StageEvent};
use crate::starfield::Starfield;
use crate::terminal::{Buffer, Terminal};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Size used for print mode when stdout is not a terminal
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// What a key press asks the session to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Pause,
    Resume,
    NextGlobe,
    Theme,
    Help,
}

/// Runtime state for interactive controls
pub struct Controls {
    /// Seconds between frames
    pub frame_delay: f32,
    pub paused: bool,
    pub show_help: bool,
    pub theme: ThemeState,
}

impl Controls {
    pub fn new(frame_delay: f32, theme: ThemeState) -> Self {
        Self {
            frame_delay,
            paused: false,
            show_help: false,
            theme,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        if self.theme.handle_key(code) {
            return Action::Theme;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                if self.paused {
                    Action::Pause
                } else {
                    Action::Resume
                }
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                Action::Help
            }
            KeyCode::Tab => Action::NextGlobe,
            // Number keys: frame delay (1=fastest, 9=slowest)
            KeyCode::Char(c @ '1'..='9') => {
                self.frame_delay = match c {
                    '1' => 0.005,
                    '2' => 0.01,
                    '3' => 0.02,
                    '4' => 0.03,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    _ => 0.2,
                };
                Action::None
            }
            _ => Action::None,
        }
    }
}

/// Handles for everything a scene mounted
pub struct SceneMounts {
    globe: Option<(Mount, GlobeVariant, Placement)>,
    others: Vec<Mount>,
}

impl SceneMounts {
    pub fn globe_variant(&self) -> Option<GlobeVariant> {
        self.globe.as_ref().map(|(_, variant, _)| *variant)
    }

    pub fn len(&self) -> usize {
        self.others.len() + usize::from(self.globe.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap the globe for the next variant
    pub fn cycle_globe(&mut self, stage: &mut Stage, config: &RunConfig, theme: ThemeState) {
        let Some((mount, variant, placement)) = self.globe.take() else {
            return;
        };
        stage.unmount(mount);
        let next = variant.next();
        info!(variant = next.name(), "switching globe");
        self.globe = Some((mount_globe(stage, config, theme, next, placement), next, placement));
    }

    pub fn unmount_all(self, stage: &mut Stage) {
        if let Some((mount, _, _)) = self.globe {
            stage.unmount(mount);
        }
        for mount in self.others {
            stage.unmount(mount);
        }
    }
}

fn mount_globe(stage: &mut Stage, config: &RunConfig, theme: ThemeState, variant: GlobeVariant, placement: Placement) -> Mount {
    let scene = GlobeScene::new(&config.globe, theme.theme());
    stage.mount(Box::new(Globe::new(variant, scene)), placement)
}

/// Mount the effects that make up the configured scene
pub fn mount_scene(stage: &mut Stage, config: &RunConfig) -> SceneMounts {
    let theme = config.theme;
    let palette = theme.theme();
    let mut mounts = SceneMounts { globe: None, others: Vec::new() };
    let variant = config.globe.variant;

    let globe_at = |stage: &mut Stage, placement: Placement| {
        Some((mount_globe(stage, config, theme, variant, placement), variant, placement))
    };

    match config.scene {
        SceneKind::Starfield => {
            mounts.others.push(stage.mount(Box::new(Starfield::new(config.starfield.clone())), Placement::Full));
        }
        SceneKind::Globe => mounts.globe = globe_at(stage, Placement::Full),
        SceneKind::Crystal => {
            mounts.others.push(stage.mount(Box::new(Crystal::new(&config.crystal, palette)), Placement::Full));
        }
        SceneKind::Particles => {
            mounts.others.push(stage.mount(Box::new(FloatingParticles::new(&config.particles, palette)), Placement::Full));
        }
        SceneKind::Marquee => {
            let placement = Placement::Centered { width: 1.0, height: 0.2 };
            mounts.others.push(stage.mount(Box::new(Marquee::new(&config.marquee, palette)), placement));
        }
        SceneKind::Showcase => {
            mounts.others.push(stage.mount(Box::new(Starfield::new(config.starfield.clone())), Placement::Full));
            mounts.others.push(stage.mount(Box::new(FloatingParticles::new(&config.particles, palette)), Placement::Full));
            mounts.globe = globe_at(stage, Placement::Left(0.5));
            mounts.others.push(stage.mount(Box::new(Crystal::new(&config.crystal, palette)), Placement::Right(0.4)));
            mounts.others.push(stage.mount(Box::new(Marquee::new(&config.marquee, palette)), Placement::Bottom(3)));
        }
    }
    mounts
}

fn seed_for(config: &RunConfig) -> u64 {
    config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    })
}

fn pointer_kind(kind: MouseEventKind) -> Option<PointerKind> {
    match kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => Some(PointerKind::Move),
        MouseEventKind::Down(MouseButton::Left) => Some(PointerKind::Down),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerKind::Up),
        _ => None,
    }
}

/// Run a scene off-screen for `config.frames` frames of virtual time
pub fn simulate(config: &RunConfig, cols: u16, rows: u16) -> Buffer {
    let mut stage = Stage::new(StdRng::seed_from_u64(seed_for(config)));
    stage.dispatch(StageEvent::Resize { cols, rows });
    let mounts = mount_scene(&mut stage, config);

    for frame in 0..=config.frames {
        stage.tick(Duration::from_secs_f32(frame as f32 * config.time_step));
    }

    let mut buf = Buffer::new(cols, rows);
    stage.render(&mut buf);
    mounts.unmount_all(&mut stage);
    buf
}

/// Print the final simulated frame with ANSI colours
pub fn run_print_mode<W: Write>(config: &RunConfig, out: &mut W) -> io::Result<()> {
    let (cols, rows) = crossterm::terminal::size().unwrap_or(FALLBACK_SIZE);
    let buf = simulate(config, cols, rows.saturating_sub(1).max(1));
    buf.write_ansi(out)?;
    out.flush()
}

/// Run the configured scene
pub fn run(config: RunConfig) -> io::Result<()> {
    if config.print {
        return run_print_mode(&config, &mut io::stdout().lock());
    }

    let seed = seed_for(&config);
    info!(seed, scene = ?config.scene, "starting session");

    let mut term = match Terminal::new(true) {
        Ok(term) => term,
        Err(e) => {
            warn!(error = %e, "terminal unavailable");
            eprintln!("folioviz: cannot open an interactive terminal ({}); try --print", e);
            return Ok(());
        }
    };

    let mut stage = Stage::new(StdRng::seed_from_u64(seed));
    let (cols, rows) = term.size();
    stage.dispatch(StageEvent::Resize { cols, rows });
    let mut mounts = mount_scene(&mut stage, &config);
    let mut controls = Controls::new(config.time_step, config.theme);
    let start = Instant::now();

    'session: loop {
        while let Some(event) = term.next_event()? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => match controls.handle_key(key.code) {
                    Action::Quit => break 'session,
                    Action::Resume => stage.rewind_clocks(),
                    Action::NextGlobe => mounts.cycle_globe(&mut stage, &config, controls.theme),
                    Action::Theme => stage.set_theme(controls.theme.theme()),
                    Action::Pause | Action::Help | Action::None => {}
                },
                Event::Mouse(mouse) => {
                    if let Some(kind) = pointer_kind(mouse.kind) {
                        stage.dispatch(StageEvent::Pointer { kind, col: mouse.column, row: mouse.row });
                    }
                }
                Event::Resize(cols, rows) => {
                    term.resize(cols, rows);
                    term.clear_screen()?;
                    stage.dispatch(StageEvent::Resize { cols, rows });
                }
                _ => {}
            }
        }

        if !controls.paused {
            stage.tick(start.elapsed());
        }

        term.clear();
        stage.render(term.buffer_mut());
        if controls.show_help {
            render_help_overlay(term.buffer_mut(), HELP);
        }
        term.present()?;
        term.sleep(controls.frame_delay);
    }

    mounts.unmount_all(&mut stage);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_set_the_frame_delay() {
        let mut controls = Controls::new(0.03, ThemeState::default());
        assert_eq!(controls.handle_key(KeyCode::Char('1')), Action::None);
        assert_eq!(controls.frame_delay, 0.005);
        controls.handle_key(KeyCode::Char('9'));
        assert_eq!(controls.frame_delay, 0.2);
    }

    #[test]
    fn space_toggles_pause_and_resume() {
        let mut controls = Controls::new(0.03, ThemeState::default());
        assert_eq!(controls.handle_key(KeyCode::Char(' ')), Action::Pause);
        assert!(controls.paused);
        assert_eq!(controls.handle_key(KeyCode::Char(' ')), Action::Resume);
        assert!(!controls.paused);
    }

    #[test]
    fn shifted_digits_switch_theme() {
        let mut controls = Controls::new(0.03, ThemeState::default());
        assert_eq!(controls.handle_key(KeyCode::Char('@')), Action::Theme);
        assert_eq!(controls.theme.theme().name, "ice");
        assert_eq!(controls.handle_key(KeyCode::Char('@')), Action::None);
    }

    #[test]
    fn tab_cycles_the_globe_without_leaking() {
        let config = RunConfig { scene: SceneKind::Globe, ..RunConfig::default() };
        let mut stage = Stage::with_seed(1);
        stage.dispatch(StageEvent::Resize { cols: 40, rows: 20 });
        let mut mounts = mount_scene(&mut stage, &config);
        for expected in GlobeVariant::ALL.iter().cycle().skip(1).take(12) {
            mounts.cycle_globe(&mut stage, &config, config.theme);
            assert_eq!(mounts.globe_variant(), Some(*expected));
            assert_eq!(stage.mounted(), 1);
            assert_eq!(stage.pending_frame_callbacks(), 1);
        }
        mounts.unmount_all(&mut stage);
        assert_eq!(stage.listener_count(), 0);
    }

    #[test]
    fn showcase_mounts_every_layer() {
        let config = RunConfig { scene: SceneKind::Showcase, ..RunConfig::default() };
        let mut stage = Stage::with_seed(1);
        let mounts = mount_scene(&mut stage, &config);
        assert_eq!(mounts.len(), 5);
        assert_eq!(stage.mounted(), 5);
        mounts.unmount_all(&mut stage);
        assert_eq!(stage.mounted(), 0);
    }

    #[test]
    fn simulate_draws_something() {
        let config = RunConfig { scene: SceneKind::Crystal, seed: Some(7), frames: 10, ..RunConfig::default() };
        let buf = simulate(&config, 40, 16);
        assert!(buf.non_blank_cells() > 0);
    }
}

//! Mounting and per-frame driving of effects.
//!
//! A [`Stage`] is the only place frame callbacks and input listeners live.
//! Mounting an effect starts its [`FrameLoop`] and registers its listeners;
//! unmounting removes every registration before returning, so an effect can
//! be mounted and unmounted any number of times without anything piling up.

use crate::canvas::{Viewport, DOTS_X, DOTS_Y};
use crate::colors::Theme;
use crate::terminal::{Buffer, Rect};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Duration;
use tracing::{debug, trace};

/// Largest time step handed to an effect; longer stalls are skipped over
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// A self-contained animated effect
pub trait Effect {
    fn name(&self) -> &'static str;

    /// Called on mount and whenever the terminal changes size
    fn resize(&mut self, viewport: Viewport, rng: &mut dyn RngCore);

    /// Advance the simulation by `dt` seconds
    fn update(&mut self, dt: f32, rng: &mut dyn RngCore);

    /// Draw the current state into `region`
    fn render(&self, buf: &mut Buffer, region: Rect);

    fn wants_pointer(&self) -> bool {
        false
    }

    fn pointer(&mut self, _event: Pointer) {}

    fn set_theme(&mut self, _theme: Theme) {}
}

/// Where a mounted effect sits on the screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    Full,
    /// Left part of the screen, as a fraction of the width
    Left(f32),
    Right(f32),
    /// Bottom rows
    Bottom(u16),
    /// Centred box, as fractions of width and height
    Centered { width: f32, height: f32 },
}

impl Placement {
    pub fn resolve(&self, cols: u16, rows: u16) -> Rect {
        let part = |total: u16, frac: f32| ((total as f32 * frac.clamp(0.0, 1.0)).round() as u16).min(total);
        match *self {
            Placement::Full => Rect::new(0, 0, cols, rows),
            Placement::Left(frac) => Rect::new(0, 0, part(cols, frac), rows),
            Placement::Right(frac) => {
                let w = part(cols, frac);
                Rect::new(cols - w, 0, w, rows)
            }
            Placement::Bottom(n) => {
                let h = n.min(rows);
                Rect::new(0, rows - h, cols, h)
            }
            Placement::Centered { width, height } => {
                let (w, h) = (part(cols, width), part(rows, height));
                Rect::new((cols - w) / 2, (rows - h) / 2, w, h)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
    Up,
    Leave,
}

/// Pointer input translated into an effect's own region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub kind: PointerKind,
    /// Region-local position in dots
    pub x: f32,
    pub y: f32,
    /// Position normalized to the region, 0..1 inside it
    pub nx: f32,
    pub ny: f32,
}

/// Input delivered to the stage by the host loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    Resize { cols: u16, rows: u16 },
    Pointer { kind: PointerKind, col: u16, row: u16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u64);

/// Handle for a mounted effect, consumed by [`Stage::unmount`]
#[must_use = "an effect stays mounted until its handle is passed to Stage::unmount"]
#[derive(Debug, PartialEq, Eq)]
pub struct Mount {
    id: MountId,
}

impl Mount {
    pub fn id(&self) -> MountId {
        self.id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Listener {
    Resize,
    Pointer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Mounted,
    Unmounted,
}

/// Wall-clock bookkeeping for one frame loop
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last: Option<Duration>,
    elapsed: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick; zero on the first tick
    pub fn advance(&mut self, now: Duration) -> f32 {
        let dt = match self.last {
            Some(last) => now.saturating_sub(last).as_secs_f32().min(MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last = Some(now);
        self.elapsed += dt;
        dt
    }

    /// Forget the last timestamp so the next tick starts fresh
    pub fn rewind(&mut self) {
        self.last = None;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// The per-effect frame loop: owns its effect, clock and on-screen region
pub struct FrameLoop {
    id: MountId,
    effect: Box<dyn Effect>,
    placement: Placement,
    region: Rect,
    clock: FrameClock,
    state: LoopState,
    pointer_inside: bool,
}

impl FrameLoop {
    fn tick(&mut self, now: Duration, rng: &mut dyn RngCore) {
        if self.state != LoopState::Mounted {
            return;
        }
        let dt = self.clock.advance(now);
        self.effect.update(dt, rng);
    }

    fn resize(&mut self, cols: u16, rows: u16, rng: &mut dyn RngCore) {
        self.region = self.placement.resolve(cols, rows);
        debug!(effect = self.effect.name(), width = self.region.width, height = self.region.height, "resize");
        self.effect.resize(Viewport::from(self.region), rng);
    }

    fn pointer(&mut self, kind: PointerKind, col: u16, row: u16) {
        let inside = self.region.contains(col, row);
        let was_inside = self.pointer_inside;
        self.pointer_inside = inside;

        let kind = match kind {
            PointerKind::Down if !inside => return,
            PointerKind::Move if was_inside && !inside => PointerKind::Leave,
            other => other,
        };

        let local_col = col as f32 - self.region.x as f32 + 0.5;
        let local_row = row as f32 - self.region.y as f32 + 0.5;
        let event = Pointer {
            kind,
            x: local_col * DOTS_X as f32,
            y: local_row * DOTS_Y as f32,
            nx: local_col / self.region.width.max(1) as f32,
            ny: local_row / self.region.height.max(1) as f32,
        };
        trace!(effect = self.effect.name(), ?event, "pointer");
        self.effect.pointer(event);
    }
}

pub struct Stage {
    loops: Vec<FrameLoop>,
    frame_callbacks: Vec<MountId>,
    listeners: Vec<(MountId, Listener)>,
    next_id: u64,
    size: Option<(u16, u16)>,
    rng: StdRng,
}

impl Stage {
    pub fn new(rng: StdRng) -> Self {
        Self {
            loops: Vec::new(),
            frame_callbacks: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
            size: None,
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Start an effect's frame loop and register its listeners
    pub fn mount(&mut self, effect: Box<dyn Effect>, placement: Placement) -> Mount {
        let id = MountId(self.next_id);
        self.next_id += 1;

        self.frame_callbacks.push(id);
        self.listeners.push((id, Listener::Resize));
        if effect.wants_pointer() {
            self.listeners.push((id, Listener::Pointer));
        }

        let mut frame_loop = FrameLoop {
            id,
            effect,
            placement,
            region: Rect::default(),
            clock: FrameClock::new(),
            state: LoopState::Mounted,
            pointer_inside: false,
        };
        if let Some((cols, rows)) = self.size {
            frame_loop.resize(cols, rows, &mut self.rng);
        }
        debug!(effect = frame_loop.effect.name(), id = id.0, "mounted");
        self.loops.push(frame_loop);

        Mount { id }
    }

    /// Stop the frame loop and drop every registration it owns
    pub fn unmount(&mut self, mount: Mount) -> Option<Box<dyn Effect>> {
        self.frame_callbacks.retain(|id| *id != mount.id);
        self.listeners.retain(|(id, _)| *id != mount.id);

        let pos = self.loops.iter().position(|l| l.id == mount.id)?;
        let mut frame_loop = self.loops.remove(pos);
        frame_loop.state = LoopState::Unmounted;
        debug!(effect = frame_loop.effect.name(), id = mount.id.0, "unmounted");
        Some(frame_loop.effect)
    }

    pub fn dispatch(&mut self, event: StageEvent) {
        let Stage { loops, listeners, rng, size, .. } = self;
        match event {
            StageEvent::Resize { cols, rows } => {
                *size = Some((cols, rows));
                for frame_loop in loops.iter_mut() {
                    if listeners.contains(&(frame_loop.id, Listener::Resize)) {
                        frame_loop.resize(cols, rows, &mut *rng);
                    }
                }
            }
            StageEvent::Pointer { kind, col, row } => {
                for frame_loop in loops.iter_mut() {
                    if listeners.contains(&(frame_loop.id, Listener::Pointer)) {
                        frame_loop.pointer(kind, col, row);
                    }
                }
            }
        }
    }

    /// Run one frame of every mounted loop
    pub fn tick(&mut self, now: Duration) {
        let Stage { loops, frame_callbacks, rng, .. } = self;
        for frame_loop in loops.iter_mut() {
            if frame_callbacks.contains(&frame_loop.id) {
                frame_loop.tick(now, &mut *rng);
            }
        }
    }

    /// Draw every mounted effect in mount order
    pub fn render(&self, buf: &mut Buffer) {
        for frame_loop in &self.loops {
            if frame_loop.state == LoopState::Mounted && !frame_loop.region.is_empty() {
                frame_loop.effect.render(buf, frame_loop.region);
            }
        }
    }

    /// Hand a new palette to every mounted effect
    pub fn set_theme(&mut self, theme: Theme) {
        for frame_loop in &mut self.loops {
            frame_loop.effect.set_theme(theme);
        }
    }

    /// Reset every clock, e.g. after a pause
    pub fn rewind_clocks(&mut self) {
        for frame_loop in &mut self.loops {
            frame_loop.clock.rewind();
        }
    }

    pub fn pending_frame_callbacks(&self) -> usize {
        self.frame_callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn mounted(&self) -> usize {
        self.loops.len()
    }

    pub fn region_of(&self, id: MountId) -> Option<Rect> {
        self.loops.iter().find(|l| l.id == id).map(|l| l.region)
    }

    pub fn elapsed_of(&self, id: MountId) -> Option<f32> {
        self.loops.iter().find(|l| l.id == id).map(|l| l.clock.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Probe {
        updates: Rc<Cell<usize>>,
        resizes: Rc<Cell<usize>>,
        last_dt: Rc<Cell<f32>>,
        pointers: Rc<Cell<usize>>,
        pointer: bool,
    }

    impl Effect for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }
        fn resize(&mut self, _viewport: Viewport, _rng: &mut dyn RngCore) {
            self.resizes.set(self.resizes.get() + 1);
        }
        fn update(&mut self, dt: f32, _rng: &mut dyn RngCore) {
            self.updates.set(self.updates.get() + 1);
            self.last_dt.set(dt);
        }
        fn render(&self, _buf: &mut Buffer, _region: Rect) {}
        fn wants_pointer(&self) -> bool {
            self.pointer
        }
        fn pointer(&mut self, _event: Pointer) {
            self.pointers.set(self.pointers.get() + 1);
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn mount_then_unmount_leaves_nothing_behind() {
        let mut stage = Stage::with_seed(1);
        let mount = stage.mount(Box::new(Probe { pointer: true, ..Default::default() }), Placement::Full);
        assert_eq!(stage.pending_frame_callbacks(), 1);
        assert_eq!(stage.listener_count(), 2);
        assert!(stage.unmount(mount).is_some());
        assert_eq!(stage.pending_frame_callbacks(), 0);
        assert_eq!(stage.listener_count(), 0);
        assert_eq!(stage.mounted(), 0);
    }

    #[test]
    fn repeated_remounts_do_not_accumulate_listeners() {
        let mut stage = Stage::with_seed(1);
        stage.dispatch(StageEvent::Resize { cols: 40, rows: 10 });
        for _ in 0..25 {
            let mount = stage.mount(Box::new(Probe { pointer: true, ..Default::default() }), Placement::Full);
            stage.tick(ms(16));
            stage.unmount(mount);
        }
        assert_eq!(stage.pending_frame_callbacks(), 0);
        assert_eq!(stage.listener_count(), 0);
    }

    #[test]
    fn unmounted_effects_stop_ticking() {
        let updates = Rc::new(Cell::new(0));
        let mut stage = Stage::with_seed(1);
        let mount = stage.mount(Box::new(Probe { updates: updates.clone(), ..Default::default() }), Placement::Full);
        stage.tick(ms(0));
        stage.tick(ms(16));
        let effect = stage.unmount(mount);
        stage.tick(ms(32));
        assert_eq!(updates.get(), 2);
        drop(effect);
    }

    #[test]
    fn delta_time_follows_the_clock() {
        let last_dt = Rc::new(Cell::new(-1.0));
        let mut stage = Stage::with_seed(1);
        let _mount = stage.mount(Box::new(Probe { last_dt: last_dt.clone(), ..Default::default() }), Placement::Full);
        stage.tick(ms(1000));
        assert_eq!(last_dt.get(), 0.0);
        stage.tick(ms(1050));
        assert!((last_dt.get() - 0.05).abs() < 1e-4);
        stage.tick(ms(9000));
        assert!((last_dt.get() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn mount_after_resize_initializes_immediately() {
        let resizes = Rc::new(Cell::new(0));
        let mut stage = Stage::with_seed(1);
        let before = stage.mount(Box::new(Probe { resizes: resizes.clone(), ..Default::default() }), Placement::Full);
        assert_eq!(resizes.get(), 0);
        stage.dispatch(StageEvent::Resize { cols: 20, rows: 8 });
        assert_eq!(resizes.get(), 1);
        let after = stage.mount(Box::new(Probe { resizes: resizes.clone(), ..Default::default() }), Placement::Left(0.5));
        assert_eq!(resizes.get(), 2);
        assert_eq!(stage.region_of(after.id()), Some(Rect::new(0, 0, 10, 8)));
        stage.unmount(before);
        stage.unmount(after);
    }

    #[test]
    fn pointer_only_reaches_listeners() {
        let pointers = Rc::new(Cell::new(0));
        let mut stage = Stage::with_seed(1);
        stage.dispatch(StageEvent::Resize { cols: 20, rows: 8 });
        let deaf = stage.mount(Box::new(Probe { pointers: pointers.clone(), ..Default::default() }), Placement::Full);
        stage.dispatch(StageEvent::Pointer { kind: PointerKind::Move, col: 3, row: 3 });
        assert_eq!(pointers.get(), 0);
        let listening = stage.mount(
            Box::new(Probe { pointers: pointers.clone(), pointer: true, ..Default::default() }),
            Placement::Right(0.5),
        );
        // Down outside the region is ignored
        stage.dispatch(StageEvent::Pointer { kind: PointerKind::Down, col: 3, row: 3 });
        assert_eq!(pointers.get(), 0);
        stage.dispatch(StageEvent::Pointer { kind: PointerKind::Down, col: 15, row: 3 });
        assert_eq!(pointers.get(), 1);
        stage.unmount(deaf);
        stage.unmount(listening);
    }

    #[test]
    fn placements_fit_the_screen() {
        assert_eq!(Placement::Full.resolve(80, 24), Rect::new(0, 0, 80, 24));
        assert_eq!(Placement::Right(0.25).resolve(80, 24), Rect::new(60, 0, 20, 24));
        assert_eq!(Placement::Bottom(30).resolve(80, 24), Rect::new(0, 0, 80, 24));
        assert_eq!(
            Placement::Centered { width: 0.5, height: 0.5 }.resolve(80, 24),
            Rect::new(20, 6, 40, 12)
        );
    }
}

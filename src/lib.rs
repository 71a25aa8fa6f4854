//! Portfolio visual effects for the terminal: a layered starfield, five
//! globe styles, a floating crystal, drifting motes and a tech marquee,
//! all drawn with braille dots and driven by a shared [`stage::Stage`].

pub mod app;
pub mod arc;
pub mod canvas;
pub mod colors;
pub mod config;
pub mod crystal;
pub mod geometry;
pub mod globe;
pub mod help;
pub mod marquee;
pub mod particles;
pub mod pointcloud;
pub mod settings;
pub mod stage;
pub mod starfield;
pub mod terminal;

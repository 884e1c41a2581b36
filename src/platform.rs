//! Host contracts the game controller drives. The browser host lives in
//! `web`, the headless one in `sim`.

use crate::fruit::{Fruit, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub font: &'static str,
    pub color: &'static str,
    /// Canvas `textAlign` value.
    pub align: &'static str,
}

/// 2D drawing surface.
pub trait Surface {
    /// Opaque drawable handle produced by `load_image`.
    type Image;

    /// Starts loading and returns immediately; completion is not awaited.
    fn load_image(&mut self, fruit: Fruit) -> Self::Image;
    /// Internal drawing resolution.
    fn size(&self) -> (f64, f64);
    /// Internal resolution divided by rendered (CSS) size, per axis.
    fn scale(&self) -> (f64, f64);
    fn clear(&mut self);
    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle);
    fn draw_image(&mut self, image: &Self::Image, rect: Rect);
}

pub trait Clock {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
}

/// The three callbacks the controller schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    CountdownTick,
    Deadline,
    Frame,
}

/// Handed back to `Game::wake` when a scheduled callback fires. The token
/// lets the controller tell a current arming from a stale one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Wake {
    pub task: Task,
    pub token: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delay {
    Millis(u32),
    NextFrame,
}

/// One-shot callback scheduling.
pub trait Scheduler {
    /// Host-side id used for cancellation.
    type Timer: Copy + std::fmt::Debug;

    fn schedule(&mut self, wake: Wake, delay: Delay) -> Self::Timer;
    /// Must tolerate timers that already fired or were already cancelled.
    fn cancel(&mut self, timer: Self::Timer);
}

/// Uniform samples in `[0, 1)`.
pub trait Entropy {
    fn next_f64(&mut self) -> f64;
}

/// Externally owned restart and share buttons.
pub trait Controls {
    fn set_outcome_controls_visible(&mut self, visible: bool);
}

pub trait Platform: Surface + Clock + Scheduler + Entropy + Controls {}

impl<T: Surface + Clock + Scheduler + Entropy + Controls> Platform for T {}

/// Convert a point relative to the canvas' rendered box into drawing-buffer
/// coordinates.
pub fn to_canvas(css_x: f64, css_y: f64, scale: (f64, f64)) -> (f64, f64) {
    (css_x * scale.0, css_y * scale.1)
}

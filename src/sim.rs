//! Headless host: virtual clock, timer queue and a recording surface.
//!
//! `Game::<SimPlatform>::advance` plays the part of the browser event loop,
//! firing due callbacks in time order. Frames arrive every `FRAME_MS`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::fruit::{Fruit, Rect};
use crate::game::{Game, Tap};
use crate::platform::{
    Clock, Controls, Delay, Entropy, Scheduler, Surface, Task, TextStyle, Wake,
};

pub const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    Image {
        fruit: Fruit,
        rect: Rect,
    },
}

#[derive(Clone, Copy, Debug)]
struct Queued {
    due_ms: f64,
    id: u64,
    wake: Wake,
}

/// Seeded `SmallRng` with an optional script of values served first.
#[derive(Clone, Debug)]
pub struct SimRng {
    rng: SmallRng,
    script: Vec<f64>,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            script: Vec::new(),
        }
    }

    /// Values returned in order before falling back to the seeded stream.
    pub fn script(&mut self, values: &[f64]) {
        self.script = values.iter().rev().copied().collect();
    }

    fn next(&mut self) -> f64 {
        match self.script.pop() {
            Some(v) => v,
            None => self.rng.r#gen::<f64>(),
        }
    }
}

pub struct SimPlatform {
    now_ms: f64,
    width: f64,
    height: f64,
    scale: (f64, f64),
    queue: Vec<Queued>,
    next_id: u64,
    ops: Vec<DrawOp>,
    controls_visible: bool,
    rng: SimRng,
}

impl SimPlatform {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            now_ms: 0.0,
            width,
            height,
            scale: (1.0, 1.0),
            queue: Vec::new(),
            next_id: 1,
            ops: Vec::new(),
            controls_visible: false,
            rng: SimRng::seeded(0x5EED),
        }
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = (sx, sy);
        self
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Every text drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn drew_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Callbacks still queued with the host.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Push queued callbacks for `task` back by `ms`, as the browser host does
    /// when the game is busy at delivery time.
    pub fn defer(&mut self, task: Task, ms: f64) {
        for q in self.queue.iter_mut().filter(|q| q.wake.task == task) {
            q.due_ms += ms;
        }
    }

    fn pop_due(&mut self, until_ms: f64) -> Option<Queued> {
        let idx = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, q)| q.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        Some(self.queue.remove(idx))
    }
}

impl Surface for SimPlatform {
    type Image = Fruit;

    fn load_image(&mut self, fruit: Fruit) -> Fruit {
        fruit
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn scale(&self) -> (f64, f64) {
        self.scale
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn draw_image(&mut self, image: &Fruit, rect: Rect) {
        self.ops.push(DrawOp::Image {
            fruit: *image,
            rect,
        });
    }
}

impl Clock for SimPlatform {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

impl Scheduler for SimPlatform {
    type Timer = u64;

    fn schedule(&mut self, wake: Wake, delay: Delay) -> u64 {
        let due_ms = match delay {
            Delay::Millis(ms) => self.now_ms + f64::from(ms),
            Delay::NextFrame => self.now_ms + FRAME_MS,
        };
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Queued { due_ms, id, wake });
        id
    }

    fn cancel(&mut self, timer: u64) {
        self.queue.retain(|q| q.id != timer);
    }
}

impl Entropy for SimPlatform {
    fn next_f64(&mut self) -> f64 {
        self.rng.next()
    }
}

impl Controls for SimPlatform {
    fn set_outcome_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }
}

impl Game<SimPlatform> {
    /// Run the virtual event loop forward by `ms`, firing every callback that
    /// comes due, then leave the clock at the end of the window.
    pub fn advance(&mut self, ms: f64) {
        let until = self.platform().now() + ms;
        while let Some(q) = self.platform_mut().pop_due(until) {
            self.platform_mut().now_ms = q.due_ms;
            self.wake(q.wake);
        }
        self.platform_mut().now_ms = until;
    }

    /// Tap the centre of `fruit`'s current box, in CSS pixels.
    pub fn tap_fruit(&mut self, fruit: Fruit) -> Tap {
        let Some(f) = self.fruits().iter().find(|f| f.fruit == fruit) else {
            return self.tap(-1.0, -1.0);
        };
        let (sx, sy) = self.platform().scale;
        let cx = (f.x + f.width / 2.0) / sx;
        let cy = (f.y + f.height / 2.0) / sy;
        self.tap(cx, cy)
    }
}

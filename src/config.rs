//! Tunables for a round. `Default` reproduces the standard game.

use std::fmt;

use crate::fruit::Fruit;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// First value shown by the countdown.
    pub countdown_from: u8,
    pub tick_ms: u32,
    /// "Too slow" deadline measured from round start.
    pub deadline_ms: u32,
    /// Horizontal slot per catalog entry, in catalog order.
    pub slots: Vec<f64>,
    pub spawn_y: f64,
    pub fruit_width: f64,
    pub fruit_height: f64,
    /// Per-frame speed is drawn from `[speed_min, speed_max)`.
    pub speed_min: f64,
    pub speed_max: f64,
    pub prompt_y: f64,
    /// Share of the viewport the canvas covers in the browser.
    pub canvas_fraction: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick_ms: 1_000,
            deadline_ms: 5_000,
            slots: vec![20.0, 100.0, 180.0, 260.0, 340.0],
            spawn_y: -50.0,
            fruit_width: 60.0,
            fruit_height: 60.0,
            speed_min: 2.0,
            speed_max: 4.0,
            prompt_y: 40.0,
            canvas_fraction: 0.9,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    SlotCount { expected: usize, found: usize },
    SpeedRange { min: f64, max: f64 },
    ZeroPeriod(&'static str),
    FruitSize,
    CanvasFraction(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SlotCount { expected, found } => {
                write!(f, "expected {expected} slots (one per fruit), found {found}")
            }
            ConfigError::SpeedRange { min, max } => {
                write!(f, "speed range [{min}, {max}) is empty")
            }
            ConfigError::ZeroPeriod(name) => write!(f, "{name} must be non-zero"),
            ConfigError::FruitSize => f.write_str("fruit width and height must be positive"),
            ConfigError::CanvasFraction(v) => {
                write!(f, "canvas fraction {v} must be within (0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots.len() != Fruit::COUNT {
            return Err(ConfigError::SlotCount {
                expected: Fruit::COUNT,
                found: self.slots.len(),
            });
        }
        if !(self.speed_min < self.speed_max) {
            return Err(ConfigError::SpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroPeriod("tick_ms"));
        }
        if self.deadline_ms == 0 {
            return Err(ConfigError::ZeroPeriod("deadline_ms"));
        }
        if !(self.fruit_width > 0.0 && self.fruit_height > 0.0) {
            return Err(ConfigError::FruitSize);
        }
        if !(self.canvas_fraction > 0.0 && self.canvas_fraction <= 1.0) {
            return Err(ConfigError::CanvasFraction(self.canvas_fraction));
        }
        Ok(())
    }

    /// Speed for a unit-interval sample.
    pub fn speed_at(&self, r: f64) -> f64 {
        self.speed_min + r * (self.speed_max - self.speed_min)
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, String> {
        let cfg: GameConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(cfg)
    }
}

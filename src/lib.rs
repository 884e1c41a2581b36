//! Fruit Tap core crate.
//!
//! Fruits fall down a canvas and the player has five seconds to tap the one
//! named on screen. The controller in `game` is host-agnostic: the browser
//! drives it through `web`, tests and replays through `sim`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod fruit;
pub mod game;
pub mod platform;
pub mod share;
pub mod sim;
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use fruit::{FallingFruit, Fruit};
pub use game::{Game, HighScore, Outcome, Phase, Tap};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::launch(GameConfig::default()).map(|_| ())
}

/// Like `start_game`, with tunables from a JSON object (missing keys default).
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e))?;
    web::launch(config).map(|_| ())
}

#[wasm_bindgen]
pub fn share_text(reaction_time: f64) -> String {
    share::share_message(reaction_time)
}

// Canvas drawing for each phase. Pure output apart from `draw_play_frame`,
// which advances every fruit right after drawing it.

use crate::fruit::{FallingFruit, Fruit, FruitImages};
use crate::platform::{Surface, TextStyle};

use super::Outcome;

const COUNTDOWN: TextStyle = TextStyle {
    font: "60px Arial",
    color: "#333",
    align: "center",
};
const PROMPT: TextStyle = TextStyle {
    font: "24px Arial",
    color: "#444",
    align: "center",
};
const SUCCESS: TextStyle = TextStyle {
    font: "24px Arial",
    color: "green",
    align: "center",
};
const FAILURE: TextStyle = TextStyle {
    font: "24px Arial",
    color: "red",
    align: "center",
};
const SCORE: TextStyle = TextStyle {
    font: "20px Arial",
    color: "#222",
    align: "center",
};

pub const GO_MARKER: &str = "GO!";
pub const SUCCESS_TEXT: &str = "🎉 Correct! 🎯";
pub const TOO_SLOW_TEXT: &str = "Too Slow! Game Over";

pub fn countdown_text(value: u8) -> String {
    if value > 0 {
        value.to_string()
    } else {
        GO_MARKER.to_string()
    }
}

pub fn prompt_text(target: Fruit) -> String {
    format!("Tap on: {}", target.label())
}

pub fn reaction_text(seconds: f64) -> String {
    format!("Reaction: {seconds:.2}s")
}

pub fn high_score_text(seconds: f64) -> String {
    format!("High Score: {seconds:.2}s")
}

pub fn draw_countdown<S: Surface>(surface: &mut S, value: u8) {
    let (w, h) = surface.size();
    surface.clear();
    surface.draw_text(&countdown_text(value), w / 2.0, h / 2.0, COUNTDOWN);
}

pub fn draw_play_frame<S: Surface>(
    surface: &mut S,
    images: &FruitImages<S::Image>,
    fruits: &mut [FallingFruit],
    target: Fruit,
    prompt_y: f64,
) {
    let (w, _) = surface.size();
    surface.clear();
    surface.draw_text(&prompt_text(target), w / 2.0, prompt_y, PROMPT);
    for fruit in fruits.iter_mut() {
        surface.draw_image(&images[fruit.fruit], fruit.rect());
        fruit.advance();
    }
}

/// Success is drawn over the last play frame; too-slow starts from a blank
/// surface.
pub fn draw_outcome<S: Surface>(
    surface: &mut S,
    outcome: Outcome,
    reaction_time: f64,
    high_score: Option<f64>,
) {
    let (w, h) = surface.size();
    match outcome {
        Outcome::Success => {
            surface.draw_text(SUCCESS_TEXT, w / 2.0, h / 2.0 - 20.0, SUCCESS);
        }
        Outcome::TooSlow => {
            surface.clear();
            surface.draw_text(TOO_SLOW_TEXT, w / 2.0, h / 2.0 - 20.0, FAILURE);
        }
    }
    surface.draw_text(&reaction_text(reaction_time), w / 2.0, h / 2.0 + 20.0, SCORE);
    if let Some(best) = high_score {
        surface.draw_text(&high_score_text(best), w / 2.0, h / 2.0 + 50.0, SCORE);
    }
}

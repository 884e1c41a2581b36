// Round scenarios driven through the headless host.
// Native-only: no wasm/browser APIs are touched.

use fruit_tap::sim::{DrawOp, SimPlatform};
use fruit_tap::{Fruit, Game, GameConfig, Outcome, Phase, Tap};

// Countdown shows 3, 2, 1, GO! one second apart; play begins on the next tick.
const PLAY_STARTS_AT: f64 = 4000.0;

fn new_game(target_sample: f64) -> Game<SimPlatform> {
    let mut platform = SimPlatform::new(400.0, 600.0);
    platform.rng_mut().script(&[target_sample]);
    Game::new(platform, GameConfig::default())
}

fn started(target_sample: f64) -> Game<SimPlatform> {
    let mut game = new_game(target_sample);
    game.start();
    game.advance(PLAY_STARTS_AT);
    assert_eq!(game.phase(), Phase::Playing);
    game
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn countdown_visits_each_value_once_then_plays() {
    let mut game = new_game(0.5);
    assert_eq!(game.phase(), Phase::Idle);
    game.start();
    assert_eq!(game.phase(), Phase::Countdown(3));

    game.advance(PLAY_STARTS_AT - 1.0);
    assert_eq!(game.phase(), Phase::Countdown(0));
    assert_eq!(game.platform().texts(), ["3", "2", "1", "GO!"]);

    game.advance(1.0);
    assert_eq!(game.phase(), Phase::Playing);
    let texts = game.platform().texts();
    assert_eq!(&texts[..4], ["3", "2", "1", "GO!"]);
    assert_eq!(texts[4], "Tap on: MANGO");
    assert_eq!(texts.iter().filter(|t| **t == "GO!").count(), 1);
}

#[test]
fn start_is_only_honoured_once() {
    let mut game = new_game(0.5);
    game.start();
    game.advance(1500.0);
    game.start();
    assert_eq!(game.phase(), Phase::Countdown(2));
}

#[test]
fn round_start_places_one_fruit_per_slot() {
    let game = started(0.5);
    let cfg = GameConfig::default();
    assert_eq!(game.target(), Some(Fruit::Mango));
    let fruits = game.fruits();
    assert_eq!(fruits.len(), Fruit::COUNT);
    for ((f, expected), slot) in fruits.iter().zip(Fruit::ALL).zip(&cfg.slots) {
        assert_eq!(f.fruit, expected);
        assert_eq!(f.x, *slot);
        assert_eq!((f.width, f.height), (60.0, 60.0));
        assert!((2.0..4.0).contains(&f.speed), "speed {} out of range", f.speed);
        // One frame was drawn immediately at round start.
        assert!(close(f.y, -50.0 + f.speed), "{} at y={}", f.fruit, f.y);
    }
}

#[test]
fn play_frame_draws_prompt_then_fruits_in_catalog_order() {
    let mut game = started(0.0);
    game.platform_mut().take_ops();
    game.advance(17.0);
    let ops = game.platform().ops();
    assert_eq!(ops[0], DrawOp::Clear);
    assert!(matches!(&ops[1], DrawOp::Text { text, .. } if text == "Tap on: APPLE"));
    let drawn: Vec<Fruit> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Image { fruit, .. } => Some(*fruit),
            _ => None,
        })
        .collect();
    assert_eq!(drawn, Fruit::ALL);
}

#[test]
fn fruits_keep_falling_each_frame() {
    let mut game = started(0.5);
    let before: Vec<f64> = game.fruits().iter().map(|f| f.y).collect();
    game.advance(500.0);
    for (f, y0) in game.fruits().iter().zip(before) {
        assert!(f.y > y0 + 20.0 * f.speed, "{} only moved from {y0} to {}", f.fruit, f.y);
    }
}

#[test]
fn correct_tap_on_mango_after_1_23s() {
    let mut game = started(0.5);
    game.advance(1230.0);
    assert_eq!(game.tap_fruit(Fruit::Mango), Tap::Correct);

    assert_eq!(game.phase(), Phase::RoundOver(Outcome::Success));
    assert!(game.over());
    assert!(close(game.reaction_time().unwrap(), 1.23));
    assert!(close(game.high_score().unwrap(), 1.23));
    assert!(game.platform().controls_visible());
    assert!(game.platform().drew_text("Correct!"));
    assert!(game.platform().drew_text("Reaction: 1.23s"));
    assert!(game.platform().drew_text("High Score: 1.23s"));
}

#[test]
fn no_tap_for_five_seconds_is_too_slow() {
    let mut game = started(0.5);
    game.advance(4999.0);
    assert_eq!(game.phase(), Phase::Playing);
    game.advance(1.0);

    assert_eq!(game.phase(), Phase::RoundOver(Outcome::TooSlow));
    assert!(close(game.reaction_time().unwrap(), 5.0));
    assert_eq!(game.high_score(), None);
    assert!(game.platform().drew_text("Too Slow! Game Over"));
    assert!(game.platform().drew_text("Reaction: 5.00s"));
    assert!(!game.platform().drew_text("High Score"));
    assert!(game.platform().controls_visible());
}

#[test]
fn too_slow_clears_but_success_draws_over_last_frame() {
    let mut game = started(0.5);
    game.advance(300.0);
    game.platform_mut().take_ops();
    game.tap_fruit(Fruit::Mango);
    assert!(!game.platform().ops().contains(&DrawOp::Clear));

    game.restart();
    game.advance(PLAY_STARTS_AT + 5000.0);
    let ops = game.platform_mut().take_ops();
    let fail = ops
        .iter()
        .position(|op| matches!(op, DrawOp::Text { text, .. } if text.starts_with("Too Slow")))
        .expect("failure message drawn");
    assert_eq!(ops[fail - 1], DrawOp::Clear);
}

#[test]
fn wrong_fruit_is_ignored_and_round_continues() {
    let mut game = started(0.5);
    game.advance(200.0);
    assert_eq!(game.tap_fruit(Fruit::Apple), Tap::WrongFruit(Fruit::Apple));
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.reaction_time(), None);
    assert!(!game.platform().controls_visible());

    let apple_y = game.fruits()[0].y;
    game.advance(100.0);
    assert!(game.fruits()[0].y > apple_y);

    // Still winnable afterwards.
    assert_eq!(game.tap_fruit(Fruit::Mango), Tap::Correct);
}

#[test]
fn tap_on_empty_space_is_a_miss() {
    let mut game = started(0.5);
    assert_eq!(game.tap(399.0, 599.0), Tap::Miss);
    assert_eq!(game.phase(), Phase::Playing);
}

#[test]
fn taps_outside_play_are_ignored() {
    let mut game = new_game(0.5);
    assert_eq!(game.tap(200.0, 10.0), Tap::Ignored);
    game.start();
    game.advance(2000.0);
    assert_eq!(game.tap(200.0, 10.0), Tap::Ignored);
    assert_eq!(game.phase(), Phase::Countdown(1));
}

#[test]
fn hit_box_edges_count() {
    // Top-left corner.
    let mut game = started(0.5);
    game.advance(400.0);
    let mango = game.fruits()[2].clone();
    assert_eq!(game.tap(mango.x, mango.y), Tap::Correct);

    // Bottom-right corner, next round.
    game.platform_mut().rng_mut().script(&[0.5]);
    game.restart();
    game.advance(PLAY_STARTS_AT + 400.0);
    let mango = game.fruits()[2].clone();
    assert_eq!(
        game.tap(mango.x + mango.width, mango.y + mango.height),
        Tap::Correct
    );

    // Just past the corner misses.
    game.platform_mut().rng_mut().script(&[0.5]);
    game.restart();
    game.advance(PLAY_STARTS_AT + 400.0);
    let mango = game.fruits()[2].clone();
    assert_ne!(
        game.tap(mango.x + mango.width + 0.5, mango.y + mango.height + 0.5),
        Tap::Correct
    );
}

#[test]
fn taps_are_scaled_from_css_to_canvas_pixels() {
    let mut platform = SimPlatform::new(800.0, 1200.0).with_scale(2.0, 2.0);
    platform.rng_mut().script(&[0.5]);
    let mut game = Game::new(platform, GameConfig::default());
    game.start();
    game.advance(PLAY_STARTS_AT + 600.0);

    let mango = game.fruits()[2].clone();
    // Unscaled canvas coordinates land on the wrong spot.
    let cx = mango.x + mango.width / 2.0;
    let cy = mango.y + mango.height / 2.0;
    assert_ne!(game.tap(cx, cy), Tap::Correct);
    assert_eq!(game.tap(cx / 2.0, cy / 2.0), Tap::Correct);
}

#[test]
fn high_score_is_minimum_successful_reaction() {
    let mut game = new_game(0.5);
    game.start();
    // (tap after ms, or None to let the deadline pass)
    let rounds: [Option<f64>; 5] = [Some(2000.0), None, Some(1000.0), Some(1500.0), None];
    for (i, round) in rounds.iter().enumerate() {
        if i > 0 {
            game.platform_mut().rng_mut().script(&[0.5]);
            game.restart();
        }
        game.advance(PLAY_STARTS_AT);
        match round {
            Some(ms) => {
                game.advance(*ms);
                assert_eq!(game.tap_fruit(Fruit::Mango), Tap::Correct, "round {i}");
            }
            None => game.advance(5000.0),
        }
        assert!(game.over(), "round {i} did not end");
    }
    assert!(close(game.high_score().unwrap(), 1.0));
}

#[test]
fn high_score_stays_unset_without_success() {
    let mut game = new_game(0.5);
    game.start();
    for i in 0..3 {
        if i > 0 {
            game.restart();
        }
        game.advance(PLAY_STARTS_AT + 5000.0);
        assert_eq!(game.phase(), Phase::RoundOver(Outcome::TooSlow));
    }
    assert_eq!(game.high_score(), None);
}

#[test]
fn restart_resets_round_and_hides_controls() {
    let mut game = started(0.5);
    game.advance(5000.0);
    assert!(game.platform().controls_visible());

    game.restart();
    assert_eq!(game.phase(), Phase::Countdown(3));
    assert!(game.fruits().is_empty());
    assert_eq!(game.target(), None);
    assert_eq!(game.reaction_time(), None);
    assert!(!game.platform().controls_visible());
}

#[test]
fn taps_are_counted_per_round() {
    let mut game = started(0.5);
    game.tap(399.0, 599.0);
    game.tap_fruit(Fruit::Apple);
    assert_eq!(game.round().taps, 2);

    game.restart();
    assert_eq!(game.round().taps, 0);
    // Taps outside play still reach the controller, they just do nothing.
    assert_eq!(game.tap(10.0, 10.0), Tap::Ignored);
    assert_eq!(game.round().taps, 1);
}

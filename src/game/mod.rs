//! Game controller: owns the round state and drives
//! countdown → play → outcome, one round at a time.
//!
//! Everything is callback driven. The host calls `start` once, `wake` whenever
//! a scheduled task fires, `tap` on pointer input and `restart` from the
//! restart button. The controller never blocks.

pub mod view;

use log::{debug, info};

use crate::config::GameConfig;
use crate::fruit::{FallingFruit, Fruit, FruitImages, hit_test};
use crate::platform::{Delay, Platform, Task, Wake, to_canvas};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TooSlow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before the first `start`.
    Idle,
    /// Value currently on screen; 0 is the "GO!" marker.
    Countdown(u8),
    Playing,
    RoundOver(Outcome),
}

/// What a tap did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tap {
    /// Not playing.
    Ignored,
    Miss,
    WrongFruit(Fruit),
    Correct,
}

/// Best (lowest) successful reaction time of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HighScore(Option<f64>);

impl HighScore {
    pub fn get(&self) -> Option<f64> {
        self.0
    }

    /// Returns true if `seconds` became the new high score.
    pub fn offer(&mut self, seconds: f64) -> bool {
        match self.0 {
            Some(best) if seconds >= best => false,
            _ => {
                self.0 = Some(seconds);
                true
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoundState {
    pub target: Option<Fruit>,
    pub fruits: Vec<FallingFruit>,
    pub started_at_ms: f64,
    /// Seconds from round start to the outcome.
    pub reaction_time: Option<f64>,
    /// Pointer inputs delivered since the round's countdown began.
    pub taps: u32,
}

struct Armed<T> {
    token: u64,
    timer: T,
}

struct Timers<T> {
    countdown: Option<Armed<T>>,
    deadline: Option<Armed<T>>,
    frame: Option<Armed<T>>,
    next_token: u64,
}

impl<T> Timers<T> {
    fn new() -> Self {
        Self {
            countdown: None,
            deadline: None,
            frame: None,
            next_token: 1,
        }
    }

    fn slot(&mut self, task: Task) -> &mut Option<Armed<T>> {
        match task {
            Task::CountdownTick => &mut self.countdown,
            Task::Deadline => &mut self.deadline,
            Task::Frame => &mut self.frame,
        }
    }
}

pub struct Game<P: Platform> {
    platform: P,
    config: GameConfig,
    images: FruitImages<P::Image>,
    phase: Phase,
    round: RoundState,
    high_score: HighScore,
    timers: Timers<P::Timer>,
}

impl<P: Platform> Game<P> {
    /// Kicks off image loading; the game stays `Idle` until `start`.
    pub fn new(mut platform: P, config: GameConfig) -> Self {
        let images = FruitImages::load(|fruit| platform.load_image(fruit));
        Self {
            platform,
            config,
            images,
            phase: Phase::Idle,
            round: RoundState::default(),
            high_score: HighScore::default(),
            timers: Timers::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn target(&self) -> Option<Fruit> {
        self.round.target
    }

    pub fn fruits(&self) -> &[FallingFruit] {
        &self.round.fruits
    }

    pub fn reaction_time(&self) -> Option<f64> {
        self.round.reaction_time
    }

    pub fn high_score(&self) -> Option<f64> {
        self.high_score.get()
    }

    pub fn started(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::RoundOver(_))
    }

    pub fn over(&self) -> bool {
        matches!(self.phase, Phase::RoundOver(_))
    }

    /// Number of tasks currently armed.
    pub fn pending_tasks(&self) -> usize {
        [&self.timers.countdown, &self.timers.deadline, &self.timers.frame]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }

    /// First countdown after load. Later rounds go through `restart`.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            debug!("start ignored in {:?}", self.phase);
            return;
        }
        self.enter_countdown();
    }

    /// Abandons whatever is in progress and counts down a fresh round.
    pub fn restart(&mut self) {
        info!("restart from {:?}", self.phase);
        self.enter_countdown();
    }

    /// Entry point for every scheduled callback.
    pub fn wake(&mut self, wake: Wake) {
        if !self.claim(wake) {
            debug!("stale wake {:?}", wake);
            return;
        }
        match wake.task {
            Task::CountdownTick => self.on_tick(),
            Task::Deadline => self.finish(Outcome::TooSlow),
            Task::Frame => self.on_frame(),
        }
    }

    /// Pointer input in CSS pixels relative to the canvas' top-left corner.
    pub fn tap(&mut self, css_x: f64, css_y: f64) -> Tap {
        self.round.taps += 1;
        if self.phase != Phase::Playing {
            return Tap::Ignored;
        }
        let (x, y) = to_canvas(css_x, css_y, self.platform.scale());
        let Some(hit) = hit_test(&self.round.fruits, x, y).map(|f| f.fruit) else {
            return Tap::Miss;
        };
        if Some(hit) != self.round.target {
            debug!("wrong fruit tapped: {hit}");
            return Tap::WrongFruit(hit);
        }
        self.finish(Outcome::Success);
        Tap::Correct
    }

    fn enter_countdown(&mut self) {
        self.cancel_timers();
        self.round.target = None;
        self.round.fruits.clear();
        self.round.reaction_time = None;
        self.round.taps = 0;
        self.platform.set_outcome_controls_visible(false);

        let from = self.config.countdown_from;
        self.phase = Phase::Countdown(from);
        view::draw_countdown(&mut self.platform, from);
        self.arm(Task::CountdownTick, Delay::Millis(self.config.tick_ms));
    }

    fn on_tick(&mut self) {
        let Phase::Countdown(value) = self.phase else {
            return;
        };
        if value == 0 {
            self.begin_play();
            return;
        }
        let value = value - 1;
        self.phase = Phase::Countdown(value);
        view::draw_countdown(&mut self.platform, value);
        self.arm(Task::CountdownTick, Delay::Millis(self.config.tick_ms));
    }

    fn begin_play(&mut self) {
        self.cancel_timers();
        let target = Fruit::from_unit(self.platform.next_f64());
        let mut fruits = Vec::with_capacity(Fruit::COUNT);
        for (fruit, &x) in Fruit::ALL.iter().zip(&self.config.slots) {
            let speed = self.config.speed_at(self.platform.next_f64());
            fruits.push(FallingFruit {
                fruit: *fruit,
                x,
                y: self.config.spawn_y,
                width: self.config.fruit_width,
                height: self.config.fruit_height,
                speed,
            });
        }
        self.round.target = Some(target);
        self.round.fruits = fruits;
        self.round.started_at_ms = self.platform.now_ms();
        self.phase = Phase::Playing;
        info!("round started, target {target}");

        self.arm(Task::Deadline, Delay::Millis(self.config.deadline_ms));
        self.on_frame();
    }

    fn on_frame(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(target) = self.round.target else {
            return;
        };
        view::draw_play_frame(
            &mut self.platform,
            &self.images,
            &mut self.round.fruits,
            target,
            self.config.prompt_y,
        );
        self.arm(Task::Frame, Delay::NextFrame);
    }

    /// The latch: only the first outcome of a round gets past the phase check.
    fn finish(&mut self, outcome: Outcome) {
        if self.phase != Phase::Playing {
            return;
        }
        self.cancel_timers();
        let seconds = (self.platform.now_ms() - self.round.started_at_ms) / 1000.0;
        self.round.reaction_time = Some(seconds);
        if outcome == Outcome::Success && self.high_score.offer(seconds) {
            info!("new high score {seconds:.2}s");
        }
        self.phase = Phase::RoundOver(outcome);
        info!("round over: {outcome:?} after {seconds:.2}s");

        view::draw_outcome(&mut self.platform, outcome, seconds, self.high_score.get());
        self.platform.set_outcome_controls_visible(true);
    }

    fn arm(&mut self, task: Task, delay: Delay) {
        if let Some(old) = self.timers.slot(task).take() {
            self.platform.cancel(old.timer);
        }
        let token = self.timers.next_token;
        self.timers.next_token += 1;
        let timer = self.platform.schedule(Wake { task, token }, delay);
        *self.timers.slot(task) = Some(Armed { token, timer });
    }

    /// Consumes the slot if `wake` is its current arming.
    fn claim(&mut self, wake: Wake) -> bool {
        let slot = self.timers.slot(wake.task);
        if slot.as_ref().is_some_and(|armed| armed.token == wake.token) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Idempotent; called on every path that leaves a phase.
    pub fn cancel_timers(&mut self) {
        for task in [Task::CountdownTick, Task::Deadline, Task::Frame] {
            if let Some(armed) = self.timers.slot(task).take() {
                self.platform.cancel(armed.timer);
            }
        }
    }
}

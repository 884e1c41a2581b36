//! Browser host: canvas drawing, timers, pointer input and the restart / share
//! buttons.
//!
//! The controller lives in an `Rc<RefCell<Game<WebPlatform>>>`. DOM listeners
//! hold strong references (they live as long as the page); scheduled
//! callbacks only hold a `Weak` one and go quiet if the game is gone.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{Level, error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    MouseEvent, TouchEvent, Window, window,
};

use crate::config::GameConfig;
use crate::fruit::{Fruit, Rect};
use crate::game::Game;
use crate::platform::{Clock, Controls, Delay, Entropy, Scheduler, Surface, TextStyle, Wake};
use crate::share::{share_link, share_message};

pub const CANVAS_ID: &str = "gameCanvas";
pub const RESTART_ID: &str = "restartBtn";
pub const SHARE_ID: &str = "shareBtn";

pub const SHARE_UNSUPPORTED: &str = "Sharing is not supported on this device.";

pub type SharedGame = Rc<RefCell<Game<WebPlatform>>>;
type WeakGame = Weak<RefCell<Game<WebPlatform>>>;

// --- Input -----------------------------------------------------------------

/// How long after a touch a click is treated as the browser's compatibility
/// click for that same touch.
pub const GHOST_CLICK_MS: f64 = 600.0;

/// Lets each physical tap through once, whether it arrives as a touch, a
/// click, or both.
#[derive(Clone, Copy, Debug, Default)]
pub struct TapFilter {
    last_touch_ms: Option<f64>,
}

impl TapFilter {
    pub fn touch(&mut self, now_ms: f64) {
        self.last_touch_ms = Some(now_ms);
    }

    pub fn click(&self, now_ms: f64) -> bool {
        match self.last_touch_ms {
            Some(t) if now_ms - t < GHOST_CLICK_MS => false,
            _ => true,
        }
    }
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// --- Platform ----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebTimer {
    Timeout(i32),
    Frame(i32),
    /// Registration failed; nothing to cancel.
    Unscheduled,
}

pub struct WebPlatform {
    game: WeakGame,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    restart_btn: Option<HtmlElement>,
    share_btn: Option<HtmlElement>,
}

fn fire(game: &WeakGame, wake: Wake) {
    let Some(game) = game.upgrade() else {
        return;
    };
    match game.try_borrow_mut() {
        Ok(mut g) => g.wake(wake),
        Err(_) => {
            // The slot still holds this token; dropping the wake would strand
            // the round, so deliver it on the next frame instead.
            error!("game busy, retrying {:?} next frame", wake);
            retry_next_frame(Rc::downgrade(&game), wake);
        }
    };
}

fn retry_next_frame(game: WeakGame, wake: Wake) {
    let Some(win) = window() else {
        error!("no window, {:?} lost", wake);
        return;
    };
    let cb = Closure::once_into_js(move |_ts: f64| fire(&game, wake));
    if let Err(e) = win.request_animation_frame(cb.unchecked_ref()) {
        error!("cannot retry {:?}: {:?}", wake, e);
    }
}

impl Surface for WebPlatform {
    type Image = Option<HtmlImageElement>;

    fn load_image(&mut self, fruit: Fruit) -> Self::Image {
        match HtmlImageElement::new() {
            Ok(img) => {
                img.set_src(&fruit.asset_path());
                Some(img)
            }
            Err(e) => {
                warn!("cannot create image for {fruit}: {e:?}");
                None
            }
        }
    }

    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn scale(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let (w, h) = self.size();
        let sx = if rect.width() > 0.0 { w / rect.width() } else { 1.0 };
        let sy = if rect.height() > 0.0 { h / rect.height() } else { 1.0 };
        (sx, sy)
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        self.ctx.set_font(style.font);
        self.ctx.set_fill_style_str(style.color);
        self.ctx.set_text_align(style.align);
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn draw_image(&mut self, image: &Self::Image, rect: Rect) {
        // An image still loading (or broken) draws nothing this frame.
        let Some(img) = image else {
            return;
        };
        if !img.complete() || img.natural_width() == 0 {
            return;
        }
        let _ = self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(img, rect.x, rect.y, rect.w, rect.h);
    }
}

impl Clock for WebPlatform {
    fn now_ms(&self) -> f64 {
        performance_now()
    }
}

impl Scheduler for WebPlatform {
    type Timer = WebTimer;

    fn schedule(&mut self, wake: Wake, delay: Delay) -> WebTimer {
        let Some(win) = window() else {
            warn!("no window, cannot schedule {:?}", wake);
            return WebTimer::Unscheduled;
        };
        let game = self.game.clone();
        let registered = match delay {
            Delay::Millis(ms) => {
                let cb = Closure::once_into_js(move || fire(&game, wake));
                win.set_timeout_with_callback_and_timeout_and_arguments_0(
                    cb.unchecked_ref(),
                    ms.min(i32::MAX as u32) as i32,
                )
                .map(WebTimer::Timeout)
            }
            Delay::NextFrame => {
                let cb = Closure::once_into_js(move |_ts: f64| fire(&game, wake));
                win.request_animation_frame(cb.unchecked_ref())
                    .map(WebTimer::Frame)
            }
        };
        registered.unwrap_or_else(|e| {
            warn!("failed to schedule {:?}: {:?}", wake, e);
            WebTimer::Unscheduled
        })
    }

    fn cancel(&mut self, timer: WebTimer) {
        let Some(win) = window() else {
            return;
        };
        match timer {
            WebTimer::Timeout(id) => win.clear_timeout_with_handle(id),
            WebTimer::Frame(id) => {
                let _ = win.cancel_animation_frame(id);
            }
            WebTimer::Unscheduled => {}
        }
    }
}

impl Entropy for WebPlatform {
    #[cfg(feature = "rng")]
    fn next_f64(&mut self) -> f64 {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64,
            Err(_) => js_sys::Math::random(),
        }
    }

    #[cfg(not(feature = "rng"))]
    fn next_f64(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

impl Controls for WebPlatform {
    fn set_outcome_controls_visible(&mut self, visible: bool) {
        let display = if visible { "block" } else { "none" };
        for btn in [&self.restart_btn, &self.share_btn].into_iter().flatten() {
            let _ = btn.style().set_property("display", display);
        }
    }
}

// --- Entry points ------------------------------------------------------------

/// Set up the canvas, buttons and listeners, then start the first countdown.
/// Call once per page.
pub fn launch(config: GameConfig) -> Result<SharedGame, JsValue> {
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    // Already set by an earlier launch is fine.
    let _ = console_log::init_with_level(Level::Info);

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas = canvas_element(&win, &doc, config.canvas_fraction)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let restart_btn = button(&doc, RESTART_ID);
    let share_btn = button(&doc, SHARE_ID);

    let game: SharedGame = Rc::new_cyclic(|weak| {
        let platform = WebPlatform {
            game: weak.clone(),
            canvas: canvas.clone(),
            ctx,
            restart_btn: restart_btn.clone(),
            share_btn: share_btn.clone(),
        };
        RefCell::new(Game::new(platform, config))
    });

    listen_taps(&canvas, &game)?;
    if let Some(btn) = &restart_btn {
        let game = game.clone();
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            game.borrow_mut().restart();
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    if let Some(btn) = &share_btn {
        let game = game.clone();
        let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
            let reaction = game.borrow().reaction_time();
            if let Some(t) = reaction {
                share(t);
            }
        }) as Box<dyn FnMut(_)>);
        btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    game.borrow_mut().start();
    Ok(game)
}

fn canvas_element(win: &Window, doc: &Document, fraction: f64) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    let vw = win.inner_width()?.as_f64().unwrap_or(400.0);
    let vh = win.inner_height()?.as_f64().unwrap_or(600.0);
    canvas.set_width((vw * fraction) as u32);
    canvas.set_height((vh * fraction) as u32);
    Ok(canvas)
}

fn button(doc: &Document, id: &str) -> Option<HtmlElement> {
    let el = doc.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok();
    if el.is_none() {
        warn!("#{id} is not an HTML element");
    }
    el
}

fn listen_taps(canvas: &HtmlCanvasElement, game: &SharedGame) -> Result<(), JsValue> {
    let filter = Rc::new(Cell::new(TapFilter::default()));
    {
        let game = game.clone();
        let target = canvas.clone();
        let filter = filter.clone();
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
            if !filter.get().click(performance_now()) {
                return;
            }
            let rect = target.get_bounding_client_rect();
            let x = evt.client_x() as f64 - rect.left();
            let y = evt.client_y() as f64 - rect.top();
            game.borrow_mut().tap(x, y);
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let game = game.clone();
        let target = canvas.clone();
        let filter = filter.clone();
        let closure = Closure::wrap(Box::new(move |evt: TouchEvent| {
            let Some(touch) = evt.touches().get(0) else {
                return;
            };
            // Suppress the compatibility click; `TapFilter` covers browsers
            // that send it anyway.
            evt.prevent_default();
            let mut f = filter.get();
            f.touch(performance_now());
            filter.set(f);
            let rect = target.get_bounding_client_rect();
            let x = touch.client_x() as f64 - rect.left();
            let y = touch.client_y() as f64 - rect.top();
            game.borrow_mut().tap(x, y);
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Open the message link for `reaction_time`, or tell the player why not.
pub fn share(reaction_time: f64) {
    let Some(win) = window() else {
        return;
    };
    let encoded: String = js_sys::encode_uri_component(&share_message(reaction_time)).into();
    let opened = win.open_with_url_and_target(&share_link(&encoded), "_blank");
    if let Some(notice) = share_notice(&opened) {
        warn!("share link could not be opened");
        let _ = win.alert_with_message(notice);
    }
}

/// Message for the player when opening the share link did not produce a window.
pub fn share_notice(opened: &Result<Option<Window>, JsValue>) -> Option<&'static str> {
    match opened {
        Ok(Some(_)) => None,
        _ => Some(SHARE_UNSUPPORTED),
    }
}

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use common::{
    CLIENT_LEADERBOARD_CAPACITY, DEFAULT_FALLBACK_URL, DEFAULT_SERVICE_URL, Direction, GameEvent,
    GamePhase, Grid, HttpTransport, LeaderboardSource, LeaderboardStore, MIN_SWIPE_DISTANCE_PX,
    PseudoRandom, RankedEntry, RemoteLeaderboard, ServiceKind, Simulation, StatusLine,
    SyncGateway, TimerAction, compose_display,
};
use js_sys::{Function, Promise};
use log::{info, warn};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::render;
use crate::storage::BrowserStorage;
use crate::sync::SpawnLocalSink;

const TOKEN_SAVED: &str = "✅ GitHub token guardado! Scores ahora se sincronizarán.";

#[derive(Serialize)]
struct LeaderboardView {
    source: LeaderboardSource,
    entries: Vec<RankedEntry>,
}

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

struct GameInner {
    simulation: Simulation,
    store: LeaderboardStore<BrowserStorage>,
    status: StatusLine,
    context: CanvasRenderingContext2d,
    tick_fn: Option<Function>,
    interval_id: Option<i32>,
}

impl GameInner {
    /// Feeds simulation events to the status line, the store and the timer,
    /// then redraws.
    fn apply(&mut self, events: Vec<GameEvent>) {
        let now = now_ms();
        for event in &events {
            self.status.apply(event, now);
            if let Err(e) = self.store.handle_event(event) {
                warn!("Could not record game result: {:#}", e);
            }
            if let Some(action) = event.timer_action() {
                self.apply_timer(action);
            }
        }
        self.status.refresh(self.simulation.phase(), now);
        self.draw();
    }

    fn apply_timer(&mut self, action: TimerAction) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(id) = self.interval_id.take() {
            window.clear_interval_with_handle(id);
        }

        if let (TimerAction::Start { interval_ms }, Some(tick_fn)) = (action, &self.tick_fn) {
            match window.set_interval_with_callback_and_timeout_and_arguments_0(tick_fn, interval_ms as i32) {
                Ok(id) => self.interval_id = Some(id),
                Err(e) => warn!("Failed to start game timer: {:?}", e),
            }
        }
    }

    fn draw(&self) {
        if let Err(e) = render::draw(&self.context, &self.simulation.snapshot()) {
            warn!("Failed to draw frame: {:?}", e);
        }
    }
}

/// The browser game: one canvas, one timer, the local leaderboard and an
/// optional leaderboard service.
#[wasm_bindgen]
pub struct PabloGame {
    inner: Rc<RefCell<GameInner>>,
    gateway: Option<Rc<SyncGateway<HttpTransport>>>,
    // Owns the JS function the interval calls
    _on_tick: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl PabloGame {
    /// `service_url` defaults to the local service; an empty string plays
    /// offline. `service_kind` is `proxy` (default) or `direct`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        service_url: Option<String>,
        service_kind: Option<String>,
    ) -> Result<PabloGame, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("No element with id '{}'", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("Element is not a canvas"))?;
        let context = canvas
            .get_context("2d")
            .map_err(|_| JsValue::from_str("Failed to get 2d context"))?
            .ok_or_else(|| JsValue::from_str("2d context is null"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("Failed to cast to 2d context"))?;

        let service_url = service_url.unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let gateway = if service_url.trim().is_empty() {
            info!("Playing offline, scores stay in this browser");
            None
        } else {
            let kind = match service_kind {
                Some(kind) => kind.parse::<ServiceKind>().map_err(to_js)?,
                None => ServiceKind::default(),
            };
            let transport =
                HttpTransport::new(&service_url, kind, Some(DEFAULT_FALLBACK_URL)).map_err(to_js)?;
            Some(Rc::new(SyncGateway::new(transport)))
        };

        let mut store = LeaderboardStore::load(BrowserStorage::open());
        if let Some(gateway) = &gateway {
            store = store.with_sink(Box::new(SpawnLocalSink::new(gateway.clone())));
        }

        let grid = Grid::from_canvas(canvas.width(), canvas.height());
        let seed = PseudoRandom::from_clock().next_u64();
        let simulation = Simulation::new(grid, seed).with_high_score(store.high_score());

        let inner = Rc::new(RefCell::new(GameInner {
            simulation,
            store,
            status: StatusLine::default(),
            context,
            tick_fn: None,
            interval_id: None,
        }));

        let weak: Weak<RefCell<GameInner>> = Rc::downgrade(&inner);
        let on_tick = Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                let events = inner.simulation.tick();
                inner.apply(events);
            }
        });

        {
            let mut inner = inner.borrow_mut();
            inner.tick_fn = Some(on_tick.as_ref().unchecked_ref::<Function>().clone());
            inner.draw();
        }

        Ok(PabloGame {
            inner,
            gateway,
            _on_tick: on_tick,
        })
    }

    /// Start, resume, or play again.
    pub fn start(&self) {
        let mut inner = self.inner.borrow_mut();
        let events = inner.simulation.start();
        inner.apply(events);
    }

    pub fn toggle_pause(&self) {
        let mut inner = self.inner.borrow_mut();
        let events = inner.simulation.toggle_pause();
        inner.apply(events);
    }

    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        let events = inner.simulation.reset();
        inner.apply(events);
    }

    /// Queues a turn given as a unit vector, e.g. from on-screen buttons.
    pub fn set_direction(&self, dx: i32, dy: i32) {
        let mut inner = self.inner.borrow_mut();
        let events = inner.simulation.set_direction_delta(dx, dy);
        inner.apply(events);
    }

    /// Queues a turn from a touch swipe measured in pixels.
    pub fn handle_swipe(&self, dx: f64, dy: f64) {
        if let Some(direction) = Direction::from_swipe(dx, dy, MIN_SWIPE_DISTANCE_PX) {
            let mut inner = self.inner.borrow_mut();
            let events = inner.simulation.set_direction(direction);
            inner.apply(events);
        }
    }

    /// Handles a `KeyboardEvent.key`. Returns `true` when the key was used
    /// and the page should not scroll.
    pub fn handle_key(&self, key: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.simulation.phase(), GamePhase::Running | GamePhase::Paused) {
            return false;
        }

        let events = match key {
            "ArrowUp" => inner.simulation.set_direction(Direction::Up),
            "ArrowDown" => inner.simulation.set_direction(Direction::Down),
            "ArrowLeft" => inner.simulation.set_direction(Direction::Left),
            "ArrowRight" => inner.simulation.set_direction(Direction::Right),
            " " => inner.simulation.toggle_pause(),
            _ => return false,
        };
        inner.apply(events);
        true
    }

    pub fn score(&self) -> u32 {
        self.inner.borrow().simulation.score()
    }

    pub fn high_score(&self) -> u32 {
        self.inner.borrow().simulation.high_score()
    }

    /// e.g. `2 (3/7)`
    pub fn level_label(&self) -> String {
        self.inner.borrow().simulation.level_label()
    }

    pub fn status_text(&self) -> String {
        let mut inner = self.inner.borrow_mut();
        let phase = inner.simulation.phase();
        inner.status.refresh(phase, now_ms());
        inner.status.text.clone()
    }

    /// `neutral`, `success` or `error`, for styling the status line.
    pub fn status_kind(&self) -> String {
        serde_json::to_value(self.inner.borrow().status.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Label for the start button in the current phase.
    pub fn start_label(&self) -> String {
        match self.inner.borrow().simulation.phase() {
            GamePhase::Idle => "Start Game",
            GamePhase::Running | GamePhase::Paused => "Resume",
            GamePhase::GameOver => "Play Again",
        }
        .to_string()
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().simulation.is_running()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.borrow().simulation.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn player_name(&self) -> String {
        self.inner.borrow().store.player_name()
    }

    /// Returns `false` for a blank name.
    pub fn set_player_name(&self, name: &str) -> Result<bool, JsValue> {
        self.inner.borrow_mut().store.set_player_name(name).map_err(to_js)
    }

    /// Returns `false` for a blank token.
    pub fn set_sync_token(&self, token: &str) -> Result<bool, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let saved = inner.store.set_sync_token(token).map_err(to_js)?;
        if saved {
            inner.status.notice(TOKEN_SAVED, now_ms());
        }
        Ok(saved)
    }

    /// Local entries only, as JSON.
    pub fn local_leaderboard_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.borrow().store.top_n(CLIENT_LEADERBOARD_CAPACITY))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Resolves to a JSON `{source, entries}` merging local and remote scores.
    /// Never rejects because a service is down.
    pub fn leaderboard(&self) -> Promise {
        let local = self.inner.borrow().store.entries().to_vec();
        let gateway = self.gateway.clone();

        future_to_promise(async move {
            let remote = match gateway {
                Some(gateway) => gateway.load_remote().await,
                None => RemoteLeaderboard::local_only(),
            };
            let view = LeaderboardView {
                source: remote.source,
                entries: compose_display(&local, &remote, CLIENT_LEADERBOARD_CAPACITY),
            };
            serde_json::to_string(&view)
                .map(|json| JsValue::from_str(&json))
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }
}

impl Drop for PabloGame {
    fn drop(&mut self) {
        if let (Some(window), Some(id)) = (web_sys::window(), self.inner.borrow_mut().interval_id.take()) {
            window.clear_interval_with_handle(id);
        }
    }
}

//! Lane Dash entry point
//!
//! Browser builds wire the DOM, keyboard, touch buttons and the cross-tab
//! channel to the simulation. Native builds run a headless computer-only
//! round and print the final world as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{
        BroadcastChannel, Document, Element, Event, EventTarget, HtmlButtonElement,
        HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, MessageEvent,
    };

    use lane_dash::claim::{ChannelMessage, channel_name};
    use lane_dash::config::{ConfigError, sanitize_name};
    use lane_dash::hud;
    use lane_dash::input::{CAPTURED_KEYS, InputSnapshot, KeyBindings};
    use lane_dash::render::CanvasRenderer;
    use lane_dash::sim::{SimEvent, SimulationState, TickInput, tick};
    use lane_dash::{RoundConfig, Settings, Tuning};

    /// Page elements the game talks to
    struct Dom {
        canvas: HtmlCanvasElement,
        hint: Element,
        modal: HtmlElement,
        name_input: HtmlInputElement,
        start_btn: HtmlButtonElement,
        controls_text: Option<Element>,
    }

    impl Dom {
        fn find(document: &Document) -> Result<Self, JsValue> {
            Ok(Self {
                canvas: by_id(document, "game")?,
                hint: by_id(document, "hint")?,
                modal: by_id(document, "modal")?,
                name_input: by_id(document, "nameInput")?,
                start_btn: by_id(document, "startBtn")?,
                controls_text: document.get_element_by_id("controlsText"),
            })
        }
    }

    fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
            .dyn_into::<T>()
            .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
    }

    fn elements(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
        let list = document.query_selector_all(selector)?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn listen(
        target: &EventTarget,
        kind: &str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    struct Game {
        state: SimulationState,
        renderer: CanvasRenderer,
        dom: Dom,
        settings: Settings,
        tab_id: String,
        channel: Option<BroadcastChannel>,
        held: HashSet<String>,
        touch: InputSnapshot,
        selected_lane: Option<usize>,
        last_time: f64,
    }

    impl Game {
        fn local_input(&self) -> TickInput {
            let Some(lane) = self.state.local_lane() else {
                return TickInput::default();
            };
            let keys = KeyBindings::for_lane(lane)
                .map(|bindings| bindings.snapshot(&self.held))
                .unwrap_or_default();
            TickInput::for_lane(lane, keys.merge(self.touch))
        }

        fn frame(&mut self, now: f64) {
            let dt = if self.last_time > 0.0 {
                ((now - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = now;

            let input = self.local_input();
            tick(&mut self.state, &input, dt);

            for event in self.state.drain_events() {
                if let SimEvent::CompetitorDied { lane, distance } = event {
                    log::debug!("P{} down at {}m", lane + 1, hud::distance_metres(distance));
                }
            }

            if let Err(e) = self.renderer.render(&self.state) {
                log::warn!("Render error: {:?}", e);
            }
            let status = hud::status_line(&self.state, &self.settings.room);
            self.dom.hint.set_text_content(Some(&status));
        }

        /// Enable the start button once a lane and a name are chosen
        fn refresh_modal(&self) {
            let name_ok = !sanitize_name(&self.dom.name_input.value()).is_empty();
            self.dom
                .start_btn
                .set_disabled(!(name_ok && self.selected_lane.is_some()));
            if let (Some(lane), Some(el)) = (self.selected_lane, &self.dom.controls_text) {
                if let Some(bindings) = KeyBindings::for_lane(lane) {
                    el.set_text_content(Some(&bindings.label()));
                }
            }
        }

        fn start(&mut self) -> Result<(), ConfigError> {
            let Some(lane) = self.selected_lane else {
                return Ok(());
            };
            let mut name = sanitize_name(&self.dom.name_input.value());
            if name.is_empty() {
                name = "Player".to_owned();
            }
            self.state.start(&RoundConfig::single_player(lane, &name)?)?;
            self.broadcast_claim(lane, &name);
            Ok(())
        }

        fn broadcast_claim(&self, lane: usize, name: &str) {
            let Some(channel) = &self.channel else {
                return;
            };
            let message = ChannelMessage::claim(lane, name, &self.tab_id, js_sys::Date::now());
            match message.encode() {
                Ok(json) => {
                    if let Err(e) = channel.post_message(&JsValue::from_str(&json)) {
                        log::warn!("Claim broadcast failed: {:?}", e);
                    }
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        fn receive(&mut self, data: JsValue) {
            // Peers may post plain objects instead of JSON text
            let json = match data.as_string() {
                Some(text) => text,
                None => match js_sys::JSON::stringify(&data) {
                    Ok(text) => String::from(text),
                    Err(_) => return,
                },
            };
            match ChannelMessage::decode(&json) {
                Ok(message) => {
                    if let Some(claim) = message.into_claim(&self.tab_id) {
                        self.state.apply_claim(&claim);
                    }
                }
                Err(e) => log::debug!("Ignoring channel message: {e}"),
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }

        log::info!("Lane Dash starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let dom = Dom::find(&document)?;

        let settings = Settings::from_query(&window.location().search().unwrap_or_default());
        let renderer = CanvasRenderer::new(dom.canvas.clone())?;
        renderer.resize(window.device_pixel_ratio())?;

        let channel = match BroadcastChannel::new(&channel_name(&settings.room)) {
            Ok(channel) => Some(channel),
            Err(e) => {
                log::warn!("BroadcastChannel unavailable, playing solo: {:?}", e);
                None
            }
        };

        let seed = js_sys::Date::now() as u64;
        let tab_id = format!("{:x}", (js_sys::Math::random() * 4_503_599_627_370_496.0) as u64);
        log::info!("Room '{}', tab {}, seed {}", settings.room, tab_id, seed);

        if let Some(name) = &settings.name {
            dom.name_input.set_value(name);
        }

        let game = Rc::new(RefCell::new(Game {
            state: SimulationState::new(Tuning::default(), seed),
            renderer,
            dom,
            selected_lane: None,
            settings,
            tab_id,
            channel,
            held: HashSet::new(),
            touch: InputSnapshot::default(),
            last_time: 0.0,
        }));

        setup_channel(game.clone());
        setup_modal(&document, game.clone())?;
        setup_keyboard(&window, game.clone())?;
        setup_touch(&document, game.clone())?;

        {
            let canvas = game.borrow().dom.canvas.clone();
            let focus_target = canvas.clone();
            listen(&canvas, "pointerdown", move |_| {
                let _ = focus_target.focus();
            })?;
        }
        {
            let game = game.clone();
            listen(&window, "resize", move |_| {
                let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                if let Err(e) = game.borrow().renderer.resize(dpr) {
                    log::warn!("Resize failed: {:?}", e);
                }
            })?;
        }

        request_animation_frame(game);
        log::info!("Lane Dash running!");
        Ok(())
    }

    fn setup_channel(game: Rc<RefCell<Game>>) {
        let Some(channel) = game.borrow().channel.clone() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MessageEvent| {
            game.borrow_mut().receive(event.data());
        });
        channel.set_onmessage(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    fn setup_modal(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let slots = elements(document, ".slot")?;
        let preselect = game.borrow().settings.lane;

        for slot in &slots {
            let Some(lane) = slot
                .get_attribute("data-slot")
                .and_then(|s| s.parse::<usize>().ok())
                .and_then(|s| s.checked_sub(1))
            else {
                continue;
            };
            if preselect == Some(lane) {
                slot.class_list().add_1("selected")?;
                game.borrow_mut().selected_lane = Some(lane);
            }

            let game = game.clone();
            let all = slots.clone();
            let this = slot.clone();
            listen(slot, "click", move |_| {
                for other in &all {
                    let _ = other.class_list().remove_1("selected");
                }
                let _ = this.class_list().add_1("selected");
                let mut g = game.borrow_mut();
                g.selected_lane = Some(lane);
                g.refresh_modal();
            })?;
        }

        {
            let name_input = game.borrow().dom.name_input.clone();
            let game = game.clone();
            listen(&name_input, "input", move |_| game.borrow().refresh_modal())?;
        }

        let start_btn = game.borrow().dom.start_btn.clone();
        {
            let game = game.clone();
            listen(&start_btn, "click", move |_| {
                let mut g = game.borrow_mut();
                match g.start() {
                    Ok(()) => {
                        let _ = g.dom.modal.style().set_property("display", "none");
                        let _ = g.dom.canvas.focus();
                    }
                    Err(e) => log::warn!("Cannot start round: {e}"),
                }
            })?;
        }

        game.borrow().refresh_modal();
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            listen(window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let code = event.code();
                if CAPTURED_KEYS.contains(&code.as_str()) {
                    event.prevent_default();
                }
                game.borrow_mut().held.insert(code);
            })?;
        }
        listen(window, "keyup", move |event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                game.borrow_mut().held.remove(&event.code());
            }
        })
    }

    fn setup_touch(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for button in elements(document, "#touch .btn")? {
            let Some(action) = button.get_attribute("data-act") else {
                continue;
            };
            for (kind, pressed, suppress) in [
                ("pointerdown", true, true),
                ("pointerup", false, true),
                ("pointercancel", false, false),
                ("pointerleave", false, false),
            ] {
                let game = game.clone();
                let action = action.clone();
                listen(&button, kind, move |event| {
                    if suppress {
                        event.prevent_default();
                    }
                    game.borrow_mut().touch.set_action(&action, pressed);
                })?;
            }
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::fs;

    use anyhow::{Context, Result};
    use clap::Parser;

    use lane_dash::hud;
    use lane_dash::sim::{SimEvent, SimulationState, TickInput, tick};
    use lane_dash::{RoundConfig, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Run a computer-only round without a window and print the final world as JSON
    #[derive(Debug, Parser)]
    #[command(name = "lane-dash", version)]
    pub struct Options {
        /// Seed for obstacle and rival rolls
        #[arg(long, default_value_t = 1)]
        pub seed: u64,

        /// Game time to simulate, in seconds
        #[arg(long, default_value_t = 30.0)]
        pub seconds: f32,

        /// JSON file overriding the default tuning
        #[arg(long, value_name = "FILE")]
        pub tuning: Option<String>,
    }

    pub fn run(options: &Options) -> Result<()> {
        let tuning = match &options.tuning {
            Some(path) => {
                let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
                Tuning::from_json(&json).with_context(|| format!("loading tuning from {path}"))?
            }
            None => Tuning::default(),
        };

        let mut state = SimulationState::new(tuning, options.seed);
        state
            .start(&RoundConfig::all_computer())
            .context("starting headless round")?;
        log::info!(
            "Headless run: seed {}, {:.1}s of game time",
            options.seed,
            options.seconds
        );

        let frames = (options.seconds.max(0.0) / FRAME_DT).round() as u32;
        let input = TickInput::default();
        for frame in 0..frames {
            tick(&mut state, &input, FRAME_DT);
            for event in state.drain_events() {
                match event {
                    SimEvent::CompetitorDied { lane, distance } => log::debug!(
                        "P{} down at {}m",
                        lane + 1,
                        hud::distance_metres(distance)
                    ),
                    other => log::debug!("{other:?}"),
                }
            }
            if frame % 600 == 0 {
                log::info!("{}", hud::status_line(&state, "headless"));
            }
        }

        println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_options() {
            let options =
                Options::try_parse_from(["lane-dash", "--seed", "42", "--seconds", "2.5"]).unwrap();
            assert_eq!(options.seed, 42);
            assert_eq!(options.seconds, 2.5);
            assert!(options.tuning.is_none());

            let defaults = Options::try_parse_from(["lane-dash"]).unwrap();
            assert_eq!(defaults.seed, 1);
            assert_eq!(defaults.seconds, 30.0);

            assert!(Options::try_parse_from(["lane-dash", "--seed"]).is_err());
            assert!(Options::try_parse_from(["lane-dash", "--seed", "x"]).is_err());
            assert!(Options::try_parse_from(["lane-dash", "--fast"]).is_err());
        }

        #[test]
        fn test_short_headless_run() {
            let options = Options::try_parse_from(["lane-dash", "--seconds", "1"]).unwrap();
            assert!(run(&options).is_ok());
        }

        #[test]
        fn test_missing_tuning_file_is_an_error() {
            let options =
                Options::try_parse_from(["lane-dash", "--tuning", "/nonexistent/tuning.json"])
                    .unwrap();
            let err = run(&options).unwrap_err();
            assert!(err.to_string().contains("/nonexistent/tuning.json"));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run(&headless::Options::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

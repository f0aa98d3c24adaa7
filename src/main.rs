//! Street Pursuit entry point
//!
//! On wasm32 this wires the browser (DOM, input, Web Audio, animation frames)
//! to the simulation. Natively it runs a headless autopilot session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        DeviceOrientationEvent, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent,
    };

    use glam::Vec2;
    use street_pursuit::audio::AudioManager;
    use street_pursuit::platform::{Swipe, TiltSteering, key_to_input, swipe_to_input};
    use street_pursuit::sim::{GameEvent, GamePhase, GameSession, Hud, InputEvent, TickInput, frame};
    use street_pursuit::{CharacterId, Progress, ROSTER, Settings};

    // Rendering hooks provided by the page's three.js layer
    #[wasm_bindgen(inline_js = "
        export function render_frame(json) {
            if (typeof window.renderFrame === 'function') {
                window.renderFrame(JSON.parse(json));
            }
        }

        export function game_event(json) {
            if (typeof window.onGameEvent === 'function') {
                window.onGameEvent(JSON.parse(json));
            }
        }

        export function set_roster(json) {
            if (typeof window.setRoster === 'function') {
                window.setRoster(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn render_frame(json: &str);
        fn game_event(json: &str);
        fn set_roster(json: &str);
    }

    /// Touch in progress: start point (CSS px) and timestamp
    #[derive(Clone, Copy)]
    struct TouchStart {
        x: f32,
        y: f32,
        at_ms: f64,
    }

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        input: TickInput,
        audio: AudioManager,
        progress: Progress,
        settings: Settings,
        tilt: TiltSteering,
        touch: Option<TouchStart>,
        canvas: HtmlCanvasElement,
        last_hud: Option<Hud>,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_volumes(
                settings.effective_sfx_volume(),
                settings.effective_loop_volume(),
            );
            let progress = Progress::load();
            let mut session = GameSession::new(seed);
            session.select_character(progress.selected_character());
            Self {
                session,
                input: TickInput::default(),
                audio,
                progress,
                settings,
                tilt: TiltSteering::new(),
                touch: None,
                canvas,
                last_hud: None,
            }
        }

        fn push(&mut self, event: InputEvent) {
            if event == InputEvent::Start && self.session.phase() == GamePhase::Idle {
                self.session.reseed(js_sys::Date::now() as u64);
                self.tilt.reset();
                self.audio.resume();
            }
            self.input.push(event);
        }

        /// Client coordinates to normalised viewport coordinates (0..1, y down)
        fn normalise(&self, client_x: f32, client_y: f32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let w = (rect.width() as f32).max(1.0);
            let h = (rect.height() as f32).max(1.0);
            Vec2::new(
                (client_x - rect.left() as f32) / w,
                (client_y - rect.top() as f32) / h,
            )
        }

        fn update(&mut self, time: f64) {
            let events = frame(&mut self.session, &self.input, time);
            self.input.clear();
            for event in &events {
                self.handle_event(event);
            }
            self.audio.update(self.session.engine_level());
        }

        fn handle_event(&mut self, event: &GameEvent) {
            self.audio.handle(event);

            match *event {
                GameEvent::PhaseChanged { to, .. } => show_phase(to),
                GameEvent::ShootoutWon => {
                    self.progress.record_shootout_win();
                    self.save_progress();
                }
                GameEvent::RunEnded { score, distance_km } => {
                    if self.progress.record_run(score, distance_km) {
                        log::info!("New high score: {}", score);
                    }
                    self.save_progress();
                    show_game_over(score, distance_km, self.progress.high_score);
                }
                GameEvent::CameraShake { .. } if !self.settings.effective_screen_shake() => return,
                GameEvent::CameraLean { .. } if !self.settings.effective_camera_lean() => return,
                _ => {}
            }

            if let Ok(json) = serde_json::to_string(event) {
                game_event(&json);
            }
        }

        fn save_progress(&mut self) {
            for id in self.progress.check_unlocks() {
                log::info!("Unlocked {}", id.character().name);
            }
            self.progress.save();
            refresh_character_cards(&self.progress);
        }

        /// Start-screen pick: locked characters are refused
        fn choose_character(&mut self, id: CharacterId) {
            if self.session.phase() != GamePhase::Idle {
                return;
            }
            if !self.progress.select(id) {
                log::info!("{} is locked: {}", id.character().name, id.character().unlock_desc);
                return;
            }
            self.progress.save();
            self.push(InputEvent::SelectCharacter(id));
            refresh_character_cards(&self.progress);
        }

        fn render(&self) {
            match serde_json::to_string(&self.session.snapshot()) {
                Ok(json) => render_frame(&json),
                Err(e) => log::warn!("Snapshot serialisation failed: {}", e),
            }
        }

        fn update_hud(&mut self) {
            let hud = self.session.hud();
            if self.last_hud == Some(hud) {
                return;
            }
            self.last_hud = Some(hud);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&hud.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-distance .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.2} km", hud.distance_km)));
            }
            if let Some(el) = document.query_selector("#hud-pursuit .hud-fill").ok().flatten() {
                let _ = el.set_attribute("style", &format!("width: {:.0}%", hud.pursuit_percent));
            }
            if let Some(el) = document.get_element_by_id("hud-pursuit") {
                let hot = self.session.pursuit.siren_active();
                let _ = el.class_list().toggle_with_force("hot", hot);
            }
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.apply_volumes(false);
            self.settings.save();
            if let Some(btn) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("mute-btn"))
            {
                btn.set_text_content(Some(if muted { "UNMUTE" } else { "MUTE" }));
            }
        }

        /// Push volumes from settings; `silenced` forces zero (window blurred)
        fn apply_volumes(&mut self, silenced: bool) {
            if silenced {
                self.audio.set_volumes(0.0, 0.0);
            } else {
                self.audio.set_volumes(
                    self.settings.effective_sfx_volume(),
                    self.settings.effective_loop_volume(),
                );
            }
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// One card per roster entry in `#character-list`
    fn build_character_cards(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(list) = document.get_element_by_id("character-list") else {
            return;
        };

        for character in &ROSTER {
            let Ok(card) = document.create_element("div") else {
                continue;
            };
            let _ = card.set_attribute("id", &format!("character-{}", character.id.as_str()));
            let _ = card.set_attribute("class", "character-card");
            let _ = card.set_attribute("style", &format!("--accent: {}", character.accent_color));
            card.set_inner_html(&format!(
                "<div class=\"name\">{} {}</div>\
                 <div class=\"origin\">{} / chased by {}</div>\
                 <div class=\"bio\">{}</div>\
                 <div class=\"stats\">SPD {} / DEF {} / LCK {}</div>\
                 <div class=\"unlock\">{}</div>",
                character.name,
                character.nickname,
                character.origin,
                character.chased_by,
                character.bio,
                character.stats.speed,
                character.stats.defense,
                character.stats.luck,
                character.unlock_desc,
            ));

            let id = character.id;
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().choose_character(id);
            });
            let _ = card.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();

            let _ = list.append_child(&card);
        }

        refresh_character_cards(&game.borrow().progress);
    }

    /// Sync locked/selected classes on the character cards
    fn refresh_character_cards(progress: &Progress) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let selected = progress.selected_character();
        for character in &ROSTER {
            let id = character.id;
            if let Some(card) = document.get_element_by_id(&format!("character-{}", id.as_str())) {
                let classes = card.class_list();
                let _ = classes.toggle_with_force("locked", !progress.is_unlocked(id));
                let _ = classes.toggle_with_force("selected", id == selected);
            }
        }
    }

    /// Show the overlay for a phase, hide the rest
    fn show_phase(phase: GamePhase) {
        set_hidden("start-screen", phase != GamePhase::Idle);
        set_hidden("hud", matches!(phase, GamePhase::Idle | GamePhase::GameOver));
        set_hidden("pause-menu", phase != GamePhase::Paused);
        set_hidden("shootout-overlay", phase != GamePhase::Shootout);
        set_hidden("game-over", phase != GamePhase::GameOver);
    }

    fn show_game_over(score: u64, distance_km: f32, high_score: u64) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("final-score") {
            el.set_text_content(Some(&score.to_string()));
        }
        if let Some(el) = document.get_element_by_id("final-distance") {
            el.set_text_content(Some(&format!("{:.2} km", distance_km)));
        }
        if let Some(el) = document.get_element_by_id("high-score") {
            el.set_text_content(Some(&high_score.to_string()));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Street Pursuit starting...");

        let Some(window) = web_sys::window() else {
            log::warn!("No window - nothing to run");
            return;
        };
        let Some(document) = window.document() else {
            log::warn!("No document - nothing to run");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("No #canvas element - nothing to run");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone())));
        log::info!("Game initialized with seed: {}", seed);

        show_phase(GamePhase::Idle);

        match serde_json::to_string(&ROSTER) {
            Ok(json) => set_roster(&json),
            Err(e) => log::warn!("Roster serialisation failed: {}", e),
        }
        build_character_cards(game.clone());

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Street Pursuit running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Mouse click (shootout targets)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.phase() == GamePhase::Shootout {
                    let point = g.normalise(event.client_x() as f32, event.client_y() as f32);
                    g.push(InputEvent::Tap(point));
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().touch = Some(TouchStart {
                        x: touch.client_x() as f32,
                        y: touch.client_y() as f32,
                        at_ms: js_sys::Date::now(),
                    });
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end: swipe, or tap during a shootout
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let (Some(start), Some(touch)) = (g.touch.take(), event.changed_touches().get(0))
                else {
                    return;
                };
                let (x, y) = (touch.client_x() as f32, touch.client_y() as f32);
                let swipe = Swipe {
                    dx: x - start.x,
                    dy: y - start.y,
                    duration_ms: (js_sys::Date::now() - start.at_ms) as f32,
                };
                match (g.session.phase(), swipe_to_input(swipe)) {
                    (GamePhase::Shootout, _) => {
                        let point = g.normalise(x, y);
                        g.push(InputEvent::Tap(point));
                    }
                    (GamePhase::Playing, Some(input)) => g.push(input),
                    (GamePhase::Idle, _) => g.push(InputEvent::Start),
                    _ => {}
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if event.code() == "KeyM" {
                    g.toggle_mute();
                    return;
                }
                if let Some(input) = key_to_input(&event.code(), g.session.phase()) {
                    event.prevent_default();
                    g.push(input);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Device tilt
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
                let mut g = game.borrow_mut();
                if !g.settings.tilt_steering || g.session.phase() != GamePhase::Playing {
                    return;
                }
                let gamma = event.gamma().unwrap_or(0.0);
                if let Some(input) = g.tilt.update(gamma, js_sys::Date::now()) {
                    g.push(input);
                }
            });
            let _ = window.add_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    /// Click handler on a button that queues one input
    fn bind_button(id: &str, game: Rc<RefCell<Game>>, input: InputEvent) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            game.borrow_mut().push(input);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        bind_button("start-btn", game.clone(), InputEvent::Start);
        bind_button("pause-btn", game.clone(), InputEvent::Pause);
        bind_button("resume-btn", game.clone(), InputEvent::Resume);
        bind_button("restart-btn", game.clone(), InputEvent::Restart);
        bind_button("quit-btn", game.clone(), InputEvent::Restart);

        if let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("mute-btn"))
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().toggle_mute();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.session.phase() == GamePhase::Playing {
                        g.push(InputEvent::Pause);
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.session.phase() == GamePhase::Playing {
                    g.push(InputEvent::Pause);
                    log::info!("Auto-paused (window blur)");
                }
                if g.settings.mute_on_blur {
                    g.apply_volumes(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window focus: restore volumes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().apply_volumes(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);

    log::info!("Street Pursuit (native) - headless run, seed {}", seed);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Seeded autopilot session for exercising the simulation without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use street_pursuit::Progress;
    use street_pursuit::consts::LANES;
    use street_pursuit::sim::{GameEvent, GamePhase, GameSession, InputEvent, TickInput, tick};

    const DT: f32 = 1.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_TICKS: u64 = 60 * 60 * 10;
    /// How far ahead (world units) the autopilot looks for obstacles
    const LOOKAHEAD: f32 = 45.0;

    pub fn run(seed: u64) {
        let mut session = GameSession::new(seed);
        let mut progress = Progress::load();
        let mut input = TickInput::from(vec![
            InputEvent::SelectCharacter(progress.selected_character()),
            InputEvent::Start,
        ]);

        while session.time_ticks < MAX_TICKS {
            for event in tick(&mut session, &input, DT) {
                match event {
                    GameEvent::RunEnded { score, distance_km } => {
                        progress.record_run(score, distance_km);
                    }
                    GameEvent::ShootoutWon => progress.record_shootout_win(),
                    GameEvent::PhaseChanged { .. }
                    | GameEvent::ObstacleHit { .. }
                    | GameEvent::ShootoutStarted { .. } => log::info!("{:?}", event),
                    _ => log::debug!("{:?}", event),
                }
            }
            if session.phase() == GamePhase::GameOver {
                break;
            }
            input = autopilot(&session);
        }

        for id in progress.check_unlocks() {
            log::info!("Unlocked {}", id.character().name);
        }
        let hud = session.hud();
        log::info!(
            "Run over after {} ticks: score {}, {:.2} km, {} shootouts won",
            session.time_ticks,
            hud.score,
            hud.distance_km,
            session.shootout_wins()
        );
        progress.save();
    }

    /// Dodge into the clearest adjacent lane; tap every live target
    fn autopilot(session: &GameSession) -> TickInput {
        let mut input = TickInput::default();
        match session.phase() {
            GamePhase::Playing => {
                let blocked = |lane: usize| {
                    session
                        .obstacles
                        .active()
                        .any(|o| o.lane == lane && o.pos.z < 5.0 && o.pos.z > -LOOKAHEAD)
                };
                let lane = session.player.lane;
                if blocked(lane) {
                    if lane > 0 && !blocked(lane - 1) {
                        input.push(InputEvent::LaneLeft);
                    } else if lane + 1 < LANES.len() && !blocked(lane + 1) {
                        input.push(InputEvent::LaneRight);
                    } else {
                        input.push(InputEvent::Jump);
                    }
                }
            }
            GamePhase::Shootout => {
                for target in session.shootout.targets().iter().filter(|t| t.is_live()) {
                    input.push(InputEvent::Tap(target.pos));
                }
            }
            _ => {}
        }
        input
    }
}

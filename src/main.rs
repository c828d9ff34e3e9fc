//! Green Dino entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, PageTransitionEvent,
        PointerEvent,
    };

    use green_dino::audio::{AudioOutput, SoundEffect, WebAudio};
    use green_dino::consts::*;
    use green_dino::leaderboard::{
        DEFAULT_QUERY_LIMIT, LeaderboardStore, LocalLeaderboard, rank_label, submit_session,
    };
    use green_dino::platform::{JumpKeyAction, JumpLatch};
    use green_dino::renderer::{CanvasRenderer, Scene};
    use green_dino::text::item_name;
    use green_dino::{Language, Rules, Session, Settings};

    const MUSIC_TRACK: &str = "assets/music.mp3";

    /// Game instance holding all state
    struct Game {
        session: Session,
        settings: Settings,
        latch: JumpLatch,
        audio: WebAudio,
        leaderboard: LocalLeaderboard,
        renderer: Option<CanvasRenderer>,
        accumulator: f32,
        last_time: f64,
        /// Set when the page goes away; the frame loop stops rescheduling
        torn_down: bool,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut audio = WebAudio::new();
            audio.set_volume(settings.effective_music_volume());
            audio.set_effects_volume(settings.effective_sfx_volume());
            if let Err(e) = audio.load_track(MUSIC_TRACK) {
                log::warn!("Background track unavailable: {}", e);
            }

            Self {
                session: Session::new(seed, Rules::preset(settings.variant), settings.aggregate),
                settings,
                latch: JumpLatch::new(),
                audio,
                leaderboard: LocalLeaderboard::load(),
                renderer: None,
                accumulator: 0.0,
                last_time: 0.0,
                torn_down: false,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if !self.session.round_in_progress() {
                self.accumulator = 0.0;
                return;
            }
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                // Consumed by the first substep only
                let input = self.latch.take();
                let outcome = self.session.tick(&input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                if let Some(episode) = self.session.episode_mut() {
                    for event in episode.drain_events() {
                        if let Some(effect) = SoundEffect::for_event(&event) {
                            self.audio.play_effect(effect);
                        }
                    }
                }

                if outcome.ended() {
                    self.on_round_end();
                    break;
                }
            }
        }

        fn on_round_end(&mut self) {
            self.accumulator = 0.0;
            self.latch.clear();
            if self.session.is_complete() {
                self.audio.stop();
                self.audio.play_effect(SoundEffect::Success);
            }
        }

        fn render(&self) {
            let (Some(renderer), Some(episode)) = (&self.renderer, self.session.episode()) else {
                return;
            };
            renderer.render(&Scene::build(episode, self.settings.language));
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };
            let t = self.settings.language.strings();

            let games_left = format!("{}: {}", t.games_left, self.session.rounds_remaining());
            set_text(&document, "hud-games-left", &games_left);

            let between_rounds = !self.session.round_in_progress();
            let played_one = self.session.episode().is_some();
            set_hidden(&document, "start-screen", !(between_rounds && !played_one));
            set_hidden(
                &document,
                "game-over",
                !(between_rounds && played_one && !self.session.is_complete()),
            );
            if let Some(score) = self.session.round_scores().last() {
                set_text(&document, "final-score", &format!("{}: {}", t.score, score));
            }
            if let Some(episode) = self.session.episode() {
                let names: Vec<&str> = episode
                    .inventory
                    .as_slice()
                    .iter()
                    .map(|kind| item_name(*kind, self.settings.language))
                    .collect();
                let collected = if names.is_empty() {
                    String::new()
                } else {
                    format!("{}: {}", t.collected, names.join(", "))
                };
                set_text(&document, "collected-items", &collected);
            }

            match self.session.summary() {
                Some(summary) => {
                    set_hidden(&document, "session-complete", false);
                    set_text(&document, "completion-code", &summary.completion_code);
                    set_text(
                        &document,
                        "session-score",
                        &format!("{}: {}", t.score, summary.score),
                    );
                    let rank = self.leaderboard.board().potential_rank(summary.best_score);
                    set_text(&document, "potential-rank", &rank_label(rank - 1));
                }
                None => set_hidden(&document, "session-complete", true),
            }
        }

        fn start_round(&mut self) {
            if self.session.is_complete() {
                let seed = js_sys::Date::now() as u64;
                self.session = Session::new(
                    seed,
                    Rules::preset(self.settings.variant),
                    self.settings.aggregate,
                );
                log::info!("New session with seed: {}", self.session.seed());
            }
            self.latch.clear();
            self.accumulator = 0.0;
            match self.session.start_round() {
                Ok(_) => {
                    self.audio.resume();
                    if let Err(e) = self.audio.play() {
                        log::warn!("Background track not started: {}", e);
                    }
                }
                Err(e) => log::warn!("Cannot start round: {}", e),
            }
        }

        fn restart_round(&mut self) {
            self.latch.clear();
            self.accumulator = 0.0;
            if let Err(e) = self.session.restart_round() {
                log::warn!("Cannot restart round: {}", e);
            }
        }

        fn submit(&mut self, nickname: &str) {
            let Some(summary) = self.session.summary() else {
                return;
            };
            let Some(document) = document() else { return };
            let t = self.settings.language.strings();

            match submit_session(&mut self.leaderboard, nickname, &summary, js_sys::Date::now()) {
                Ok(submission) => {
                    self.audio.play_effect(SoundEffect::Success);
                    let message = if submission.renamed {
                        format!("{} {}", t.nickname_taken, submission.nickname)
                    } else {
                        String::new()
                    };
                    set_text(&document, "submit-status", &message);
                    set_hidden(&document, "submit-form", true);
                    self.settings.nickname = Some(submission.nickname);
                    self.settings.save();
                }
                Err(e) => {
                    self.audio.play_effect(SoundEffect::Error);
                    let message = if e.is_retryable() {
                        t.submit_failed.to_string()
                    } else {
                        e.to_string()
                    };
                    set_text(&document, "submit-status", &message);
                }
            }
            self.show_leaderboard();
        }

        fn show_leaderboard(&self) {
            let Some(document) = document() else { return };
            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            let t = self.settings.language.strings();
            let entries = match self.leaderboard.top(DEFAULT_QUERY_LIMIT) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Leaderboard query failed: {}", e);
                    Vec::new()
                }
            };
            if entries.is_empty() {
                list.set_text_content(Some(t.no_scores));
                return;
            }
            let rows: Vec<String> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| format!("{} {} {}", rank_label(i), e.nickname, e.highest_score))
                .collect();
            list.set_text_content(Some(&rows.join("\n")));
        }

        /// Page is going away: stop the loop and drop the running round
        fn teardown(&mut self) {
            if self.torn_down {
                return;
            }
            self.torn_down = true;
            self.session.abandon();
            self.latch.clear();
            self.audio.stop();
            log::info!("Game torn down");
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn apply_copy(document: &Document, settings: &Settings) {
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("lang", settings.language.as_str());
        }
        let t = settings.language.strings();
        set_text(document, "title", t.title);
        set_text(document, "instructions", t.instructions);
        set_text(document, "start-btn", t.start);
        set_text(document, "restart-btn", t.restart);
        set_text(document, "next-btn", t.try_again);
        set_text(document, "game-over-title", t.game_over);
        set_text(document, "completed-text", t.completed);
        set_text(document, "code-label", t.your_code);
        set_text(document, "leaderboard-title", t.leaderboard);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Green Dino starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut settings = Settings::load();
        if let Some(language) = language_from_query(&window) {
            if language != settings.language {
                settings.language = language;
                settings.save();
            }
        }
        apply_copy(&document, &settings);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));
        log::info!("Game initialized with seed: {}", seed);

        match CanvasRenderer::new(canvas.clone()) {
            Some(renderer) => game.borrow_mut().renderer = Some(renderer),
            None => log::warn!("Canvas 2D context unavailable - nothing will be drawn"),
        }

        setup_input_handlers(&canvas, game.clone())?;
        setup_buttons(&document, game.clone());
        setup_lifecycle(&document, game.clone())?;

        {
            let g = game.borrow();
            if let (Some(nickname), Some(input)) = (
                g.settings.nickname.as_deref(),
                document
                    .get_element_by_id("nickname")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok()),
            ) {
                input.set_value(nickname);
            }
            g.show_leaderboard();
            g.update_hud();
        }

        request_animation_frame(game);

        log::info!("Green Dino running!");
        Ok(())
    }

    /// `?lang=nl` in the page URL
    fn language_from_query(window: &web_sys::Window) -> Option<Language> {
        let search = window.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("lang="))
            .and_then(Language::from_str)
    }

    fn is_jump_key(event: &KeyboardEvent) -> bool {
        event.code() == "Space" || event.key() == " "
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if !is_jump_key(&event) {
                    return;
                }
                let mut g = game.borrow_mut();
                let action = JumpKeyAction::resolve(
                    g.session.round_in_progress(),
                    g.session.is_complete(),
                    event.repeat(),
                );
                match action {
                    JumpKeyAction::Jump => {
                        // Keep space from scrolling the page
                        event.prevent_default();
                        g.latch.key_down(event.repeat());
                    }
                    JumpKeyAction::StartRound => {
                        event.prevent_default();
                        g.audio.play_effect(SoundEffect::Click);
                        g.start_round();
                    }
                    JumpKeyAction::Ignore => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if is_jump_key(&event) {
                    game.borrow_mut().latch.key_up();
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.session.round_in_progress() {
                    g.latch.pointer_down();
                }
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing #{} button", id);
            return;
        };
        let closure = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(handler);
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "next-btn", "play-again-btn"] {
            let game = game.clone();
            on_click(document, id, move |_| {
                let mut g = game.borrow_mut();
                g.audio.play_effect(SoundEffect::Click);
                g.start_round();
            });
        }

        {
            let game = game.clone();
            on_click(document, "restart-btn", move |_| {
                let mut g = game.borrow_mut();
                g.audio.play_effect(SoundEffect::Click);
                g.restart_round();
            });
        }

        on_click(document, "submit-btn", move |_| {
            let nickname = document_input_value("nickname").unwrap_or_default();
            game.borrow_mut().submit(&nickname);
        });
    }

    fn document_input_value(id: &str) -> Option<String> {
        let input: HtmlInputElement = document()?.get_element_by_id(id)?.dyn_into().ok()?;
        Some(input.value())
    }

    fn setup_lifecycle(document: &Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Tab switch: the loop idles on its own, only the music needs handling
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if !g.settings.mute_on_blur {
                    return;
                }
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.audio.pause();
                } else if g.session.round_in_progress() {
                    if let Err(e) = g.audio.play() {
                        log::warn!("Background track not resumed: {}", e);
                    }
                }
                // Resync so the hidden interval is not simulated
                g.last_time = 0.0;
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().teardown();
            });
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Back/forward cache restore: restart the frame loop
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if !event.persisted() {
                    return;
                }
                {
                    let mut g = game.borrow_mut();
                    if !g.torn_down {
                        return;
                    }
                    g.torn_down = false;
                    g.last_time = 0.0;
                    log::info!("Game restored from page cache");
                }
                request_animation_frame(game.clone());
            });
            window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(renderer) = game.borrow_mut().renderer.as_mut() {
                    renderer.resize();
                }
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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
            if g.torn_down {
                return;
            }

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use green_dino::leaderboard::{
        DEFAULT_QUERY_LIMIT, LeaderboardStore, MemoryLeaderboard, rank_label, submit_session,
    };
    use green_dino::sim::{EpisodeState, TickInput};
    use green_dino::text::item_name;
    use green_dino::tuning::TuningError;
    use green_dino::{Language, Rules, ScoreAggregate, Session, Variant};

    /// The autopilot stops jumping after this many ticks so rounds end
    const TICK_BUDGET: u64 = 3_000;

    /// Jump when a hazard is about to reach the actor
    fn autopilot(state: &EpisodeState) -> TickInput {
        let actor = &state.actor;
        if actor.airborne || state.time_ticks > TICK_BUDGET {
            return TickInput::default();
        }
        let front = actor.x + actor.width;
        let threat = state.items.iter().any(|item| {
            let gap = item.pos.x - front;
            item.kind.is_hazard() && gap > 0.0 && gap <= state.speed * 4.0
        });
        TickInput { jump: threat }
    }

    fn play_session(seed: u64, rules: Rules) -> Session {
        let mut session = Session::new(seed, rules, ScoreAggregate::Max);
        while !session.is_complete() {
            if let Err(e) = session.start_round() {
                log::error!("{}", e);
                break;
            }
            while session.round_in_progress() {
                let input = session.episode().map(autopilot).unwrap_or_default();
                session.tick(&input);
            }
        }
        session
    }

    /// `green-dino [classic|collector|rules.json] [seed]`, item names in `GREEN_DINO_LANG`
    pub fn run() -> Result<(), TuningError> {
        let language = std::env::var("GREEN_DINO_LANG")
            .ok()
            .and_then(|lang| Language::from_str(&lang))
            .unwrap_or_default();
        let mut args = std::env::args().skip(1);
        let rules_arg = args.next();
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(2024);

        let presets = match rules_arg.as_deref() {
            Some(path) if path.ends_with(".json") => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    log::error!("{}: {}", path, e);
                    TuningError::Invalid {
                        field: "path",
                        reason: "rules file could not be read",
                    }
                })?;
                vec![("custom", Rules::from_json(&json)?)]
            }
            Some(name) => {
                let variant = Variant::from_str(name).unwrap_or_default();
                vec![(variant.as_str(), Rules::preset(variant))]
            }
            None => vec![
                (Variant::Classic.as_str(), Rules::preset(Variant::Classic)),
                (Variant::Collector.as_str(), Rules::preset(Variant::Collector)),
            ],
        };

        let mut board = MemoryLeaderboard::new();
        for (name, rules) in presets {
            let session = play_session(seed, rules);
            let Some(summary) = session.summary() else {
                continue;
            };
            println!(
                "{name} (seed {}): rounds {:?} -> {} ({}), best {}",
                session.seed(),
                summary.round_scores,
                summary.score,
                summary.aggregate.as_str(),
                summary.best_score
            );
            let collected: Vec<String> = summary
                .collected
                .as_slice()
                .iter()
                .map(|k| format!("{} {}", k.glyph(), item_name(*k, language)))
                .collect();
            if !collected.is_empty() {
                println!("  collected {}", collected.join(", "));
            }
            println!("  code {}", summary.completion_code);
            println!(
                "  would place {}",
                rank_label(board.potential_rank(summary.best_score) - 1)
            );

            match submit_session(&mut board, "Dino", &summary, seed as f64) {
                Ok(submission) if submission.renamed => {
                    println!("  saved as {}", submission.nickname)
                }
                Ok(_) => {}
                Err(e) => log::warn!("Not saved: {}", e),
            }
        }

        println!("\nLeaderboard");
        let entries = board.top(DEFAULT_QUERY_LIMIT).unwrap_or_default();
        for (i, entry) in entries.iter().enumerate() {
            println!(
                "{:>4} {:<20} {:>6} ({} games)",
                rank_label(i),
                entry.nickname,
                entry.highest_score,
                entry.games_played
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Green Dino (native) starting...");
    log::info!("Running a headless demo - use `trunk serve` for the web version");

    if let Err(e) = demo::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

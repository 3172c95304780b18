//! The page behavior controller.
//!
//! [`PageController`] owns all page state and every timer. It is driven
//! entirely by its host:
//!
//! - [`init`](PageController::init) applies startup presentation and arms
//!   timers for the behaviors the [`PageInventory`] enables,
//! - [`dispatch`](PageController::dispatch) feeds one [`Action`],
//! - [`advance_time`](PageController::advance_time) moves the deterministic
//!   clock and runs due timers at their logical fire time,
//! - [`teardown`](PageController::teardown) cancels every timer.
//!
//! Behaviors are independent. A failing host call is logged against the
//! behavior that issued it and never reaches another behavior.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_time::Duration;

use crate::action::{Action, Effect, PlayOrigin};
use crate::audio::AudioPlayer;
use crate::bubbles::{BubbleId, BubbleSpawner};
use crate::config::PageConfig;
use crate::host::{PageHost, PageInventory};
use crate::lazy::LazyImages;
use crate::menu::MobileMenu;
use crate::scheduler::{Fired, Scheduler, TimerId};
use crate::scroll::resolve_scroll;
use crate::slider::{SlideNav, Slider};
use crate::theme::{Theme, ThemeToggle};

/// Work carried by controller timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    AutoAdvance,
    SpawnBubble,
    RemoveBubble(BubbleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    TornDown,
}

pub struct PageController<H: PageHost> {
    config: PageConfig,
    inventory: PageInventory,
    host: H,
    scheduler: Scheduler<TimerTask>,
    rng: SmallRng,
    phase: Phase,
    theme: Option<ThemeToggle>,
    slider: Option<Slider>,
    auto_timer: Option<TimerId>,
    audio: Option<AudioPlayer>,
    bubbles: Option<BubbleSpawner>,
    menu: Option<MobileMenu>,
    lazy: Option<LazyImages>,
}

impl<H: PageHost> PageController<H> {
    /// Create a controller seeded from the OS random source.
    pub fn new(config: PageConfig, inventory: PageInventory, host: H) -> Self {
        Self::with_rng(config, inventory, host, SmallRng::from_os_rng())
    }

    /// Create a controller with a fixed bubble RNG seed.
    pub fn with_seed(config: PageConfig, inventory: PageInventory, host: H, seed: u64) -> Self {
        Self::with_rng(config, inventory, host, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: PageConfig, inventory: PageInventory, host: H, rng: SmallRng) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(target: "pagectl", error = %err, "invalid page config; using defaults");
                PageConfig::default()
            }
        };
        Self {
            config,
            inventory,
            host,
            scheduler: Scheduler::new(),
            rng,
            phase: Phase::Created,
            theme: None,
            slider: None,
            auto_timer: None,
            audio: None,
            bubbles: None,
            menu: None,
            lazy: None,
        }
    }

    /// Wire every behavior the inventory allows. Runs once.
    pub fn init(&mut self) {
        if self.phase != Phase::Created {
            tracing::debug!(target: "pagectl", "init called twice; ignoring");
            return;
        }
        self.phase = Phase::Running;
        tracing::info!(target: "pagectl", inventory = ?self.inventory, "initializing page behaviors");

        self.init_theme();
        self.init_slider();
        self.init_audio();
        self.init_bubbles();
        if self.inventory.mobile_menu {
            self.menu = Some(MobileMenu::default());
        } else {
            tracing::debug!(target: "pagectl", behavior = "menu", "disabled: toggle or panel missing");
        }
        self.init_lazy();

        tracing::info!(target: "pagectl", timers = self.scheduler.len(), "page behaviors initialized");
    }

    fn init_theme(&mut self) {
        if !self.inventory.theme_toggle {
            tracing::debug!(target: "pagectl", behavior = "theme", "disabled: toggle or icon missing");
            return;
        }
        let toggle = ThemeToggle::load(&self.host, self.config.theme_storage_key.clone());
        let effect = toggle.effect();
        self.theme = Some(toggle);
        self.emit("theme", [effect]);
    }

    fn init_slider(&mut self) {
        let Some(slider) = Slider::new(self.inventory.slide_count) else {
            tracing::debug!(target: "pagectl", behavior = "slider", "disabled: no slides");
            return;
        };
        let effect = slider.effect();
        self.slider = Some(slider);
        self.emit("slider", [effect]);
        self.restart_auto_advance();
    }

    fn init_audio(&mut self) {
        if !self.inventory.audio {
            tracing::debug!(target: "pagectl", behavior = "audio", "disabled: no audio element");
            return;
        }
        let player = AudioPlayer::new(
            self.config.default_volume,
            self.config.playback_blocked_message.clone(),
        );
        let effects = player.init();
        self.audio = Some(player);
        self.emit("audio", effects);
    }

    fn init_bubbles(&mut self) {
        if !self.inventory.bubble_container {
            tracing::debug!(target: "pagectl", behavior = "bubbles", "disabled: no container");
            return;
        }
        self.bubbles = Some(BubbleSpawner::new(self.config.bubble_emojis.clone()));
        self.scheduler
            .schedule_every(self.config.bubble_interval(), TimerTask::SpawnBubble);
        let stagger = self.config.initial_bubble_stagger();
        for i in 0..self.config.initial_bubbles {
            self.scheduler
                .schedule_once(stagger.saturating_mul(i), TimerTask::SpawnBubble);
        }
    }

    fn init_lazy(&mut self) {
        let lazy = LazyImages::new(self.inventory.lazy_image_count);
        match lazy.init() {
            Some(effect) => {
                self.lazy = Some(lazy);
                self.emit("lazy", [effect]);
            }
            None => {
                tracing::debug!(target: "pagectl", behavior = "lazy", "disabled: no deferred images");
            }
        }
    }

    /// Feed one logical event.
    pub fn dispatch(&mut self, action: Action) {
        if self.phase != Phase::Running {
            tracing::debug!(target: "pagectl", ?action, "controller not running; dropping action");
            return;
        }
        let _span = tracing::debug_span!("pagectl.dispatch", ?action).entered();

        match action {
            Action::ToggleTheme => {
                let Some(theme) = self.theme.as_mut() else {
                    return disabled("theme");
                };
                let effect = theme.toggle(&mut self.host);
                self.emit("theme", [effect]);
            }

            Action::NextSlide => self.navigate(SlideNav::Next),
            Action::PrevSlide => self.navigate(SlideNav::Prev),
            Action::JumpToSlide(index) => self.navigate(SlideNav::Jump(index)),

            Action::HeroPlayClicked => self.with_audio(|p| p.request_play(PlayOrigin::Hero)),
            Action::PlayPauseClicked => self.with_audio(AudioPlayer::toggle),
            Action::PlaybackStarted(origin) => self.with_audio(|p| p.playback_started(origin)),
            Action::PlaybackFailed { origin, reason } => {
                self.with_audio(|p| p.playback_failed(origin, &reason));
            }
            Action::MediaStateChanged { paused } => {
                self.with_audio(|p| p.media_state_changed(paused));
            }
            Action::MetadataLoaded { duration } => self.with_audio(|p| p.metadata_loaded(duration)),
            Action::TimeUpdate { current, duration } => {
                self.with_audio(|p| p.time_update(current, duration));
            }
            Action::ProgressClicked { offset_x, width } => {
                self.with_audio(|p| p.seek(offset_x, width));
            }
            Action::VolumeChanged(value) => self.with_audio(|p| p.set_volume(value)),
            Action::ClosePlayer => self.with_audio(AudioPlayer::close),
            Action::VisibilityChanged { hidden } => {
                self.with_audio(|p| p.visibility_changed(hidden));
            }

            Action::ScrollButtonClicked => {
                if !self.inventory.scroll_button {
                    return disabled("scroll");
                }
                let effect = resolve_scroll(
                    &self.host,
                    &self.config.scroll_targets,
                    self.config.scroll_fallback_offset_px,
                );
                self.emit("scroll", [effect]);
            }

            Action::ToggleMenu => {
                let Some(menu) = self.menu.as_mut() else {
                    return disabled("menu");
                };
                let effect = menu.toggle();
                self.emit("menu", [effect]);
            }
            Action::DocumentClicked { inside_menu } => {
                let Some(menu) = self.menu.as_mut() else {
                    return;
                };
                let effect = menu.document_clicked(inside_menu);
                self.emit("menu", effect);
            }

            Action::ImageIntersected(index) => {
                let Some(lazy) = self.lazy.as_mut() else {
                    return disabled("lazy");
                };
                let effect = lazy.intersected(index);
                self.emit("lazy", effect);
            }
        }
    }

    /// Advance the clock by `dt`, running every timer that comes due.
    pub fn advance_time(&mut self, dt: Duration) {
        let target = self.scheduler.now().saturating_add(dt);
        self.advance_to(target);
    }

    /// Advance the clock to `now`, running every timer due by then.
    pub fn advance_to(&mut self, now: Duration) {
        while let Some(fired) = self.scheduler.pop_due(now) {
            self.run_timer(fired);
        }
        self.scheduler.set_now(now);
    }

    /// Cancel every timer and stop accepting actions.
    pub fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }
        let cancelled = self.scheduler.cancel_all();
        self.auto_timer = None;
        self.phase = Phase::TornDown;
        tracing::info!(target: "pagectl", cancelled, "page torn down");
    }

    fn run_timer(&mut self, fired: Fired<TimerTask>) {
        match fired.task {
            TimerTask::AutoAdvance => {
                let Some(effect) = self.slider.as_mut().and_then(|s| s.apply(SlideNav::Auto)) else {
                    return;
                };
                self.emit("slider", [effect]);
            }
            TimerTask::SpawnBubble => {
                let Some(spawner) = self.bubbles.as_mut() else {
                    return;
                };
                let Some((id, effect)) = spawner.spawn(&mut self.rng) else {
                    return;
                };
                self.scheduler
                    .schedule_once(self.config.bubble_lifetime(), TimerTask::RemoveBubble(id));
                self.emit("bubbles", [effect]);
            }
            TimerTask::RemoveBubble(id) => {
                let Some(effect) = self.bubbles.as_mut().and_then(|b| b.remove(id)) else {
                    return;
                };
                self.emit("bubbles", [effect]);
            }
        }
    }

    fn navigate(&mut self, nav: SlideNav) {
        let Some(slider) = self.slider.as_mut() else {
            return disabled("slider");
        };
        let Some(effect) = slider.apply(nav) else {
            return;
        };
        self.emit("slider", [effect]);
        if nav.is_manual() {
            self.restart_auto_advance();
        }
    }

    /// Cancel the pending auto-advance and start a fresh full interval.
    fn restart_auto_advance(&mut self) {
        if let Some(id) = self.auto_timer.take() {
            self.scheduler.cancel(id);
        }
        let id = self
            .scheduler
            .schedule_every(self.config.auto_slide_interval(), TimerTask::AutoAdvance);
        tracing::trace!(target: "pagectl.slider", timer_id = id.get(), "auto-advance restarted");
        self.auto_timer = Some(id);
    }

    fn with_audio(&mut self, f: impl FnOnce(&mut AudioPlayer) -> Vec<Effect>) {
        let Some(player) = self.audio.as_mut() else {
            return disabled("audio");
        };
        let effects = f(player);
        self.emit("audio", effects);
    }

    /// Hand effects to the host; failures are logged and the rest still run.
    fn emit(&mut self, behavior: &'static str, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            if let Err(err) = self.host.apply(effect) {
                tracing::warn!(target: "pagectl", behavior, error = %err, "effect not applied");
            }
        }
    }

    // ===== Accessors =====

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn inventory(&self) -> PageInventory {
        self.inventory
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next timer is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.theme.as_ref().map(ThemeToggle::current)
    }

    #[must_use]
    pub fn slide_index(&self) -> Option<usize> {
        self.slider.as_ref().map(Slider::index)
    }

    #[must_use]
    pub fn auto_advance_timer(&self) -> Option<TimerId> {
        self.auto_timer
    }

    #[must_use]
    pub fn audio(&self) -> Option<&AudioPlayer> {
        self.audio.as_ref()
    }

    #[must_use]
    pub fn menu_open(&self) -> Option<bool> {
        self.menu.as_ref().map(MobileMenu::is_open)
    }

    #[must_use]
    pub fn live_bubbles(&self) -> usize {
        self.bubbles.as_ref().map_or(0, BubbleSpawner::live)
    }

    #[must_use]
    pub fn pending_images(&self) -> usize {
        self.lazy.as_ref().map_or(0, LazyImages::pending)
    }
}

fn disabled(behavior: &'static str) {
    tracing::debug!(target: "pagectl", behavior, "action ignored: behavior disabled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller(inventory: PageInventory) -> PageController<RecordingHost> {
        let mut page =
            PageController::with_seed(PageConfig::default(), inventory, RecordingHost::new(), 3);
        page.init();
        page
    }

    #[test]
    fn empty_page_initializes_nothing() {
        let page = controller(PageInventory::default());
        assert!(page.is_running());
        assert!(page.host().effects().is_empty());
        assert_eq!(page.pending_timers(), 0);
        assert_eq!(page.theme(), None);
        assert_eq!(page.slide_index(), None);
    }

    #[test]
    fn actions_for_missing_behaviors_are_ignored() {
        let mut page = controller(PageInventory::default());
        page.dispatch(Action::ToggleTheme);
        page.dispatch(Action::NextSlide);
        page.dispatch(Action::PlayPauseClicked);
        page.dispatch(Action::ToggleMenu);
        page.dispatch(Action::ScrollButtonClicked);
        page.dispatch(Action::ImageIntersected(0));
        assert!(page.host().effects().is_empty());
    }

    #[test]
    fn init_runs_once() {
        let mut page = controller(PageInventory::full(3, 0));
        let timers = page.pending_timers();
        let effects = page.host().effects().len();
        page.init();
        assert_eq!(page.pending_timers(), timers);
        assert_eq!(page.host().effects().len(), effects);
    }

    #[test]
    fn manual_navigation_replaces_auto_timer() {
        let mut page = controller(PageInventory::full(3, 0));
        let before = page.auto_advance_timer().unwrap();
        page.dispatch(Action::NextSlide);
        let after = page.auto_advance_timer().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn invalid_jump_keeps_timer() {
        let mut page = controller(PageInventory::full(3, 0));
        let before = page.auto_advance_timer();
        page.dispatch(Action::JumpToSlide(9));
        assert_eq!(page.auto_advance_timer(), before);
        assert_eq!(page.slide_index(), Some(0));
    }

    #[test]
    fn bubbles_front_load_then_follow_interval() {
        let inventory = PageInventory {
            bubble_container: true,
            ..PageInventory::default()
        };
        let mut page = controller(inventory);
        page.advance_time(ms(0));
        assert_eq!(page.live_bubbles(), 1);
        page.advance_time(ms(1200));
        assert_eq!(page.live_bubbles(), 5);
        page.advance_time(ms(800));
        assert_eq!(page.live_bubbles(), 6);
    }

    #[test]
    fn host_failures_do_not_stop_behaviors() {
        let mut page = controller(PageInventory::full(3, 0));
        page.host_mut().fail_apply(true);
        page.dispatch(Action::NextSlide);
        page.dispatch(Action::NextSlide);
        assert_eq!(page.slide_index(), Some(2));
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = PageConfig {
            auto_slide_interval_ms: 0,
            ..PageConfig::default()
        };
        let page =
            PageController::with_seed(config, PageInventory::default(), RecordingHost::new(), 1);
        assert_eq!(page.config(), &PageConfig::default());
    }

    #[test]
    fn actions_after_teardown_are_dropped() {
        let mut page = controller(PageInventory::full(3, 0));
        page.teardown();
        page.host_mut().take_effects();
        page.dispatch(Action::NextSlide);
        assert!(page.host().effects().is_empty());
        assert!(!page.is_running());
    }
}

//! Background audio transport.
//!
//! Playback start is asynchronous in browsers and may be refused by autoplay
//! policy, so starting is split in two: [`AudioPlayer::request_play`] emits
//! [`Effect::StartPlayback`], and the host reports the outcome back through
//! [`AudioPlayer::playback_started`] or [`AudioPlayer::playback_failed`].
//! Failures are never retried.
//!
//! The element can also stop or start on its own (track ended, media keys,
//! browser interventions). The host reports those through
//! [`AudioPlayer::media_state_changed`] so the transport always decides
//! play/pause from the element's real state.

use crate::action::{Effect, PlayIcon, PlayOrigin};

/// `m:ss` display for a playback position. Non-finite input shows `0:00`.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Progress fill in percent; 0 when the ratio is undefined.
#[must_use]
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    let percent = current / duration * 100.0;
    if percent.is_finite() { percent } else { 0.0 }
}

/// Map a click `offset_x` pixels into a track `width` pixels wide onto a
/// playback position.
///
/// Returns `(seconds, percent)` with the fraction clamped to `[0, 1]`, or
/// `None` when no finite position exists (zero-width track, unknown
/// duration).
#[must_use]
pub fn seek_position(offset_x: f64, width: f64, duration: f64) -> Option<(f64, f64)> {
    if !(width.is_finite() && width > 0.0) {
        return None;
    }
    let percent = (offset_x / width * 100.0).clamp(0.0, 100.0);
    let seconds = percent / 100.0 * duration;
    (percent.is_finite() && seconds.is_finite()).then_some((seconds, percent))
}

#[derive(Debug, Clone)]
pub struct AudioPlayer {
    playing: bool,
    /// A `play()` request is in flight.
    starting: bool,
    duration: f64,
    volume: f64,
    player_visible: bool,
    blocked_message: String,
}

impl AudioPlayer {
    #[must_use]
    pub fn new(volume: f64, blocked_message: impl Into<String>) -> Self {
        Self {
            playing: false,
            starting: false,
            duration: f64::NAN,
            volume: volume.clamp(0.0, 1.0),
            player_visible: false,
            blocked_message: blocked_message.into(),
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// True while a start request has not been answered yet.
    #[must_use]
    pub const fn is_starting(&self) -> bool {
        self.starting
    }

    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    #[must_use]
    pub const fn is_player_visible(&self) -> bool {
        self.player_visible
    }

    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::SetVolume(self.volume)]
    }

    pub fn request_play(&mut self, origin: PlayOrigin) -> Vec<Effect> {
        self.starting = true;
        vec![Effect::StartPlayback(origin)]
    }

    /// Play/pause button: start when paused, pause when playing or starting.
    pub fn toggle(&mut self) -> Vec<Effect> {
        if self.is_active() {
            self.pause()
        } else {
            self.request_play(PlayOrigin::Transport)
        }
    }

    pub fn playback_started(&mut self, origin: PlayOrigin) -> Vec<Effect> {
        self.starting = false;
        self.playing = true;
        let mut effects = vec![Effect::SetPlayIcon(PlayIcon::Pause)];
        if origin == PlayOrigin::Hero {
            effects.push(self.show_player(true));
        }
        effects
    }

    /// Log a refused start. Hero-button failures also reveal the player and
    /// tell the user to press play there.
    ///
    /// A rejection for a start that was already cancelled by a pause is the
    /// browser aborting `play()`; it is logged and otherwise ignored.
    pub fn playback_failed(&mut self, origin: PlayOrigin, reason: &str) -> Vec<Effect> {
        let was_starting = std::mem::take(&mut self.starting);
        self.playing = false;
        if !was_starting {
            tracing::debug!(
                target: "pagectl.audio",
                origin = ?origin,
                reason = %reason,
                "start request superseded by pause"
            );
            return Vec::new();
        }
        tracing::warn!(
            target: "pagectl.audio",
            origin = ?origin,
            reason = %reason,
            "playback start failed"
        );
        match origin {
            PlayOrigin::Hero => vec![
                self.show_player(true),
                Effect::Alert(self.blocked_message.clone()),
            ],
            PlayOrigin::Transport => Vec::new(),
        }
    }

    pub fn metadata_loaded(&mut self, duration: f64) -> Vec<Effect> {
        self.duration = duration;
        vec![Effect::SetDurationText(format_time(duration))]
    }

    pub fn time_update(&mut self, current: f64, duration: f64) -> Vec<Effect> {
        if duration.is_finite() {
            self.duration = duration;
        }
        vec![
            Effect::SetProgress(progress_percent(current, duration)),
            Effect::SetCurrentTimeText(format_time(current)),
        ]
    }

    pub fn seek(&mut self, offset_x: f64, width: f64) -> Vec<Effect> {
        match seek_position(offset_x, width, self.duration) {
            Some((seconds, percent)) => vec![Effect::SeekTo(seconds), Effect::SetProgress(percent)],
            None => {
                tracing::debug!(
                    target: "pagectl.audio",
                    offset_x,
                    width,
                    duration = self.duration,
                    "seek ignored: no finite position"
                );
                Vec::new()
            }
        }
    }

    pub fn set_volume(&mut self, value: f64) -> Vec<Effect> {
        if !value.is_finite() {
            tracing::warn!(target: "pagectl.audio", value, "ignoring non-numeric volume");
            return Vec::new();
        }
        self.volume = value.clamp(0.0, 1.0);
        vec![Effect::SetVolume(self.volume)]
    }

    /// Hide the panel, pausing first if needed.
    pub fn close(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.show_player(false)];
        if self.is_active() {
            effects.extend(self.pause());
        }
        effects
    }

    /// Pause when the page is hidden. Becoming visible again does not resume.
    pub fn visibility_changed(&mut self, hidden: bool) -> Vec<Effect> {
        if hidden && self.is_active() {
            self.pause()
        } else {
            Vec::new()
        }
    }

    /// The element paused, ended or started playing without being asked to.
    ///
    /// Only a change of state touches the icon. A `play` event while a start
    /// request is in flight leaves the request pending so its outcome is
    /// still handled.
    pub fn media_state_changed(&mut self, paused: bool) -> Vec<Effect> {
        if paused {
            self.starting = false;
        }
        let playing = !paused;
        if self.playing == playing {
            return Vec::new();
        }
        self.playing = playing;
        tracing::debug!(target: "pagectl.audio", playing, "transport resynced from element");
        let icon = if playing { PlayIcon::Pause } else { PlayIcon::Play };
        vec![Effect::SetPlayIcon(icon)]
    }

    fn is_active(&self) -> bool {
        self.playing || self.starting
    }

    fn pause(&mut self) -> Vec<Effect> {
        self.playing = false;
        self.starting = false;
        vec![Effect::PausePlayback, Effect::SetPlayIcon(PlayIcon::Play)]
    }

    fn show_player(&mut self, visible: bool) -> Effect {
        self.player_visible = visible;
        Effect::ShowPlayer(visible)
    }
}

//! Messages into the controller and commands out of it.
//!
//! DOM listeners translate browser events into [`Action`]s; every state
//! change comes back as one or more [`Effect`]s for the host to apply. The
//! split mirrors an Elm-style update loop: the controller never reaches into
//! the document itself.

use crate::bubbles::{BubbleId, BubbleSpec};
use crate::theme::Theme;

/// Which control asked for playback to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrigin {
    /// The call-to-action button in the page hero.
    Hero,
    /// The play/pause button inside the player panel.
    Transport,
}

/// Icon shown on the player's play/pause button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
}

impl PlayIcon {
    /// Icon-font class for this glyph.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Play => "fa-play",
            Self::Pause => "fa-pause",
        }
    }

    /// The class this glyph replaces.
    #[must_use]
    pub const fn other_class(self) -> &'static str {
        match self {
            Self::Play => "fa-pause",
            Self::Pause => "fa-play",
        }
    }
}

/// A logical user or browser event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ToggleTheme,

    NextSlide,
    PrevSlide,
    JumpToSlide(usize),

    /// Hero "play music" button.
    HeroPlayClicked,
    /// Player play/pause button.
    PlayPauseClicked,
    /// The host's `play()` request resolved.
    PlaybackStarted(PlayOrigin),
    /// The host's `play()` request was rejected.
    PlaybackFailed { origin: PlayOrigin, reason: String },
    /// The audio element paused, ended or started playing; `paused` is its
    /// state after the event.
    MediaStateChanged { paused: bool },
    MetadataLoaded { duration: f64 },
    TimeUpdate { current: f64, duration: f64 },
    /// Click on the progress track, `offset_x` pixels from its left edge.
    ProgressClicked { offset_x: f64, width: f64 },
    VolumeChanged(f64),
    ClosePlayer,
    VisibilityChanged { hidden: bool },

    ScrollButtonClicked,

    ToggleMenu,
    /// Any click in the document; `inside_menu` is true when the target lies
    /// within the menu toggle or the menu panel.
    DocumentClicked { inside_menu: bool },

    /// Lazy image `index` entered the viewport.
    ImageIntersected(usize),
}

/// A DOM mutation or host request produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Body mode class and toggle icon for `Theme`.
    ApplyTheme(Theme),

    /// Track transform and dot markers for the active slide.
    ShowSlide { index: usize, count: usize },

    SetVolume(f64),
    /// Ask the audio element to play; the host answers with
    /// [`Action::PlaybackStarted`] or [`Action::PlaybackFailed`].
    StartPlayback(PlayOrigin),
    PausePlayback,
    SetPlayIcon(PlayIcon),
    ShowPlayer(bool),
    /// Progress fill width, in percent.
    SetProgress(f64),
    SetCurrentTimeText(String),
    SetDurationText(String),
    /// Move the playhead to the given position, in seconds.
    SeekTo(f64),
    /// Blocking notification.
    Alert(String),

    SpawnBubble { id: BubbleId, spec: BubbleSpec },
    RemoveBubble(BubbleId),

    /// Smooth-scroll the first element matching `selector` into view.
    ScrollIntoView { selector: String },
    /// Smooth-scroll the window down by `top` pixels.
    ScrollBy { top: f64 },

    SetMenuOpen(bool),

    /// Start observing every deferred image.
    ObserveLazyImages,
    /// Copy `data-src` into `src` for image `index` and stop observing it.
    LoadImage(usize),
}

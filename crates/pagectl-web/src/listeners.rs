//! DOM event wiring.
//!
//! Each listener maps a browser event to at most one [`Action`] and hands it
//! to the page. Listeners hold the page weakly; the page owns the listeners
//! and drops them on teardown.

use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use pagectl_core::Action;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, MouseEvent, Node, Window};

use crate::dom;
use crate::host::Elements;
use crate::page::Page;

fn deliver(page: &Weak<Page>, action: Action) {
    if let Some(page) = page.upgrade() {
        page.dispatch(action);
    }
}

/// Listen for `event` and dispatch whatever `to_action` yields.
fn on<F>(
    page: &Rc<Page>,
    target: &EventTarget,
    event: &'static str,
    to_action: F,
) -> EventListener
where
    F: Fn(&Event) -> Option<Action> + 'static,
{
    let page = Rc::downgrade(page);
    EventListener::new(target, event, move |event| {
        if let Some(action) = to_action(event) {
            deliver(&page, action);
        }
    })
}

/// Click that replaces the default navigation with `action`.
fn on_click(page: &Rc<Page>, target: &Element, action: Action) -> EventListener {
    let page = Rc::downgrade(page);
    EventListener::new_with_options(
        target,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            event.prevent_default();
            deliver(&page, action.clone());
        },
    )
}

fn contains(container: &Element, target: Option<&Node>) -> bool {
    container.contains(target)
}

pub(crate) fn wire(
    page: &Rc<Page>,
    window: &Window,
    document: &Document,
    elements: &Elements,
) -> Vec<EventListener> {
    let mut listeners = Vec::new();
    let inventory = elements.inventory();

    if inventory.theme_toggle {
        if let Some(toggle) = &elements.theme_toggle {
            listeners.push(on_click(page, toggle, Action::ToggleTheme));
        }
    }

    if inventory.slide_count > 0 {
        if let Some(next) = &elements.next_slide {
            listeners.push(on_click(page, next, Action::NextSlide));
        }
        if let Some(prev) = &elements.prev_slide {
            listeners.push(on_click(page, prev, Action::PrevSlide));
        }
        for (index, dot) in elements.dots.iter().enumerate() {
            listeners.push(on_click(page, dot, Action::JumpToSlide(index)));
        }
    }

    if let Some(audio) = &elements.audio {
        wire_audio(page, audio, document, elements, &mut listeners);
    }

    if let Some(button) = &elements.scroll_button {
        listeners.push(on_click(page, button, Action::ScrollButtonClicked));
    }

    if let (Some(toggle), Some(menu)) = (&elements.menu_toggle, &elements.mobile_menu) {
        listeners.push(on_click(page, toggle, Action::ToggleMenu));
        let (toggle, menu) = (toggle.clone(), menu.clone());
        listeners.push(on(page, document, "click", move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let target = target.as_ref();
            let inside_menu = contains(&toggle, target) || contains(&menu, target);
            Some(Action::DocumentClicked { inside_menu })
        }));
    }

    let unload = Rc::downgrade(page);
    listeners.push(EventListener::new(window, "beforeunload", move |_| {
        if let Some(page) = unload.upgrade() {
            page.teardown();
        }
    }));

    tracing::debug!(target: "pagectl.web", listeners = listeners.len(), "listeners attached");
    listeners
}

fn wire_audio(
    page: &Rc<Page>,
    audio: &web_sys::HtmlAudioElement,
    document: &Document,
    elements: &Elements,
    listeners: &mut Vec<EventListener>,
) {
    if let Some(hero) = &elements.hero_play {
        listeners.push(on_click(page, hero, Action::HeroPlayClicked));
    }
    if let (Some(button), Some(_)) = (&elements.play_pause, &elements.play_icon) {
        listeners.push(on_click(page, button, Action::PlayPauseClicked));
    }
    if let (Some(close), Some(_)) = (&elements.close_player, &elements.music_player) {
        listeners.push(on(page, close, "click", |_| Some(Action::ClosePlayer)));
    }

    for event in ["play", "pause"] {
        let media = audio.clone();
        listeners.push(on(page, audio, event, move |_| {
            Some(Action::MediaStateChanged {
                paused: media.paused(),
            })
        }));
    }
    listeners.push(on(page, audio, "ended", |_| {
        Some(Action::MediaStateChanged { paused: true })
    }));

    let media = audio.clone();
    listeners.push(on(page, audio, "loadedmetadata", move |_| {
        Some(Action::MetadataLoaded {
            duration: media.duration(),
        })
    }));

    if let (Some(_), Some(track)) = (&elements.progress, &elements.progress_bar) {
        let media = audio.clone();
        listeners.push(on(page, audio, "timeupdate", move |_| {
            Some(Action::TimeUpdate {
                current: media.current_time(),
                duration: media.duration(),
            })
        }));

        let bounds = track.clone();
        listeners.push(on(page, track, "click", move |event| {
            let event = event.dyn_ref::<MouseEvent>()?;
            let rect = bounds.get_bounding_client_rect();
            Some(Action::ProgressClicked {
                offset_x: dom::click_offset(event.client_x(), rect.left()),
                width: rect.width(),
            })
        }));
    }

    if let Some(slider) = &elements.volume_slider {
        let input = slider.clone();
        listeners.push(on(page, slider, "input", move |_| {
            let value = input.value();
            let volume = dom::parse_volume(&value);
            if volume.is_none() {
                tracing::debug!(target: "pagectl.web", value = %value, "volume input is not a number");
            }
            volume.map(Action::VolumeChanged)
        }));
    }

    let doc = document.clone();
    listeners.push(on(page, document, "visibilitychange", move |_| {
        Some(Action::VisibilityChanged {
            hidden: doc.hidden(),
        })
    }));
}

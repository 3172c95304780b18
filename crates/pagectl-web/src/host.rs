//! `PageHost` on top of `web-sys`.
//!
//! [`Elements`] is the one-time probe of the document. [`DomHost`] applies
//! controller effects to those elements and reports asynchronous outcomes
//! (audio `play()` promises, image intersections) back to the page as
//! actions, always outside the controller borrow.

use std::collections::HashMap;
use std::rc::Weak;

use js_sys::Array;
use pagectl_core::action::{Effect, PlayOrigin};
use pagectl_core::bubbles::{BubbleId, BubbleSpec};
use pagectl_core::menu::menu_icon_class;
use pagectl_core::slider::{dot_markers, track_transform};
use pagectl_core::{Action, PageError, PageHost, PageInventory, Result, Theme};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, HtmlAudioElement, HtmlElement, HtmlImageElement, HtmlInputElement,
    IntersectionObserver, IntersectionObserverEntry, Node, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Storage, Window,
};

use crate::dom::{self, ids};
use crate::page::Page;

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(err.name()), String::from(err.message()));
    }
    format!("{value:?}")
}

fn js_err(op: &'static str) -> impl FnOnce(JsValue) -> PageError {
    move |value| PageError::host(op, describe(&value))
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn select_all<T: JsCast>(document: &Document, selector: &str) -> Vec<T> {
    let list = match document.query_selector_all(selector) {
        Ok(list) => list,
        Err(err) => {
            tracing::warn!(target: "pagectl.web", selector, error = %describe(&err), "selector failed");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

fn inner_icon(parent: Option<&Element>) -> Option<Element> {
    parent?.query_selector(dom::ICON_SELECTOR).ok().flatten()
}

fn require<'a, T>(element: Option<&'a T>, id: &str) -> Result<&'a T> {
    element.ok_or_else(|| PageError::missing(id))
}

fn swap_class(element: &Element, remove: &str, add: &str) -> Result<()> {
    let classes = element.class_list();
    classes.remove_1(remove).map_err(js_err("classList.remove"))?;
    classes.add_1(add).map_err(js_err("classList.add"))
}

fn set_style(element: &HtmlElement, property: &str, value: &str) -> Result<()> {
    element
        .style()
        .set_property(property, value)
        .map_err(js_err("style.setProperty"))
}

/// Page elements, looked up once when the page mounts.
#[derive(Clone)]
pub(crate) struct Elements {
    pub(crate) body: Option<HtmlElement>,
    pub(crate) theme_toggle: Option<Element>,
    pub(crate) theme_icon: Option<Element>,
    pub(crate) slider: Option<HtmlElement>,
    pub(crate) slide_count: usize,
    pub(crate) prev_slide: Option<Element>,
    pub(crate) next_slide: Option<Element>,
    pub(crate) dots: Vec<Element>,
    pub(crate) audio: Option<HtmlAudioElement>,
    pub(crate) play_pause: Option<Element>,
    pub(crate) play_icon: Option<Element>,
    pub(crate) progress: Option<HtmlElement>,
    pub(crate) progress_bar: Option<Element>,
    pub(crate) hero_play: Option<Element>,
    pub(crate) volume_slider: Option<HtmlInputElement>,
    pub(crate) close_player: Option<Element>,
    pub(crate) music_player: Option<HtmlElement>,
    pub(crate) current_time: Option<Element>,
    pub(crate) duration: Option<Element>,
    pub(crate) bubble_container: Option<Element>,
    pub(crate) scroll_button: Option<Element>,
    pub(crate) menu_toggle: Option<Element>,
    pub(crate) menu_icon: Option<Element>,
    pub(crate) mobile_menu: Option<Element>,
    pub(crate) lazy_images: Vec<HtmlImageElement>,
}

impl Elements {
    pub(crate) fn probe(document: &Document) -> Self {
        let theme_toggle: Option<Element> = by_id(document, ids::THEME_TOGGLE);
        let menu_toggle: Option<Element> = by_id(document, ids::MENU_TOGGLE);
        Self {
            body: document.body(),
            theme_icon: inner_icon(theme_toggle.as_ref()),
            theme_toggle,
            slider: by_id(document, ids::SLIDER),
            slide_count: select_all::<Element>(document, dom::SLIDE_SELECTOR).len(),
            prev_slide: by_id(document, ids::PREV_SLIDE),
            next_slide: by_id(document, ids::NEXT_SLIDE),
            dots: select_all(document, dom::DOT_SELECTOR),
            audio: by_id(document, ids::AUDIO),
            play_pause: by_id(document, ids::PLAY_PAUSE),
            play_icon: by_id(document, ids::PLAY_ICON),
            progress: by_id(document, ids::PROGRESS),
            progress_bar: by_id(document, ids::PROGRESS_BAR),
            hero_play: by_id(document, ids::HERO_PLAY),
            volume_slider: by_id(document, ids::VOLUME_SLIDER),
            close_player: by_id(document, ids::CLOSE_PLAYER),
            music_player: by_id(document, ids::MUSIC_PLAYER),
            current_time: by_id(document, ids::CURRENT_TIME),
            duration: by_id(document, ids::DURATION),
            bubble_container: by_id(document, ids::BUBBLE_CONTAINER),
            scroll_button: by_id(document, ids::SCROLL_BUTTON),
            menu_icon: inner_icon(menu_toggle.as_ref()),
            menu_toggle,
            mobile_menu: by_id(document, ids::MOBILE_MENU),
            lazy_images: select_all(document, dom::LAZY_IMAGE_SELECTOR),
        }
    }

    pub(crate) fn inventory(&self) -> PageInventory {
        PageInventory {
            theme_toggle: self.theme_toggle.is_some()
                && self.theme_icon.is_some()
                && self.body.is_some(),
            slide_count: if self.slider.is_some() {
                self.slide_count
            } else {
                0
            },
            dot_count: self.dots.len(),
            audio: self.audio.is_some(),
            bubble_container: self.bubble_container.is_some(),
            scroll_button: self.scroll_button.is_some(),
            mobile_menu: self.menu_toggle.is_some() && self.mobile_menu.is_some(),
            lazy_image_count: self.lazy_images.len(),
        }
    }
}

struct LazyObserver {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

pub(crate) struct DomHost {
    window: Window,
    document: Document,
    elements: Elements,
    bubbles: HashMap<BubbleId, Element>,
    observer: Option<LazyObserver>,
    page: Weak<Page>,
}

impl DomHost {
    pub(crate) fn new(window: Window, document: Document, elements: Elements, page: Weak<Page>) -> Self {
        Self {
            window,
            document,
            elements,
            bubbles: HashMap::new(),
            observer: None,
            page,
        }
    }

    /// Stop observing images and drop live bubbles.
    pub(crate) fn shutdown(&mut self) {
        if let Some(lazy) = self.observer.take() {
            lazy.observer.disconnect();
        }
        for (_, bubble) in self.bubbles.drain() {
            bubble.remove();
        }
    }

    fn storage(&self) -> Result<Storage> {
        self.window
            .local_storage()
            .map_err(|err| PageError::storage(describe(&err)))?
            .ok_or_else(|| PageError::storage("localStorage is not available"))
    }

    /// Deliver an action after the current controller step finishes.
    fn defer(&self, action: Action) {
        let page = self.page.clone();
        spawn_local(async move {
            if let Some(page) = page.upgrade() {
                page.dispatch(action);
            }
        });
    }

    fn audio(&self) -> Result<&HtmlAudioElement> {
        require(self.elements.audio.as_ref(), ids::AUDIO)
    }

    fn apply_theme(&self, theme: Theme) -> Result<()> {
        let body = require(self.elements.body.as_ref(), "body")?;
        swap_class(body, theme.toggled().body_class(), theme.body_class())?;
        if let Some(icon) = &self.elements.theme_icon {
            swap_class(icon, theme.toggled().icon_class(), theme.icon_class())?;
        }
        Ok(())
    }

    fn show_slide(&self, index: usize) -> Result<()> {
        let slider = require(self.elements.slider.as_ref(), ids::SLIDER)?;
        set_style(slider, "transform", &track_transform(index))?;
        let markers = dot_markers(index, self.elements.dots.len());
        for (dot, active) in self.elements.dots.iter().zip(markers) {
            dot.class_list()
                .toggle_with_force(dom::ACTIVE_CLASS, active)
                .map_err(js_err("classList.toggle"))?;
            if active {
                dot.set_attribute(dom::ARIA_CURRENT, "true")
                    .map_err(js_err("setAttribute"))?;
            } else {
                dot.remove_attribute(dom::ARIA_CURRENT)
                    .map_err(js_err("removeAttribute"))?;
            }
        }
        Ok(())
    }

    fn start_playback(&self, origin: PlayOrigin) -> Result<()> {
        let promise = match self.audio()?.play() {
            Ok(promise) => promise,
            Err(err) => {
                self.defer(Action::PlaybackFailed {
                    origin,
                    reason: describe(&err),
                });
                return Ok(());
            }
        };
        let page = self.page.clone();
        spawn_local(async move {
            let action = match JsFuture::from(promise).await {
                Ok(_) => Action::PlaybackStarted(origin),
                Err(err) => Action::PlaybackFailed {
                    origin,
                    reason: describe(&err),
                },
            };
            if let Some(page) = page.upgrade() {
                page.dispatch(action);
            }
        });
        Ok(())
    }

    fn spawn_bubble(&mut self, id: BubbleId, spec: &BubbleSpec) -> Result<()> {
        let container = require(self.elements.bubble_container.as_ref(), ids::BUBBLE_CONTAINER)?;
        let bubble: HtmlElement = self
            .document
            .create_element("div")
            .map_err(js_err("createElement"))?
            .dyn_into()
            .map_err(|_| PageError::host("createElement", "div is not an HtmlElement"))?;
        bubble.set_class_name(dom::BUBBLE_CLASS);
        bubble
            .set_attribute(dom::ARIA_HIDDEN, "true")
            .map_err(js_err("setAttribute"))?;
        bubble.set_text_content(Some(&spec.emoji));
        for (property, value) in spec.style_properties() {
            set_style(&bubble, property, &value)?;
        }
        container
            .append_child(&bubble)
            .map_err(js_err("appendChild"))?;
        self.bubbles.insert(id, bubble.into());
        Ok(())
    }

    fn scroll_into_view(&self, selector: &str) -> Result<()> {
        let target = self
            .document
            .query_selector(selector)
            .map_err(|_| PageError::Selector {
                selector: selector.to_string(),
            })?
            .ok_or_else(|| PageError::missing(selector))?;
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        target.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn scroll_by(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_by_with_scroll_to_options(&options);
    }

    fn set_menu_open(&self, open: bool) -> Result<()> {
        let menu = require(self.elements.mobile_menu.as_ref(), ids::MOBILE_MENU)?;
        menu.class_list()
            .toggle_with_force(dom::ACTIVE_CLASS, open)
            .map_err(js_err("classList.toggle"))?;
        if let Some(icon) = &self.elements.menu_icon {
            swap_class(icon, menu_icon_class(!open), menu_icon_class(open))?;
        }
        Ok(())
    }

    fn observe_lazy_images(&mut self) -> Result<()> {
        let images = self.elements.lazy_images.clone();
        let page = self.page.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let Some(page) = page.upgrade() else {
                    return;
                };
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    let target: &Node = target.as_ref();
                    if let Some(index) = images.iter().position(|img| img.is_same_node(Some(target))) {
                        page.dispatch(Action::ImageIntersected(index));
                    }
                }
            },
        );
        let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())
            .map_err(js_err("IntersectionObserver"))?;
        for image in &self.elements.lazy_images {
            observer.observe(image);
        }
        self.observer = Some(LazyObserver {
            observer,
            _callback: callback,
        });
        Ok(())
    }

    fn load_image(&self, index: usize) -> Result<()> {
        let image = self
            .elements
            .lazy_images
            .get(index)
            .ok_or_else(|| PageError::missing(format!("img[data-src] #{index}")))?;
        if let Some(src) = image.get_attribute(dom::DATA_SRC) {
            image.set_src(&src);
            image
                .remove_attribute(dom::DATA_SRC)
                .map_err(js_err("removeAttribute"))?;
        }
        if let Some(lazy) = &self.observer {
            lazy.observer.unobserve(image);
        }
        Ok(())
    }
}

impl PageHost for DomHost {
    fn load_preference(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|err| PageError::storage(describe(&err)))
    }

    fn store_preference(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| PageError::storage(describe(&err)))
    }

    fn selector_matches(&self, selector: &str) -> Result<bool> {
        self.document
            .query_selector(selector)
            .map(|found| found.is_some())
            .map_err(|_| PageError::Selector {
                selector: selector.to_string(),
            })
    }

    fn apply(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::ApplyTheme(theme) => self.apply_theme(theme),
            Effect::ShowSlide { index, .. } => self.show_slide(index),
            Effect::SetVolume(volume) => {
                self.audio()?.set_volume(volume);
                Ok(())
            }
            Effect::StartPlayback(origin) => self.start_playback(origin),
            Effect::PausePlayback => self.audio()?.pause().map_err(js_err("audio.pause")),
            Effect::SetPlayIcon(icon) => match &self.elements.play_icon {
                Some(el) => swap_class(el, icon.other_class(), icon.class()),
                None => Ok(()),
            },
            Effect::ShowPlayer(visible) => match &self.elements.music_player {
                Some(player) => set_style(player, "display", dom::player_display(visible)),
                None => Ok(()),
            },
            Effect::SetProgress(percent) => match &self.elements.progress {
                Some(progress) => set_style(progress, "width", &dom::percent_width(percent)),
                None => Ok(()),
            },
            Effect::SetCurrentTimeText(text) => {
                if let Some(el) = &self.elements.current_time {
                    el.set_text_content(Some(&text));
                }
                Ok(())
            }
            Effect::SetDurationText(text) => {
                if let Some(el) = &self.elements.duration {
                    el.set_text_content(Some(&text));
                }
                Ok(())
            }
            Effect::SeekTo(seconds) => {
                self.audio()?.set_current_time(seconds);
                Ok(())
            }
            Effect::Alert(message) => self
                .window
                .alert_with_message(&message)
                .map_err(js_err("alert")),
            Effect::SpawnBubble { id, spec } => self.spawn_bubble(id, &spec),
            Effect::RemoveBubble(id) => {
                if let Some(bubble) = self.bubbles.remove(&id) {
                    bubble.remove();
                }
                Ok(())
            }
            Effect::ScrollIntoView { selector } => self.scroll_into_view(&selector),
            Effect::ScrollBy { top } => {
                self.scroll_by(top);
                Ok(())
            }
            Effect::SetMenuOpen(open) => self.set_menu_open(open),
            Effect::ObserveLazyImages => self.observe_lazy_images(),
            Effect::LoadImage(index) => self.load_image(index),
        }
    }
}

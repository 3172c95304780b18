//! The mounted page: controller, timer pump and listeners.
//!
//! Every entry point (listener, timer, promise callback) runs one
//! run-to-completion step: advance the controller clock to real elapsed
//! time, feed the action, then re-arm the single pump timeout for the next
//! deadline.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use pagectl_core::{Action, PageConfig, PageController, Theme};
use web_sys::{Document, Window};
use web_time::{Duration, Instant};

use crate::host::{DomHost, Elements};
use crate::listeners;

pub(crate) struct Page {
    window: Window,
    document: Document,
    elements: Elements,
    controller: RefCell<PageController<DomHost>>,
    epoch: Instant,
    pump: RefCell<Option<Timeout>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl Page {
    /// Probe the document and build the controller. Nothing runs until
    /// [`Page::start`].
    pub(crate) fn mount(window: Window, document: Document, config: PageConfig) -> Rc<Self> {
        let elements = Elements::probe(&document);
        let inventory = elements.inventory();
        tracing::debug!(target: "pagectl.web", ?inventory, "document probed");
        Rc::new_cyclic(|weak| {
            let host = DomHost::new(
                window.clone(),
                document.clone(),
                elements.clone(),
                weak.clone(),
            );
            Self {
                window,
                document,
                elements,
                controller: RefCell::new(PageController::new(config, inventory, host)),
                epoch: Instant::now(),
                pump: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }
        })
    }

    pub(crate) fn start(self: &Rc<Self>) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.init(),
            Err(_) => {
                tracing::warn!(target: "pagectl.web", "controller busy during start");
                return;
            }
        }
        let wired = listeners::wire(self, &self.window, &self.document, &self.elements);
        *self.listeners.borrow_mut() = wired;
        self.rearm();
    }

    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Run one action through the controller.
    pub(crate) fn dispatch(self: &Rc<Self>, action: Action) {
        {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                tracing::warn!(target: "pagectl.web", ?action, "re-entrant dispatch dropped");
                return;
            };
            controller.advance_to(self.elapsed());
            controller.dispatch(action);
        }
        self.rearm();
    }

    fn tick(self: &Rc<Self>) {
        self.pump.borrow_mut().take();
        {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                tracing::warn!(target: "pagectl.web", "timer fired while controller busy");
                return;
            };
            controller.advance_to(self.elapsed());
        }
        self.rearm();
    }

    /// Keep exactly one timeout armed for the controller's next deadline.
    fn rearm(self: &Rc<Self>) {
        let deadline = match self.controller.try_borrow() {
            Ok(controller) if controller.is_running() => controller.next_deadline(),
            _ => None,
        };
        let timeout = deadline.map(|deadline| {
            let delay = deadline.saturating_sub(self.elapsed());
            // Round up so the timeout never fires before the deadline.
            let millis = u32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(u32::MAX);
            let page = Rc::downgrade(self);
            Timeout::new(millis, move || {
                if let Some(page) = page.upgrade() {
                    page.tick();
                }
            })
        });
        *self.pump.borrow_mut() = timeout;
    }

    /// Cancel every timer, drop listeners and stop observing images.
    pub(crate) fn teardown(&self) {
        {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                tracing::warn!(target: "pagectl.web", "controller busy during teardown");
                return;
            };
            controller.teardown();
            controller.host_mut().shutdown();
        }
        self.pump.borrow_mut().take();
        self.listeners.borrow_mut().clear();
    }

    pub(crate) fn theme(&self) -> Option<Theme> {
        self.controller.try_borrow().ok()?.theme()
    }

    pub(crate) fn slide_index(&self) -> Option<usize> {
        self.controller.try_borrow().ok()?.slide_index()
    }

    pub(crate) fn config(&self) -> Option<PageConfig> {
        Some(self.controller.try_borrow().ok()?.config().clone())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pagectl_core::{Action, PageConfig};
    use pretty_assertions::assert_eq;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
    use web_sys::{Element, HtmlElement};
    use web_time::Duration;

    use super::Page;
    use crate::dom::{self, ids};

    wasm_bindgen_test_configure!(run_in_browser);

    const PIXEL: &str = "data:image/gif;base64,R0lGODlhAQABAAAAACw=";

    fn fixture_markup() -> String {
        format!(
            r#"
            <button id="{theme}"><i class="fas fa-moon"></i></button>
            <div id="{slider}">
                <div class="slide"></div><div class="slide"></div><div class="slide"></div>
            </div>
            <span class="dot active"></span><span class="dot"></span><span class="dot"></span>
            <audio id="{audio}"></audio>
            <button id="{play_pause}"><i id="{play_icon}" class="fas fa-play"></i></button>
            <div id="{bubbles}"></div>
            <button id="{menu_toggle}"><i class="fas fa-bars"></i></button>
            <nav id="{menu}"></nav>
            <img data-src="{PIXEL}" alt="">
            "#,
            theme = ids::THEME_TOGGLE,
            slider = ids::SLIDER,
            audio = ids::AUDIO,
            play_pause = ids::PLAY_PAUSE,
            play_icon = ids::PLAY_ICON,
            bubbles = ids::BUBBLE_CONTAINER,
            menu_toggle = ids::MENU_TOGGLE,
            menu = ids::MOBILE_MENU,
        )
    }

    struct Fixture {
        page: Rc<Page>,
        root: Element,
    }

    impl Fixture {
        fn mount(config: PageConfig) -> Self {
            let window = web_sys::window().expect("browser window");
            let document = window.document().expect("browser document");
            if let Ok(Some(storage)) = window.local_storage() {
                let _ = storage.remove_item(&config.theme_storage_key);
            }
            let root = document.create_element("div").expect("create fixture root");
            root.set_inner_html(&fixture_markup());
            document
                .body()
                .expect("document has a body")
                .append_child(&root)
                .expect("attach fixture");

            let page = Page::mount(window, document, config);
            page.start();
            Self { page, root }
        }

        fn find(&self, selector: &str) -> Element {
            self.root
                .query_selector(selector)
                .expect("valid selector")
                .unwrap_or_else(|| panic!("fixture has {selector}"))
        }

        fn find_all(&self, selector: &str) -> Vec<Element> {
            let list = self.root.query_selector_all(selector).expect("valid selector");
            (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect()
        }

        fn body(&self) -> HtmlElement {
            self.page.document.body().expect("document has a body")
        }

        fn advance(&self, ms: u64) {
            self.page
                .controller
                .borrow_mut()
                .advance_time(Duration::from_millis(ms));
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            self.page.teardown();
            self.root.remove();
            let _ = self.body().class_list().remove_2("light-mode", "dark-mode");
        }
    }

    fn has_class(element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    #[wasm_bindgen_test]
    fn theme_toggle_swaps_body_mode_and_icon() {
        let fixture = Fixture::mount(PageConfig::default());
        let body = fixture.body();
        let icon = fixture.find(&format!("#{} i", ids::THEME_TOGGLE));
        assert!(has_class(&body, "light-mode"));
        assert!(has_class(&icon, "fa-moon"));

        fixture.page.dispatch(Action::ToggleTheme);
        assert!(has_class(&body, "dark-mode"));
        assert!(!has_class(&body, "light-mode"));
        assert!(has_class(&icon, "fa-sun"));
        assert!(!has_class(&icon, "fa-moon"));
    }

    #[wasm_bindgen_test]
    fn only_the_selected_dot_is_marked() {
        let fixture = Fixture::mount(PageConfig::default());
        fixture.page.dispatch(Action::JumpToSlide(2));

        let dots = fixture.find_all(dom::DOT_SELECTOR);
        let active: Vec<bool> = dots.iter().map(|d| has_class(d, dom::ACTIVE_CLASS)).collect();
        let current: Vec<Option<String>> = dots
            .iter()
            .map(|d| d.get_attribute(dom::ARIA_CURRENT))
            .collect();
        assert_eq!(active, vec![false, false, true]);
        assert_eq!(current, vec![None, None, Some("true".to_string())]);

        let slider: HtmlElement = fixture
            .find(&format!("#{}", ids::SLIDER))
            .dyn_into()
            .expect("slider is an HtmlElement");
        assert_eq!(
            slider.style().get_property_value("transform").ok().as_deref(),
            Some("translateX(-200%)")
        );
    }

    #[wasm_bindgen_test]
    fn expired_bubbles_leave_the_container() {
        let config = PageConfig {
            initial_bubbles: 1,
            bubble_interval_ms: 60_000,
            bubble_lifetime_ms: 100,
            ..PageConfig::default()
        };
        let fixture = Fixture::mount(config);
        let container = fixture.find(&format!("#{}", ids::BUBBLE_CONTAINER));

        fixture.advance(0);
        assert_eq!(container.child_element_count(), 1);
        let bubble = container.first_element_child().expect("bubble node");
        assert!(has_class(&bubble, dom::BUBBLE_CLASS));
        assert_eq!(bubble.get_attribute(dom::ARIA_HIDDEN).as_deref(), Some("true"));

        fixture.advance(100);
        assert_eq!(container.child_element_count(), 0);
    }

    #[wasm_bindgen_test]
    fn teardown_removes_live_bubbles() {
        let fixture = Fixture::mount(PageConfig::default());
        let container = fixture.find(&format!("#{}", ids::BUBBLE_CONTAINER));
        fixture.advance(600);
        assert_eq!(container.child_element_count(), 3);
        fixture.page.teardown();
        assert_eq!(container.child_element_count(), 0);
    }

    #[wasm_bindgen_test]
    fn intersected_image_swaps_data_src_into_src() {
        let fixture = Fixture::mount(PageConfig::default());
        let image = fixture.find("img");
        fixture.page.dispatch(Action::ImageIntersected(0));
        assert_eq!(image.get_attribute("src").as_deref(), Some(PIXEL));
        assert!(!image.has_attribute(dom::DATA_SRC));
    }

    #[wasm_bindgen_test]
    fn menu_toggle_marks_panel_and_swaps_icon() {
        let fixture = Fixture::mount(PageConfig::default());
        let menu = fixture.find(&format!("#{}", ids::MOBILE_MENU));
        let icon = fixture.find(&format!("#{} i", ids::MENU_TOGGLE));

        fixture.page.dispatch(Action::ToggleMenu);
        assert!(has_class(&menu, dom::ACTIVE_CLASS));
        assert!(has_class(&icon, "fa-times"));
        assert!(!has_class(&icon, "fa-bars"));

        fixture.page.dispatch(Action::DocumentClicked { inside_menu: false });
        assert!(!has_class(&menu, dom::ACTIVE_CLASS));
        assert!(has_class(&icon, "fa-bars"));
    }

    #[wasm_bindgen_test]
    fn element_state_drives_the_play_icon() {
        let fixture = Fixture::mount(PageConfig::default());
        let icon = fixture.find(&format!("#{}", ids::PLAY_ICON));

        fixture.page.dispatch(Action::MediaStateChanged { paused: false });
        assert!(has_class(&icon, "fa-pause"));
        fixture.page.dispatch(Action::MediaStateChanged { paused: true });
        assert!(has_class(&icon, "fa-play"));
        assert!(!has_class(&icon, "fa-pause"));
    }
}

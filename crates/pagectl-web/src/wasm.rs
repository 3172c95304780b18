//! `wasm-bindgen` entry points.
//!
//! [`start`] runs when the module loads: it installs the panic hook and the
//! console subscriber, waits for `DOMContentLoaded` if the document is still
//! parsing, then mounts one [`Page`]. [`current_page`] hands JS a weak
//! [`PageHandle`] to it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::config::resolve_config;
use crate::dom::ids;
use crate::page::Page;

thread_local! {
    static PAGE: RefCell<Option<Rc<Page>>> = const { RefCell::new(None) };
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!(
                    "pagectl panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                ),
                None => format!("pagectl panic: {info}"),
            };
            console_error(&msg);
        }));
    });
}

fn ready_state(document: &Document) -> Option<String> {
    Reflect::get(document, &"readyState".into()).ok()?.as_string()
}

fn config_block(document: &Document) -> Option<String> {
    document.get_element_by_id(ids::CONFIG)?.text_content()
}

fn mount(window: Window, document: Document) {
    let already_mounted = PAGE.with(|slot| slot.borrow().is_some());
    if already_mounted {
        tracing::debug!(target: "pagectl.web", "page already mounted");
        return;
    }
    let config = resolve_config(config_block(&document).as_deref());
    let page = Page::mount(window, document, config);
    page.start();
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
    tracing::info!(target: "pagectl.web", "page mounted");
}

/// Module entry point.
#[wasm_bindgen(start)]
pub fn start() {
    install_panic_hook();
    crate::console::install();

    let Some(window) = web_sys::window() else {
        console_error("pagectl: no window; page behaviors disabled");
        return;
    };
    let Some(document) = window.document() else {
        console_error("pagectl: no document; page behaviors disabled");
        return;
    };

    if ready_state(&document).as_deref() == Some("loading") {
        let (w, d) = (window.clone(), document.clone());
        EventListener::once(&document, "DOMContentLoaded", move |_| mount(w, d)).forget();
    } else {
        mount(window, document);
    }
}

/// Handle to the mounted page, if any.
#[wasm_bindgen(js_name = currentPage)]
pub fn current_page() -> Option<PageHandle> {
    PAGE.with(|slot| {
        slot.borrow().as_ref().map(|page| PageHandle {
            page: Rc::downgrade(page),
        })
    })
}

/// JS view of the running page. Holds the page weakly; every method is a
/// no-op once the page is gone.
#[wasm_bindgen]
pub struct PageHandle {
    page: Weak<Page>,
}

#[wasm_bindgen]
impl PageHandle {
    /// Cancel all timers and detach every listener.
    pub fn teardown(&self) {
        if let Some(page) = self.page.upgrade() {
            page.teardown();
        }
    }

    /// `"light"` or `"dark"`, or `undefined` without a theme toggle.
    pub fn theme(&self) -> Option<String> {
        let theme = self.page.upgrade()?.theme()?;
        Some(theme.as_str().to_string())
    }

    #[wasm_bindgen(js_name = slideIndex)]
    pub fn slide_index(&self) -> Option<u32> {
        let index = self.page.upgrade()?.slide_index()?;
        u32::try_from(index).ok()
    }

    /// Effective configuration as JSON.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> Option<String> {
        let config = self.page.upgrade()?.config()?;
        match crate::config::config_json(&config) {
            Ok(json) => Some(json),
            Err(err) => {
                tracing::warn!(target: "pagectl.web", error = %err, "config not serializable");
                None
            }
        }
    }
}

#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use pagectl_core::PageConfig;
use pagectl_web::config::resolve_config;
use pagectl_web::dom::ids;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window()
        .and_then(|w| w.document())
        .expect("test runs in a browser document")
}

#[wasm_bindgen_test]
fn config_block_is_read_from_the_document() {
    let document = document();
    let block = document
        .create_element("script")
        .expect("create script element");
    block
        .set_attribute("type", "application/json")
        .expect("set type");
    block.set_id(ids::CONFIG);
    block.set_text_content(Some(r#"{"bubble_lifetime_ms": 4000}"#));
    document
        .body()
        .expect("document has a body")
        .append_child(&block)
        .expect("append config block");

    let raw = document
        .get_element_by_id(ids::CONFIG)
        .and_then(|el| el.text_content());
    let config = resolve_config(raw.as_deref());
    assert_eq!(config.bubble_lifetime_ms, 4000);
    assert_eq!(config.auto_slide_interval_ms, PageConfig::default().auto_slide_interval_ms);

    block.remove();
}

#[wasm_bindgen_test]
fn console_subscriber_installs_once() {
    pagectl_web::console::install();
    pagectl_web::console::install();
    tracing::warn!(target: "pagectl.test", "console layer reachable");
}

#[wasm_bindgen_test]
fn start_mounts_a_page_handle() {
    pagectl_web::start();
    pagectl_web::start();
    let handle = pagectl_web::current_page().expect("page mounted after start");
    let config = handle.config_json().expect("config available before teardown");
    assert!(config.contains("\"theme_storage_key\""));
    handle.teardown();
    handle.teardown();
}

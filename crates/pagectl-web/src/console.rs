//! `tracing` output for the browser console.
//!
//! [`ConsoleLayer`] renders each event as `"[target] message key=value ..."`
//! and hands it to a [`ConsoleSink`] together with its level, so warnings
//! land in `console.warn`, errors in `console.error` and so on.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write(&self, level: Level, line: &str);
}

pub struct ConsoleLayer<W> {
    sink: W,
}

impl<W: ConsoleSink> ConsoleLayer<W> {
    pub const fn new(sink: W) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber, W: ConsoleSink> Layer<S> for ConsoleLayer<W> {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let line = format_event(event);
        self.sink.write(*event.metadata().level(), &line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {}={}", field.name(), value);
    }
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }
}

/// Render one event as a single console line.
#[must_use]
pub fn format_event(event: &Event<'_>) -> String {
    let mut visitor = LineVisitor::default();
    event.record(&mut visitor);
    format!(
        "[{}] {}{}",
        event.metadata().target(),
        visitor.message,
        visitor.fields
    )
}

/// Default verbosity: debug builds show behavior wiring, release builds
/// stay at `INFO`.
#[must_use]
pub const fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserConsole, install};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{ConsoleLayer, ConsoleSink, default_level};
    use tracing::Level;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use wasm_bindgen::JsValue;
    use web_sys::console;

    /// Writes to the matching `console.*` method.
    pub struct BrowserConsole;

    impl ConsoleSink for BrowserConsole {
        fn write(&self, level: Level, line: &str) {
            let line = JsValue::from_str(line);
            match level {
                Level::ERROR => console::error_1(&line),
                Level::WARN => console::warn_1(&line),
                Level::INFO => console::info_1(&line),
                _ => console::debug_1(&line),
            }
        }
    }

    /// Install the console subscriber once per page.
    pub fn install() {
        use std::sync::Once;

        static ONCE: Once = Once::new();
        ONCE.call_once(|| {
            let subscriber = tracing_subscriber::registry()
                .with(LevelFilter::from_level(default_level()))
                .with(ConsoleLayer::new(BrowserConsole));
            if tracing::subscriber::set_global_default(subscriber).is_err() {
                console::debug_1(&JsValue::from_str(
                    "pagectl: a tracing subscriber is already installed",
                ));
            }
        });
    }
}

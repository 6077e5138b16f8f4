// Console logging and small formatting helpers.
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::Registry;
use wasm_bindgen::JsValue;

pub fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Route `tracing` events to the browser console and panics to
/// `console.error`. Call once at startup.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let max_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = Registry::default().with(ConsoleLayer { max_level });
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        clog(&format!("logging already initialised: {e}"));
    }
}

struct ConsoleLayer {
    max_level: Level,
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        let mut line = EventLine::default();
        event.record(&mut line);
        let text = JsValue::from_str(&format!(
            "[{}] {}: {}{}",
            meta.level(),
            meta.target(),
            line.message,
            line.fields
        ));
        match *meta.level() {
            Level::ERROR => web_sys::console::error_1(&text),
            Level::WARN => web_sys::console::warn_1(&text),
            _ => web_sys::console::log_1(&text),
        }
    }
}

#[derive(Default)]
struct EventLine {
    message: String,
    fields: String,
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Scale as a whole-number percentage, e.g. `1.1` -> `"110%"`.
pub fn format_zoom(scale: f64) -> String {
    format!("{:.0}%", scale * 100.0)
}

/// Signed pixel offset pair, e.g. `"+12, -40 px"`.
pub fn format_offset(x: f64, y: f64) -> String {
    format!("{:+.0}, {:+.0} px", x, y)
}

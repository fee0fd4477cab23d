/// PhishGuard - Chrome Extension for phishing warnings
/// Built with Rust + WASM + Yew

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod monitor;
pub mod overlay;
pub mod url_filter;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(test)]
mod testing;

pub use analysis::{AnalysisResult, TabId, TabVisualState, Verdict, WarningMessage};
pub use cache::ResultCache;
pub use config::Settings;
pub use dispatcher::{Badge, DispatchReport, ResultDispatcher};
pub use error::{ConfigError, TransportError};
pub use monitor::{EventOutcome, MonitorOptions, StalePolicy, TabMonitor};
pub use overlay::{OverlayInjector, PageDom, ShowOutcome, WarningView};

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}


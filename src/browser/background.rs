/// Background service worker: tab events in, badge and page messages out

use super::{getPageHtml, getStorage, getTabUrl, onTabActivated, onTabRemoved, onTabUrlChanged, sendToTab, setBadge};
use crate::analysis::{TabId, WarningMessage};
use crate::api::HttpAnalysisApi;
use crate::cache::ResultCache;
use crate::config::{SETTINGS_STORAGE_KEY, Settings};
use crate::dispatcher::{Badge, ResultDispatcher};
use crate::host::{BadgeSink, Clock, Delivery, PageMessenger, StartupQueue, TabEvent, TabHost};
use crate::monitor::{MonitorOptions, TabMonitor};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub struct ChromeTabHost;

impl TabHost for ChromeTabHost {
    async fn current_url(&self, tab_id: TabId) -> Option<String> {
        getTabUrl(tab_id).await.ok().and_then(|url| url.as_string())
    }

    async fn page_html(&self, tab_id: TabId) -> Option<String> {
        match getPageHtml(tab_id).await {
            Ok(html) => html.as_string(),
            Err(e) => {
                log::debug!("No page HTML for tab {}: {:?}", tab_id, e);
                None
            }
        }
    }
}

pub struct ChromeBadge;

impl BadgeSink for ChromeBadge {
    fn set_badge(&self, tab_id: TabId, badge: &Badge) {
        setBadge(tab_id, badge.text, badge.color);
    }
}

pub struct ChromeMessenger;

impl PageMessenger for ChromeMessenger {
    async fn send_warning(&self, tab_id: TabId, message: &WarningMessage) -> Delivery {
        // Plain JS objects, not Maps, for the opaque payload
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let message_js = match message.serialize(&serializer) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to serialize warning for tab {}: {:?}", tab_id, e);
                return Delivery::Undeliverable;
            }
        };

        match sendToTab(tab_id, message_js).await {
            Ok(_) => Delivery::Delivered,
            Err(e) => {
                log::debug!("sendMessage to tab {} failed: {:?}", tab_id, e);
                Delivery::ReceiverAbsent
            }
        }
    }
}

pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

async fn load_settings() -> Settings {
    let stored = match getStorage(SETTINGS_STORAGE_KEY).await {
        Ok(value) if value.is_null() || value.is_undefined() => None,
        Ok(value) => match serde_wasm_bindgen::from_value::<serde_json::Value>(value) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Unreadable settings: {:?}", e);
                None
            }
        },
        Err(e) => {
            log::warn!("Failed to read settings: {:?}", e);
            None
        }
    };
    Settings::from_storage(stored)
}

type BackgroundMonitor = TabMonitor<HttpAnalysisApi, ChromeTabHost, ChromeBadge, ChromeMessenger, JsClock>;

fn build_monitor(settings: &Settings) -> Option<BackgroundMonitor> {
    let endpoint = match settings.analyze_endpoint() {
        Ok(endpoint) => endpoint,
        Err(e) => {
            log::warn!("{}; using the default API", e);
            match Settings::default().analyze_endpoint() {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    log::error!("No usable analysis endpoint: {}", e);
                    return None;
                }
            }
        }
    };
    log::info!("Analysis endpoint: {}", endpoint);

    let cache = Rc::new(RefCell::new(ResultCache::new(
        settings.cache_ttl(),
        settings.max_cache_entries,
    )));
    Some(TabMonitor::new(
        HttpAnalysisApi::new(endpoint),
        ChromeTabHost,
        ResultDispatcher::new(ChromeBadge, ChromeMessenger),
        JsClock,
        cache,
        MonitorOptions::from(settings),
    ))
}

fn spawn_event(queue: &Rc<StartupQueue<BackgroundMonitor>>, event: TabEvent) {
    let queue = queue.clone();
    spawn_local(async move {
        queue.deliver(event).await;
    });
}

/// Entry point for the extension's background service worker.
///
/// Listeners are registered before settings are read so that events fired
/// while the worker wakes up are not lost; they are held until the monitor
/// is ready.
#[wasm_bindgen]
pub async fn start_background() {
    let queue: Rc<StartupQueue<BackgroundMonitor>> = Rc::new(StartupQueue::default());

    let on_url_changed = {
        let queue = queue.clone();
        Closure::wrap(Box::new(move |tab_id: i32, url: String| {
            spawn_event(&queue, TabEvent::UrlChanged { tab_id, url: Some(url) });
        }) as Box<dyn Fn(i32, String)>)
    };

    let on_activated = {
        let queue = queue.clone();
        Closure::wrap(Box::new(move |tab_id: i32| {
            spawn_event(&queue, TabEvent::Activated { tab_id });
        }) as Box<dyn Fn(i32)>)
    };

    let on_removed = {
        let queue = queue.clone();
        Closure::wrap(Box::new(move |tab_id: i32| {
            spawn_event(&queue, TabEvent::Removed { tab_id });
        }) as Box<dyn Fn(i32)>)
    };

    onTabUrlChanged(on_url_changed.as_ref().unchecked_ref());
    onTabActivated(on_activated.as_ref().unchecked_ref());
    onTabRemoved(on_removed.as_ref().unchecked_ref());

    // Listeners live for the whole worker lifetime
    on_url_changed.forget();
    on_activated.forget();
    on_removed.forget();

    let settings = load_settings().await;
    let Some(monitor) = build_monitor(&settings) else {
        return;
    };

    let held = queue.install(Rc::new(monitor));
    if !held.is_empty() {
        log::debug!("Replaying {} tab events received during startup", held.len());
    }
    for event in held {
        spawn_event(&queue, event);
    }
}

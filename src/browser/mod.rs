/// Chrome extension glue: JS bridge bindings and the two entry points
mod background;
mod content;

pub use background::{ChromeBadge, ChromeMessenger, ChromeTabHost, JsClock, start_background};
pub use content::{WebPageDom, start_content_script};

use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/extension.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTabUrl(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getPageHtml(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendToTab(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    fn setBadge(tab_id: i32, text: &str, color: &str);

    fn onTabUrlChanged(callback: &js_sys::Function);

    fn onTabActivated(callback: &js_sys::Function);

    fn onTabRemoved(callback: &js_sys::Function);

    fn onRuntimeMessage(callback: &js_sys::Function);
}

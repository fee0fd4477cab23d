#![cfg(target_arch = "wasm32")]

use phishguard_extension::browser::WebPageDom;
use phishguard_extension::overlay::OVERLAY_ELEMENT_ID;
use phishguard_extension::{AnalysisResult, OverlayInjector, ShowOutcome, WarningMessage};
use serde_json::json;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn overlay_count() -> u32 {
    document()
        .query_selector_all(&format!("#{}", OVERLAY_ELEMENT_ID))
        .unwrap()
        .length()
}

fn body_overflow() -> String {
    document()
        .body()
        .unwrap()
        .style()
        .get_property_value("overflow")
        .unwrap()
}

fn warning() -> WarningMessage {
    let data = AnalysisResult::from_value(json!({"verdict": "phishing", "score": 0.97})).unwrap();
    WarningMessage::new(data, "http://example-bank-login.test/verify".to_string())
}

#[wasm_bindgen_test]
fn test_overlay_injected_once() {
    let injector = OverlayInjector::new(WebPageDom::default());

    assert_eq!(injector.show(&warning()), ShowOutcome::Shown);
    assert_eq!(injector.show(&warning()), ShowOutcome::AlreadyShown);

    assert_eq!(overlay_count(), 1);
    assert_eq!(body_overflow(), "hidden");

    assert!(injector.proceed());
}

#[wasm_bindgen_test]
fn test_proceed_restores_scrolling() {
    let injector = OverlayInjector::new(WebPageDom::default());
    injector.show(&warning());

    assert!(injector.proceed());

    assert_eq!(overlay_count(), 0);
    assert_eq!(body_overflow(), "");
}

#[wasm_bindgen_test]
fn test_proceeded_page_is_not_warned_again() {
    let injector = OverlayInjector::new(WebPageDom::default());
    injector.show(&warning());
    injector.proceed();

    assert_eq!(injector.show(&warning()), ShowOutcome::Dismissed);
    assert_eq!(overlay_count(), 0);
    assert_eq!(body_overflow(), "");
}

/// Content script: renders the warning overlay into the visited page

use super::onRuntimeMessage;
use crate::analysis::WarningMessage;
use crate::overlay::component::{WarningOverlay, WarningOverlayProps};
use crate::overlay::{OVERLAY_ELEMENT_ID, OverlayActions, OverlayInjector, PageDom, WarningView};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use web_sys::{CssStyleDeclaration, Document};
use yew::AppHandle;

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn body_style() -> Option<CssStyleDeclaration> {
    Some(document()?.body()?.style())
}

/// `PageDom` over the live document
#[derive(Default)]
pub struct WebPageDom {
    app: RefCell<Option<AppHandle<WarningOverlay>>>,
    saved_overflow: RefCell<Option<String>>,
}

impl PageDom for WebPageDom {
    fn overlay_present(&self) -> bool {
        document()
            .and_then(|document| document.get_element_by_id(OVERLAY_ELEMENT_ID))
            .is_some()
    }

    fn mount_overlay(&self, view: &WarningView, actions: OverlayActions) {
        let Some(document) = document() else {
            return;
        };
        let Some(body) = document.body() else {
            log::warn!("Page has no body; cannot show the warning");
            return;
        };

        let root = match document.create_element("div") {
            Ok(root) => root,
            Err(e) => {
                log::warn!("Failed to create overlay root: {:?}", e);
                return;
            }
        };
        root.set_id(OVERLAY_ELEMENT_ID);
        if let Err(e) = body.append_child(&root) {
            log::warn!("Failed to attach overlay: {:?}", e);
            return;
        }

        let props = WarningOverlayProps {
            view: view.clone(),
            on_leave: actions.on_leave,
            on_proceed: actions.on_proceed,
        };
        let handle = yew::Renderer::<WarningOverlay>::with_root_and_props(root, props).render();
        *self.app.borrow_mut() = Some(handle);
    }

    fn unmount_overlay(&self) {
        if let Some(handle) = self.app.borrow_mut().take() {
            handle.destroy();
        }
        if let Some(root) = document().and_then(|document| document.get_element_by_id(OVERLAY_ELEMENT_ID)) {
            root.remove();
        }
    }

    fn lock_scroll(&self) {
        if let Some(style) = body_style() {
            let previous = style.get_property_value("overflow").unwrap_or_default();
            *self.saved_overflow.borrow_mut() = Some(previous);
            if let Err(e) = style.set_property("overflow", "hidden") {
                log::debug!("Could not lock page scroll: {:?}", e);
            }
        }
    }

    fn unlock_scroll(&self) {
        let Some(style) = body_style() else {
            return;
        };
        match self.saved_overflow.borrow_mut().take() {
            Some(previous) if !previous.is_empty() => {
                if let Err(e) = style.set_property("overflow", &previous) {
                    log::debug!("Could not restore page overflow: {:?}", e);
                }
            }
            _ => {
                if let Err(e) = style.remove_property("overflow") {
                    log::debug!("Could not clear page overflow: {:?}", e);
                }
            }
        }
    }

    fn navigate(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                log::warn!("Failed to leave site: {:?}", e);
            }
        }
    }
}

/// Entry point for the content script injected into every page
#[wasm_bindgen]
pub fn start_content_script() {
    let injector = OverlayInjector::new(WebPageDom::default());

    let on_message = Closure::wrap(Box::new(move |message: JsValue| {
        match serde_wasm_bindgen::from_value::<WarningMessage>(message) {
            Ok(message) => {
                injector.show(&message);
            }
            Err(e) => log::debug!("Ignoring runtime message: {:?}", e),
        }
    }) as Box<dyn Fn(JsValue)>);

    onRuntimeMessage(on_message.as_ref().unchecked_ref());
    on_message.forget();
}

/// Content-script side: the full-page phishing warning
pub mod component;

use crate::analysis::WarningMessage;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use yew::Callback;

pub const OVERLAY_ELEMENT_ID: &str = "phishguard-warning-overlay";
pub const LEAVE_SITE_URL: &str = "about:blank";
pub const FALLBACK_REASON: &str = "This site matches known phishing patterns.";

/// What the overlay displays, derived only from the warning message
#[derive(Debug, Clone, PartialEq)]
pub struct WarningView {
    pub url: String,
    pub confidence_text: String,
    pub reasons: Vec<String>,
}

impl WarningView {
    pub fn from_message(message: &WarningMessage) -> WarningView {
        let confidence = message
            .data
            .confidence()
            .unwrap_or_else(|| message.data.score());

        let mut reasons = message.data.reasons();
        if reasons.is_empty() {
            reasons.push(FALLBACK_REASON.to_string());
        }

        WarningView {
            url: message.url.clone(),
            confidence_text: format_confidence(confidence),
            reasons,
        }
    }
}

/// `0.97` → `"97.0%"`. Values above 1 are taken as percentages already.
pub fn format_confidence(value: f64) -> String {
    let percent = if value <= 1.0 { value * 100.0 } else { value };
    format!("{:.1}%", percent.clamp(0.0, 100.0))
}

/// The two user choices wired into a mounted overlay
#[derive(Clone, PartialEq)]
pub struct OverlayActions {
    pub on_leave: Callback<()>,
    pub on_proceed: Callback<()>,
}

/// The page the content script runs in
pub trait PageDom {
    fn overlay_present(&self) -> bool;
    fn mount_overlay(&self, view: &WarningView, actions: OverlayActions);
    fn unmount_overlay(&self);
    fn lock_scroll(&self);
    fn unlock_scroll(&self);
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Shown,
    AlreadyShown,
    /// The user already left or proceeded on this page
    Dismissed,
    NotAWarning,
}

/// Shows at most one warning overlay per page load.
///
/// One injector lives for one content-script instance. Both actions are
/// terminal: once dismissed, later warnings for the page are ignored.
pub struct OverlayInjector<D> {
    dom: D,
    dismissed: Cell<bool>,
    this: Weak<OverlayInjector<D>>,
}

impl<D: PageDom + 'static> OverlayInjector<D> {
    pub fn new(dom: D) -> Rc<Self> {
        Rc::new_cyclic(|this| OverlayInjector {
            dom,
            dismissed: Cell::new(false),
            this: this.clone(),
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn show(&self, message: &WarningMessage) -> ShowOutcome {
        if !message.is_show_warning() {
            return ShowOutcome::NotAWarning;
        }
        if self.dismissed.get() {
            log::debug!("Warning overlay already dismissed on this page");
            return ShowOutcome::Dismissed;
        }
        if self.dom.overlay_present() {
            log::debug!("Warning overlay already shown");
            return ShowOutcome::AlreadyShown;
        }

        let view = WarningView::from_message(message);
        self.dom.lock_scroll();
        self.dom.mount_overlay(&view, self.actions());
        ShowOutcome::Shown
    }

    /// "Proceed anyway": remove the overlay and give scrolling back
    pub fn proceed(&self) -> bool {
        if !self.dom.overlay_present() {
            return false;
        }
        self.dismissed.set(true);
        self.dom.unmount_overlay();
        self.dom.unlock_scroll();
        true
    }

    /// "Leave site": tear down and navigate to a neutral page
    pub fn leave(&self) -> bool {
        if !self.dom.overlay_present() {
            return false;
        }
        self.dismissed.set(true);
        self.dom.unmount_overlay();
        self.dom.unlock_scroll();
        self.dom.navigate(LEAVE_SITE_URL);
        true
    }

    fn actions(&self) -> OverlayActions {
        let leave = self.this.clone();
        let proceed = self.this.clone();
        OverlayActions {
            on_leave: Callback::from(move |_| {
                if let Some(injector) = leave.upgrade() {
                    injector.leave();
                }
            }),
            on_proceed: Callback::from(move |_| {
                if let Some(injector) = proceed.upgrade() {
                    injector.proceed();
                }
            }),
        }
    }
}

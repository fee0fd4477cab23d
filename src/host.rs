/// Seams between the analysis pipeline and the browser host.
///
/// The background worker implements these over `chrome.*`; tests implement
/// them with in-memory fakes.
use crate::analysis::{TabId, WarningMessage};
use crate::dispatcher::Badge;
use crate::monitor::EventOutcome;
use std::cell::RefCell;
use std::rc::Rc;

/// Read-only access to tab state. Both lookups are best-effort.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn current_url(&self, tab_id: TabId) -> Option<String>;

    /// Rendered HTML of the tab's page, when it can be captured
    async fn page_html(&self, tab_id: TabId) -> Option<String>;
}

/// The per-tab action badge
pub trait BadgeSink {
    fn set_badge(&self, tab_id: TabId, badge: &Badge);
}

/// Outcome of a fire-and-forget message to a tab's content script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No content script listening (page still loading, or unsupported page)
    ReceiverAbsent,
    /// The message could not be encoded for the page
    Undeliverable,
}

#[allow(async_fn_in_trait)]
pub trait PageMessenger {
    async fn send_warning(&self, tab_id: TabId, message: &WarningMessage) -> Delivery;
}

/// Wall clock in epoch milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Receiver of tab lifecycle events
#[allow(async_fn_in_trait)]
pub trait TabEventHandler {
    async fn on_url_changed(&self, tab_id: TabId, url: Option<&str>) -> EventOutcome;
    async fn on_tab_activated(&self, tab_id: TabId) -> EventOutcome;
    fn on_tab_removed(&self, tab_id: TabId);
}

/// A tab lifecycle event, for replaying event sequences
#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    UrlChanged { tab_id: TabId, url: Option<String> },
    Activated { tab_id: TabId },
    Removed { tab_id: TabId },
}

impl TabEvent {
    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::UrlChanged { tab_id, .. } | TabEvent::Activated { tab_id } | TabEvent::Removed { tab_id } => {
                *tab_id
            }
        }
    }

    pub async fn deliver<H: TabEventHandler>(&self, handler: &H) -> EventOutcome {
        match self {
            TabEvent::UrlChanged { tab_id, url } => handler.on_url_changed(*tab_id, url.as_deref()).await,
            TabEvent::Activated { tab_id } => handler.on_tab_activated(*tab_id).await,
            TabEvent::Removed { tab_id } => {
                handler.on_tab_removed(*tab_id);
                EventOutcome::Ignored
            }
        }
    }
}

/// Accepts tab events from the moment listeners are registered, before the
/// handler exists.
///
/// Events that arrive early are held in arrival order and handed back by
/// `install`. A removal drops the removed tab's held events.
pub struct StartupQueue<H> {
    handler: RefCell<Option<Rc<H>>>,
    held: RefCell<Vec<TabEvent>>,
}

impl<H> Default for StartupQueue<H> {
    fn default() -> Self {
        StartupQueue {
            handler: RefCell::new(None),
            held: RefCell::new(Vec::new()),
        }
    }
}

impl<H: TabEventHandler> StartupQueue<H> {
    pub fn is_ready(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// Install the handler and take the events held so far
    pub fn install(&self, handler: Rc<H>) -> Vec<TabEvent> {
        *self.handler.borrow_mut() = Some(handler);
        self.held.take()
    }

    pub fn handler(&self) -> Option<Rc<H>> {
        self.handler.borrow().clone()
    }

    pub async fn deliver(&self, event: TabEvent) -> EventOutcome {
        let Some(handler) = self.handler() else {
            let mut held = self.held.borrow_mut();
            if let TabEvent::Removed { tab_id } = event {
                held.retain(|e| e.tab_id() != tab_id);
            } else {
                held.push(event);
            }
            return EventOutcome::Queued;
        };
        event.deliver(&*handler).await
    }
}

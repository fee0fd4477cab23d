/// Turning analysis outcomes into badge and page-warning side effects
use crate::analysis::{AnalysisResult, TabId, TabVisualState, WarningMessage};
use crate::host::{BadgeSink, Delivery, PageMessenger};

/// Badge text and background color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub text: &'static str,
    pub color: &'static str,
}

impl Badge {
    pub fn for_state(state: TabVisualState) -> Badge {
        match state {
            TabVisualState::Dangerous => Badge { text: "!", color: "#F44336" },
            TabVisualState::Safe => Badge { text: "✓", color: "#4CAF50" },
            TabVisualState::Error => Badge { text: "ERR", color: "#FF9800" },
            TabVisualState::Unknown => Badge { text: "", color: "#9E9E9E" },
        }
    }
}

/// What a dispatch did, for callers that want to observe it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub state: TabVisualState,
    /// Set only when a warning message was attempted
    pub delivery: Option<Delivery>,
}

pub struct ResultDispatcher<B, M> {
    badge: B,
    messenger: M,
}

impl<B: BadgeSink, M: PageMessenger> ResultDispatcher<B, M> {
    pub fn new(badge: B, messenger: M) -> Self {
        ResultDispatcher { badge, messenger }
    }

    pub fn badge(&self) -> &B {
        &self.badge
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Overwrite the tab's badge from `result` and, if dangerous, ask the
    /// page to show the warning overlay.
    pub async fn dispatch_result(&self, tab_id: TabId, url: &str, result: &AnalysisResult) -> DispatchReport {
        let state = TabVisualState::from_result(result);
        self.badge.set_badge(tab_id, &Badge::for_state(state));

        if state != TabVisualState::Dangerous {
            return DispatchReport { state, delivery: None };
        }

        let message = WarningMessage::new(result.clone(), url.to_string());
        let delivery = self.messenger.send_warning(tab_id, &message).await;
        match delivery {
            Delivery::Delivered => {}
            Delivery::ReceiverAbsent => log::warn!("No content script in tab {} to show the warning", tab_id),
            Delivery::Undeliverable => log::error!("Warning for tab {} could not be sent", tab_id),
        }

        DispatchReport {
            state,
            delivery: Some(delivery),
        }
    }

    /// Show the error badge; no page message is sent.
    pub fn dispatch_failure(&self, tab_id: TabId) -> DispatchReport {
        self.badge.set_badge(tab_id, &Badge::for_state(TabVisualState::Error));
        DispatchReport {
            state: TabVisualState::Error,
            delivery: None,
        }
    }
}

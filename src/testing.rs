/// In-memory host fakes shared by unit tests
use crate::analysis::{AnalysisResult, TabId, WarningMessage};
use crate::api::{AnalysisApi, AnalyzeUrlRequest};
use crate::dispatcher::Badge;
use crate::error::TransportError;
use crate::host::{BadgeSink, Clock, Delivery, PageMessenger, TabHost};
use futures::channel::oneshot;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

type Response = Result<AnalysisResult, TransportError>;

pub fn result(value: serde_json::Value) -> AnalysisResult {
    AnalysisResult::from_value(value).unwrap()
}

/// Analysis API answering from a per-URL script.
///
/// A gated URL suspends until the test completes its sender, which is how
/// tests interleave overlapping requests.
#[derive(Default)]
pub struct ScriptedApi {
    responses: RefCell<HashMap<String, Response>>,
    gates: RefCell<HashMap<String, Vec<oneshot::Receiver<Response>>>>,
    pub calls: RefCell<Vec<AnalyzeUrlRequest>>,
}

impl ScriptedApi {
    pub fn respond(&self, url: &str, response: Response) {
        self.responses.borrow_mut().insert(url.to_string(), response);
    }

    pub fn gate(&self, url: &str) -> oneshot::Sender<Response> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().entry(url.to_string()).or_default().push(rx);
        tx
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl AnalysisApi for ScriptedApi {
    async fn analyze(&self, request: &AnalyzeUrlRequest) -> Response {
        self.calls.borrow_mut().push(request.clone());

        let gate = self
            .gates
            .borrow_mut()
            .get_mut(&request.url)
            .filter(|pending| !pending.is_empty())
            .map(|pending| pending.remove(0));
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string())));
        }

        self.responses
            .borrow()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Network("connection refused".to_string())))
    }
}

#[derive(Default)]
pub struct FakeTabHost {
    pub urls: RefCell<HashMap<TabId, String>>,
    pub html: RefCell<Option<String>>,
    pub html_requests: Cell<usize>,
}

impl FakeTabHost {
    pub fn with_tab(self, tab_id: TabId, url: &str) -> Self {
        self.urls.borrow_mut().insert(tab_id, url.to_string());
        self
    }
}

impl TabHost for FakeTabHost {
    async fn current_url(&self, tab_id: TabId) -> Option<String> {
        self.urls.borrow().get(&tab_id).cloned()
    }

    async fn page_html(&self, _tab_id: TabId) -> Option<String> {
        self.html_requests.set(self.html_requests.get() + 1);
        self.html.borrow().clone()
    }
}

#[derive(Default)]
pub struct RecordingBadge {
    pub badges: RefCell<Vec<(TabId, Badge)>>,
}

impl RecordingBadge {
    pub fn last_for(&self, tab_id: TabId) -> Option<Badge> {
        self.badges
            .borrow()
            .iter()
            .rev()
            .find(|(id, _)| *id == tab_id)
            .map(|(_, badge)| *badge)
    }
}

impl BadgeSink for RecordingBadge {
    fn set_badge(&self, tab_id: TabId, badge: &Badge) {
        self.badges.borrow_mut().push((tab_id, *badge));
    }
}

pub struct RecordingMessenger {
    pub sent: RefCell<Vec<(TabId, WarningMessage)>>,
    pub reply: Cell<Delivery>,
}

impl RecordingMessenger {
    pub fn new(receiver_present: bool) -> Self {
        Self::replying(if receiver_present {
            Delivery::Delivered
        } else {
            Delivery::ReceiverAbsent
        })
    }

    pub fn replying(reply: Delivery) -> Self {
        RecordingMessenger {
            sent: RefCell::new(Vec::new()),
            reply: Cell::new(reply),
        }
    }
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PageMessenger for RecordingMessenger {
    async fn send_warning(&self, tab_id: TabId, message: &WarningMessage) -> Delivery {
        self.sent.borrow_mut().push((tab_id, message.clone()));
        self.reply.get()
    }
}

#[derive(Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn at(now: f64) -> Self {
        ManualClock { now: Cell::new(now) }
    }

    pub fn advance_ms(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

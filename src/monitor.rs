/// Per-tab analysis pipeline: filter, cache, request, dispatch
use crate::analysis::TabId;
use crate::api::{AnalysisApi, AnalyzeUrlRequest};
use crate::cache::ResultCache;
use crate::config::Settings;
use crate::dispatcher::{DispatchReport, ResultDispatcher};
use crate::host::{BadgeSink, Clock, PageMessenger, TabEventHandler, TabHost};
use crate::url_filter::{display_host, is_analyzable};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// What to do with a response when a newer request for the same tab was
/// issued while it was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every response in arrival order; the last to arrive wins
    #[default]
    ApplyAll,
    /// Drop responses whose request is no longer the tab's latest
    LatestOnly,
}

/// Which branch an event took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Not analyzable, or protection disabled
    Ignored,
    Cached(DispatchReport),
    Analyzed(DispatchReport),
    Failed(DispatchReport),
    /// Response arrived after a newer request under `StalePolicy::LatestOnly`
    Superseded,
    /// Arrived before the monitor was built; held for replay
    Queued,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOptions {
    pub enabled: bool,
    pub send_page_html: bool,
    pub max_html_bytes: usize,
    pub skip_db: bool,
    pub stale_policy: StalePolicy,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions::from(&Settings::default())
    }
}

impl From<&Settings> for MonitorOptions {
    fn from(settings: &Settings) -> Self {
        MonitorOptions {
            enabled: settings.enabled,
            send_page_html: settings.send_page_html,
            max_html_bytes: settings.max_html_bytes,
            skip_db: settings.skip_db,
            stale_policy: settings.stale_policy(),
        }
    }
}

/// Decides, for every tab navigation, whether to analyze the URL, and serves
/// cached results while they are fresh.
///
/// There is no in-flight de-duplication: two misses for the same URL issue two
/// requests. Each qualifying event takes the next number from a monitor-wide
/// sequence and records it as the tab's latest request; `StalePolicy::LatestOnly`
/// drops responses whose number is no longer the tab's latest.
pub struct TabMonitor<A, H, B, M, C> {
    api: A,
    host: H,
    dispatcher: ResultDispatcher<B, M>,
    clock: C,
    cache: Rc<RefCell<ResultCache>>,
    options: MonitorOptions,
    last_request: Cell<u64>,
    generations: RefCell<HashMap<TabId, u64>>,
}

impl<A, H, B, M, C> TabMonitor<A, H, B, M, C>
where
    A: AnalysisApi,
    H: TabHost,
    B: BadgeSink,
    M: PageMessenger,
    C: Clock,
{
    pub fn new(
        api: A,
        host: H,
        dispatcher: ResultDispatcher<B, M>,
        clock: C,
        cache: Rc<RefCell<ResultCache>>,
        options: MonitorOptions,
    ) -> Self {
        TabMonitor {
            api,
            host,
            dispatcher,
            clock,
            cache,
            options,
            last_request: Cell::new(0),
            generations: RefCell::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn dispatcher(&self) -> &ResultDispatcher<B, M> {
        &self.dispatcher
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Sequence number of the tab's latest qualifying event, 0 if there has
    /// been none since the tab was last removed.
    pub fn generation(&self, tab_id: TabId) -> u64 {
        self.generations.borrow().get(&tab_id).copied().unwrap_or(0)
    }

    /// Numbers never repeat, so a request from before a tab was removed can't
    /// match a request made after its id was reused.
    fn next_generation(&self, tab_id: TabId) -> u64 {
        let generation = self.last_request.get() + 1;
        self.last_request.set(generation);
        self.generations.borrow_mut().insert(tab_id, generation);
        generation
    }

    fn is_superseded(&self, tab_id: TabId, generation: u64) -> bool {
        self.options.stale_policy == StalePolicy::LatestOnly
            && self.generations.borrow().get(&tab_id) != Some(&generation)
    }

    async fn analyze(&self, tab_id: TabId, url: &str) -> EventOutcome {
        let generation = self.next_generation(tab_id);

        let cached = self.cache.borrow_mut().lookup(url, self.clock.now_ms());
        if let Some(result) = cached {
            log::debug!("Cached result for {} (tab {})", display_host(url), tab_id);
            return EventOutcome::Cached(self.dispatcher.dispatch_result(tab_id, url, &result).await);
        }

        let html = if self.options.send_page_html {
            self.host.page_html(tab_id).await
        } else {
            None
        };
        let request = AnalyzeUrlRequest::new(url)
            .skip_db(self.options.skip_db)
            .html(html, self.options.max_html_bytes);

        log::info!("Analyzing {} (tab {})", display_host(url), tab_id);
        let response = self.api.analyze(&request).await;

        match response {
            Ok(result) => {
                self.cache
                    .borrow_mut()
                    .insert(url.to_string(), result.clone(), self.clock.now_ms());

                if self.is_superseded(tab_id, generation) {
                    log::debug!("Dropping superseded result for tab {}", tab_id);
                    return EventOutcome::Superseded;
                }
                EventOutcome::Analyzed(self.dispatcher.dispatch_result(tab_id, url, &result).await)
            }
            Err(e) => {
                log::warn!("Analysis of {} failed: {}", display_host(url), e);

                if self.is_superseded(tab_id, generation) {
                    return EventOutcome::Superseded;
                }
                EventOutcome::Failed(self.dispatcher.dispatch_failure(tab_id))
            }
        }
    }
}

impl<A, H, B, M, C> TabEventHandler for TabMonitor<A, H, B, M, C>
where
    A: AnalysisApi,
    H: TabHost,
    B: BadgeSink,
    M: PageMessenger,
    C: Clock,
{
    async fn on_url_changed(&self, tab_id: TabId, url: Option<&str>) -> EventOutcome {
        match url {
            Some(url) if self.options.enabled && is_analyzable(Some(url)) => self.analyze(tab_id, url).await,
            _ => {
                log::debug!("Skipping navigation in tab {}", tab_id);
                EventOutcome::Ignored
            }
        }
    }

    async fn on_tab_activated(&self, tab_id: TabId) -> EventOutcome {
        let url = self.host.current_url(tab_id).await;
        self.on_url_changed(tab_id, url.as_deref()).await
    }

    fn on_tab_removed(&self, tab_id: TabId) {
        self.generations.borrow_mut().remove(&tab_id);
    }
}

use analysis_core::{AnalysisError, AnalysisResult, Timeframe};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::{AnalysisOrchestrator, AnalysisStage};

/// Request-scoped view state: what a UI needs to render the analysis panel.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub request_id: u64,
    pub asset: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub stage: AnalysisStage,
    pub is_loading: bool,
    pub error: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn idle(request_id: u64) -> Self {
        Self {
            request_id,
            asset: None,
            timeframe: None,
            stage: AnalysisStage::Idle,
            is_loading: false,
            error: None,
            analysis: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
pub enum RequestOutcome {
    Completed(AnalysisResult),
    Failed(AnalysisError),
    /// A newer request (or a reset) started before this one finished; its
    /// result was dropped.
    Superseded,
}

/// One analysis panel.
///
/// Each `request` gets a new id; state updates from a request that is no
/// longer the latest are ignored, so a slow response can never overwrite a
/// newer one. Overlapping requests are allowed and are not serialised.
pub struct AnalysisSession {
    orchestrator: Arc<AnalysisOrchestrator>,
    state: watch::Sender<SessionSnapshot>,
}

impl AnalysisSession {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::idle(0));
        Self { orchestrator, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Run an analysis and publish its progress.
    ///
    /// Starting clears any previous error and result. On failure only the
    /// error message is published.
    pub async fn request(&self, asset: &str, timeframe: Timeframe) -> RequestOutcome {
        let id = self.start(|id| SessionSnapshot {
            asset: Some(asset.trim().to_string()),
            timeframe: Some(timeframe),
            is_loading: true,
            ..SessionSnapshot::idle(id)
        });

        let result = self
            .orchestrator
            .run_observed(asset, timeframe, |stage| {
                self.update_if_current(id, |snap| snap.stage = stage);
            })
            .await;

        let applied = match &result {
            Ok(analysis) => self.update_if_current(id, |snap| {
                snap.is_loading = false;
                snap.analysis = Some(analysis.clone());
            }),
            Err(e) => self.update_if_current(id, |snap| {
                snap.is_loading = false;
                snap.analysis = None;
                snap.error = Some(e.user_message());
            }),
        };

        if !applied {
            tracing::debug!("Discarding stale analysis result for request {}", id);
            return RequestOutcome::Superseded;
        }

        match result {
            Ok(analysis) => RequestOutcome::Completed(analysis),
            Err(e) => RequestOutcome::Failed(e),
        }
    }

    /// Return to idle; results of requests still in flight will be dropped.
    pub fn reset(&self) {
        self.start(SessionSnapshot::idle);
    }

    /// Take the next request id and publish `initial` under it. Both happen
    /// under the channel's write lock, so the newest id is always the one on
    /// display.
    fn start(&self, initial: impl FnOnce(u64) -> SessionSnapshot) -> u64 {
        let mut id = 0;
        self.state.send_modify(|snap| {
            id = snap.request_id + 1;
            *snap = initial(id);
        });
        id
    }

    fn update_if_current(&self, id: u64, update: impl FnOnce(&mut SessionSnapshot)) -> bool {
        self.state.send_if_modified(|snap| {
            if snap.request_id != id {
                return false;
            }
            update(snap);
            snap.updated_at = Utc::now();
            true
        })
    }
}

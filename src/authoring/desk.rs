//! Off-thread authoring requests with stale-response suppression.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use super::{PlanAuthor, PlanRequest, TargetAuthor};
use crate::error::AuthoringError;
use crate::plan::{accept_plan, AnimationPlan};
use crate::timeline::FeatureSummary;
use crate::world::{accept_target, WorldTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringKind {
    Plan,
    Target,
}

/// A validated response ready for the session
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted {
    Plan(AnimationPlan),
    Target(WorldTarget),
}

struct Response {
    kind: AuthoringKind,
    id: u64,
    /// Known track duration at request time, used for plan coverage repair
    duration: Option<f64>,
    result: Result<String, AuthoringError>,
}

/// Per-kind request bookkeeping
#[derive(Debug, Default)]
struct Lane {
    latest_id: u64,
    in_progress: bool,
    last_error: Option<String>,
}

/// Issues authoring requests on worker threads and drains their results
///
/// Every request gets an id from one increasing counter. When a response
/// arrives after a newer request of the same kind was issued, it is dropped.
pub struct AuthoringDesk {
    plan_author: Option<Arc<dyn PlanAuthor>>,
    target_author: Option<Arc<dyn TargetAuthor>>,
    tx: Sender<Response>,
    rx: Receiver<Response>,
    next_id: u64,
    plan: Lane,
    target: Lane,
}

impl AuthoringDesk {
    pub fn new(
        plan_author: Option<Arc<dyn PlanAuthor>>,
        target_author: Option<Arc<dyn TargetAuthor>>,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            plan_author,
            target_author,
            tx,
            rx,
            next_id: 0,
            plan: Lane::default(),
            target: Lane::default(),
        }
    }

    /// Desk with no authors; every request is a no-op
    pub fn disconnected() -> Self {
        Self::new(None, None)
    }

    pub fn has_plan_author(&self) -> bool {
        self.plan_author.is_some()
    }

    pub fn has_target_author(&self) -> bool {
        self.target_author.is_some()
    }

    /// Fire a plan request; returns its id, or `None` without an author
    pub fn request_plan(&mut self, request: PlanRequest) -> Option<u64> {
        let author = Arc::clone(self.plan_author.as_ref()?);
        let id = self.issue(AuthoringKind::Plan);
        let duration = request.timeline.track_info.duration;
        info!(
            "Requesting animation plan #{} ({} frames)",
            id,
            request.timeline.frames.len()
        );
        let tx = self.tx.clone();
        self.spawn(AuthoringKind::Plan, id, move || {
            let result = author.author_plan(&request);
            // Receiver gone means the session ended; nothing to deliver to
            let _ = tx.send(Response {
                kind: AuthoringKind::Plan,
                id,
                duration,
                result,
            });
        });
        Some(id)
    }

    /// Fire a target request; returns its id, or `None` without an author
    pub fn request_target(&mut self, summary: FeatureSummary) -> Option<u64> {
        let author = Arc::clone(self.target_author.as_ref()?);
        let id = self.issue(AuthoringKind::Target);
        debug!(
            "Requesting world target #{} (avg rms {:.2}, flux {:.3})",
            id, summary.avg_rms, summary.flux
        );
        let tx = self.tx.clone();
        self.spawn(AuthoringKind::Target, id, move || {
            let result = author.author_target(&summary);
            let _ = tx.send(Response {
                kind: AuthoringKind::Target,
                id,
                duration: None,
                result,
            });
        });
        Some(id)
    }

    pub fn in_progress(&self, kind: AuthoringKind) -> bool {
        self.lane(kind).in_progress
    }

    pub fn is_idle(&self) -> bool {
        !self.plan.in_progress && !self.target.in_progress
    }

    /// Message of the most recent failure of this kind
    pub fn last_error(&self, kind: AuthoringKind) -> Option<&str> {
        self.lane(kind).last_error.as_deref()
    }

    /// Drain every finished response without blocking
    pub fn poll(&mut self) -> Vec<Accepted> {
        let responses: Vec<Response> = self.rx.try_iter().collect();
        responses
            .into_iter()
            .filter_map(|response| self.settle(response))
            .collect()
    }

    /// Block until no request is in flight or `timeout` passes
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Accepted> {
        let deadline = Instant::now() + timeout;
        let mut accepted = self.poll();
        while !self.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(response) => accepted.extend(self.settle(response)),
                Err(RecvTimeoutError::Timeout) => {
                    warn!("Authoring still in progress after {:?}", timeout);
                    break;
                }
                // Unreachable while the desk holds a sender
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        accepted
    }

    fn issue(&mut self, kind: AuthoringKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let lane = self.lane_mut(kind);
        lane.latest_id = id;
        lane.in_progress = true;
        id
    }

    fn spawn<F>(&mut self, kind: AuthoringKind, id: u64, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let spawned = thread::Builder::new()
            .name(format!("authoring-{:?}-{}", kind, id).to_lowercase())
            .spawn(job);
        if let Err(e) = spawned {
            let lane = self.lane_mut(kind);
            lane.in_progress = false;
            lane.last_error = Some(format!("failed to spawn authoring worker: {}", e));
            warn!("Authoring request #{} not started: {}", id, e);
        }
    }

    /// Validate one response; `None` when stale or rejected
    fn settle(&mut self, response: Response) -> Option<Accepted> {
        let Response {
            kind,
            id,
            duration,
            result,
        } = response;
        let lane = self.lane_mut(kind);
        if id < lane.latest_id {
            debug!("Dropping stale {:?} response #{} (latest #{})", kind, id, lane.latest_id);
            return None;
        }
        lane.in_progress = false;

        let accepted = result.and_then(|raw| match kind {
            AuthoringKind::Plan => accept_plan(&raw, duration).map(Accepted::Plan),
            AuthoringKind::Target => accept_target(&raw).map(Accepted::Target),
        });

        let lane = self.lane_mut(kind);
        match accepted {
            Ok(accepted) => {
                lane.last_error = None;
                info!("Accepted {:?} response #{}", kind, id);
                Some(accepted)
            }
            Err(e) => {
                warn!("{:?} response #{} rejected: {}", kind, id, e);
                lane.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn lane(&self, kind: AuthoringKind) -> &Lane {
        match kind {
            AuthoringKind::Plan => &self.plan,
            AuthoringKind::Target => &self.target,
        }
    }

    fn lane_mut(&mut self, kind: AuthoringKind) -> &mut Lane {
        match kind {
            AuthoringKind::Plan => &mut self.plan,
            AuthoringKind::Target => &mut self.target,
        }
    }
}

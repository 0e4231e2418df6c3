//! Per-request state machine and package accumulation
//!
//! ```text
//!  query accepted
//!        |
//!        v
//!   Submitted --verify Accepted/InProgress--> Polling --+
//!        |                                      ^      | (repeat)
//!        |                                      +------+
//!        +--- verify Finished ----------------> Done      packages frozen
//!        +--- verify Failure/Rejected/Expired -> Dead     packages discarded
//! ```
//!
//! Only verify observations move a request. Done and Dead are terminal and
//! ignore anything observed afterwards.

use crate::service::{QueryResult, VerifyResult};
use crate::status::StatusRequest;
use crate::types::RequestId;
use std::collections::{HashMap, HashSet};

/// Order-preserving, de-duplicated union of two package lists
///
/// Entries of `existing` keep their positions; entries of `new` not seen
/// before are appended in their own order.
pub fn merge(existing: &[String], new: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(existing.len() + new.len());
    let mut merged = Vec::with_capacity(existing.len() + new.len());
    for id in existing.iter().chain(new) {
        if seen.insert(id.as_str()) {
            merged.push(id.clone());
        }
    }
    merged
}

/// Caller-side state of a download request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Accepted by query, not polled yet
    Submitted,
    /// Being prepared remotely
    Polling,
    /// Finished; packages are final
    Done,
    /// Terminal failure reported by the remote
    Dead(StatusRequest),
}

impl RequestState {
    /// Done or Dead
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Done | RequestState::Dead(_))
    }
}

/// A request and the packages discovered for it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    request_id: RequestId,
    state: RequestState,
    package_ids: Vec<String>,
}

impl DownloadRequest {
    /// Fresh request in [`RequestState::Submitted`]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            state: RequestState::Submitted,
            package_ids: Vec::new(),
        }
    }

    /// Request started by an accepted query
    pub fn from_query(result: &QueryResult) -> Option<Self> {
        if !result.is_accepted() {
            return None;
        }
        result.request_id.clone().map(Self::new)
    }

    /// Request identifier
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Current state
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Packages accumulated so far
    pub fn package_ids(&self) -> &[String] {
        &self.package_ids
    }

    /// Apply one verify observation, returning the resulting state
    ///
    /// Observations of other requests, non-accepted observations and anything
    /// observed after a terminal state leave the request unchanged.
    pub fn apply(&mut self, result: &VerifyResult) -> RequestState {
        if result.request_id != self.request_id {
            tracing::warn!(
                request_id = %self.request_id,
                observed = %result.request_id,
                "ignoring verify result of another request"
            );
            return self.state;
        }
        if self.state.is_terminal() || !result.is_accepted() {
            return self.state;
        }
        let Some(status_request) = result.status_request else {
            return self.state;
        };

        let previous = self.state;
        match status_request {
            StatusRequest::Accepted | StatusRequest::InProgress => {
                self.package_ids = merge(&self.package_ids, &result.package_ids);
                self.state = RequestState::Polling;
            }
            StatusRequest::Finished => {
                self.package_ids = merge(&self.package_ids, &result.package_ids);
                self.state = RequestState::Done;
            }
            StatusRequest::Failure | StatusRequest::Rejected | StatusRequest::Expired => {
                self.package_ids.clear();
                self.state = RequestState::Dead(status_request);
            }
        }

        if previous != self.state {
            tracing::debug!(
                request_id = %self.request_id,
                from = ?previous,
                to = ?self.state,
                packages = self.package_ids.len(),
                "request state changed"
            );
        }
        self.state
    }
}

/// Tracks the requests a caller is polling
#[derive(Clone, Debug, Default)]
pub struct PackageCollector {
    requests: HashMap<RequestId, DownloadRequest>,
}

impl PackageCollector {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a request; an already tracked request is kept as is
    pub fn track(&mut self, request_id: RequestId) -> &DownloadRequest {
        self.requests
            .entry(request_id.clone())
            .or_insert_with(|| DownloadRequest::new(request_id))
    }

    /// Start tracking the request of an accepted query
    pub fn track_query(&mut self, result: &QueryResult) -> Option<&DownloadRequest> {
        let request = DownloadRequest::from_query(result)?;
        Some(self.track(request.request_id))
    }

    /// Feed a verify result to its request
    ///
    /// Returns `None` when the request is not tracked.
    pub fn observe(&mut self, result: &VerifyResult) -> Option<RequestState> {
        match self.requests.get_mut(&result.request_id) {
            Some(request) => Some(request.apply(result)),
            None => {
                tracing::debug!(request_id = %result.request_id, "verify result for untracked request");
                None
            }
        }
    }

    /// Tracked request
    pub fn get(&self, request_id: &RequestId) -> Option<&DownloadRequest> {
        self.requests.get(request_id)
    }

    /// Stop tracking a request
    pub fn forget(&mut self, request_id: &RequestId) -> Option<DownloadRequest> {
        self.requests.remove(request_id)
    }

    /// Requests that have not reached a terminal state
    pub fn pending(&self) -> impl Iterator<Item = &DownloadRequest> {
        self.requests.values().filter(|r| !r.state.is_terminal())
    }

    /// Number of tracked requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

//! Plan and target authoring boundary.
//!
//! Authors turn a request into a raw JSON response. They may be slow and may
//! fail; the [`AuthoringDesk`] runs them off the tick thread and validates
//! whatever comes back before anything reaches the session.

mod desk;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::AuthoringError;
use crate::timeline::{AudioTimeline, FeatureSummary};

pub use desk::{Accepted, AuthoringDesk, AuthoringKind};

/// Request body for plan authoring
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub timeline: AudioTimeline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_hint: Option<String>,
}

/// Produces a raw animation plan response
pub trait PlanAuthor: Send + Sync {
    fn author_plan(&self, request: &PlanRequest) -> Result<String, AuthoringError>;
}

/// Produces a raw world target response
pub trait TargetAuthor: Send + Sync {
    fn author_target(&self, summary: &FeatureSummary) -> Result<String, AuthoringError>;
}

/// Answers every request with the contents of a file
///
/// The file is re-read per request, so it can be edited while a session runs.
#[derive(Debug, Clone)]
pub struct FileAuthor {
    path: PathBuf,
}

impl FileAuthor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, AuthoringError> {
        debug!("Reading authoring response from {:?}", self.path);
        fs::read_to_string(&self.path)
            .map_err(|e| AuthoringError::Transport(format!("{}: {}", self.path.display(), e)))
    }
}

impl PlanAuthor for FileAuthor {
    fn author_plan(&self, _request: &PlanRequest) -> Result<String, AuthoringError> {
        self.read()
    }
}

impl TargetAuthor for FileAuthor {
    fn author_target(&self, _summary: &FeatureSummary) -> Result<String, AuthoringError> {
        self.read()
    }
}

/// Wraps a closure as an author
pub struct FnAuthor<F>(pub F);

impl<F> PlanAuthor for FnAuthor<F>
where
    F: Fn(&PlanRequest) -> Result<String, AuthoringError> + Send + Sync,
{
    fn author_plan(&self, request: &PlanRequest) -> Result<String, AuthoringError> {
        (self.0)(request)
    }
}

impl<F> TargetAuthor for FnAuthor<F>
where
    F: Fn(&FeatureSummary) -> Result<String, AuthoringError> + Send + Sync,
{
    fn author_target(&self, summary: &FeatureSummary) -> Result<String, AuthoringError> {
        (self.0)(summary)
    }
}

/*!
 * Job status tracking.
 *
 * One job structures one source document. Status progression is a
 * strict linear machine; an illegal transition is a validation error,
 * never a silent state change.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The linear pipeline stages, in order, plus the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Ocr,
    Parsing,
    Refining,
    Translating,
    Exporting,
    Complete,
    Error,
}

impl JobStatus {
    /// Pipeline position; terminal states share the last slot.
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Ocr => 1,
            Self::Parsing => 2,
            Self::Refining => 3,
            Self::Translating => 4,
            Self::Exporting => 5,
            Self::Complete | Self::Error => 6,
        }
    }

    /// Whether the machine allows moving from `self` to `next`.
    ///
    /// Forward moves may skip stages (a job with no refinement pass
    /// jumps straight to translating); `Error` is reachable from any
    /// non-terminal state; nothing leaves a terminal state.
    pub fn can_transition(self, next: JobStatus) -> bool {
        if self == Self::Complete || self == Self::Error {
            return false;
        }
        if next == Self::Error {
            return true;
        }
        next.rank() > self.rank()
    }

    /// Whether this is a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Ocr => "ocr",
            Self::Parsing => "parsing",
            Self::Refining => "refining",
            Self::Translating => "translating",
            Self::Exporting => "exporting",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// An illegal status transition.
#[derive(Error, Debug, PartialEq)]
#[error("Illegal job transition: {from} -> {to}")]
pub struct TransitionError {
    /// Current status
    pub from: JobStatus,
    /// Attempted status
    pub to: JobStatus,
}

/// Bookkeeping record for one structuring job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job id
    pub id: Uuid,
    /// Book slug this job produces
    pub slug: String,
    /// Current status
    pub status: JobStatus,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Last status change
    pub updated: DateTime<Utc>,
    /// Error message when status is Error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    /// Create a pending job for a slug.
    pub fn new(slug: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            status: JobStatus::Pending,
            created: now,
            updated: now,
            error: None,
        }
    }

    /// Advance to the next status, enforcing the transition table.
    pub fn advance(&mut self, next: JobStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated = Utc::now();
        Ok(())
    }

    /// Move to the error state with a message.
    pub fn fail(&mut self, message: &str) -> Result<(), TransitionError> {
        self.advance(JobStatus::Error)?;
        self.error = Some(message.to_string());
        Ok(())
    }
}

/// Task status definitions for tracking a remote crawl job
///
/// Status only ever moves forward: `Created -> InProgress -> {Complete, TimedOut}`,
/// and `Failed` is reachable from both non-terminal states.
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    // ===== Active States =====
    /// Task has been accepted by the provider but not yet started locally
    Created,

    /// Task is running on the provider side and being polled
    InProgress,

    // ===== Terminal States =====
    /// Provider reported the task as ready and the report was produced
    Complete,

    /// Submission or result retrieval failed permanently
    Failed,

    /// The poll attempt budget ran out before the task was ready
    TimedOut,
}

impl TaskStatus {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::TimedOut)
    }

    /// Returns true if the task may still progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if moving from `self` to `next` is a legal forward transition
    ///
    /// Staying in the same state is always allowed and treated as a no-op.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Self::Created, Self::InProgress)
                | (Self::Created, Self::Failed)
                | (Self::InProgress, Self::Complete)
                | (Self::InProgress, Self::TimedOut)
                | (Self::InProgress, Self::Failed)
        )
    }

    /// Converts the status to its storage string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::InProgress => "in_progress",
            Self::Complete => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Parses a status from its storage string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Complete),
            "failed" => Some(Self::Failed),
            "timed_out" => Some(Self::TimedOut),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

//! Approval decision vocabulary for the review flow.
//!
//! There is no transition guard: approving an approved draft rewrites the
//! same status, and a rejection can follow an approval.

use serde::Serialize;

use crate::content::{STATUS_APPROVED, STATUS_REJECTED};

/// Where the client returns after a decision.
pub const REDIRECT_PATH: &str = "/content-blueprint";

/// Default pause before the redirect so the success message stays visible.
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Status tag written to the draft.
    pub fn status(self) -> &'static str {
        match self {
            Decision::Approve => STATUS_APPROVED,
            Decision::Reject => STATUS_REJECTED,
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Decision::Approve => "Content approved! Redirecting...",
            Decision::Reject => "Content rejected. Redirecting...",
        }
    }
}

/// Client navigation instruction returned with a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: &'static str,
    pub after_ms: u64,
}

impl Redirect {
    pub fn after_decision(delay_ms: u64) -> Self {
        Self {
            to: REDIRECT_PATH,
            after_ms: delay_ms,
        }
    }
}

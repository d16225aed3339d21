//! Run data model: what the search produces, what each attempt yields, and
//! the summary reported at the end of a run.
use serde::{Serialize, Serializer};
use std::fmt;

/// A job posting discovered on the search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCandidate {
    pub title: String,
    pub url: String,
}

impl JobCandidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Why a candidate did not end in an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoEasyApply,
    ApplyNotClickable,
    CouldNotSubmit,
    Error(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoEasyApply => f.write_str("No Easy Apply"),
            SkipReason::ApplyNotClickable => f.write_str("Apply button not clickable"),
            SkipReason::CouldNotSubmit => f.write_str("Could not submit"),
            SkipReason::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one apply attempt. Every considered candidate yields exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Applied {
        title: String,
        url: String,
    },
    Skipped {
        title: String,
        url: String,
        reason: SkipReason,
    },
}

impl AttemptOutcome {
    pub fn applied(job: JobCandidate) -> Self {
        Self::Applied {
            title: job.title,
            url: job.url,
        }
    }

    pub fn skipped(job: JobCandidate, reason: SkipReason) -> Self {
        Self::Skipped {
            title: job.title,
            url: job.url,
            reason,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedJob {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedJob {
    pub title: String,
    pub url: String,
    pub reason: SkipReason,
}

/// Outcomes accumulated while a run is in progress.
///
/// The only way to obtain a [`RunSummary`], so `totalTried` always equals the
/// number of recorded outcomes.
#[derive(Debug, Default)]
pub struct RunState {
    applied: Vec<AppliedJob>,
    skipped: Vec<SkippedJob>,
}

impl RunState {
    pub fn record(&mut self, outcome: AttemptOutcome) {
        match outcome {
            AttemptOutcome::Applied { title, url } => {
                self.applied.push(AppliedJob { title, url });
            }
            AttemptOutcome::Skipped { title, url, reason } => {
                self.skipped.push(SkippedJob { title, url, reason });
            }
        }
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn into_summary(self, keywords: impl Into<String>, location: impl Into<String>) -> RunSummary {
        let total_tried = self.applied.len() + self.skipped.len();
        RunSummary {
            keywords: keywords.into(),
            location: location.into(),
            applied: self.applied,
            skipped: self.skipped,
            total_tried,
        }
    }
}

/// Final report of a run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    keywords: String,
    location: String,
    applied: Vec<AppliedJob>,
    skipped: Vec<SkippedJob>,
    #[serde(rename = "totalTried")]
    total_tried: usize,
}

impl RunSummary {
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn applied(&self) -> &[AppliedJob] {
        &self.applied
    }

    pub fn skipped(&self) -> &[SkippedJob] {
        &self.skipped
    }

    pub fn total_tried(&self) -> usize {
        self.total_tried
    }

    /// Pretty JSON rendering printed at the end of a run.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

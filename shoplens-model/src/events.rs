use chrono::{DateTime, Utc};

/// Kinds of rows in the append-only check log.
///
/// The string forms are the on-disk vocabulary of the `events` table and
/// must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    AnalysisStarted,
    AnalysisSucceeded,
    AnalysisFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AnalysisStarted => "analysis_started",
            EventKind::AnalysisSucceeded => "analysis_succeeded",
            EventKind::AnalysisFailed => "analysis_failed",
        }
    }

    /// Parse the stored string form. Unknown strings yield `None`; readers
    /// treat those rows as still in progress rather than failing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "analysis_started" => Some(EventKind::AnalysisStarted),
            "analysis_succeeded" => Some(EventKind::AnalysisSucceeded),
            "analysis_failed" => Some(EventKind::AnalysisFailed),
            _ => None,
        }
    }

    /// Whether this kind ends a check.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::AnalysisSucceeded | EventKind::AnalysisFailed
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only check log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredEvent {
    pub id: i64,
    pub domain: String,
    /// Raw stored kind; see [`StoredEvent::kind`] for the typed view.
    pub event_type: String,
    pub recorded_at: DateTime<Utc>,
    /// JSON payload text as written by the detector, if any.
    pub payload: Option<String>,
}

impl StoredEvent {
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }
}

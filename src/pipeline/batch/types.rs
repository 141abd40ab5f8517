//! Core types for the quarterly report batch.

use serde::{Deserialize, Serialize};

use crate::models::ResultSet;

// ═══════════════════════════════════════════
// Notices
// ═══════════════════════════════════════════

/// Why a document (or the summary step) produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The PDF could not be opened or parsed.
    Extraction,
    /// The PDF opened but contained no text; the model was not called.
    EmptyText,
    /// The model call failed (transport, auth, quota).
    ModelInvocation,
    /// The model answered but its output was not a JSON object.
    MalformedResponse,
    /// Summary generation failed; per-document results are unaffected.
    Summary,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::EmptyText => "empty_text",
            Self::ModelInvocation => "model_invocation",
            Self::MalformedResponse => "malformed_response",
            Self::Summary => "summary",
        }
    }
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-visible failure notice for one skipped document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNotice {
    pub label: String,
    pub kind: NoticeKind,
    pub message: String,
}

impl BatchNotice {
    pub fn new(label: &str, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BatchNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

// ═══════════════════════════════════════════
// Batch Result
// ═══════════════════════════════════════════

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: ResultSet,
    /// `None` when there were no results or the summary call failed.
    pub summary: Option<String>,
    pub notices: Vec<BatchNotice>,
    pub documents_total: usize,
    pub duration_ms: u64,
}

impl BatchOutcome {
    /// Documents that produced a notice. A result replaced by a later
    /// document with the same label still counts as analyzed.
    pub fn documents_failed(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| n.kind != NoticeKind::Summary)
            .count()
    }

    pub fn documents_analyzed(&self) -> usize {
        self.documents_total.saturating_sub(self.documents_failed())
    }

    pub fn is_complete_success(&self) -> bool {
        self.documents_total > 0 && self.documents_failed() == 0
    }
}

// ═══════════════════════════════════════════
// Batch Status Events
// ═══════════════════════════════════════════

/// Progress emitted while a batch runs. Fractions never decrease within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchStatusEvent {
    Started {
        document_count: usize,
    },
    Progress {
        fraction: f32,
        label: String,
    },
    Completed {
        results: usize,
        notices: usize,
        duration_ms: u64,
    },
}

impl BatchStatusEvent {
    /// Progress in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Started { .. } => 0.0,
            Self::Progress { fraction, .. } => *fraction,
            Self::Completed { .. } => 1.0,
        }
    }

    /// Short status text for display.
    pub fn label(&self) -> String {
        match self {
            Self::Started { document_count } => {
                format!("Starting analysis of {document_count} reports...")
            }
            Self::Progress { label, .. } => label.clone(),
            Self::Completed { .. } => "Done!".to_string(),
        }
    }
}

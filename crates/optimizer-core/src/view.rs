//! Presentation state for the single-page form.
//!
//! `ViewState` owns the form values, the pending/error/result phase and the
//! copy confirmation. Every transition the UI can make goes through it, so
//! the front-end only reads state and forwards events.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{RequestParameters, StructuredResult};

/// The only message a user ever sees for a failed submission.
pub const GENERIC_ERROR: &str =
    "Failed to generate prompt. Please check the console for more details.";
pub const PLACEHOLDER_TEXT: &str = "Your optimized prompt will appear here.";
pub const SUBMIT_LABEL: &str = "Generate Optimized Prompt";
pub const PENDING_LABEL: &str = "Optimizing...";
pub const COPY_LABEL: &str = "Copiar prompt";
pub const COPIED_LABEL: &str = "Copiado!";
/// How long the copy confirmation stays visible.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Pending,
    Failed { message: String },
    Ready { result: StructuredResult },
}

/// What the output area shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputPanel<'a> {
    Placeholder(&'static str),
    Loading,
    Error(&'a str),
    Result(&'a StructuredResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("the original prompt is required")]
    IncompleteInput,
    #[error("a submission is already in progress")]
    AlreadyPending,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub form: RequestParameters,
    phase: Phase,
    #[serde(skip)]
    copied_at: Option<Instant>,
}

impl ViewState {
    pub fn new(form: RequestParameters) -> Self {
        Self {
            form,
            phase: Phase::Idle,
            copied_at: None,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending)
    }

    /// The submit control is disabled while a call is in flight.
    pub fn submit_enabled(&self) -> bool {
        !self.is_pending()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_pending() {
            PENDING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Enter the pending phase, clearing any previous error or result.
    pub fn begin_submit(&mut self) -> Result<(), SubmitRejected> {
        if self.is_pending() {
            return Err(SubmitRejected::AlreadyPending);
        }
        if !self.form.is_complete() {
            return Err(SubmitRejected::IncompleteInput);
        }
        self.phase = Phase::Pending;
        self.copied_at = None;
        Ok(())
    }

    pub fn finish_success(&mut self, result: StructuredResult) {
        if !self.is_pending() {
            tracing::warn!("dropping result that arrived with no submission pending");
            return;
        }
        self.phase = Phase::Ready { result };
    }

    pub fn finish_failure(&mut self) {
        if !self.is_pending() {
            tracing::warn!("dropping failure that arrived with no submission pending");
            return;
        }
        self.phase = Phase::Failed {
            message: GENERIC_ERROR.to_string(),
        };
    }

    pub fn result(&self) -> Option<&StructuredResult> {
        match &self.phase {
            Phase::Ready { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn output(&self) -> OutputPanel<'_> {
        match &self.phase {
            Phase::Idle => OutputPanel::Placeholder(PLACEHOLDER_TEXT),
            Phase::Pending => OutputPanel::Loading,
            Phase::Failed { message } => OutputPanel::Error(message),
            Phase::Ready { result } => OutputPanel::Result(result),
        }
    }

    /// The copy control only exists next to a rendered code block.
    pub fn copy_payload(&self) -> Option<&str> {
        self.result()
            .filter(|r| r.has_code_block())?
            .copy_payload()
    }

    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn copy_label(&self, now: Instant) -> &'static str {
        match self.copied_at {
            Some(at) if now.saturating_duration_since(at) < COPY_FEEDBACK => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }
}

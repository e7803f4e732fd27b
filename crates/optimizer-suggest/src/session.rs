use std::time::Instant;

use optimizer_core::view::{SubmitRejected, ViewState};
use optimizer_core::RequestParameters;

use crate::engine::Generator;

#[derive(Debug, thiserror::Error)]
#[error("clipboard: {0}")]
pub struct ClipboardError(pub String);

/// Destination for the copy action.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Drives one form through submit and copy, keeping the view state in step.
#[derive(Debug, Default)]
pub struct Session {
    view: ViewState,
}

impl Session {
    pub fn new(form: RequestParameters) -> Self {
        Self {
            view: ViewState::new(form),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn form_mut(&mut self) -> &mut RequestParameters {
        &mut self.view.form
    }

    /// Run one submission. Rejected submissions never reach the generator;
    /// every accepted one ends in either a result or the generic error.
    pub async fn submit(&mut self, generator: &dyn Generator) -> Result<(), SubmitRejected> {
        self.view.begin_submit()?;
        match crate::optimize(&self.view.form, generator).await {
            Ok(result) => {
                tracing::info!(items = result.items.len(), "optimized prompt ready");
                self.view.finish_success(result);
            }
            Err(e) => {
                tracing::error!(error = %e, "prompt optimization failed");
                self.view.finish_failure();
            }
        }
        Ok(())
    }

    /// Copy the first copy action's payload. Returns whether anything was copied.
    pub fn copy(
        &mut self,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<bool, ClipboardError> {
        let Some(payload) = self.view.copy_payload() else {
            return Ok(false);
        };
        clipboard.set_text(payload)?;
        self.view.mark_copied(now);
        Ok(true)
    }
}

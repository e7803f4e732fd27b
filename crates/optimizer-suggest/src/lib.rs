pub mod engine;
mod parse;
pub mod prompt;
pub mod render;
pub mod schema;
pub mod session;

use optimizer_core::{RequestParameters, StructuredResult};

pub use engine::{GenerateError, Generator, LlmGenerator};
pub use parse::parse_result;
pub use render::{render, Block, ResultPanel};
pub use session::{Clipboard, ClipboardError, Session};

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("response is not a valid result: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Compose the request, make one generation call and parse the reply.
pub async fn optimize(
    params: &RequestParameters,
    generator: &dyn Generator,
) -> Result<StructuredResult, OptimizeError> {
    let system = prompt::system_prompt();
    let user_msg = prompt::user_message(params);

    tracing::debug!(target_model = %params.target_model, "composed optimization request");

    let raw = generator
        .generate(system, &user_msg, &schema::response_schema())
        .await?;
    tracing::debug!(bytes = raw.len(), "raw generator output received");

    Ok(parse::parse_result(&raw)?)
}

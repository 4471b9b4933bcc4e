//! Structured generation — the one pipeline every document generator runs through.
//!
//! Flow: fill prompt template → TextGenerator (retries 429/503) → extract_json →
//!       normalize against the document shape → Normalized<T> with provenance.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::normalize::{Normalized, Provenance, ShapeError};
use crate::llm_client::extract::{extract_json, ExtractError};
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::{LlmError, TextGenerator};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// User-facing message shared by every generation failure.
pub const GENERATION_FAILED_MESSAGE: &str = "Generation failed, please try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    Letter,
    PresentationOutline,
    Presentation,
    AtsScore,
    Diagram,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::Letter => "letter",
            DocumentKind::PresentationOutline => "presentation_outline",
            DocumentKind::Presentation => "presentation",
            DocumentKind::AtsScore => "ats_score",
            DocumentKind::Diagram => "diagram",
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model output could not be parsed: {0}")]
    Parse(#[from] ExtractError),

    #[error("model output has the wrong shape: {0}")]
    Validation(#[from] ShapeError),
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Llm(LlmError::RateLimited { .. }) => "LLM_RATE_LIMITED",
            GenerationError::Llm(LlmError::Overloaded { .. }) => "LLM_OVERLOADED",
            GenerationError::Llm(_) => "LLM_ERROR",
            GenerationError::Parse(_) => "GENERATION_PARSE_ERROR",
            GenerationError::Validation(_) => "GENERATION_SHAPE_ERROR",
        }
    }

    /// Only transient upstream failures are worth retrying from the client side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Llm(e) if e.is_transient())
    }
}

/// A document type the model can produce.
///
/// Implementors own their prompt and their defaults; `generate_structured` owns the flow.
pub trait StructuredDocument: Sized + Serialize {
    type Request: Sync;

    const KIND: DocumentKind;
    /// Role description placed in front of the JSON-only system rules.
    const ROLE: &'static str;

    fn build_prompt(request: &Self::Request) -> String;

    fn normalize(
        value: &Value,
        request: &Self::Request,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError>;

    fn title(&self) -> String;
}

/// Replaces each `{name}` placeholder in `template` with its value, in a single pass.
/// Substituted values are never rescanned; unknown placeholders are left as written.
pub fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match fields.iter().find(|(key, _)| *key == name) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Builds the prompt, calls the model, extracts JSON, and normalizes it into `D`.
pub async fn generate_structured<D: StructuredDocument>(
    generator: &dyn TextGenerator,
    request: &D::Request,
) -> Result<Normalized<D>, GenerationError> {
    let kind = D::KIND.as_str();
    let prompt = D::build_prompt(request);
    let system = system_prompt(D::ROLE);

    info!("Generating {kind} ({} prompt chars)", prompt.len());
    let text = generator.generate(&prompt, &system).await?;

    let value = extract_json(&text).map_err(|e| {
        warn!(
            "Unparseable {kind} output: {e}; head={:?}",
            text.chars().take(120).collect::<String>()
        );
        e
    })?;

    let mut provenance = Provenance::default();
    let document = D::normalize(&value, request, &mut provenance)?;

    if !provenance.is_empty() {
        warn!(
            "{kind}: substituted defaults for {} field(s)",
            provenance.len()
        );
    }

    Ok(Normalized::new(document, provenance))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Replays canned replies in order and records the prompts it was given.
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::normalize::{Fields, Provenance, ShapeError};
use crate::generation::prompts::{LETTER_PROMPT_TEMPLATE, LETTER_ROLE};
use crate::generation::structured::{fill_template, DocumentKind, StructuredDocument};
use crate::llm_client::prompts::COMPLETENESS_INSTRUCTION;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterType {
    #[default]
    Cover,
    Resignation,
    Recommendation,
    Business,
    Personal,
}

impl LetterType {
    fn label(&self) -> &'static str {
        match self {
            LetterType::Cover => "cover",
            LetterType::Resignation => "resignation",
            LetterType::Recommendation => "recommendation",
            LetterType::Business => "business",
            LetterType::Personal => "personal",
        }
    }

    fn default_subject(&self) -> &'static str {
        match self {
            LetterType::Cover => "Application for the Open Position",
            LetterType::Resignation => "Letter of Resignation",
            LetterType::Recommendation => "Letter of Recommendation",
            LetterType::Business => "Business Correspondence",
            LetterType::Personal => "A Personal Note",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LetterRequest {
    pub from_name: String,
    #[serde(default)]
    pub to_name: Option<String>,
    #[serde(default)]
    pub to_company: Option<String>,
    #[serde(default)]
    pub letter_type: LetterType,
    pub prompt: String,
}

impl LetterRequest {
    fn recipient(&self) -> &str {
        self.to_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Hiring Manager")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letter {
    pub letter_type: LetterType,
    pub subject: String,
    pub greeting: String,
    pub body: Vec<String>,
    pub closing: String,
    pub signature: String,
}

impl StructuredDocument for Letter {
    type Request = LetterRequest;

    const KIND: DocumentKind = DocumentKind::Letter;
    const ROLE: &'static str = LETTER_ROLE;

    fn build_prompt(request: &LetterRequest) -> String {
        fill_template(
            LETTER_PROMPT_TEMPLATE,
            &[
                ("letter_type", request.letter_type.label()),
                ("from_name", request.from_name.trim()),
                ("to_name", request.recipient()),
                (
                    "to_company",
                    request.to_company.as_deref().unwrap_or("Not specified"),
                ),
                ("prompt", request.prompt.trim()),
                ("completeness", COMPLETENESS_INSTRUCTION),
            ],
        )
    }

    fn normalize(
        value: &Value,
        request: &LetterRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let fields = Fields::root(value)?;

        let body = match body_paragraphs(&fields) {
            paragraphs if !paragraphs.is_empty() => paragraphs,
            _ => {
                provenance.record("body");
                vec![format!(
                    "I am writing to you regarding the following: {}",
                    request.prompt.trim()
                )]
            }
        };

        Ok(Letter {
            letter_type: request.letter_type,
            subject: fields.text(provenance, "subject", request.letter_type.default_subject()),
            greeting: fields.text(
                provenance,
                "greeting",
                &format!("Dear {},", request.recipient()),
            ),
            body,
            closing: fields.text(provenance, "closing", "Sincerely,"),
            signature: fields.text(provenance, "signature", request.from_name.trim()),
        })
    }

    fn title(&self) -> String {
        self.subject.clone()
    }
}

/// Paragraphs arrive as an array under `body`, or as one string under `body` or
/// `content` with blank lines between paragraphs.
fn body_paragraphs(fields: &Fields<'_>) -> Vec<String> {
    for key in ["body", "content"] {
        match fields.get(key) {
            Some(Value::Array(_)) => {
                let items = fields.optional_text_list(key);
                if !items.is_empty() {
                    return items;
                }
            }
            Some(Value::String(text)) => {
                let paragraphs: Vec<String> = text
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
                if !paragraphs.is_empty() {
                    return paragraphs;
                }
            }
            _ => {}
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> LetterRequest {
        LetterRequest {
            from_name: "Grace Hopper".to_string(),
            to_name: None,
            to_company: Some("Navy Labs".to_string()),
            letter_type: LetterType::Cover,
            prompt: "Applying for the compiler engineer role".to_string(),
        }
    }

    #[test]
    fn test_letter_type_defaults_to_cover() {
        let request: LetterRequest = serde_json::from_value(json!({
            "from_name": "Grace", "prompt": "hello"
        }))
        .unwrap();
        assert_eq!(request.letter_type, LetterType::Cover);
        assert_eq!(request.recipient(), "Hiring Manager");
    }

    #[test]
    fn test_prompt_names_sender_and_recipient() {
        let prompt = Letter::build_prompt(&request());
        assert!(prompt.contains("FROM: Grace Hopper"));
        assert!(prompt.contains("TO: Hiring Manager"));
        assert!(prompt.contains("ORGANISATION: Navy Labs"));
        assert!(prompt.starts_with("Write a cover letter."));
    }

    #[test]
    fn test_content_string_is_split_into_paragraphs() {
        let mut provenance = Provenance::default();
        let letter = Letter::normalize(
            &json!({
                "subject": "Compiler Engineer",
                "greeting": "Dear Team,",
                "content": "First.\n\nSecond.\n\n\nThird.",
                "closing": "Best regards,",
                "signature": "Grace"
            }),
            &request(),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(letter.body, vec!["First.", "Second.", "Third."]);
        assert!(provenance.is_empty());
    }

    #[test]
    fn test_empty_reply_gets_deterministic_defaults() {
        let mut provenance = Provenance::default();
        let letter = Letter::normalize(&json!({}), &request(), &mut provenance).unwrap();
        assert_eq!(letter.greeting, "Dear Hiring Manager,");
        assert_eq!(letter.signature, "Grace Hopper");
        assert_eq!(letter.closing, "Sincerely,");
        assert_eq!(letter.subject, "Application for the Open Position");
        assert_eq!(letter.body.len(), 1);
        assert_eq!(
            provenance.into_fields(),
            vec!["body", "closing", "greeting", "signature", "subject"]
        );
    }
}

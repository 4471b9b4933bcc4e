//! ATS scoring — how well a resume would survive keyword screening for a given job.
//!
//! The model does the judgement. `keyword_overlap` is a pure, deterministic keyword
//! match used to fill the score and keyword lists whenever the model leaves them out.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::normalize::{Fields, ItemFields, Provenance, ShapeError};
use crate::generation::prompts::{ATS_PROMPT_TEMPLATE, ATS_ROLE};
use crate::generation::structured::{fill_template, DocumentKind, StructuredDocument};
use crate::llm_client::prompts::COMPLETENESS_INSTRUCTION;

/// How many of the most frequent job-description terms the local analysis checks.
const MAX_KEYWORDS: usize = 20;

const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Mirror the exact skill and tool names used in the job description.",
    "Quantify achievements with numbers, percentages, or timeframes.",
    "Use standard section headings such as Experience, Education, and Skills.",
];

const STOPWORDS: &[&str] = &[
    "about", "above", "across", "after", "all", "also", "and", "any", "are", "based", "been",
    "being", "both", "but", "can", "candidate", "company", "could", "each", "etc", "experience",
    "for", "from", "have", "help", "highly", "including", "into", "its", "join", "knowledge",
    "looking", "more", "must", "new", "not", "our", "own", "plus", "preferred", "required",
    "role", "should", "skills", "strong", "such", "team", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "using", "well", "were",
    "what", "when", "where", "which", "who", "will", "with", "work", "working", "would", "year",
    "years", "you", "your",
];

#[derive(Debug, Clone, Deserialize)]
pub struct AtsRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionScore {
    pub section: String,
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsScore {
    pub overall_score: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub section_scores: Vec<SectionScore>,
    pub suggestions: Vec<String>,
}

/// Result of the local keyword match.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordOverlap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl KeywordOverlap {
    /// Share of checked keywords present in the resume, 0–100.
    pub fn score(&self) -> u8 {
        let total = self.matched.len() + self.missing.len();
        if total == 0 {
            return 0;
        }
        ((self.matched.len() * 100) as f64 / total as f64).round() as u8
    }
}

impl StructuredDocument for AtsScore {
    type Request = AtsRequest;

    const KIND: DocumentKind = DocumentKind::AtsScore;
    const ROLE: &'static str = ATS_ROLE;

    fn build_prompt(request: &AtsRequest) -> String {
        fill_template(
            ATS_PROMPT_TEMPLATE,
            &[
                ("job_description", request.job_description.trim()),
                ("resume_text", request.resume_text.trim()),
                ("completeness", COMPLETENESS_INSTRUCTION),
            ],
        )
    }

    fn normalize(
        value: &Value,
        request: &AtsRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let fields = Fields::root(value)?;
        let local = keyword_overlap(&request.resume_text, &request.job_description);

        let overall_score = match fields.optional_integer("overall_score") {
            Some(score) => clamp_score(score),
            None => {
                provenance.record("overall_score");
                local.score()
            }
        };

        let matched_keywords = keywords_or(&fields, provenance, "matched_keywords", &local.matched);
        let missing_keywords = keywords_or(&fields, provenance, "missing_keywords", &local.missing);

        Ok(AtsScore {
            overall_score,
            matched_keywords,
            missing_keywords,
            section_scores: fields.records(
                provenance,
                "section_scores",
                normalize_section,
                Vec::new,
            ),
            suggestions: fields.text_list(provenance, "suggestions", DEFAULT_SUGGESTIONS),
        })
    }

    fn title(&self) -> String {
        format!("ATS Score {}/100", self.overall_score)
    }
}

fn normalize_section(item: &ItemFields<'_>, provenance: &mut Provenance) -> SectionScore {
    SectionScore {
        section: item.text(provenance, "section", "general"),
        score: clamp_score(item.integer(provenance, "score", 0)),
        feedback: item.text(provenance, "feedback", "No feedback provided."),
    }
}

fn keywords_or(
    fields: &Fields<'_>,
    provenance: &mut Provenance,
    key: &str,
    fallback: &[String],
) -> Vec<String> {
    // An explicit empty array is a valid answer (nothing missing, nothing matched).
    if let Some(Value::Array(_)) = fields.get(key) {
        return fields.optional_text_list(key);
    }
    provenance.record(key);
    fallback.to_vec()
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| t.chars().count() >= 2)
}

/// Deterministic keyword match: the most frequent non-stopword terms of the job
/// description (ties broken alphabetically), split by presence in the resume.
pub fn keyword_overlap(resume_text: &str, job_description: &str) -> KeywordOverlap {
    let stopwords: HashSet<&str> = STOPWORDS.iter().copied().collect();

    let mut frequency: HashMap<String, usize> = HashMap::new();
    for token in tokenize(job_description) {
        let is_short_word = token.chars().count() < 3 && !token.contains(|c: char| c == '+' || c == '#');
        if stopwords.contains(token.as_str()) || is_short_word || token.parse::<f64>().is_ok() {
            continue;
        }
        *frequency.entry(token).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let resume_tokens: BTreeSet<String> = tokenize(resume_text).collect();
    let (matched, missing): (Vec<String>, Vec<String>) = ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(keyword, _)| keyword)
        .partition(|keyword| resume_tokens.contains(keyword));

    KeywordOverlap { matched, missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JD: &str = "Senior Rust Engineer. Required: Rust, Kubernetes, PostgreSQL. \
        You will design Rust services on Kubernetes. C++ a plus.";
    const RESUME: &str = "Backend engineer. Built Rust services and PostgreSQL schemas.";

    fn request() -> AtsRequest {
        AtsRequest {
            resume_text: RESUME.to_string(),
            job_description: JD.to_string(),
        }
    }

    #[test]
    fn test_keyword_overlap_ranks_by_frequency() {
        let overlap = keyword_overlap(RESUME, JD);
        assert_eq!(overlap.matched.first().map(String::as_str), Some("rust"));
        assert!(overlap.matched.contains(&"postgresql".to_string()));
        assert!(overlap.missing.contains(&"kubernetes".to_string()));
        assert!(overlap.missing.contains(&"c++".to_string()));
        assert!(!overlap.missing.contains(&"required".to_string()));
    }

    #[test]
    fn test_keyword_overlap_is_deterministic() {
        assert_eq!(keyword_overlap(RESUME, JD), keyword_overlap(RESUME, JD));
    }

    #[test]
    fn test_overlap_score_of_nothing_is_zero() {
        assert_eq!(keyword_overlap("anything", "").score(), 0);
    }

    #[test]
    fn test_model_score_is_clamped() {
        let mut provenance = Provenance::default();
        let score = AtsScore::normalize(
            &json!({
                "overall_score": 140,
                "matched_keywords": ["rust"],
                "missing_keywords": [],
                "section_scores": [{"section": "skills", "score": "-5", "feedback": "thin"}],
                "suggestions": ["Add Kubernetes"]
            }),
            &request(),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(score.overall_score, 100);
        assert_eq!(score.section_scores[0].score, 0);
        assert_eq!(score.section_scores[0].feedback, "thin");
        assert!(score.missing_keywords.is_empty());
        assert!(provenance.is_empty());
    }

    #[test]
    fn test_missing_fields_fall_back_to_local_analysis() {
        let mut provenance = Provenance::default();
        let score = AtsScore::normalize(&json!({}), &request(), &mut provenance).unwrap();
        let local = keyword_overlap(RESUME, JD);
        assert_eq!(score.overall_score, local.score());
        assert_eq!(score.matched_keywords, local.matched);
        assert_eq!(score.missing_keywords, local.missing);
        assert_eq!(score.suggestions.len(), DEFAULT_SUGGESTIONS.len());
        assert!(provenance.is_defaulted("overall_score"));
        assert!(provenance.is_defaulted("matched_keywords"));
        assert!(provenance.is_defaulted("section_scores"));
    }

    #[test]
    fn test_missing_section_feedback_is_recorded() {
        let mut provenance = Provenance::default();
        let score = AtsScore::normalize(
            &json!({
                "overall_score": 70, "matched_keywords": [], "missing_keywords": [],
                "section_scores": [{"section": "skills", "score": 80}],
                "suggestions": ["Add metrics"]
            }),
            &request(),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(score.section_scores[0].feedback, "No feedback provided.");
        assert_eq!(provenance.into_fields(), vec!["section_scores[0].feedback"]);
    }

    #[test]
    fn test_title_shows_score() {
        let mut provenance = Provenance::default();
        let score =
            AtsScore::normalize(&json!({"overall_score": "72%"}), &request(), &mut provenance)
                .unwrap();
        assert_eq!(score.title(), "ATS Score 72/100");
    }
}

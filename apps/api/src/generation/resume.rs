//! Resume generation — free-text background in, ATS-friendly structured resume out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::normalize::{Fields, ItemFields, Provenance, ShapeError};
use crate::generation::prompts::{RESUME_PROMPT_TEMPLATE, RESUME_ROLE};
use crate::generation::structured::{fill_template, DocumentKind, StructuredDocument};
use crate::llm_client::prompts::{COMPLETENESS_INSTRUCTION, FACTUALITY_INSTRUCTION};

const DEFAULT_TECHNICAL: &[&str] = &["Problem Solving", "System Design", "Technical Documentation"];
const DEFAULT_PROGRAMMING: &[&str] = &["JavaScript", "Python", "SQL"];
const DEFAULT_TOOLS: &[&str] = &["Git", "VS Code", "Jira"];
const DEFAULT_SOFT: &[&str] = &["Communication", "Teamwork", "Leadership", "Time Management"];
const DEFAULT_BULLETS: &[&str] = &[
    "Delivered key projects on schedule in collaboration with cross-functional teams",
    "Improved team processes and documentation to raise delivery quality",
];
const DEFAULT_SUMMARY: &str = "Motivated professional with a track record of delivering \
    results, learning quickly, and collaborating effectively across teams.";

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeRequest {
    pub name: String,
    pub email: String,
    pub prompt: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub date: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skills {
    pub technical: Vec<String>,
    pub programming: Vec<String>,
    pub tools: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Skills,
    pub projects: Vec<Project>,
    pub certifications: Vec<String>,
}

impl StructuredDocument for Resume {
    type Request = ResumeRequest;

    const KIND: DocumentKind = DocumentKind::Resume;
    const ROLE: &'static str = RESUME_ROLE;

    fn build_prompt(request: &ResumeRequest) -> String {
        fill_template(
            RESUME_PROMPT_TEMPLATE,
            &[
                ("name", request.name.trim()),
                ("email", request.email.trim()),
                (
                    "target_role",
                    request.target_role.as_deref().unwrap_or("Not specified"),
                ),
                ("prompt", request.prompt.trim()),
                ("completeness", COMPLETENESS_INSTRUCTION),
                ("factuality", FACTUALITY_INSTRUCTION),
            ],
        )
    }

    fn normalize(
        value: &Value,
        request: &ResumeRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let fields = Fields::root(value)?;

        let experience = fields.records(
            provenance,
            "experience",
            normalize_experience,
            || vec![placeholder_experience(request)],
        );

        let education = fields.records(provenance, "education", normalize_education, Vec::new);

        let projects = fields.declared_records(provenance, "projects", normalize_project);

        Ok(Resume {
            name: fields.text(provenance, "name", request.name.trim()),
            email: fields.text(provenance, "email", request.email.trim()),
            phone: fields.optional_text("phone"),
            location: fields.optional_text("location"),
            summary: fields.text(provenance, "summary", DEFAULT_SUMMARY),
            experience,
            education,
            skills: normalize_skills(&fields, provenance),
            projects,
            certifications: fields.declared_text_list(provenance, "certifications"),
        })
    }

    fn title(&self) -> String {
        format!("{} Resume", self.name)
    }
}

fn normalize_experience(item: &ItemFields<'_>, provenance: &mut Provenance) -> Experience {
    Experience {
        title: item.text(provenance, "title", "Professional Role"),
        company: item.text(provenance, "company", "Company Name"),
        location: item.optional_text("location"),
        date: item.text(provenance, "date", "Present"),
        bullets: item.text_list(provenance, "bullets", DEFAULT_BULLETS),
    }
}

fn normalize_education(item: &ItemFields<'_>, provenance: &mut Provenance) -> Education {
    Education {
        degree: item.text(provenance, "degree", "Degree"),
        institution: item.text(provenance, "institution", "Institution"),
        location: item.optional_text("location"),
        date: item.optional_text("date"),
    }
}

fn normalize_project(item: &ItemFields<'_>, provenance: &mut Provenance) -> Project {
    let name = item.text(provenance, "name", "Project");
    Project {
        description: item.text(provenance, "description", &name),
        technologies: item.declared_text_list(provenance, "technologies"),
        name,
    }
}

fn placeholder_experience(request: &ResumeRequest) -> Experience {
    Experience {
        title: request
            .target_role
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Professional Role".to_string()),
        company: "Company Name".to_string(),
        location: None,
        date: "Present".to_string(),
        bullets: to_strings(DEFAULT_BULLETS),
    }
}

/// Skills arrive as grouped lists, as one flat list, or not at all.
/// A flat list is taken as the technical group.
fn normalize_skills(fields: &Fields<'_>, provenance: &mut Provenance) -> Skills {
    if let Some(groups) = fields.object("skills") {
        return Skills {
            technical: groups.text_list(provenance, "technical", DEFAULT_TECHNICAL),
            programming: groups.text_list(provenance, "programming", DEFAULT_PROGRAMMING),
            tools: groups.text_list(provenance, "tools", DEFAULT_TOOLS),
            soft: groups.text_list(provenance, "soft", DEFAULT_SOFT),
        };
    }

    let flat = fields.optional_text_list("skills");
    let technical = if flat.is_empty() {
        provenance.record("skills.technical");
        to_strings(DEFAULT_TECHNICAL)
    } else {
        flat
    };
    for group in ["programming", "tools", "soft"] {
        provenance.record(format!("skills.{group}"));
    }

    Skills {
        technical,
        programming: to_strings(DEFAULT_PROGRAMMING),
        tools: to_strings(DEFAULT_TOOLS),
        soft: to_strings(DEFAULT_SOFT),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> ResumeRequest {
        ResumeRequest {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            prompt: "Backend engineer, 5 years of Rust and Postgres".to_string(),
            target_role: Some("Senior Backend Engineer".to_string()),
        }
    }

    fn normalize(value: Value) -> (Resume, Provenance) {
        let mut provenance = Provenance::default();
        let resume = Resume::normalize(&value, &request(), &mut provenance).unwrap();
        (resume, provenance)
    }

    #[test]
    fn test_prompt_embeds_request_fields() {
        let prompt = Resume::build_prompt(&request());
        assert!(prompt.contains("NAME: Ada Lovelace"));
        assert!(prompt.contains("TARGET ROLE: Senior Backend Engineer"));
        assert!(prompt.contains("5 years of Rust"));
        assert!(!prompt.contains("{completeness}"));
    }

    #[test]
    fn test_complete_resume_keeps_generated_values() {
        let (resume, provenance) = normalize(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+44 20 0000 0000",
            "summary": "Backend engineer.",
            "experience": [{
                "title": "Engineer", "company": "Acme", "date": "2020 - Present",
                "bullets": ["Cut p99 latency by 40%"]
            }],
            "education": [{"degree": "BSc", "institution": "UCL"}],
            "skills": {
                "technical": ["Distributed systems"], "programming": ["Rust"],
                "tools": ["Postgres"], "soft": ["Mentoring"]
            },
            "projects": [{"name": "Cache", "description": "LRU cache", "technologies": ["Rust"]}],
            "certifications": ["AWS SAA"]
        }));
        assert!(provenance.is_empty(), "{:?}", provenance);
        assert_eq!(resume.experience[0].company, "Acme");
        assert_eq!(resume.skills.programming, vec!["Rust"]);
        assert_eq!(resume.projects[0].name, "Cache");
        assert_eq!(resume.certifications, vec!["AWS SAA"]);
    }

    #[test]
    fn test_missing_experience_becomes_single_placeholder() {
        let (resume, provenance) = normalize(json!({"name": "Ada"}));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].title, "Senior Backend Engineer");
        assert!(provenance.is_defaulted("experience"));
    }

    #[test]
    fn test_empty_skills_become_starter_lists() {
        let (resume, provenance) = normalize(json!({
            "skills": {"technical": [], "programming": ["Rust"], "tools": "", "soft": null}
        }));
        assert_eq!(resume.skills.technical.len(), DEFAULT_TECHNICAL.len());
        assert_eq!(resume.skills.programming, vec!["Rust"]);
        assert_eq!(resume.skills.tools, to_strings(DEFAULT_TOOLS));
        assert!(provenance.is_defaulted("skills.technical"));
        assert!(!provenance.is_defaulted("skills.programming"));
        assert!(provenance.is_defaulted("skills.soft"));
    }

    #[test]
    fn test_flat_skill_list_goes_to_technical() {
        let (resume, provenance) = normalize(json!({"skills": ["Rust", "Kafka"]}));
        assert_eq!(resume.skills.technical, vec!["Rust", "Kafka"]);
        assert!(!provenance.is_defaulted("skills.technical"));
        assert!(provenance.is_defaulted("skills.tools"));
    }

    #[test]
    fn test_identity_falls_back_to_request() {
        let (resume, provenance) = normalize(json!({"name": "", "email": 42}));
        assert_eq!(resume.name, "Ada Lovelace");
        assert_eq!(resume.email, "ada@example.com");
        assert!(provenance.is_defaulted("name"));
        assert!(provenance.is_defaulted("email"));
        assert_eq!(resume.title(), "Ada Lovelace Resume");
    }

    #[test]
    fn test_partial_experience_entry_is_completed() {
        let (resume, provenance) = normalize(json!({
            "experience": [{"title": "Engineer", "bullets": []}]
        }));
        assert_eq!(resume.experience[0].company, "Company Name");
        assert_eq!(resume.experience[0].bullets.len(), DEFAULT_BULLETS.len());
        assert!(provenance.is_defaulted("experience[0].company"));
        assert!(provenance.is_defaulted("experience[0].bullets"));
        assert!(!provenance.is_defaulted("experience[0].title"));
    }

    #[test]
    fn test_absent_optional_sections_are_recorded() {
        let (resume, provenance) = normalize(json!({
            "projects": [{"name": "Cache"}]
        }));
        assert!(resume.certifications.is_empty());
        assert_eq!(resume.projects[0].description, "Cache");
        assert!(provenance.is_defaulted("certifications"));
        assert!(provenance.is_defaulted("projects[0].description"));
        assert!(provenance.is_defaulted("projects[0].technologies"));

        let (resume, provenance) = normalize(json!({"projects": [], "certifications": []}));
        assert!(resume.projects.is_empty());
        assert!(!provenance.is_defaulted("projects"));
        assert!(!provenance.is_defaulted("certifications"));

        let (_, provenance) = normalize(json!({}));
        assert!(provenance.is_defaulted("projects"));
    }

    #[test]
    fn test_array_root_is_a_shape_error() {
        let mut provenance = Provenance::default();
        assert!(Resume::normalize(&json!([]), &request(), &mut provenance).is_err());
    }
}

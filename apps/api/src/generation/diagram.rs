use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::normalize::{Fields, Provenance, ShapeError};
use crate::generation::prompts::{DIAGRAM_PROMPT_TEMPLATE, DIAGRAM_ROLE};
use crate::generation::structured::{fill_template, DocumentKind, StructuredDocument};
use crate::llm_client::prompts::COMPLETENESS_INSTRUCTION;

const FALLBACK_CODE: &str = "flowchart TD\n    A[Start] --> B[Process]\n    B --> C[End]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    #[default]
    Flowchart,
    Sequence,
    Class,
    Er,
    Gantt,
    Mindmap,
}

impl DiagramType {
    fn as_str(&self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Class => "class",
            DiagramType::Er => "er",
            DiagramType::Gantt => "gantt",
            DiagramType::Mindmap => "mindmap",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "flowchart" | "flow" | "graph" => Some(DiagramType::Flowchart),
            "sequence" | "sequencediagram" => Some(DiagramType::Sequence),
            "class" | "classdiagram" => Some(DiagramType::Class),
            "er" | "erd" | "erdiagram" | "entity-relationship" => Some(DiagramType::Er),
            "gantt" => Some(DiagramType::Gantt),
            "mindmap" => Some(DiagramType::Mindmap),
            _ => None,
        }
    }

    /// The diagram type declared by the first word of Mermaid source. A `---` front-matter
    /// block and `%%` comment or `%%{init}%%` directive lines may precede it.
    fn from_code(code: &str) -> Option<Self> {
        let mut lines = code.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();
        if lines.peek() == Some(&"---") {
            lines.next();
            lines.by_ref().find(|l| *l == "---")?;
        }
        let header = lines.find(|l| !l.starts_with("%%"))?;
        let keyword = header.split_whitespace().next()?;
        match keyword {
            "flowchart" | "graph" => Some(DiagramType::Flowchart),
            "sequenceDiagram" => Some(DiagramType::Sequence),
            "classDiagram" | "classDiagram-v2" => Some(DiagramType::Class),
            "erDiagram" => Some(DiagramType::Er),
            "gantt" => Some(DiagramType::Gantt),
            "mindmap" => Some(DiagramType::Mindmap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagramRequest {
    pub prompt: String,
    #[serde(default)]
    pub diagram_type: Option<DiagramType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    pub title: String,
    pub diagram_type: DiagramType,
    pub mermaid_code: String,
    pub description: String,
}

impl StructuredDocument for Diagram {
    type Request = DiagramRequest;

    const KIND: DocumentKind = DocumentKind::Diagram;
    const ROLE: &'static str = DIAGRAM_ROLE;

    fn build_prompt(request: &DiagramRequest) -> String {
        fill_template(
            DIAGRAM_PROMPT_TEMPLATE,
            &[
                ("prompt", request.prompt.trim()),
                (
                    "diagram_type",
                    request
                        .diagram_type
                        .map(|t| t.as_str())
                        .unwrap_or("choose the best fit"),
                ),
                ("completeness", COMPLETENESS_INSTRUCTION),
            ],
        )
    }

    fn normalize(
        value: &Value,
        request: &DiagramRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let fields = Fields::root(value)?;

        let code = fields
            .optional_text("mermaid_code")
            .or_else(|| fields.optional_text("code"))
            .map(|c| strip_mermaid_fence(&c));
        let declared = code.as_deref().and_then(DiagramType::from_code);

        // The code is what renders, so its header decides the type over any label.
        let (mermaid_code, diagram_type) = match (code, declared) {
            (Some(code), Some(declared)) => (code, declared),
            _ => {
                provenance.record("mermaid_code");
                if fields
                    .optional_text("diagram_type")
                    .and_then(|t| DiagramType::parse(&t))
                    != Some(DiagramType::Flowchart)
                {
                    provenance.record("diagram_type");
                }
                (FALLBACK_CODE.to_string(), DiagramType::Flowchart)
            }
        };

        Ok(Diagram {
            title: fields.text(provenance, "title", "Diagram"),
            diagram_type,
            mermaid_code,
            description: fields.text(provenance, "description", request.prompt.trim()),
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

fn strip_mermaid_fence(code: &str) -> String {
    let code = code.trim();
    let code = code
        .strip_prefix("```mermaid")
        .or_else(|| code.strip_prefix("```"))
        .unwrap_or(code);
    code.strip_suffix("```").unwrap_or(code).trim().to_string()
}

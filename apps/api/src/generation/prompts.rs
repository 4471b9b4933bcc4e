// All LLM prompt constants for the document generators.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const RESUME_ROLE: &str = "You are an expert resume writer who produces concise, \
    ATS-friendly resumes with strong action verbs and quantified achievements.";

/// Replace: {name}, {email}, {target_role}, {prompt}, {completeness}, {factuality}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Create a professional resume for the person below.

NAME: {name}
EMAIL: {email}
TARGET ROLE: {target_role}

WHAT THE USER TOLD US:
{prompt}

Return a JSON object with this EXACT schema:
{
  "name": "Full name",
  "email": "email@example.com",
  "phone": "+1 555 010 0000",
  "location": "City, Country",
  "summary": "Two or three sentence professional summary tailored to the target role",
  "experience": [
    {
      "title": "Job title",
      "company": "Company",
      "location": "City, Country",
      "date": "Jan 2021 - Present",
      "bullets": ["Achievement with a metric", "Another achievement"]
    }
  ],
  "education": [
    {"degree": "B.Sc. Computer Science", "institution": "University", "location": "City", "date": "2016 - 2020"}
  ],
  "skills": {
    "technical": ["..."],
    "programming": ["..."],
    "tools": ["..."],
    "soft": ["..."]
  },
  "projects": [
    {"name": "Project", "description": "One sentence", "technologies": ["..."]}
  ],
  "certifications": ["..."]
}

RULES:
1. Start every experience bullet with a strong action verb
2. Prefer numbers: percentages, money, counts, durations
3. Use keywords a recruiter for the target role would search for
4. {completeness}
5. {factuality}"#;

pub const LETTER_ROLE: &str = "You are a professional correspondence writer who writes \
    clear, warm, well-structured letters.";

/// Replace: {letter_type}, {from_name}, {to_name}, {to_company}, {prompt}, {completeness}
pub const LETTER_PROMPT_TEMPLATE: &str = r#"Write a {letter_type} letter.

FROM: {from_name}
TO: {to_name}
ORGANISATION: {to_company}

PURPOSE AND DETAILS:
{prompt}

Return a JSON object with this EXACT schema:
{
  "subject": "Short subject line",
  "greeting": "Dear ...,",
  "body": ["First paragraph", "Second paragraph", "Third paragraph"],
  "closing": "Sincerely,",
  "signature": "Sender name"
}

RULES:
1. Three or four body paragraphs, each a separate array item
2. Keep the tone appropriate for a {letter_type} letter
3. {completeness}"#;

pub const OUTLINE_ROLE: &str = "You are a presentation strategist who structures talks \
    into clear, logically ordered slides.";

/// Replace: {prompt}, {slide_count}, {layouts}, {completeness}
pub const OUTLINE_PROMPT_TEMPLATE: &str = r#"Create an outline for a presentation of exactly {slide_count} slides.

TOPIC AND CONTEXT:
{prompt}

Return a JSON object with this EXACT schema:
{
  "title": "Presentation title",
  "slides": [
    {"title": "Slide title", "key_points": ["point", "point"], "layout": "content"}
  ]
}

LAYOUTS (pick one per slide): {layouts}
The first slide uses "title" and the last slide uses "conclusion".
{completeness}"#;

pub const PRESENTATION_ROLE: &str = "You are a presentation designer who turns outlines \
    into complete, visually varied slides with concise copy.";

/// Replace: {prompt}, {title}, {outline_json}, {layouts}, {chart_types}, {completeness}
pub const PRESENTATION_PROMPT_TEMPLATE: &str = r#"Write the full content for the presentation "{title}".

TOPIC AND CONTEXT:
{prompt}

APPROVED OUTLINE (keep the same slides in the same order):
{outline_json}

Return a JSON object with this EXACT schema:
{
  "title": "Presentation title",
  "theme": "modern",
  "slides": [
    {
      "title": "Slide title",
      "content": "One or two sentences of slide copy",
      "bullets": ["Short bullet", "Short bullet"],
      "layout": "content",
      "chart": {"type": "bar", "title": "Chart title", "labels": ["A", "B"], "values": [10, 20]},
      "image_query": "two or three word stock photo search",
      "notes": "Speaker notes"
    }
  ]
}

RULES:
1. Layouts: {layouts}
2. Include "chart" only on slides where numbers tell the story; chart types: {chart_types}
3. "labels" and "values" must have the same length
4. "image_query" describes a photo, never text on a slide
5. {completeness}"#;

pub const ATS_ROLE: &str = "You are an applicant tracking system analyst who scores \
    resumes against job descriptions the way ATS software does.";

/// Replace: {resume_text}, {job_description}, {completeness}
pub const ATS_PROMPT_TEMPLATE: &str = r#"Score the resume below against the job description.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume_text}

Return a JSON object with this EXACT schema:
{
  "overall_score": 0,
  "matched_keywords": ["keyword found in both"],
  "missing_keywords": ["keyword in the job description but not the resume"],
  "section_scores": [
    {"section": "experience", "score": 0, "feedback": "One sentence"}
  ],
  "suggestions": ["Concrete, actionable improvement"]
}

RULES:
1. Scores are integers from 0 to 100
2. Score sections: contact, summary, experience, education, skills, formatting
3. {completeness}"#;

pub const DIAGRAM_ROLE: &str = "You are a software architect who draws precise Mermaid \
    diagrams.";

/// Replace: {prompt}, {diagram_type}, {completeness}
pub const DIAGRAM_PROMPT_TEMPLATE: &str = r#"Create a Mermaid diagram.

DESCRIPTION:
{prompt}

PREFERRED DIAGRAM TYPE: {diagram_type}

Return a JSON object with this EXACT schema:
{
  "title": "Diagram title",
  "diagram_type": "flowchart",
  "mermaid_code": "flowchart TD\n    A[Start] --> B[End]",
  "description": "One paragraph explaining the diagram"
}

RULES:
1. "mermaid_code" must be valid Mermaid syntax with no code fences
2. "diagram_type" is one of: flowchart, sequence, class, er, gantt, mindmap
3. {completeness}"#;

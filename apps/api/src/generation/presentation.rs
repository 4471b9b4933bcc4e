//! Presentations — outline-then-full generation.
//!
//! The outline is a cheap structural draft the user can edit; the full presentation
//! is generated from the approved outline and never loses a slide from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generation::normalize::{Fields, ItemFields, Provenance, ShapeError};
use crate::generation::prompts::{
    OUTLINE_PROMPT_TEMPLATE, OUTLINE_ROLE, PRESENTATION_PROMPT_TEMPLATE, PRESENTATION_ROLE,
};
use crate::generation::structured::{fill_template, DocumentKind, StructuredDocument};
use crate::llm_client::prompts::COMPLETENESS_INSTRUCTION;

pub const MIN_SLIDES: u32 = 3;
pub const MAX_SLIDES: u32 = 20;
pub const DEFAULT_SLIDES: u32 = 8;
const DEFAULT_THEME: &str = "modern";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    Title,
    #[default]
    Content,
    TwoColumn,
    ImageText,
    Chart,
    Quote,
    Conclusion,
}

impl SlideLayout {
    const ALL: [SlideLayout; 7] = [
        SlideLayout::Title,
        SlideLayout::Content,
        SlideLayout::TwoColumn,
        SlideLayout::ImageText,
        SlideLayout::Chart,
        SlideLayout::Quote,
        SlideLayout::Conclusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlideLayout::Title => "title",
            SlideLayout::Content => "content",
            SlideLayout::TwoColumn => "two_column",
            SlideLayout::ImageText => "image_text",
            SlideLayout::Chart => "chart",
            SlideLayout::Quote => "quote",
            SlideLayout::Conclusion => "conclusion",
        }
    }

    /// Lenient parse: "Two Column", "two-column" and "two_column" are the same layout.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        Self::ALL.into_iter().find(|layout| layout.as_str() == key)
    }

    fn prompt_list() -> String {
        Self::ALL
            .iter()
            .map(|l| format!("\"{}\"", l.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Area,
}

impl ChartType {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bar" | "column" => Some(ChartType::Bar),
            "line" => Some(ChartType::Line),
            "pie" | "donut" | "doughnut" => Some(ChartType::Pie),
            "area" => Some(ChartType::Area),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct OutlineRequest {
    pub prompt: String,
    #[serde(default)]
    pub slide_count: Option<u32>,
}

impl OutlineRequest {
    pub fn slide_count(&self) -> u32 {
        self.slide_count
            .unwrap_or(DEFAULT_SLIDES)
            .clamp(MIN_SLIDES, MAX_SLIDES)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideOutline {
    pub title: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub layout: SlideLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationOutline {
    pub title: String,
    pub slides: Vec<SlideOutline>,
}

impl StructuredDocument for PresentationOutline {
    type Request = OutlineRequest;

    const KIND: DocumentKind = DocumentKind::PresentationOutline;
    const ROLE: &'static str = OUTLINE_ROLE;

    fn build_prompt(request: &OutlineRequest) -> String {
        let slide_count = request.slide_count().to_string();
        let layouts = SlideLayout::prompt_list();
        fill_template(
            OUTLINE_PROMPT_TEMPLATE,
            &[
                ("slide_count", slide_count.as_str()),
                ("prompt", request.prompt.trim()),
                ("layouts", layouts.as_str()),
                ("completeness", COMPLETENESS_INSTRUCTION),
            ],
        )
    }

    /// Accepts `{"title", "slides": [...]}` or a bare array of slides.
    fn normalize(
        value: &Value,
        request: &OutlineRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let wrapped;
        let value = match value {
            Value::Array(_) => {
                wrapped = serde_json::json!({ "slides": value });
                &wrapped
            }
            other => other,
        };
        let fields = Fields::root(value)?;
        let count = request.slide_count() as usize;

        let mut slides = fields.records(
            provenance,
            "slides",
            normalize_outline_slide,
            || default_outline(request.prompt.trim(), count),
        );
        slides.truncate(MAX_SLIDES as usize);

        Ok(PresentationOutline {
            title: fields.text(provenance, "title", &title_from_prompt(&request.prompt)),
            slides,
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

fn normalize_outline_slide(item: &ItemFields<'_>, provenance: &mut Provenance) -> SlideOutline {
    let title = item.text(provenance, "title", "Untitled Slide");
    let key_points = item.optional_text_list("key_points");
    let key_points = if key_points.is_empty() {
        provenance.record(format!("{}.key_points", item.path()));
        vec![format!("Overview of {title}")]
    } else {
        key_points
    };
    SlideOutline {
        layout: layout_of(item, provenance),
        title,
        key_points,
    }
}

fn layout_of(item: &ItemFields<'_>, provenance: &mut Provenance) -> SlideLayout {
    match item.optional_text("layout").as_deref().and_then(SlideLayout::parse) {
        Some(layout) => layout,
        None => {
            provenance.record(format!("{}.layout", item.path()));
            SlideLayout::Content
        }
    }
}

/// Title slide, numbered content slides, conclusion.
fn default_outline(topic: &str, count: usize) -> Vec<SlideOutline> {
    let count = count.max(MIN_SLIDES as usize);
    (0..count)
        .map(|i| match i {
            0 => SlideOutline {
                title: title_from_prompt(topic),
                key_points: vec![topic.to_string()],
                layout: SlideLayout::Title,
            },
            i if i == count - 1 => SlideOutline {
                title: "Conclusion".to_string(),
                key_points: vec!["Summary".to_string(), "Next steps".to_string()],
                layout: SlideLayout::Conclusion,
            },
            i => SlideOutline {
                title: format!("Key Point {i}"),
                key_points: vec![format!("Details for key point {i}")],
                layout: SlideLayout::Content,
            },
        })
        .collect()
}

fn title_from_prompt(prompt: &str) -> String {
    let line = prompt.trim().lines().next().unwrap_or_default();
    let title: String = line.chars().take(60).collect();
    if title.is_empty() {
        "Untitled Presentation".to_string()
    } else {
        title
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Full presentation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PresentationRequest {
    pub prompt: String,
    #[serde(default)]
    pub title: Option<String>,
    pub outline: Vec<SlideOutline>,
}

impl PresentationRequest {
    fn deck_title(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .unwrap_or_else(|| title_from_prompt(&self.prompt))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub content: String,
    pub bullets: Vec<String>,
    pub layout: SlideLayout,
    pub chart: Option<ChartSpec>,
    pub image_query: Option<String>,
    pub notes: Option<String>,
}

impl From<&SlideOutline> for Slide {
    fn from(outline: &SlideOutline) -> Self {
        Slide {
            title: outline.title.clone(),
            content: String::new(),
            bullets: outline.key_points.clone(),
            layout: outline.layout,
            chart: None,
            image_query: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    pub title: String,
    pub theme: String,
    pub slides: Vec<Slide>,
}

impl StructuredDocument for Presentation {
    type Request = PresentationRequest;

    const KIND: DocumentKind = DocumentKind::Presentation;
    const ROLE: &'static str = PRESENTATION_ROLE;

    fn build_prompt(request: &PresentationRequest) -> String {
        let outline_json =
            serde_json::to_string_pretty(&request.outline).unwrap_or_else(|_| "[]".to_string());
        let title = request.deck_title();
        let layouts = SlideLayout::prompt_list();
        fill_template(
            PRESENTATION_PROMPT_TEMPLATE,
            &[
                ("title", title.as_str()),
                ("prompt", request.prompt.trim()),
                ("outline_json", outline_json.as_str()),
                ("layouts", layouts.as_str()),
                ("chart_types", "bar, line, pie, area"),
                ("completeness", COMPLETENESS_INSTRUCTION),
            ],
        )
    }

    fn normalize(
        value: &Value,
        request: &PresentationRequest,
        provenance: &mut Provenance,
    ) -> Result<Self, ShapeError> {
        let fields = Fields::root(value)?;

        // Absent, wrong-typed, and empty slide lists all fall back to the outline.
        let generated = fields.object_list("slides");
        if generated.is_empty() {
            provenance.record("slides");
        }
        let mut slides: Vec<Slide> = generated
            .iter()
            .enumerate()
            .map(|(i, item)| normalize_slide(item, request.outline.get(i), provenance))
            .collect();

        // Slides the model dropped are rebuilt from the outline.
        for (i, outline) in request.outline.iter().enumerate().skip(slides.len()) {
            provenance.record(format!("slides[{i}]"));
            slides.push(Slide::from(outline));
        }

        Ok(Presentation {
            title: fields.text(provenance, "title", &request.deck_title()),
            theme: fields.text(provenance, "theme", DEFAULT_THEME),
            slides,
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

fn normalize_slide(
    item: &ItemFields<'_>,
    outline: Option<&SlideOutline>,
    provenance: &mut Provenance,
) -> Slide {
    let title = match outline {
        Some(o) => item.text(provenance, "title", &o.title),
        None => item.text(provenance, "title", "Untitled Slide"),
    };

    let bullets = item.optional_text_list("bullets");
    let bullets = if bullets.is_empty() {
        provenance.record(format!("{}.bullets", item.path()));
        match outline {
            Some(o) => o.key_points.clone(),
            None => vec![format!("Overview of {title}")],
        }
    } else {
        bullets
    };

    let layout = match item.optional_text("layout").as_deref().and_then(SlideLayout::parse) {
        Some(layout) => layout,
        None => {
            provenance.record(format!("{}.layout", item.path()));
            outline.map(|o| o.layout).unwrap_or_default()
        }
    };

    let chart = match item.get("chart") {
        None | Some(Value::Null) => None,
        Some(_) => {
            let chart = item
                .object("chart")
                .and_then(|chart| normalize_chart(&chart, &title, provenance));
            if chart.is_none() {
                provenance.record(format!("{}.chart", item.path()));
            }
            chart
        }
    };

    Slide {
        content: item.text(provenance, "content", &title),
        title,
        bullets,
        layout,
        chart,
        image_query: item.optional_text("image_query"),
        notes: item.optional_text("notes"),
    }
}

/// Reads `labels` + `values`, or a `data` array of `{name, value}` points.
/// Returns `None` when the series is empty or the lengths disagree.
fn normalize_chart(
    chart: &ItemFields<'_>,
    slide_title: &str,
    provenance: &mut Provenance,
) -> Option<ChartSpec> {
    let (labels, values) = match chart.get("data") {
        Some(Value::Array(points)) => points
            .iter()
            .filter_map(|p| {
                let label = p.get("name").or_else(|| p.get("label"))?.as_str()?;
                let value = p.get("value")?.as_f64()?;
                Some((label.to_string(), value))
            })
            .unzip(),
        _ => {
            let labels = chart.optional_text_list("labels");
            let values: Option<Vec<f64>> = match chart.get("values") {
                Some(Value::Array(items)) => items.iter().map(|v| v.as_f64()).collect(),
                _ => None,
            };
            (labels, values.unwrap_or_default())
        }
    };

    if labels.is_empty() || labels.len() != values.len() {
        return None;
    }

    let chart_type = match chart
        .optional_text("type")
        .or_else(|| chart.optional_text("chart_type"))
        .and_then(|t| ChartType::parse(&t))
    {
        Some(chart_type) => chart_type,
        None => {
            provenance.record(format!("{}.type", chart.path()));
            ChartType::default()
        }
    };

    Some(ChartSpec {
        chart_type,
        title: chart.text(provenance, "title", slide_title),
        labels,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outline_request(count: Option<u32>) -> OutlineRequest {
        OutlineRequest {
            prompt: "The future of renewable energy".to_string(),
            slide_count: count,
        }
    }

    fn presentation_request() -> PresentationRequest {
        PresentationRequest {
            prompt: "The future of renewable energy".to_string(),
            title: Some("Renewables 2030".to_string()),
            outline: vec![
                SlideOutline {
                    title: "Renewables 2030".to_string(),
                    key_points: vec!["Why now".to_string()],
                    layout: SlideLayout::Title,
                },
                SlideOutline {
                    title: "Cost Curves".to_string(),
                    key_points: vec!["Solar down 90%".to_string()],
                    layout: SlideLayout::Chart,
                },
                SlideOutline {
                    title: "Wrap Up".to_string(),
                    key_points: vec!["Act".to_string()],
                    layout: SlideLayout::Conclusion,
                },
            ],
        }
    }

    #[test]
    fn test_slide_count_is_clamped() {
        assert_eq!(outline_request(None).slide_count(), DEFAULT_SLIDES);
        assert_eq!(outline_request(Some(1)).slide_count(), MIN_SLIDES);
        assert_eq!(outline_request(Some(99)).slide_count(), MAX_SLIDES);
    }

    #[test]
    fn test_layout_parse_is_lenient() {
        assert_eq!(SlideLayout::parse("Two Column"), Some(SlideLayout::TwoColumn));
        assert_eq!(SlideLayout::parse("image-text"), Some(SlideLayout::ImageText));
        assert_eq!(SlideLayout::parse("hero"), None);
    }

    #[test]
    fn test_outline_prompt_contains_count_and_layouts() {
        let prompt = PresentationOutline::build_prompt(&outline_request(Some(5)));
        assert!(prompt.contains("exactly 5 slides"));
        assert!(prompt.contains("\"two_column\""));
    }

    #[test]
    fn test_outline_accepts_bare_array() {
        let mut provenance = Provenance::default();
        let outline = PresentationOutline::normalize(
            &json!([{"title": "Intro", "key_points": ["a"], "layout": "title"}]),
            &outline_request(None),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(outline.slides.len(), 1);
        assert_eq!(outline.slides[0].layout, SlideLayout::Title);
        assert_eq!(outline.title, "The future of renewable energy");
        assert_eq!(provenance.into_fields(), vec!["title"]);
    }

    #[test]
    fn test_outline_unknown_layout_becomes_content() {
        let mut provenance = Provenance::default();
        let outline = PresentationOutline::normalize(
            &json!({"title": "T", "slides": [{"title": "S", "key_points": ["p"], "layout": "hero"}]}),
            &outline_request(None),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(outline.slides[0].layout, SlideLayout::Content);
        assert!(provenance.is_defaulted("slides[0].layout"));
    }

    #[test]
    fn test_missing_outline_uses_requested_count() {
        let mut provenance = Provenance::default();
        let outline =
            PresentationOutline::normalize(&json!({}), &outline_request(Some(4)), &mut provenance)
                .unwrap();
        assert_eq!(outline.slides.len(), 4);
        assert_eq!(outline.slides[0].layout, SlideLayout::Title);
        assert_eq!(outline.slides[3].layout, SlideLayout::Conclusion);
        assert!(provenance.is_defaulted("slides"));
    }

    #[test]
    fn test_dropped_slides_are_rebuilt_from_outline() {
        let mut provenance = Provenance::default();
        let deck = Presentation::normalize(
            &json!({
                "title": "Renewables 2030",
                "theme": "dark",
                "slides": [{
                    "title": "Renewables 2030", "content": "Intro", "bullets": ["Why now"],
                    "layout": "title", "image_query": "wind turbines"
                }]
            }),
            &presentation_request(),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.slides[1].title, "Cost Curves");
        assert_eq!(deck.slides[1].layout, SlideLayout::Chart);
        assert_eq!(deck.slides[0].image_query.as_deref(), Some("wind turbines"));
        assert_eq!(provenance.into_fields(), vec!["slides[1]", "slides[2]"]);
    }

    #[test]
    fn test_chart_accepts_labels_values_and_data_points() {
        let mut provenance = Provenance::default();
        let deck = Presentation::normalize(
            &json!({
                "title": "T", "theme": "modern",
                "slides": [
                    {"title": "A", "bullets": ["x"], "layout": "chart",
                     "chart": {"type": "line", "labels": ["2020", "2030"], "values": [1, 2.5]}},
                    {"title": "B", "bullets": ["x"], "layout": "chart",
                     "chart": {"type": "doughnut", "data": [{"name": "Solar", "value": 40}]}},
                    {"title": "C", "bullets": ["x"], "layout": "chart",
                     "chart": {"labels": ["a", "b"], "values": [1]}}
                ]
            }),
            &presentation_request(),
            &mut provenance,
        )
        .unwrap();
        let first = deck.slides[0].chart.as_ref().unwrap();
        assert_eq!(first.chart_type, ChartType::Line);
        assert_eq!(first.values, vec![1.0, 2.5]);
        let second = deck.slides[1].chart.as_ref().unwrap();
        assert_eq!(second.chart_type, ChartType::Pie);
        assert_eq!(second.labels, vec!["Solar"]);
        assert!(deck.slides[2].chart.is_none());
    }

    #[test]
    fn test_slides_of_wrong_type_are_rebuilt_from_outline() {
        let mut provenance = Provenance::default();
        let deck = Presentation::normalize(
            &json!({"title": "T", "theme": "modern", "slides": {"0": {}}}),
            &presentation_request(),
            &mut provenance,
        )
        .unwrap();
        assert_eq!(deck.slides.len(), 3);
        assert_eq!(deck.slides[0].title, "Renewables 2030");
        assert_eq!(deck.slides[2].layout, SlideLayout::Conclusion);
        assert_eq!(
            provenance.into_fields(),
            vec!["slides", "slides[0]", "slides[1]", "slides[2]"]
        );
    }

    #[test]
    fn test_slide_substitutions_are_recorded() {
        let mut provenance = Provenance::default();
        let mut request = presentation_request();
        request.outline.truncate(1);
        let deck = Presentation::normalize(
            &json!({
                "title": "T", "theme": "modern",
                "slides": [
                    {"title": "Intro", "bullets": ["x"], "layout": "title",
                     "chart": {"type": "bar", "labels": ["a", "b"], "values": [1]}},
                    {"title": "Extra", "content": "Body", "layout": "chart",
                     "chart": {"labels": ["a"], "values": [3]}}
                ]
            }),
            &request,
            &mut provenance,
        )
        .unwrap();
        assert_eq!(deck.slides[0].content, "Intro");
        assert!(deck.slides[0].chart.is_none());
        assert_eq!(deck.slides[1].bullets, vec!["Overview of Extra"]);
        let chart = deck.slides[1].chart.as_ref().unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.title, "Extra");
        assert_eq!(
            provenance.into_fields(),
            vec![
                "slides[0].chart",
                "slides[0].content",
                "slides[1].bullets",
                "slides[1].chart.title",
                "slides[1].chart.type",
            ]
        );
    }
}

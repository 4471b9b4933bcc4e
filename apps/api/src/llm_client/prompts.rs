// Shared prompt fragments.
// Each generator defines its own templates in generation::prompts.
// This file contains cross-cutting fragments appended to those templates.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every generation prompt so the model fills every field instead of omitting it.
pub const COMPLETENESS_INSTRUCTION: &str = "\
    Fill EVERY field of the schema. Use an empty string or empty array only when the \
    input genuinely gives you nothing to write. Never add fields that are not in the schema.";

/// Appended to prompts that must not fabricate facts about a real person.
pub const FACTUALITY_INSTRUCTION: &str = "\
    Use the facts the user provided. Where details are missing, write plausible, \
    generic content and never invent employers, degrees, or certifications by name \
    unless the user mentioned them.";

/// Builds a full system prompt from a role description plus the JSON-only rules.
pub fn system_prompt(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

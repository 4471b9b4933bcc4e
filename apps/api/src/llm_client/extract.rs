//! Pulls a JSON value out of raw model text.
//!
//! Models wrap JSON in markdown fences, prepend chatter, leave trailing commas, or stop
//! mid-object when they hit the output token limit. `extract_json` tolerates all of these
//! and only gives up when nothing parseable is left.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// Fence markers only count on a line of their own. Backticks inside JSON strings sit
// behind an escaped `\n`, never at the start of a physical line.
static OPEN_FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_-]*[ \t]*\r?$").expect("open fence pattern is valid")
});

static CLOSE_FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[ \t]*\r?$").expect("close fence pattern is valid")
});

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid"));

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response contains no JSON object or array")]
    NoJson,

    #[error("response JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Extracts, and if necessary repairs, the JSON value embedded in `text`.
pub fn extract_json(text: &str) -> Result<Value, ExtractError> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(value);
    }

    let body = strip_fences(text);
    let start = body.find(&['{', '['][..]).ok_or(ExtractError::NoJson)?;
    let tail = &body[start..];
    let candidate = balanced_slice(tail);

    let first_error = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    debug!("Repairing model JSON after parse error: {first_error}");

    // The full tail keeps values cut off after the last closer; the sliced candidate
    // drops trailing prose.
    for attempt in [tail, candidate] {
        if let Ok(value) = serde_json::from_str::<Value>(&repair(attempt)) {
            return Ok(value);
        }
    }
    Err(ExtractError::Malformed(first_error))
}

/// Returns the body of the first markdown code fence, or the trimmed text if unfenced.
/// The block runs to the last bare fence line; an opening fence without a closer
/// (truncated output) runs to the end of the text.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = OPEN_FENCE_LINE.find(text) else {
        return text;
    };
    let body = &text[open.end()..];
    let body = match CLOSE_FENCE_LINE.find_iter(body).last() {
        Some(close) => &body[..close.start()],
        None => body,
    };
    body.trim()
}

/// `text` starts with `{` or `[`; slices up to the last matching closer, or returns
/// everything when no closer follows.
fn balanced_slice(text: &str) -> &str {
    let closer = if text.starts_with('{') { '}' } else { ']' };
    match text.rfind(closer) {
        Some(end) if end > 0 => &text[..=end],
        _ => text,
    }
}

fn repair(text: &str) -> String {
    let without_commas = TRAILING_COMMA.replace_all(text, "$1");
    if serde_json::from_str::<Value>(&without_commas).is_ok() {
        return without_commas.into_owned();
    }
    let closed = close_truncated(&without_commas);
    TRAILING_COMMA.replace_all(&closed, "$1").into_owned()
}

/// Finishes JSON cut off mid-value: closes an open string, drops a dangling comma,
/// completes a dangling `"key":` with null, and appends missing closers.
fn close_truncated(text: &str) -> String {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(',') {
        out.pop();
    } else if out.ends_with(':') {
        out.push_str(" null");
    }

    out.extend(closers.iter().rev());
    out
}

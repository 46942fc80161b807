//! Locates and decodes the client-side state that the retailer's server
//! renderer inlines into search pages as
//! `window.__INITIAL_STATE__ = JSON.parse('...')`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::error::ScrapeError;

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("Invalid script selector"));

// The payload body runs to the first unescaped matching quote followed by `)`.
// Backslash pairs are consumed whole so an escaped quote never ends the body.
static INITIAL_STATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"window\.__INITIAL_STATE__\s*=\s*JSON\.parse\((?:'((?:\\.|[^'\\\n])*?)'|"((?:\\.|[^"\\\n])*?)")\)"#,
    )
    .expect("Invalid initial state regex")
});

/// Characters of context kept on each side of a decode failure.
pub const SNIPPET_RADIUS: usize = 50;
pub const ERROR_MARKER: &str = "❌>>HERE<<❌";

/// A state assignment found in a script, still escaped for its JS string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAssignment<'a> {
    pub quote: char,
    pub body: &'a str,
}

/// Text content of every non-empty `<script>` element, in document order.
pub fn script_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&SCRIPT_SELECTOR)
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

pub fn find_state_assignment(script: &str) -> Option<StateAssignment<'_>> {
    let captures = INITIAL_STATE_REGEX.captures(script)?;
    if let Some(body) = captures.get(1) {
        return Some(StateAssignment { quote: '\'', body: body.as_str() });
    }
    captures
        .get(2)
        .map(|body| StateAssignment { quote: '"', body: body.as_str() })
}

/// Undo the JS string-literal escaping of the payload.
///
/// Escaped delimiters are unescaped first, then doubled backslashes are
/// collapsed. Payloads in the wild depend on this order, so it must not be
/// folded into a single pass.
pub fn unescape_payload(body: &str, quote: char) -> String {
    let escaped_quote = format!("\\{}", quote);
    body.replace(&escaped_quote, &quote.to_string())
        .replace("\\\\", "\\")
}

/// Character offset into `text` where `err` was raised.
///
/// This follows serde_json's reported position, which for errors raised after
/// consuming a character (bad escapes, broken literals) is one past the start
/// of the offending token.
fn error_offset(text: &str, err: &serde_json::Error) -> usize {
    if err.is_eof() {
        return text.chars().count();
    }

    let line_start: usize = text
        .split_inclusive('\n')
        .take(err.line().saturating_sub(1))
        .map(str::len)
        .sum();

    // serde_json columns are 1-based byte counts from the start of the line.
    let mut byte = (line_start + err.column().saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    text[..byte].chars().count()
}

/// Up to [`SNIPPET_RADIUS`] characters either side of `offset`, with
/// [`ERROR_MARKER`] inserted at `offset`.
pub fn annotate_offset(text: &str, offset: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());
    let start = offset.saturating_sub(SNIPPET_RADIUS);
    let end = (offset + SNIPPET_RADIUS).min(chars.len());

    let before: String = chars[start..offset].iter().collect();
    let after: String = chars[offset..end].iter().collect();
    format!("{}{}{}", before, ERROR_MARKER, after)
}

/// Decode unescaped payload text, attaching the failure position and a
/// marked snippet when it is not valid JSON.
pub fn decode_payload(json_text: &str) -> Result<Value, ScrapeError> {
    serde_json::from_str(json_text).map_err(|source| {
        let offset = error_offset(json_text, &source);
        let snippet = annotate_offset(json_text, offset);

        error!("JSON parsing error: {}", source);
        error!("Error at position {} (char {})", offset, offset);
        error!("Error snippet:\n{}", snippet);

        ScrapeError::Decode {
            offset,
            line: source.line(),
            column: source.column(),
            snippet,
            source,
        }
    })
}

/// Return the page's embedded state, or an empty object when no script
/// carries the assignment.
///
/// Scanning stops at the first script with a matching assignment. If that
/// payload does not decode the error is returned; later scripts are not tried.
pub fn extract_initial_state(html: &str) -> Result<Value, ScrapeError> {
    let scripts = script_blocks(html);
    debug!("Scanning {} inline scripts for initial state", scripts.len());

    for (index, script) in scripts.iter().enumerate() {
        let Some(assignment) = find_state_assignment(script) else {
            continue;
        };

        info!(
            "Found initial state in script #{} ({} bytes, quoted with {})",
            index,
            assignment.body.len(),
            assignment.quote
        );
        let json_text = unescape_payload(assignment.body, assignment.quote);
        return decode_payload(&json_text);
    }

    debug!("No initial state assignment found");
    Ok(Value::Object(Map::new()))
}

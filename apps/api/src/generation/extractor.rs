//! Response Extractor: recovers a typed value from a model completion.
//!
//! Models wrap JSON in prose, code fences and trailing commentary. The
//! extractor takes the fenced block if there is one, finds the outermost
//! balanced bracket pair of the expected kind, and hands exactly that span to
//! serde_json. Anything it cannot parse is reported as an error; it never
//! repairs or guesses at broken JSON.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::generation::tasks::OutputShape;

/// Max characters of a raw completion kept in log lines.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("completion was empty")]
    Empty,

    #[error("no JSON {expected} found in completion")]
    NotFound { expected: &'static str, raw: String },

    #[error("unbalanced brackets in JSON {expected}")]
    Unbalanced { expected: &'static str, raw: String },

    #[error("JSON {expected} did not parse: {source}")]
    Invalid {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl ExtractError {
    /// The completion the error was raised on.
    pub fn raw(&self) -> &str {
        match self {
            ExtractError::Empty => "",
            ExtractError::NotFound { raw, .. }
            | ExtractError::Unbalanced { raw, .. }
            | ExtractError::Invalid { raw, .. } => raw,
        }
    }

    /// Leading part of the raw completion, for diagnostics.
    pub fn raw_snippet(&self) -> String {
        self.raw().chars().take(SNIPPET_CHARS).collect()
    }
}

/// A completion recovered into the task's declared shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExtractedResult<T = Value> {
    Text(String),
    Records(Vec<T>),
    Record(T),
}

#[cfg(test)]
impl<T> ExtractedResult<T> {
    pub fn shape(&self) -> OutputShape {
        match self {
            ExtractedResult::Text(_) => OutputShape::Text,
            ExtractedResult::Records(_) => OutputShape::JsonArray,
            ExtractedResult::Record(_) => OutputShape::JsonObject,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExtractedResult::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Flattens to a record list: a single record becomes a list of one, text becomes empty.
    pub fn into_records(self) -> Vec<T> {
        match self {
            ExtractedResult::Records(records) => records,
            ExtractedResult::Record(record) => vec![record],
            ExtractedResult::Text(_) => Vec::new(),
        }
    }
}

impl<T> ExtractedResult<T> {
    /// Applies `f` to every record; text passes through untouched.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<ExtractedResult<U>, E> {
        Ok(match self {
            ExtractedResult::Text(text) => ExtractedResult::Text(text),
            ExtractedResult::Records(records) => {
                ExtractedResult::Records(records.into_iter().map(f).collect::<Result<_, _>>()?)
            }
            ExtractedResult::Record(record) => ExtractedResult::Record(f(record)?),
        })
    }
}

/// Extracts `raw` into `shape`. Applied exactly once per completion.
pub fn extract<T: DeserializeOwned>(
    raw: &str,
    shape: OutputShape,
) -> Result<ExtractedResult<T>, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }

    match shape {
        OutputShape::Text => Ok(ExtractedResult::Text(trimmed.to_string())),
        OutputShape::JsonArray => {
            parse_span::<Vec<T>>(trimmed, b'[', "array").map(ExtractedResult::Records)
        }
        OutputShape::JsonObject => {
            parse_span::<T>(trimmed, b'{', "object").map(ExtractedResult::Record)
        }
    }
}

fn parse_span<V: DeserializeOwned>(
    text: &str,
    open: u8,
    expected: &'static str,
) -> Result<V, ExtractError> {
    let span = locate_json(text, open).map_err(|failure| match failure {
        ScanFailure::NotFound => ExtractError::NotFound {
            expected,
            raw: text.to_string(),
        },
        ScanFailure::Unbalanced => ExtractError::Unbalanced {
            expected,
            raw: text.to_string(),
        },
    })?;

    serde_json::from_str(span).map_err(|source| ExtractError::Invalid {
        expected,
        source,
        raw: text.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanFailure {
    NotFound,
    Unbalanced,
}

/// Picks the JSON span: inside a code fence when one holds a balanced span
/// of the expected kind, otherwise anywhere in the text.
///
/// The fence is located without regard to JSON strings, so a ``` inside a
/// string value cuts the block short. The full-text scan is string-aware and
/// recovers that case.
fn locate_json(text: &str, open: u8) -> Result<&str, ScanFailure> {
    if let Some(Ok(span)) = fenced_block(text).map(|fenced| balanced_span(fenced, open)) {
        return Ok(span);
    }
    balanced_span(text, open)
}

/// Content of the first ``` block, minus an optional language tag line.
/// An unterminated fence runs to the end of the text.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];

    let body = match after.find('\n') {
        Some(newline)
            if after[..newline]
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric()) =>
        {
            &after[newline + 1..]
        }
        _ => after,
    };

    Some(body.find("```").map_or(body, |end| &body[..end]))
}

/// Finds the first `open` bracket and the bracket that closes it.
///
/// Single pass over bytes with a stack of expected closers. Brackets inside
/// string literals are ignored; `\"` does not end a string. All delimiters
/// are ASCII, so every slice boundary is a char boundary.
fn balanced_span(text: &str, open: u8) -> Result<&str, ScanFailure> {
    let start = text
        .bytes()
        .position(|b| b == open)
        .ok_or(ScanFailure::NotFound)?;

    let mut closers: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().copied().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' => closers.push(b']'),
            b'{' => closers.push(b'}'),
            b']' | b'}' => {
                if closers.pop() != Some(byte) {
                    return Err(ScanFailure::Unbalanced);
                }
                if closers.is_empty() {
                    return Ok(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    Err(ScanFailure::Unbalanced)
}

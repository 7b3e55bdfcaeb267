//! Decoding of tool output
//!
//! The tool prints either `Key: value` lines or a JSON document depending on
//! whether `-o json` was passed. Callers pick the decoder through an explicit
//! [`OutputMode`]; output is never sniffed.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;
use wfrelay_core::domain::workflow::{OutputMode, WorkflowIdentity};

use crate::error::{EngineError, Result};

/// Most `Key: value` lines the submit subcommand prints in text mode
pub const SUBMIT_TEXT_FIELDS: usize = 8;

/// Decoded tool output
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    Fields(IndexMap<String, String>),
    Document(JsonValue),
}

impl ParsedOutput {
    /// Reads the workflow name and namespace out of submit output
    pub fn identity(&self) -> Result<WorkflowIdentity> {
        let (name, namespace) = match self {
            ParsedOutput::Fields(fields) => (
                fields.get("Name").map(String::as_str),
                fields.get("Namespace").map(String::as_str),
            ),
            ParsedOutput::Document(doc) => (
                doc.pointer("/metadata/name").and_then(JsonValue::as_str),
                doc.pointer("/metadata/namespace").and_then(JsonValue::as_str),
            ),
        };

        match (name, namespace) {
            (Some(name), Some(namespace)) if !name.is_empty() && !namespace.is_empty() => {
                Ok(WorkflowIdentity {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                })
            }
            _ => Err(EngineError::Decode(
                "output does not name the submitted workflow".to_string(),
            )),
        }
    }

    /// JSON view of the output, for returning to callers
    pub fn into_json(self) -> JsonValue {
        match self {
            ParsedOutput::Fields(fields) => JsonValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, JsonValue::String(v)))
                    .collect(),
            ),
            ParsedOutput::Document(doc) => doc,
        }
    }
}

/// Decodes output in the given mode
///
/// `max_fields` only applies to text mode.
pub fn decode(raw: &[u8], mode: OutputMode, max_fields: usize) -> Result<ParsedOutput> {
    match mode {
        OutputMode::Json => parse_json(raw).map(ParsedOutput::Document),
        OutputMode::Text => parse_text(raw, max_fields).map(ParsedOutput::Fields),
    }
}

/// Parses `Key: value` lines, splitting each on its first colon
///
/// Blank lines are skipped. Every other line counts towards `max_fields`;
/// going past it is a decode error. So is a line without a colon, and a key
/// that was already seen.
pub fn parse_text(raw: &[u8], max_fields: usize) -> Result<IndexMap<String, String>> {
    let text = String::from_utf8_lossy(raw);
    let mut fields = IndexMap::new();
    let mut consumed = 0;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if consumed == max_fields {
            return Err(EngineError::Decode(format!(
                "line {} is past the {} expected fields",
                line_no + 1,
                max_fields
            )));
        }

        let (key, value) = line.split_once(':').ok_or_else(|| {
            EngineError::Decode(format!("line {} has no ':' separator", line_no + 1))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(EngineError::Decode(format!(
                "line {} has an empty key",
                line_no + 1
            )));
        }

        if fields.contains_key(key) {
            return Err(EngineError::Decode(format!(
                "line {} repeats the '{}' field",
                line_no + 1,
                key
            )));
        }

        fields.insert(key.to_string(), value.trim().to_string());
        consumed += 1;
    }

    debug!("Decoded {} text field(s)", fields.len());
    Ok(fields)
}

/// Parses the output as one JSON document
pub fn parse_json(raw: &[u8]) -> Result<JsonValue> {
    serde_json::from_slice(raw).map_err(|e| EngineError::Decode(format!("invalid JSON: {}", e)))
}

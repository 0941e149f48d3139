//! Structured-output contract enforcement
//!
//! The model is asked to answer with a single JSON object carrying exactly
//! three keys: `files`, `preview`, and `debug`. This module validates raw
//! completion text against that contract and coerces it into
//! [`GenerationOutput`]. Extra keys are ignored; anything else is rejected.
//!
//! Path safety and the string-ness of `files` values are NOT checked here.
//! Both are the materialization layer's defense, which treats manifest data
//! as untrusted regardless of where it came from.

use serde_json::{Map, Value};

/// Error type for contract violations
#[derive(Debug)]
pub enum ContractError {
    /// The completion text is not a JSON object at all.
    MalformedOutput(String),
    /// The completion parsed, but a required key is missing or has the wrong shape.
    IncompleteOutput(String),
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractError::MalformedOutput(msg) => {
                write!(f, "model output is not valid JSON: {}", msg)
            }
            ContractError::IncompleteOutput(key) => {
                write!(f, "model output missing required key: {}", key)
            }
        }
    }
}

impl std::error::Error for ContractError {}

/// Parsed generation output.
///
/// `files` is kept as the raw JSON object so the materialization layer can
/// apply its own validation to every value.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Raw `files` object mapping paths to (purported) content strings.
    pub files: Map<String, Value>,
    /// HTML preview snippet, passed through unmodified.
    pub preview: String,
    /// Model-side debugging text. Discarded downstream in favor of the
    /// review stage's independent report.
    pub debug: String,
}

/// Parse raw completion text against the generation output contract.
///
/// Surrounding whitespace is trimmed before parsing. Returns
/// [`ContractError::MalformedOutput`] when the text is not a JSON object,
/// and [`ContractError::IncompleteOutput`] naming the first required key
/// that is missing or has the wrong shape.
pub fn parse_generation_output(raw: &str) -> Result<GenerationOutput, ContractError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| ContractError::MalformedOutput(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| ContractError::MalformedOutput("expected a JSON object".to_string()))?;

    let files = object
        .get("files")
        .and_then(Value::as_object)
        .ok_or_else(|| ContractError::IncompleteOutput("files".to_string()))?
        .clone();

    let preview = object
        .get("preview")
        .and_then(Value::as_str)
        .ok_or_else(|| ContractError::IncompleteOutput("preview".to_string()))?
        .to_string();

    let debug = object
        .get("debug")
        .and_then(Value::as_str)
        .ok_or_else(|| ContractError::IncompleteOutput("debug".to_string()))?
        .to_string();

    Ok(GenerationOutput {
        files,
        preview,
        debug,
    })
}

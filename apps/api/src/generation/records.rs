//! Typed records for the structured tasks. Field names match the JSON the
//! prompts ask for (camelCase, as the pages consume them).
//!
//! Every extracted record passes through its task's type before it leaves the
//! facade, so a record with a missing or mistyped field is a malformed
//! completion rather than a partial result.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::generation::extractor::{ExtractError, ExtractedResult};
use crate::generation::tasks::{
    AD_COPY, BUSINESS_NAMES, MEME_CONCEPTS, PRODUCT_DESCRIPTION, SEO_KEYWORDS, SLOGANS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessName {
    pub name: String,
    pub tagline: String,
    /// The model's guess that the name is unclaimed. Not a trademark check.
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slogan {
    pub slogan: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCopy {
    pub headline: String,
    pub body: String,
    pub call_to_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoKeyword {
    pub keyword: String,
    /// "High" | "Medium" | "Low"
    pub search_volume: String,
    pub difficulty: String,
    pub intent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeConcept {
    pub template: String,
    pub top_text: String,
    pub bottom_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescription {
    pub title: String,
    pub description: String,
    pub highlights: Vec<String>,
}

/// Checks every record of `result` against the task's record type and
/// converts it into `T`. Tasks without a record type pass through.
pub fn conform<T: DeserializeOwned>(
    task_id: &str,
    result: ExtractedResult,
    raw: &str,
) -> Result<ExtractedResult<T>, ExtractError> {
    result.try_map(|record| {
        normalize(task_id, record)
            .and_then(serde_json::from_value::<T>)
            .map_err(|source| ExtractError::Invalid {
                expected: "record",
                source,
                raw: raw.to_string(),
            })
    })
}

/// Round-trips a record through its typed form: enforces field presence and
/// types, and drops fields the task never asked for.
fn normalize(task_id: &str, record: Value) -> Result<Value, serde_json::Error> {
    match task_id {
        BUSINESS_NAMES => through::<BusinessName>(record),
        SLOGANS => through::<Slogan>(record),
        AD_COPY => through::<AdCopy>(record),
        SEO_KEYWORDS => through::<SeoKeyword>(record),
        MEME_CONCEPTS => through::<MemeConcept>(record),
        PRODUCT_DESCRIPTION => through::<ProductDescription>(record),
        _ => Ok(record),
    }
}

fn through<R: DeserializeOwned + Serialize>(record: Value) -> Result<Value, serde_json::Error> {
    serde_json::to_value(serde_json::from_value::<R>(record)?)
}

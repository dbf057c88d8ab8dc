//! JSON shapes exchanged with the audit provider
//!
//! Every endpoint answers with the same envelope: a top-level status code and
//! a list of tasks, each carrying its own status code and result list.
//! Page fields are all optional on the wire; missing values default to zero
//! or empty when pages are normalized.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Top-level response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default = "Vec::new")]
    pub tasks: Vec<ApiTask<T>>,
}

/// One task inside a response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTask<T> {
    #[serde(default)]
    pub id: String,
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub result_count: u32,
    #[serde(default = "Option::default")]
    pub result: Option<Vec<T>>,
}

/// Entry of the ready-tasks listing
///
/// An entry without a string id decodes with an empty id and is skipped by
/// the caller, so one bad entry does not hide the rest of the listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEntry {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub result_count: Option<u32>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}

/// Result block of the pages endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesResult {
    #[serde(default)]
    pub crawl_progress: Option<String>,
    #[serde(default)]
    pub items_count: u32,
    #[serde(default)]
    pub items: Vec<RawPage>,
}

/// One audited page as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub onpage_score: Option<f64>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub page_timing: Option<RawTiming>,
    #[serde(default)]
    pub meta: Option<RawMeta>,
    /// Audit check flags; non-boolean values are ignored
    #[serde(default)]
    pub checks: BTreeMap<String, serde_json::Value>,
}

impl RawPage {
    /// Returns the boolean check flags of this page
    pub fn check_flags(&self) -> BTreeMap<String, bool> {
        self.checks
            .iter()
            .filter_map(|(name, value)| value.as_bool().map(|flag| (name.clone(), flag)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTiming {
    /// Full page load time in milliseconds
    #[serde(default)]
    pub duration_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub htags: Option<RawHtags>,
    #[serde(default)]
    pub internal_links_count: Option<u32>,
    #[serde(default)]
    pub external_links_count: Option<u32>,
    #[serde(default)]
    pub broken_links_count: Option<u32>,
    #[serde(default)]
    pub images_count: Option<u32>,
    #[serde(default)]
    pub broken_images_count: Option<u32>,
    #[serde(default)]
    pub images_without_alt_count: Option<u32>,
    #[serde(default)]
    pub content: Option<RawContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHtags {
    #[serde(default)]
    pub h1: Vec<String>,
    #[serde(default)]
    pub h2: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContent {
    #[serde(default)]
    pub plain_text_word_count: Option<u32>,
}

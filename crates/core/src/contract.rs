//! Response contract of the generation webhook.
//!
//! The upstream automation is not under our control and has renamed its
//! output fields several times. Every accepted field name lives in a
//! [`ResponseContract`], an ordered alias list per output slot, so contract
//! drift is a configuration change. The default contract is [`ResponseContract::v1`];
//! deployments may load another one from JSON.
//!
//! Body shapes: a JSON array (first element is read) or a JSON object.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::{MediaKind, PostFormat};

/// `name` or `name[index]`.
static FIELD_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\[(\d+)\])?$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// One alias: a top-level key, optionally indexing into an array value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    pub key: String,
    pub index: Option<usize>,
}

impl FieldPath {
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            index: None,
        }
    }

    pub fn indexed(key: &str, index: usize) -> Self {
        Self {
            key: key.to_string(),
            index: Some(index),
        }
    }

    fn lookup<'a>(&self, obj: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
        let value = obj.get(&self.key)?;
        match self.index {
            None => Some(value),
            Some(i) => value.as_array()?.get(i),
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let caps = FIELD_PATH_RE
            .captures(raw.trim())
            .ok_or_else(|| format!("Invalid field path '{raw}'"))?;
        let key = caps[1].to_string();
        let index = caps
            .get(2)
            .map(|m| m.as_str().parse::<usize>())
            .transpose()
            .map_err(|e| format!("Invalid index in '{raw}': {e}"))?;
        Ok(Self { key, index })
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.key),
            None => f.write_str(&self.key),
        }
    }
}

// ---------------------------------------------------------------------------
// ResponseContract
// ---------------------------------------------------------------------------

/// Ordered alias lists for each output slot. The first alias holding a
/// usable string wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseContract {
    pub version: u32,
    pub text: Vec<FieldPath>,
    pub image_url: Vec<FieldPath>,
    pub video_url: Vec<FieldPath>,
}

impl ResponseContract {
    /// The contract currently produced by the automation.
    pub fn v1() -> Self {
        Self {
            version: 1,
            text: vec![
                FieldPath::key("generated_text"),
                FieldPath::key("post_content"),
                FieldPath::key("text"),
                FieldPath::indexed("facebookOutput", 0),
            ],
            image_url: vec![
                FieldPath::key("generated_image_url"),
                FieldPath::indexed("url", 0),
                FieldPath::key("image_url"),
            ],
            video_url: vec![
                FieldPath::key("generated_video_url"),
                FieldPath::key("video_url"),
            ],
        }
    }

    /// Parse a contract from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl Default for ResponseContract {
    fn default() -> Self {
        Self::v1()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// The response body was not JSON at all.
#[derive(Debug, thiserror::Error)]
#[error("Webhook response is not valid JSON: {0}")]
pub struct InvalidResponseBody(#[from] serde_json::Error);

/// Output values found in a webhook response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedContent {
    pub text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl ExtractedContent {
    /// Keep only the slots the post format uses: text always, plus the
    /// image or video URL.
    pub fn for_format(self, format: PostFormat) -> Self {
        let kind = format.media_kind();
        Self {
            text: self.text,
            image_url: self.image_url.filter(|_| kind == Some(MediaKind::Image)),
            video_url: self.video_url.filter(|_| kind == Some(MediaKind::Video)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image_url.is_none() && self.video_url.is_none()
    }
}

/// Trim surrounding whitespace and quote characters. The automation
/// sometimes returns text still wrapped in its JSON quotes.
pub fn strip_wrapping(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Parse a webhook response body and extract every output slot.
///
/// Non-string values and values that are empty after trimming are skipped
/// in favour of the next alias. An array body with no elements, or a JSON
/// scalar, yields an empty result rather than an error.
pub fn extract_content(
    body: &str,
    contract: &ResponseContract,
) -> Result<ExtractedContent, InvalidResponseBody> {
    let value: Value = serde_json::from_str(body)?;

    let record = match &value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    let Some(Value::Object(obj)) = record else {
        return Ok(ExtractedContent::default());
    };

    Ok(ExtractedContent {
        text: first_string(obj, &contract.text),
        image_url: first_string(obj, &contract.image_url),
        video_url: first_string(obj, &contract.video_url),
    })
}

fn first_string(obj: &serde_json::Map<String, Value>, aliases: &[FieldPath]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        let s = alias.lookup(obj)?.as_str()?;
        let cleaned = strip_wrapping(s);
        (!cleaned.is_empty()).then(|| cleaned.to_string())
    })
}

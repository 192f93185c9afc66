//! Content vocabulary shared by the draft, review, and history flows.
//!
//! The wire and storage representation of each enum is the human label the
//! automation webhook already understands (`"Image + Text"`, `"Upload My
//! Own"`, ...). Lowercase slugs are accepted on input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Draft status tags
// ---------------------------------------------------------------------------

/// Draft row was persisted and the webhook has not written content yet.
pub const STATUS_DRAFT_CREATED: &str = "draft_created";

/// The generation webhook produced content for the draft.
pub const STATUS_CONTENT_GENERATED: &str = "content_generated";

/// The owner approved the generated content.
pub const STATUS_APPROVED: &str = "content_generated_approved";

/// The owner rejected the generated content. The capital `R` is part of
/// the stored tag and is matched verbatim by downstream automations.
pub const STATUS_REJECTED: &str = "content_generated_Rejected";

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Target social platform of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Facebook", alias = "facebook")]
    Facebook,
    #[serde(rename = "Twitter (X)", alias = "x", alias = "twitter", alias = "X")]
    Twitter,
    #[serde(rename = "Instagram", alias = "instagram")]
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Twitter, Platform::Instagram];

    /// Label stored on draft rows and sent to the webhook.
    pub fn label(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter (X)",
            Platform::Instagram => "Instagram",
        }
    }

    /// Slug used by campaign content rows.
    pub fn slug(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Twitter => "x",
            Platform::Instagram => "instagram",
        }
    }

    /// Short display label used by the history listing.
    pub fn short_label(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Twitter => "X",
            Platform::Instagram => "Instagram",
        }
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Facebook" | "facebook" => Ok(Platform::Facebook),
            "Twitter (X)" | "twitter" | "x" | "X" => Ok(Platform::Twitter),
            "Instagram" | "instagram" => Ok(Platform::Instagram),
            other => Err(CoreError::Validation(format!("Unknown platform '{other}'"))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// PostFormat
// ---------------------------------------------------------------------------

/// Desired post format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostFormat {
    #[serde(rename = "Text Only", alias = "text_only")]
    TextOnly,
    #[serde(rename = "Image + Text", alias = "image_text")]
    ImageText,
    #[serde(rename = "Video Post", alias = "video")]
    Video,
}

impl PostFormat {
    pub fn label(self) -> &'static str {
        match self {
            PostFormat::TextOnly => "Text Only",
            PostFormat::ImageText => "Image + Text",
            PostFormat::Video => "Video Post",
        }
    }

    /// The media slot this format fills, if any.
    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            PostFormat::TextOnly => None,
            PostFormat::ImageText => Some(MediaKind::Image),
            PostFormat::Video => Some(MediaKind::Video),
        }
    }
}

impl FromStr for PostFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Text Only" | "text_only" => Ok(PostFormat::TextOnly),
            "Image + Text" | "image_text" => Ok(PostFormat::ImageText),
            "Video Post" | "video" => Ok(PostFormat::Video),
            other => Err(CoreError::Validation(format!("Unknown format '{other}'"))),
        }
    }
}

impl fmt::Display for PostFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// AssetSource
// ---------------------------------------------------------------------------

/// Where the media of a non-text post comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetSource {
    #[serde(rename = "AI Generate", alias = "ai_generate")]
    AiGenerate,
    #[serde(rename = "Upload My Own", alias = "user_upload")]
    UserUpload,
}

impl AssetSource {
    pub fn label(self) -> &'static str {
        match self {
            AssetSource::AiGenerate => "AI Generate",
            AssetSource::UserUpload => "Upload My Own",
        }
    }
}

impl FromStr for AssetSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AI Generate" | "ai_generate" => Ok(AssetSource::AiGenerate),
            "Upload My Own" | "user_upload" => Ok(AssetSource::UserUpload),
            other => Err(CoreError::Validation(format!(
                "Unknown asset source '{other}'"
            ))),
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// A media slot on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// MIME top-level type accepted for this slot.
    pub fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Video => "video/",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Map a campaign content platform slug to its history label.
///
/// Unknown slugs are shown as-is.
pub fn campaign_platform_label(slug: &str) -> &str {
    match slug.parse::<Platform>() {
        Ok(platform) => platform.short_label(),
        Err(_) => slug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_labels_round_trip_through_from_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.label().parse::<Platform>().unwrap(), platform);
            assert_eq!(platform.slug().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_platform_serde_accepts_slug_alias() {
        let p: Platform = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(p, Platform::Twitter);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"Twitter (X)\"");
    }

    #[test]
    fn test_format_media_kind() {
        assert_eq!(PostFormat::TextOnly.media_kind(), None);
        assert_eq!(PostFormat::ImageText.media_kind(), Some(MediaKind::Image));
        assert_eq!(PostFormat::Video.media_kind(), Some(MediaKind::Video));
    }

    #[test]
    fn test_unknown_format_is_validation_error() {
        let err = "Carousel".parse::<PostFormat>().unwrap_err();
        assert!(err.to_string().contains("Unknown format"));
    }

    #[test]
    fn test_campaign_platform_label() {
        assert_eq!(campaign_platform_label("x"), "X");
        assert_eq!(campaign_platform_label("facebook"), "Facebook");
        assert_eq!(campaign_platform_label("myspace"), "myspace");
    }

    #[test]
    fn test_rejected_status_keeps_capital_r() {
        assert!(STATUS_REJECTED.ends_with("_Rejected"));
    }
}

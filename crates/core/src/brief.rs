//! Content brief: the draft-creation form and its validation rules.
//!
//! [`BriefForm`] carries the editing rules of the blueprint form (choosing
//! "Text Only" drops any asset choice, leaving "Upload My Own" drops the
//! attached file). [`ContentBrief`] is the submitted form and
//! [`ContentBrief::validate`] is the gate in front of every network call.

use serde::{Deserialize, Serialize};

use crate::content::{AssetSource, MediaKind, Platform, PostFormat};
use crate::error::CoreError;
use crate::upload::validate_asset_mime;

/// Message shown for any missing required field.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// File-picker accept list for image assets.
pub const IMAGE_ACCEPT: &str = ".jpg,.jpeg,.png,.gif";

/// File-picker accept list for video assets.
pub const VIDEO_ACCEPT: &str = ".mp4,.mov,.avi";

/// A user-supplied asset file attached to a brief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFile {
    pub name: String,
    /// MIME type reported by the client, when known.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Public URL when the file was already uploaded through the asset
    /// side-channel.
    #[serde(default)]
    pub uploaded_url: Option<String>,
}

/// A submitted draft-creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBrief {
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub format: Option<PostFormat>,
    #[serde(default)]
    pub asset_source: Option<AssetSource>,
    #[serde(default)]
    pub knowledge_base_file_name: Option<String>,
    #[serde(default)]
    pub asset_file: Option<AssetFile>,
}

/// A brief that passed [`ContentBrief::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedBrief {
    /// Trimmed idea text, never empty.
    pub idea: String,
    pub platform: Platform,
    pub format: PostFormat,
    /// Always `None` for text-only posts.
    pub asset_source: Option<AssetSource>,
    pub knowledge_base_file_name: Option<String>,
    /// Only kept when the asset source is a user upload.
    pub asset_file: Option<AssetFile>,
}

impl ContentBrief {
    /// Check every required field and normalize the brief.
    ///
    /// Rules: idea non-blank, platform chosen, format chosen; for image or
    /// video posts an asset source is chosen; for user uploads a file is
    /// attached and its MIME type (when reported) matches the format.
    pub fn validate(&self) -> Result<ValidatedBrief, CoreError> {
        let mut missing = Vec::new();

        let idea = self.idea.trim();
        if idea.is_empty() {
            missing.push("idea");
        }
        if self.platform.is_none() {
            missing.push("platform");
        }
        if self.format.is_none() {
            missing.push("format");
        }

        let media_post = matches!(self.format, Some(f) if f != PostFormat::TextOnly);
        if media_post {
            match self.asset_source {
                None => missing.push("asset_source"),
                Some(AssetSource::UserUpload) if !has_file(self.asset_file.as_ref()) => {
                    missing.push("asset_file")
                }
                _ => {}
            }
        }

        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "{MISSING_FIELDS_MESSAGE}: {}",
                missing.join(", ")
            )));
        }

        // Both are present, checked above.
        let (Some(platform), Some(format)) = (self.platform, self.format) else {
            return Err(CoreError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        };

        let asset_source = if format == PostFormat::TextOnly {
            None
        } else {
            self.asset_source
        };

        let asset_file = match asset_source {
            Some(AssetSource::UserUpload) => self.asset_file.clone(),
            _ => None,
        };

        if let Some(content_type) = asset_file.as_ref().and_then(|f| f.content_type.as_deref()) {
            validate_asset_mime(format, content_type)?;
        }

        Ok(ValidatedBrief {
            idea: idea.to_string(),
            platform,
            format,
            asset_source,
            knowledge_base_file_name: self
                .knowledge_base_file_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            asset_file,
        })
    }
}

fn has_file(file: Option<&AssetFile>) -> bool {
    file.is_some_and(|f| !f.name.trim().is_empty())
}

impl ValidatedBrief {
    pub fn is_user_upload(&self) -> bool {
        self.asset_source == Some(AssetSource::UserUpload)
    }

    /// The already-uploaded asset URL and the slot it belongs in.
    pub fn uploaded_media(&self) -> Option<(MediaKind, &str)> {
        let kind = self.format.media_kind()?;
        let url = self.asset_file.as_ref()?.uploaded_url.as_deref()?;
        Some((kind, url))
    }
}

// ---------------------------------------------------------------------------
// BriefForm
// ---------------------------------------------------------------------------

/// Editable form state for the blueprint page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BriefForm {
    pub idea: String,
    pub platform: Option<Platform>,
    format: Option<PostFormat>,
    asset_source: Option<AssetSource>,
    pub knowledge_base_file_name: Option<String>,
    asset_file: Option<AssetFile>,
}

impl BriefForm {
    pub fn format(&self) -> Option<PostFormat> {
        self.format
    }

    pub fn asset_source(&self) -> Option<AssetSource> {
        self.asset_source
    }

    pub fn asset_file(&self) -> Option<&AssetFile> {
        self.asset_file.as_ref()
    }

    /// Choosing "Text Only" clears the asset source and file.
    pub fn set_format(&mut self, format: PostFormat) {
        self.format = Some(format);
        if format == PostFormat::TextOnly {
            self.asset_source = None;
            self.asset_file = None;
        }
    }

    /// Any source other than a user upload clears the attached file.
    pub fn set_asset_source(&mut self, source: AssetSource) {
        self.asset_source = Some(source);
        if source != AssetSource::UserUpload {
            self.asset_file = None;
        }
    }

    /// Attach an asset file after checking its MIME type against the format.
    ///
    /// A rejected file leaves no file attached.
    pub fn select_asset_file(&mut self, file: AssetFile) -> Result<(), CoreError> {
        let format = self
            .format
            .ok_or_else(|| CoreError::Validation("Choose a post format first".to_string()))?;
        let content_type = file.content_type.as_deref().unwrap_or_default();
        match validate_asset_mime(format, content_type) {
            Ok(_) => {
                self.asset_file = Some(file);
                Ok(())
            }
            Err(e) => {
                self.asset_file = None;
                Err(e)
            }
        }
    }

    /// Accept list for the asset file picker.
    pub fn accepted_file_types(&self) -> &'static str {
        match self.format {
            Some(PostFormat::ImageText) => IMAGE_ACCEPT,
            Some(PostFormat::Video) => VIDEO_ACCEPT,
            _ => "",
        }
    }

    /// Whether the asset source picker is shown.
    pub fn shows_asset_source(&self) -> bool {
        matches!(self.format, Some(f) if f != PostFormat::TextOnly)
    }

    pub fn to_brief(&self) -> ContentBrief {
        ContentBrief {
            idea: self.idea.clone(),
            platform: self.platform,
            format: self.format,
            asset_source: self.asset_source,
            knowledge_base_file_name: self.knowledge_base_file_name.clone(),
            asset_file: self.asset_file.clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.to_brief().validate().is_ok()
    }

    /// The submit control is enabled only for a valid form with nothing in
    /// flight.
    pub fn submit_enabled(&self, in_flight: bool) -> bool {
        !in_flight && self.is_valid()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn image(name: &str) -> AssetFile {
        AssetFile {
            name: name.to_string(),
            content_type: Some("image/png".to_string()),
            uploaded_url: None,
        }
    }

    fn brief() -> ContentBrief {
        ContentBrief {
            idea: "  Launch of the eco collection ".to_string(),
            platform: Some(Platform::Instagram),
            format: Some(PostFormat::TextOnly),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_only_brief_is_valid_and_trimmed() {
        let v = brief().validate().unwrap();
        assert_eq!(v.idea, "Launch of the eco collection");
        assert_eq!(v.asset_source, None);
    }

    #[test]
    fn test_blank_idea_rejected() {
        let mut b = brief();
        b.idea = "   ".to_string();
        let err = b.validate().unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("idea"));
    }

    #[test]
    fn test_missing_platform_rejected() {
        let mut b = brief();
        b.platform = None;
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_missing_format_rejected() {
        let mut b = brief();
        b.format = None;
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_media_post_requires_asset_source() {
        let mut b = brief();
        b.format = Some(PostFormat::ImageText);
        let err = b.validate().unwrap_err();
        assert!(err.to_string().contains("asset_source"));
    }

    #[test]
    fn test_upload_requires_file() {
        let mut b = brief();
        b.format = Some(PostFormat::Video);
        b.asset_source = Some(AssetSource::UserUpload);
        let err = b.validate().unwrap_err();
        assert!(err.to_string().contains("asset_file"));
    }

    #[test]
    fn test_upload_with_wrong_mime_rejected() {
        let mut b = brief();
        b.format = Some(PostFormat::Video);
        b.asset_source = Some(AssetSource::UserUpload);
        b.asset_file = Some(image("cat.png"));
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_text_only_drops_asset_choices() {
        let mut b = brief();
        b.asset_source = Some(AssetSource::UserUpload);
        b.asset_file = Some(image("cat.png"));
        let v = b.validate().unwrap();
        assert_eq!(v.asset_source, None);
        assert_eq!(v.asset_file, None);
    }

    #[test]
    fn test_ai_generate_drops_file() {
        let mut b = brief();
        b.format = Some(PostFormat::ImageText);
        b.asset_source = Some(AssetSource::AiGenerate);
        b.asset_file = Some(image("cat.png"));
        let v = b.validate().unwrap();
        assert_eq!(v.asset_file, None);
        assert!(!v.is_user_upload());
    }

    #[test]
    fn test_uploaded_media_uses_format_slot() {
        let mut b = brief();
        b.format = Some(PostFormat::ImageText);
        b.asset_source = Some(AssetSource::UserUpload);
        let mut file = image("cat.png");
        file.uploaded_url = Some("http://cdn/cat.png".to_string());
        b.asset_file = Some(file);
        let v = b.validate().unwrap();
        assert_eq!(v.uploaded_media(), Some((MediaKind::Image, "http://cdn/cat.png")));
    }

    #[test]
    fn test_form_text_only_clears_asset_state() {
        let mut form = BriefForm::default();
        form.set_format(PostFormat::ImageText);
        form.set_asset_source(AssetSource::UserUpload);
        form.select_asset_file(image("cat.png")).unwrap();
        form.set_format(PostFormat::TextOnly);
        assert_eq!(form.asset_source(), None);
        assert!(form.asset_file().is_none());
    }

    #[test]
    fn test_form_switching_to_ai_clears_file() {
        let mut form = BriefForm::default();
        form.set_format(PostFormat::ImageText);
        form.set_asset_source(AssetSource::UserUpload);
        form.select_asset_file(image("cat.png")).unwrap();
        form.set_asset_source(AssetSource::AiGenerate);
        assert!(form.asset_file().is_none());
    }

    #[test]
    fn test_pdf_rejected_for_image_format_leaves_no_file() {
        let mut form = BriefForm::default();
        form.set_format(PostFormat::ImageText);
        form.set_asset_source(AssetSource::UserUpload);
        let pdf = AssetFile {
            name: "deck.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            uploaded_url: None,
        };
        assert!(form.select_asset_file(pdf).is_err());
        assert!(form.asset_file().is_none());
    }

    #[test]
    fn test_submit_disabled_while_in_flight() {
        let mut form = BriefForm {
            idea: "idea".to_string(),
            platform: Some(Platform::Facebook),
            ..Default::default()
        };
        form.set_format(PostFormat::TextOnly);
        assert!(form.submit_enabled(false));
        assert!(!form.submit_enabled(true));
    }

    #[test]
    fn test_accepted_file_types_follow_format() {
        let mut form = BriefForm::default();
        assert_eq!(form.accepted_file_types(), "");
        form.set_format(PostFormat::Video);
        assert_eq!(form.accepted_file_types(), VIDEO_ACCEPT);
        assert!(form.shows_asset_source());
    }
}

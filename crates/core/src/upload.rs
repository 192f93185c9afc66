//! Upload rules for user-supplied assets.
//!
//! The MIME gate matches the top-level type against the post format, and
//! object paths follow `{namespace}/user-{id}/{timestamp}_{filename}`.

use crate::content::{MediaKind, PostFormat};
use crate::error::CoreError;
use crate::types::UserId;

/// Storage namespace for user-uploaded post assets.
pub const ASSET_NAMESPACE: &str = "assets";

/// Validate a reported MIME type against the post format.
///
/// "Image + Text" accepts `image/*`, "Video Post" accepts `video/*`,
/// "Text Only" accepts no asset at all.
pub fn validate_asset_mime(format: PostFormat, content_type: &str) -> Result<MediaKind, CoreError> {
    let Some(kind) = format.media_kind() else {
        return Err(CoreError::Validation(
            "Text-only posts do not take an asset file".to_string(),
        ));
    };

    let normalized = content_type.trim().to_ascii_lowercase();
    if normalized.starts_with(kind.mime_prefix()) {
        Ok(kind)
    } else {
        Err(CoreError::Validation(format!(
            "Please upload a valid {} file (got '{}')",
            kind.noun(),
            if normalized.is_empty() { "unknown" } else { normalized.as_str() }
        )))
    }
}

/// Strip directory components and control characters from a client
/// filename. Falls back to `upload` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Object path for an upload: `{namespace}/user-{id}/{timestamp_ms}_{filename}`.
pub fn storage_path(namespace: &str, user_id: UserId, timestamp_ms: i64, filename: &str) -> String {
    format!(
        "{namespace}/user-{user_id}/{timestamp_ms}_{}",
        sanitize_filename(filename)
    )
}

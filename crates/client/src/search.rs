//! Semantic product search: free text and recorded speech.
//!
//! Both endpoints rank the whole catalog by embedding distance, so they take a
//! result `limit` but no page.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::instrument;

use shopkeeper_core::{ListResponse, Product};

use crate::{ApiClient, ApiError};

/// Number of results requested when the caller does not say.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Serialize)]
struct TextSearchRequest<'a> {
    search: &'a str,
    limit: u32,
}

/// An audio clip to transcribe and search with.
#[derive(Clone)]
pub struct VoiceClip {
    bytes: Vec<u8>,
    file_name: String,
    mime: String,
}

impl VoiceClip {
    /// Wrap raw audio bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime: mime.into(),
        }
    }

    /// Read a clip from disk, guessing the MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "audio".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = mime_for_extension(path.extension().and_then(|e| e.to_str()));
        Ok(Self::new(bytes, file_name, mime))
    }

    /// Clip size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the clip holds no audio.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type sent with the upload.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }
}

impl std::fmt::Debug for VoiceClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceClip")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

fn mime_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("m4a" | "mp4") => "audio/mp4",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

impl ApiClient {
    /// Rank products by similarity to a free-text query.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn text_search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<ListResponse<Product>, ApiError> {
        let body = TextSearchRequest {
            search: query,
            limit: limit.max(1),
        };
        self.post("products/text_search", &body).await
    }

    /// Transcribe `clip` on the backend and rank products by the transcript.
    ///
    /// The clip is sent as the multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns error if the upload or the API request fails.
    #[instrument(skip(self, clip), fields(file_name = %clip.file_name, bytes = clip.len()))]
    pub async fn voice_search(
        &self,
        clip: VoiceClip,
        limit: u32,
    ) -> Result<ListResponse<Product>, ApiError> {
        let part = Part::bytes(clip.bytes)
            .file_name(clip.file_name)
            .mime_str(&clip.mime)?;
        let form = Form::new().part("file", part);
        self.post_multipart(
            "products/voice_search",
            &[("limit", limit.max(1).to_string())],
            form,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_extension(Some("WAV")), "audio/wav");
        assert_eq!(mime_for_extension(Some("webm")), "audio/webm");
        assert_eq!(mime_for_extension(None), "application/octet-stream");
    }

    #[test]
    fn test_voice_clip_debug_omits_bytes() {
        let clip = VoiceClip::new(vec![1, 2, 3], "note.ogg", "audio/ogg");
        let debug_output = format!("{clip:?}");
        assert!(debug_output.contains("note.ogg"));
        assert!(debug_output.contains("bytes: 3"));
    }
}

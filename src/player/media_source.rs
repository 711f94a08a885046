use std::fmt;
use url::Url;

use crate::utils::PlayerError;

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "file", "content", "asset", "rtsp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Dash,
    Hls,
    SmoothStreaming,
    /// Plain container files (mp4, mkv, webm, ...).
    Progressive,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Dash => "DASH",
            ContentType::Hls => "HLS",
            ContentType::SmoothStreaming => "SmoothStreaming",
            ContentType::Progressive => "Progressive",
        };
        f.write_str(name)
    }
}

impl ContentType {
    /// Infer from a lowercase file name or `.ext` suffix.
    fn from_file_name(name: &str) -> Self {
        let name = strip_manifest_suffix(name);
        if name.ends_with(".mpd") {
            ContentType::Dash
        } else if name.ends_with(".m3u8") {
            ContentType::Hls
        } else if name.ends_with(".ism") || name.ends_with(".isml") {
            ContentType::SmoothStreaming
        } else {
            ContentType::Progressive
        }
    }
}

// Smooth Streaming URLs usually end in `/Manifest` or `/Manifest(format=...)`.
fn strip_manifest_suffix(path: &str) -> &str {
    if let Some(index) = path.rfind("/manifest") {
        let rest = &path[index + "/manifest".len()..];
        if rest.is_empty() || (rest.starts_with('(') && rest.ends_with(')')) {
            return &path[..index];
        }
    }
    path
}

/// A resolved, loadable source handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub uri: Url,
    pub content_type: ContentType,
}

impl MediaSource {
    pub fn resolve(content_id: &str) -> Result<Self, PlayerError> {
        Self::resolve_with_extension(content_id, None)
    }

    /// Resolve `content_id`, optionally forcing the type through an
    /// extension (without the leading dot) instead of the URL path.
    pub fn resolve_with_extension(
        content_id: &str,
        override_extension: Option<&str>,
    ) -> Result<Self, PlayerError> {
        let trimmed = content_id.trim();
        if trimmed.is_empty() {
            return Err(PlayerError::InvalidRequest("empty content id".to_string()));
        }

        let uri = parse_uri(trimmed)?;
        if !SUPPORTED_SCHEMES.contains(&uri.scheme()) {
            return Err(PlayerError::unsupported(
                content_id,
                format!("scheme {} is not supported", uri.scheme()),
            ));
        }

        let content_type = match override_extension {
            Some(ext) => {
                let ext = ext.trim_start_matches('.').to_ascii_lowercase();
                if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(PlayerError::unsupported(
                        content_id,
                        format!("invalid extension override {:?}", ext),
                    ));
                }
                ContentType::from_file_name(&format!(".{}", ext))
            }
            None => ContentType::from_file_name(&uri.path().to_ascii_lowercase()),
        };

        Ok(Self { uri, content_type })
    }
}

fn parse_uri(content_id: &str) -> Result<Url, PlayerError> {
    match Url::parse(content_id) {
        Ok(uri) => Ok(uri),
        Err(url::ParseError::RelativeUrlWithoutBase) if content_id.starts_with('/') => {
            Url::from_file_path(content_id)
                .map_err(|_| PlayerError::unsupported(content_id, "not an absolute file path"))
        }
        Err(e) => Err(PlayerError::unsupported(content_id, e.to_string())),
    }
}

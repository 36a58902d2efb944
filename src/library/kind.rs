//! Coarse media classification by file extension.

use serde::{Deserialize, Serialize};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Which viewer a record is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Unsupported,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Audio,
        MediaKind::Video,
        MediaKind::Image,
        MediaKind::Unsupported,
    ];
}

/// Classify a URI by the text after its last `.`
///
/// A URI without a `.` is treated as all-extension and lands in
/// [`MediaKind::Unsupported`].
pub fn classify(uri: &str) -> MediaKind {
    let extension = uri.rsplit('.').next().unwrap_or(uri).to_ascii_lowercase();
    let extension = extension.as_str();

    if AUDIO_EXTENSIONS.contains(&extension) {
        MediaKind::Audio
    } else if VIDEO_EXTENSIONS.contains(&extension) {
        MediaKind::Video
    } else if IMAGE_EXTENSIONS.contains(&extension) {
        MediaKind::Image
    } else {
        MediaKind::Unsupported
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
            MediaKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            "image" | "img" => Ok(MediaKind::Image),
            "unsupported" | "other" => Ok(MediaKind::Unsupported),
            _ => anyhow::bail!("Unknown media kind: {}", s),
        }
    }
}

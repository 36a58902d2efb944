//! The catalog entry type.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// MIME type used when nothing better can be guessed
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Reasons a record is rejected at construction time
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Record URI must not be empty")]
    EmptyUri,

    #[error("Record name must not be empty")]
    EmptyName,

    #[error("Invalid media type: {0:?} (expected major/minor)")]
    InvalidMediaType(String),
}

/// One catalog entry describing a recorded or picked media file
///
/// The serialized field names (`id`, `name`, `uri`, `type`, `date`) are the
/// persisted format. Reading is lenient so entries written by older
/// producers still load; writing always goes through [`FileRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Creation timestamp in epoch milliseconds
    #[serde(default, deserialize_with = "string_or_null")]
    pub id: String,

    /// Display name
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,

    /// Local path or `file://` URI
    pub uri: String,

    /// MIME type
    #[serde(rename = "type", default, deserialize_with = "string_or_null")]
    pub media_type: String,

    /// RFC 3339 creation time
    #[serde(default, deserialize_with = "string_or_null")]
    pub date: String,

    /// Name field used by older picker entries
    #[serde(
        rename = "fileName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_name: Option<String>,
}

/// Stored entries may carry `null` where a string is expected
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl FileRecord {
    /// Build a canonical record created now
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Result<Self, RecordError> {
        Self::created_at_time(name, uri, media_type, Utc::now())
    }

    /// Build a canonical record with an explicit creation time
    pub fn created_at_time(
        name: impl Into<String>,
        uri: impl Into<String>,
        media_type: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let uri = uri.into();
        let media_type = media_type.into();

        if uri.trim().is_empty() {
            return Err(RecordError::EmptyUri);
        }
        if name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if !is_media_type(&media_type) {
            return Err(RecordError::InvalidMediaType(media_type));
        }

        Ok(Self {
            id: created.timestamp_millis().to_string(),
            name,
            uri,
            media_type,
            date: created.to_rfc3339_opts(SecondsFormat::Millis, true),
            legacy_name: None,
        })
    }

    /// Override the generated ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Creation time, if `date` holds an RFC 3339 timestamp
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Name for display
    ///
    /// Falls back to the legacy `fileName`, then to the last path segment
    /// of the URI.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.legacy_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.uri.rsplit('/').next().unwrap_or(&self.uri),
        }
    }
}

/// Guess a MIME type from a file name or URI
pub fn guess_media_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| match extension_of(name).as_deref() {
            // Recorder output; not every mime table knows it
            Some("m4a") => "audio/mp4".to_string(),
            _ => FALLBACK_MEDIA_TYPE.to_string(),
        })
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

fn is_media_type(value: &str) -> bool {
    match value.split_once('/') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && !minor.contains('/')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_record_is_canonical() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record =
            FileRecord::created_at_time("a.mp3", "file:///a.mp3", "audio/mpeg", created).unwrap();

        assert_eq!(record.id, created.timestamp_millis().to_string());
        assert_eq!(record.date, "2024-01-01T12:00:00.000Z");
        assert_eq!(record.created_at(), Some(created));
    }

    #[test]
    fn test_constructor_rejects_bad_input() {
        assert_eq!(
            FileRecord::new("a.mp3", "", "audio/mpeg").unwrap_err(),
            RecordError::EmptyUri
        );
        assert_eq!(
            FileRecord::new("  ", "file:///a.mp3", "audio/mpeg").unwrap_err(),
            RecordError::EmptyName
        );
        assert_eq!(
            FileRecord::new("a.mp3", "file:///a.mp3", "audio").unwrap_err(),
            RecordError::InvalidMediaType("audio".to_string())
        );
        assert!(FileRecord::new("a", "file:///a", "a/b/c").is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let record = FileRecord::new("b.png", "file:///b.png", "image/png")
            .unwrap()
            .with_id("2");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], "2");
        assert_eq!(value["type"], "image/png");
        assert!(value.get("media_type").is_none());
    }

    #[test]
    fn test_reads_legacy_recorder_entry() {
        // Older recorder entries have no id or name and a bare "audio" type
        let json = r#"{"uri":"/docs/rec.m4a","date":"2024-03-05T10:00:00.000Z","type":"audio"}"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "");
        assert_eq!(record.media_type, "audio");
        assert_eq!(record.display_name(), "rec.m4a");
        assert!(record.created_at().is_some());
    }

    #[test]
    fn test_reads_null_fields_as_empty() {
        let json = r#"{"id":null,"name":null,"uri":"file:///x.bin","type":null,"date":null}"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "");
        assert_eq!(record.media_type, "");
        assert_eq!(record.date, "");
        assert_eq!(record.display_name(), "x.bin");
    }

    #[test]
    fn test_display_name_prefers_legacy_file_name() {
        let json = r#"{"uri":"file:///cache/DocumentPicker/abc123.png","fileName":"cat.png","type":"image/png"}"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_name(), "cat.png");

        let with_both = r#"{"name":"dog.png","fileName":"cat.png","uri":"file:///d.png"}"#;
        let record: FileRecord = serde_json::from_str(with_both).unwrap();
        assert_eq!(record.display_name(), "dog.png");
    }

    #[test]
    fn test_legacy_name_not_written_when_absent() {
        let record = FileRecord::new("a.mp3", "file:///a.mp3", "audio/mpeg").unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("fileName").is_none());
    }

    #[test]
    fn test_locale_date_has_no_timestamp() {
        let json = r#"{"id":"1","name":"x.pdf","uri":"/x.pdf","type":"application/pdf","date":"1/2/2024, 3:04:05 PM"}"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.created_at(), None);
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("song.mp3"), "audio/mpeg");
        assert_eq!(guess_media_type("photo.PNG"), "image/png");
        assert!(guess_media_type("voice.m4a").starts_with("audio/"));
        assert_eq!(guess_media_type("noext"), FALLBACK_MEDIA_TYPE);
    }
}

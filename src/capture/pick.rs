//! Registering files chosen in a document picker.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::CaptureError;
use crate::library::{guess_media_type, CatalogStore, FileRecord};
use crate::store::KeyValueStore;

/// A file returned by the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedFile {
    pub name: String,
    pub uri: String,
    /// MIME type reported by the picker, if any
    pub mime_type: Option<String>,
}

/// Result of presenting the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(PickedFile),
    Cancelled,
}

/// Catalog a picked file; a cancelled pick does nothing
pub async fn register_pick<S: KeyValueStore>(
    catalog: &CatalogStore<S>,
    outcome: PickOutcome,
) -> Result<Option<FileRecord>, CaptureError> {
    let picked = match outcome {
        PickOutcome::Picked(picked) => picked,
        PickOutcome::Cancelled => {
            debug!("pick cancelled");
            return Ok(None);
        }
    };

    let media_type = picked
        .mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| guess_media_type(&picked.name));

    let record = FileRecord::new(picked.name, picked.uri, media_type)?;
    catalog.append(record.clone()).await?;

    info!(name = %record.name, media_type = %record.media_type, "file uploaded");
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::RecordError;
    use crate::store::{KeyValueStore, MemoryKvStore};

    #[tokio::test]
    async fn test_cancelled_pick_is_noop() {
        let kv = MemoryKvStore::new();
        let catalog = CatalogStore::new(kv.clone());

        let result = register_pick(&catalog, PickOutcome::Cancelled).await.unwrap();

        assert_eq!(result, None);
        assert_eq!(kv.get("files").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pick_keeps_picker_mime_type() {
        let catalog = CatalogStore::new(MemoryKvStore::new());
        let picked = PickedFile {
            name: "report.pdf".to_string(),
            uri: "file:///cache/report.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
        };

        let record = register_pick(&catalog, PickOutcome::Picked(picked))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.media_type, "application/pdf");
        assert_eq!(record.uri, "file:///cache/report.pdf");
        assert_eq!(catalog.load().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_pick_without_mime_type_guesses() {
        let catalog = CatalogStore::new(MemoryKvStore::new());
        let picked = PickedFile {
            name: "b.png".to_string(),
            uri: "file:///b.png".to_string(),
            mime_type: None,
        };

        let record = register_pick(&catalog, PickOutcome::Picked(picked))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_pick_with_empty_uri_is_rejected() {
        let catalog = CatalogStore::new(MemoryKvStore::new());
        let picked = PickedFile {
            name: "x.png".to_string(),
            uri: String::new(),
            mime_type: None,
        };

        let err = register_pick(&catalog, PickOutcome::Picked(picked))
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::Record(RecordError::EmptyUri)));
        assert!(catalog.is_empty().await.unwrap());
    }
}

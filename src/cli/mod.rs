//! Command-line interface for mediashelf.
//!
//! Provides commands for saving recordings, uploading files, listing the
//! catalog, and opening an entry in the matching viewer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::capture::{finalize_recording, register_pick, PickOutcome, PickedFile};
use crate::config;
use crate::library::{classify, guess_media_type, CatalogStore, FileRecord, MediaKind};
use crate::store::FileKvStore;
use crate::viewer::{self, ViewError};

/// mediashelf - On-device catalog of recordings and uploaded files
#[derive(Parser, Debug)]
#[command(name = "mediashelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a finished recording (moves it into the documents directory)
    Record {
        /// Path of the file the recorder produced
        path: PathBuf,
    },

    /// Upload a file into the catalog
    Upload {
        /// File to upload
        path: Option<PathBuf>,

        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// MIME type (guessed from the file path if not given)
        #[arg(short, long)]
        mime: Option<String>,

        /// Simulate a cancelled pick
        #[arg(long, conflicts_with = "path")]
        cancel: bool,
    },

    /// List catalog entries
    List {
        /// Only show entries of this kind (audio, video, image, unsupported)
        #[arg(short, long)]
        kind: Option<MediaKind>,

        /// Maximum number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Open a catalog entry in its viewer
    View {
        /// Record ID, or #N for the N-th entry (1-based)
        target: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Record { path } => save_recording(&path).await,
            Commands::Upload {
                path,
                name,
                mime,
                cancel,
            } => upload_file(path, name, mime, cancel).await,
            Commands::List { kind, limit } => list_files(kind, limit).await,
            Commands::View { target } => view_file(&target).await,
            Commands::Config => show_config(),
        }
    }
}

/// Open the catalog at the configured location
fn open_catalog() -> Result<CatalogStore<FileKvStore>> {
    let cfg = config::config()?;
    Ok(CatalogStore::with_key(
        FileKvStore::open_default()?,
        cfg.catalog_key.clone(),
    ))
}

/// Save a finished recording
async fn save_recording(path: &Path) -> Result<()> {
    let catalog = open_catalog()?;
    let documents = config::paths::documents_dir()?;

    let record = finalize_recording(&catalog, path, &documents)
        .await
        .with_context(|| format!("Failed to save recording: {}", path.display()))?;

    eprintln!("Recording saved");
    eprintln!("   ID:   {}", record.id);
    eprintln!("   Path: {}", record.uri);

    Ok(())
}

/// Upload a file (or record a cancelled pick)
async fn upload_file(
    path: Option<PathBuf>,
    name: Option<String>,
    mime: Option<String>,
    cancel: bool,
) -> Result<()> {
    let outcome = if cancel {
        PickOutcome::Cancelled
    } else {
        let path = path.context("Nothing to upload: pass a file path or --cancel")?;
        let path = tokio::fs::canonicalize(&path)
            .await
            .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
        PickOutcome::Picked(picked_file(&path, name, mime)?)
    };

    let catalog = open_catalog()?;
    match register_pick(&catalog, outcome).await? {
        Some(record) => {
            eprintln!("File uploaded successfully!");
            eprintln!("   Name: {}", record.name);
            eprintln!("   Type: {}", record.media_type);
        }
        None => eprintln!("Upload cancelled"),
    }

    Ok(())
}

/// List catalog entries in append order
async fn list_files(kind: Option<MediaKind>, limit: usize) -> Result<()> {
    let catalog = open_catalog()?;
    let records = catalog.load().await?;

    if records.is_empty() {
        println!("No files uploaded yet.");
        return Ok(());
    }

    println!(
        "{:<5} {:<15} {:<12} {:<26} {:<40}",
        "#", "ID", "KIND", "DATE", "NAME"
    );
    println!("{}", "-".repeat(100));

    let matching = matching_records(&records, kind);

    for (index, record) in matching.iter().take(limit) {
        println!(
            "{:<5} {:<15} {:<12} {:<26} {:<40}",
            format!("#{}", index + 1),
            record.id,
            classify(&record.uri).to_string(),
            truncate(&record.date, 26),
            truncate(record.display_name(), 40)
        );
    }

    match kind {
        Some(kind) => println!(
            "\nTotal: {} {} of {} files",
            matching.len(),
            kind,
            records.len()
        ),
        None => println!("\nTotal: {} files", records.len()),
    }

    Ok(())
}

/// Entries of `kind` (all entries when `None`) with their catalog index
fn matching_records(
    records: &[FileRecord],
    kind: Option<MediaKind>,
) -> Vec<(usize, &FileRecord)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| kind.map_or(true, |k| classify(&r.uri) == k))
        .collect()
}

/// Describe an uploaded file the way a picker would
///
/// Without an explicit MIME type the type is guessed from the path, so a
/// custom display name does not change it.
fn picked_file(path: &Path, name: Option<String>, mime: Option<String>) -> Result<PickedFile> {
    let name = match name {
        Some(name) => name,
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("No file name in: {}", path.display()))?,
    };
    let mime_type = mime
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| guess_media_type(&path.to_string_lossy()));

    Ok(PickedFile {
        name,
        uri: format!("file://{}", path.display()),
        mime_type: Some(mime_type),
    })
}

/// Show a catalog entry and the viewer it routes to
async fn view_file(target: &str) -> Result<()> {
    let catalog = open_catalog()?;
    let records = catalog.load().await?;
    let record = select(&records, target)
        .ok_or_else(|| anyhow::anyhow!("File not found: {}", target))?;

    println!("  Name: {}", record.display_name());
    println!("  Type: {}", record.media_type);
    println!("  Date: {}", record.date);
    println!("  URI:  {}", record.uri);

    match viewer::open(record) {
        Ok(view) => {
            println!("  Viewer: {}", view.kind);
            println!("  Path:   {}", view.path.display());
            Ok(())
        }
        Err(e @ ViewError::UnsupportedMedia(_)) => {
            println!("  Viewer: unsupported");
            Err(e.into())
        }
        Err(e @ ViewError::FileMissing(_)) => Err(e.into()),
    }
}

/// Find a record by `#N` index or ID
fn select<'a>(records: &'a [FileRecord], target: &str) -> Option<&'a FileRecord> {
    if let Some(index) = target.strip_prefix('#') {
        let n: usize = index.parse().ok()?;
        return n.checked_sub(1).and_then(|i| records.get(i));
    }
    records.iter().find(|r| r.id == target)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("mediashelf configuration");
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:       {}", cfg.home.display());
    println!("  Store:      {}", cfg.store_dir().display());
    println!("  Documents:  {}", cfg.documents.display());
    println!("  Catalog:    {}", config::paths::catalog_file()?.display());
    println!();
    println!("Catalog key: {}", cfg.catalog_key);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FileRecord> {
        vec![
            FileRecord::new("a.mp3", "file:///a.mp3", "audio/mpeg")
                .unwrap()
                .with_id("1"),
            FileRecord::new("b.png", "file:///b.png", "image/png")
                .unwrap()
                .with_id("2"),
        ]
    }

    #[test]
    fn test_select_by_index_and_id() {
        let records = records();

        assert_eq!(select(&records, "#1").unwrap().id, "1");
        assert_eq!(select(&records, "#2").unwrap().id, "2");
        assert_eq!(select(&records, "2").unwrap().name, "b.png");

        assert!(select(&records, "#0").is_none());
        assert!(select(&records, "#3").is_none());
        assert!(select(&records, "#x").is_none());
        assert!(select(&records, "missing").is_none());
    }

    #[test]
    fn test_matching_records_counts_filtered_kind() {
        let mut records = records();
        records.push(
            FileRecord::new("c.wav", "file:///c.wav", "audio/wav")
                .unwrap()
                .with_id("3"),
        );

        let audio = matching_records(&records, Some(MediaKind::Audio));
        assert_eq!(audio.len(), 2);
        assert_eq!(audio[0].0, 0);
        assert_eq!(audio[1].0, 2);
        assert_eq!(audio[1].1.id, "3");

        assert!(matching_records(&records, Some(MediaKind::Video)).is_empty());
        assert_eq!(matching_records(&records, None).len(), 3);
    }

    #[test]
    fn test_upload_guesses_type_from_path_not_name() {
        let picked = picked_file(
            Path::new("/photos/cat.png"),
            Some("My Cat".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(picked.name, "My Cat");
        assert_eq!(picked.uri, "file:///photos/cat.png");
        assert_eq!(picked.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_upload_keeps_explicit_mime() {
        let picked = picked_file(
            Path::new("/photos/cat.png"),
            None,
            Some("image/x-custom".to_string()),
        )
        .unwrap();

        assert_eq!(picked.name, "cat.png");
        assert_eq!(picked.mime_type.as_deref(), Some("image/x-custom"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-file-name.mp3", 10), "a-very-...");
    }

    #[test]
    fn test_cli_parses_list_kind() {
        let cli = Cli::try_parse_from(["mediashelf", "list", "--kind", "audio"]).unwrap();
        match cli.command {
            Commands::List { kind, limit } => {
                assert_eq!(kind, Some(MediaKind::Audio));
                assert_eq!(limit, 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_cancel_with_path() {
        assert!(Cli::try_parse_from(["mediashelf", "upload", "a.png", "--cancel"]).is_err());
    }
}

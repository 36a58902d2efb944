//! Canonical paths for mediashelf.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mediashelf::config::paths;
//!
//! let store = paths::store_dir()?;
//! let documents = paths::documents_dir()?;
//! ```
//!
//! | Location          | Contents                          |
//! |-------------------|-----------------------------------|
//! | `<home>/store/`   | key-value store, one file per key |
//! | `<documents>/`    | finished recordings               |

use std::path::PathBuf;

use anyhow::Result;

/// Get the mediashelf home directory (~/.mediashelf)
pub fn home() -> Result<PathBuf> {
    Ok(crate::config::config()?.home.clone())
}

/// Get the key-value store directory (~/.mediashelf/store/)
pub fn store_dir() -> Result<PathBuf> {
    Ok(crate::config::config()?.store_dir())
}

/// Get the permanent documents directory (~/.mediashelf/documents/)
pub fn documents_dir() -> Result<PathBuf> {
    Ok(crate::config::config()?.documents.clone())
}

/// Get the file backing the catalog key (~/.mediashelf/store/files.json)
pub fn catalog_file() -> Result<PathBuf> {
    let config = crate::config::config()?;
    Ok(config
        .store_dir()
        .join(format!("{}.json", config.catalog_key)))
}

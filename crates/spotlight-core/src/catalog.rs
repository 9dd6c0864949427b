use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::resolve_with_base;
use crate::error::{Error, Result};
use crate::types::{Feature, SpotlightItem, Subfeature};

/// One item as written in a catalog file. `image` is a path relative to the
/// catalog file that declares it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    pub feature: Feature,
    #[serde(default)]
    pub subfeature: Option<Subfeature>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<Url>,
}

/// Loads `*.json` catalog files, each holding an array of [`CatalogEntry`].
#[derive(Default)]
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn new() -> Self { Self }

    pub fn load_directory(&self, catalog_dir: &Path) -> Result<Vec<SpotlightItem>> {
        if !catalog_dir.is_dir() {
            return Err(Error::NotFound(catalog_dir.display().to_string()));
        }
        let files = self.list_json_files(catalog_dir);
        if files.is_empty() {
            tracing::warn!("No .json catalog files found under {}", catalog_dir.display());
            return Ok(vec![]);
        }
        let mut items = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!("Loading catalog {}/{}: {}", file_index + 1, files.len(), file_path.display());
            items.extend(self.load_file(file_path)?);
        }
        tracing::info!("Loaded {} items from {} catalog files", items.len(), files.len());
        Ok(items)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<SpotlightItem>> {
        let raw = fs::read_to_string(file_path).map_err(|e| catalog_error(file_path, e))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw).map_err(|e| catalog_error(file_path, e))?;
        let base = file_path.parent().unwrap_or_else(|| Path::new("."));
        entries.into_iter().map(|entry| self.to_item(entry, base, file_path)).collect()
    }

    fn to_item(&self, entry: CatalogEntry, base: &Path, file_path: &Path) -> Result<SpotlightItem> {
        let image = match &entry.image {
            Some(rel) => {
                let image_path = resolve_with_base(base, rel);
                Some(fs::read(&image_path).map_err(|e| catalog_error(file_path, format!("{}: {}", image_path.display(), e)))?)
            }
            None => None,
        };
        Ok(SpotlightItem {
            item_id: entry.item_id,
            title: entry.title,
            description: entry.description,
            keywords: entry.keywords,
            feature: entry.feature,
            subfeature: entry.subfeature,
            image,
            thumbnail_url: entry.thumbnail_url,
        })
    }

    fn list_json_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut json_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("json") { json_files.push(path.to_path_buf()); }
        }
        json_files.sort(); json_files
    }
}

fn catalog_error(path: &Path, reason: impl ToString) -> Error {
    Error::Catalog { path: path.display().to_string(), reason: reason.to_string() }
}

//! spotlight-manager
//!
//! `SpotlightManager` turns app items into searchable records, hands every
//! index mutation to a `WorkQueue`, and maps activated results back to
//! navigation targets. Index failures are logged and never reach the caller.
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use spotlight_core::activity::UserActivity;
use spotlight_core::config::{resolve_with_base, SpotlightConfig};
use spotlight_core::identifier::{self, DEFAULT_BASE_IDENTIFIER};
use spotlight_core::traits::{Router, SearchIndex, WorkQueue};
use spotlight_core::types::{
    AttributeSet, Feature, NavigationTarget, SearchHit, SearchableRecord, SpotlightItem, Subfeature, Thumbnail,
    TEXT_CONTENT_TYPE,
};

pub mod queue;

pub use queue::{BackgroundQueue, InlineQueue};

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub base_identifier: String,
    /// PNG bytes used when an item has neither a thumbnail URL nor an image.
    pub default_thumbnail: Option<Vec<u8>>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self { base_identifier: DEFAULT_BASE_IDENTIFIER.to_string(), default_thumbnail: None }
    }
}

impl ManagerOptions {
    /// Relative `default_thumbnail` paths resolve against `base_dir`.
    pub fn from_config(config: &SpotlightConfig, base_dir: &Path) -> Result<Self> {
        let default_thumbnail = match &config.default_thumbnail {
            Some(p) => Some(std::fs::read(resolve_with_base(base_dir, p))?),
            None => None,
        };
        Ok(Self { base_identifier: config.base_identifier.clone(), default_thumbnail })
    }
}

pub struct SpotlightManager {
    index: Arc<dyn SearchIndex>,
    queue: Arc<dyn WorkQueue>,
    options: ManagerOptions,
    router: Option<Box<dyn Router>>,
}

impl SpotlightManager {
    pub fn new(index: Arc<dyn SearchIndex>, queue: Arc<dyn WorkQueue>, options: ManagerOptions) -> Self {
        Self { index, queue, options, router: None }
    }

    #[must_use]
    pub fn with_router(mut self, router: Box<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn base_identifier(&self) -> &str { &self.options.base_identifier }

    /// Submit one independent job per item. Returns before any job runs.
    pub fn index(&self, items: &[SpotlightItem]) {
        tracing::info!("Submitting {} items for indexing", items.len());
        for item in items {
            let record = self.searchable_record(item);
            let index = Arc::clone(&self.index);
            self.queue.submit(Box::new(move || {
                match index.index(std::slice::from_ref(&record)) {
                    Ok(()) => tracing::debug!(identifier = %record.unique_identifier, "Indexed item"),
                    Err(e) => tracing::error!(identifier = %record.unique_identifier, "Spotlight indexing error: {:#}", e),
                }
            }));
        }
    }

    pub fn searchable_record(&self, item: &SpotlightItem) -> SearchableRecord {
        let prefix = self.base_identifier();
        let thumbnail = match (&item.thumbnail_url, &item.image, &self.options.default_thumbnail) {
            (Some(url), _, _) => Some(Thumbnail::Url(url.clone())),
            (None, Some(png), _) => Some(Thumbnail::Data(png.clone())),
            (None, None, Some(icon)) => Some(Thumbnail::Data(icon.clone())),
            (None, None, None) => None,
        };
        SearchableRecord {
            unique_identifier: identifier::encode(prefix, item.feature, item.subfeature, &item.item_id),
            domain_identifier: identifier::domain(prefix, item.feature, item.subfeature),
            attributes: AttributeSet {
                content_type: TEXT_CONTENT_TYPE.to_string(),
                title: item.title.clone(),
                identifier: item.item_id.clone(),
                content_description: item.description.clone(),
                keywords: item.keywords.clone(),
                thumbnail,
            },
        }
    }

    /// Remove every record this app has indexed.
    pub fn delete_all(&self) {
        let index = Arc::clone(&self.index);
        self.queue.submit(Box::new(move || match index.delete_all() {
            Ok(()) => tracing::info!("All items deleted"),
            Err(e) => tracing::error!("Spotlight delete-all error: {:#}", e),
        }));
    }

    /// Remove every record under `feature`, or only under `feature.subfeature`.
    pub fn delete_items(&self, feature: Feature, subfeature: Option<Subfeature>) {
        let domain = identifier::domain(self.base_identifier(), feature, subfeature);
        let index = Arc::clone(&self.index);
        self.queue.submit(Box::new(move || match index.delete_domains(std::slice::from_ref(&domain)) {
            Ok(()) => tracing::info!(%domain, "Items deleted"),
            Err(e) => tracing::error!(%domain, "Spotlight delete error: {:#}", e),
        }));
    }

    pub fn delete_item(&self, feature: Feature, subfeature: Option<Subfeature>, item_id: &str) {
        let identifier = identifier::encode(self.base_identifier(), feature, subfeature, item_id);
        let item_id = item_id.to_string();
        let index = Arc::clone(&self.index);
        self.queue.submit(Box::new(move || match index.delete_identifiers(std::slice::from_ref(&identifier)) {
            Ok(()) => tracing::info!("Item deleted with id {}", item_id),
            Err(e) => tracing::error!(%identifier, "Spotlight delete error: {:#}", e),
        }));
    }

    /// Decode an activated result and route to it.
    ///
    /// Activities that are not searchable-item activations, identifiers
    /// without a known `feature`, and other malformed input all yield `None`.
    pub fn handle_activity(&self, activity: &UserActivity) -> Option<NavigationTarget> {
        let identifier = activity.searchable_item_identifier()?;
        let Some(target) = identifier::decode(identifier) else {
            tracing::debug!(identifier, "Ignoring activation without a known feature");
            return None;
        };
        tracing::info!(feature = %target.feature, subfeature = ?target.subfeature, item_id = ?target.item_id, "Navigating from search result");
        if let Some(router) = &self.router {
            router.navigate(&target);
        }
        Some(target)
    }

    /// Query the underlying index directly, as the system search UI would.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.index.search(query, limit)
    }
}

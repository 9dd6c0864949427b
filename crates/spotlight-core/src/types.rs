//! Domain types shared by the facade, the index engines and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::Error;

/// Uniform type identifier attached to every record.
pub const TEXT_CONTENT_TYPE: &str = "public.text";

/// High-level navigation destinations that can be indexed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Home,
    Settings,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::Home, Feature::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Home => "home",
            Feature::Settings => "settings",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownFeature(s.to_string()))
    }
}

/// Finer-grained targets under a [`Feature`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Subfeature {
    People,
    Favorites,
}

impl Subfeature {
    pub const ALL: [Subfeature; 2] = [Subfeature::People, Subfeature::Favorites];

    pub fn as_str(self) -> &'static str {
        match self {
            Subfeature::People => "people",
            Subfeature::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Subfeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subfeature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subfeature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::UnknownSubfeature(s.to_string()))
    }
}

/// An in-app entity that should be discoverable through system search.
///
/// - `item_id`: stable identity used to navigate back to the item
/// - `title`/`description`/`keywords`: what the search UI shows and matches on
/// - `feature`/`subfeature`: routing tags embedded in the record identifier
/// - `image`: PNG bytes shown next to the result
/// - `thumbnail_url`: remote thumbnail, preferred over `image` when present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotlightItem {
    pub item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub feature: Feature,
    pub subfeature: Option<Subfeature>,
    pub image: Option<Vec<u8>>,
    pub thumbnail_url: Option<Url>,
}

impl SpotlightItem {
    pub fn new(item_id: impl Into<String>, title: impl Into<String>, feature: Feature) -> Self {
        Self {
            item_id: item_id.into(),
            title: title.into(),
            description: None,
            keywords: None,
            feature,
            subfeature: None,
            image: None,
            thumbnail_url: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_subfeature(mut self, subfeature: Subfeature) -> Self {
        self.subfeature = Some(subfeature);
        self
    }

    #[must_use]
    pub fn with_image(mut self, png: Vec<u8>) -> Self {
        self.image = Some(png);
        self
    }

    #[must_use]
    pub fn with_thumbnail_url(mut self, url: Url) -> Self {
        self.thumbnail_url = Some(url);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thumbnail {
    Url(Url),
    Data(Vec<u8>),
}

/// Display and matching attributes of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub content_type: String,
    pub title: String,
    pub identifier: String,
    pub content_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub thumbnail: Option<Thumbnail>,
}

/// The unit submitted to a [`SearchIndex`](crate::traits::SearchIndex).
///
/// `unique_identifier` is the primary key and doubles as the serialized
/// navigation query; `domain_identifier` groups records for bulk deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableRecord {
    pub unique_identifier: String,
    pub domain_identifier: String,
    pub attributes: AttributeSet,
}

/// A result returned by an index query. Higher `score` is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub unique_identifier: String,
    pub domain_identifier: String,
    pub title: String,
    pub score: f32,
}

/// Where the app should go after a search result is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub feature: Feature,
    pub subfeature: Option<Subfeature>,
    pub item_id: Option<String>,
}

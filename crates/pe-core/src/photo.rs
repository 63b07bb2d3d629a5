//! Records of the stock-photo search provider.
//!
//! Only the shapes live here; fetching them is the host page's job.

use serde::{Deserialize, Serialize};

/// Resolution variants offered for every photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSources {
    pub original: String,
    pub large2x: String,
    pub large: String,
    pub medium: String,
    pub small: String,
    pub portrait: String,
    pub landscape: String,
    pub tiny: String,
}

/// Which resolution variant to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSize {
    Original,
    Large2x,
    Large,
    Medium,
    Small,
    Portrait,
    Landscape,
    Tiny,
}

impl PhotoSources {
    /// URL of the requested variant, falling back to `original` when the
    /// provider left it empty.
    pub fn url(&self, size: PhotoSize) -> &str {
        let url = match size {
            PhotoSize::Original => &self.original,
            PhotoSize::Large2x => &self.large2x,
            PhotoSize::Large => &self.large,
            PhotoSize::Medium => &self.medium,
            PhotoSize::Small => &self.small,
            PhotoSize::Portrait => &self.portrait,
            PhotoSize::Landscape => &self.landscape,
            PhotoSize::Tiny => &self.tiny,
        };
        if url.is_empty() { &self.original } else { url }
    }
}

/// One photo as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub photographer: String,
    #[serde(default)]
    pub photographer_url: String,
    #[serde(default)]
    pub photographer_id: u64,
    #[serde(default)]
    pub avg_color: Option<String>,
    pub src: PhotoSources,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub alt: String,
}

impl Photo {
    /// Background URL used by the editor (`large2x`, as the search grid
    /// hands it over).
    pub fn background_url(&self) -> &str {
        self.src.url(PhotoSize::Large2x)
    }

    /// Toast shown when the photo is picked.
    pub fn selection_message(&self) -> String {
        format!("Selected image by {}", self.photographer)
    }
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub page: u32,
    pub per_page: u32,
    pub photos: Vec<Photo>,
    pub total_results: u64,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl SearchResponse {
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }
}

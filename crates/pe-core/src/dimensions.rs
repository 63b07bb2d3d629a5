//! Output dimension presets per social platform and post format.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Whatsapp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostFormat {
    Feed,
    Story,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Instagram, Platform::Whatsapp];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Whatsapp => "whatsapp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl PostFormat {
    pub fn name(self) -> &'static str {
        match self {
            PostFormat::Feed => "feed",
            PostFormat::Story => "story",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [PostFormat::Feed, PostFormat::Story]
            .into_iter()
            .find(|f| f.name() == name)
    }
}

/// One entry of the preset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterDimension {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
    pub name: &'static str,
}

const fn dim(width: u32, height: u32, aspect_ratio: &'static str, name: &'static str) -> PosterDimension {
    PosterDimension {
        width,
        height,
        aspect_ratio,
        name,
    }
}

const FACEBOOK_FEED: &[PosterDimension] = &[
    dim(1200, 630, "1.91:1", "Landscape (1.91:1)"),
    dim(1080, 1080, "1:1", "Square (1:1)"),
    dim(1080, 1350, "4:5", "Portrait (4:5)"),
];
const FACEBOOK_STORY: &[PosterDimension] = &[dim(1080, 1920, "9:16", "Story (9:16)")];
const INSTAGRAM_FEED: &[PosterDimension] = &[
    dim(1080, 1080, "1:1", "Square (1:1)"),
    dim(1080, 566, "16:9", "Landscape (16:9)"),
    dim(1080, 1350, "4:5", "Portrait (4:5)"),
];
const INSTAGRAM_STORY: &[PosterDimension] = &[dim(1080, 1920, "9:16", "Story (9:16)")];
const WHATSAPP_FEED: &[PosterDimension] = &[
    dim(1200, 628, "1.91:1", "Template (1.91:1)"),
    dim(800, 800, "1:1", "Square (1:1)"),
];
const WHATSAPP_STORY: &[PosterDimension] = &[
    dim(1080, 1920, "9:16", "Status (9:16)"),
    dim(750, 1334, "9:16", "Alternative (9:16)"),
];

/// Presets offered for a platform/format pair, in display order.
pub fn presets(platform: Platform, format: PostFormat) -> &'static [PosterDimension] {
    match (platform, format) {
        (Platform::Facebook, PostFormat::Feed) => FACEBOOK_FEED,
        (Platform::Facebook, PostFormat::Story) => FACEBOOK_STORY,
        (Platform::Instagram, PostFormat::Feed) => INSTAGRAM_FEED,
        (Platform::Instagram, PostFormat::Story) => INSTAGRAM_STORY,
        (Platform::Whatsapp, PostFormat::Feed) => WHATSAPP_FEED,
        (Platform::Whatsapp, PostFormat::Story) => WHATSAPP_STORY,
    }
}

/// The selected output size of the poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDimensions {
    pub platform: Platform,
    pub format: PostFormat,
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl Default for CanvasDimensions {
    fn default() -> Self {
        Self::first_of(Platform::Instagram, PostFormat::Feed)
    }
}

impl CanvasDimensions {
    fn from_preset(platform: Platform, format: PostFormat, preset: &PosterDimension) -> Self {
        Self {
            platform,
            format,
            width: preset.width,
            height: preset.height,
            label: preset.name.to_string(),
        }
    }

    /// First preset of the pair; what a platform or format switch lands on.
    pub fn first_of(platform: Platform, format: PostFormat) -> Self {
        let list = presets(platform, format);
        // Every list in the table is non-empty.
        let preset = list.first().copied().unwrap_or(dim(1080, 1080, "1:1", "Square (1:1)"));
        Self::from_preset(platform, format, &preset)
    }

    /// Look up a preset by its label within a platform/format pair.
    pub fn preset(platform: Platform, format: PostFormat, name: &str) -> Option<Self> {
        presets(platform, format)
            .iter()
            .find(|p| p.name == name)
            .map(|p| Self::from_preset(platform, format, p))
    }

    /// Free-form dimensions outside the table.
    ///
    /// # Errors
    /// [`EditorError::InvalidAspectRatio`] if either side is zero.
    pub fn custom(platform: Platform, format: PostFormat, width: u32, height: u32, label: &str) -> Result<Self, EditorError> {
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidAspectRatio(if height == 0 {
                f64::INFINITY
            } else {
                0.0
            }));
        }
        Ok(Self {
            platform,
            format,
            width,
            height,
            label: label.to_string(),
        })
    }

    /// `width / height`, the target ratio of crop sessions.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

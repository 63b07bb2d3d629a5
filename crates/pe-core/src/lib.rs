pub mod config;
pub mod crop;
pub mod dimensions;
pub mod document;
pub mod error;
pub mod geometry;
pub mod id;
pub mod layers;
pub mod model;
pub mod photo;

pub use config::EditorConfig;
pub use crop::CropSession;
pub use dimensions::{CanvasDimensions, Platform, PostFormat, PosterDimension};
pub use document::{BackgroundState, PosterDocument};
pub use error::EditorError;
pub use geometry::{Corner, ImageMetrics, ViewTransform};
pub use id::ElementId;
pub use layers::LayerDirection;
pub use model::*;

// Re-export kurbo primitives so downstream crates share one geometry vocabulary.
pub use kurbo::{Point, Rect, Size, Vec2};

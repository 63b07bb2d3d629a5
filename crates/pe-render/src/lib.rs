pub mod export;
pub mod hit;
pub mod paint;

pub use export::{ExportError, ExportRequest, ExportedImage, RenderAdapter};
pub use hit::{CanvasHit, CropHit, hit_test, hit_test_crop};
pub use paint::{DisplayList, DrawOp, SceneView, build_display_list};

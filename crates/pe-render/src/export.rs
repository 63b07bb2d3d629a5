//! Contract with the external rasteriser that flattens the poster.
//!
//! The adapter receives the DOM id of the subtree to capture together with
//! the display list of the frame being captured, and returns encoded image
//! bytes. It must load cross-origin photos with CORS enabled.

use pe_core::error::EditorError;
use serde::Serialize;
use thiserror::Error;

use crate::paint::DisplayList;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot export: {0}")]
    Precondition(#[from] EditorError),

    #[error("render adapter failed: {0}")]
    Adapter(String),

    #[error("render adapter produced an empty image")]
    Empty,

    #[error("no export in progress")]
    NotStarted,
}

/// Parameters handed to the render adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub root_id: String,
    pub scale: f64,
    pub use_cors: bool,
    pub file_name: String,
}

/// A successfully flattened poster.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

pub trait RenderAdapter {
    /// Rasterise the subtree named by `request.root_id`.
    fn render_flattened(&mut self, request: &ExportRequest, frame: &DisplayList) -> Result<Vec<u8>, ExportError>;
}

impl<F> RenderAdapter for F
where
    F: FnMut(&ExportRequest, &DisplayList) -> Result<Vec<u8>, ExportError>,
{
    fn render_flattened(&mut self, request: &ExportRequest, frame: &DisplayList) -> Result<Vec<u8>, ExportError> {
        self(request, frame)
    }
}

/// Check what the adapter returned.
///
/// # Errors
/// [`ExportError::Empty`] for zero bytes.
pub fn accept_output(request: &ExportRequest, bytes: Vec<u8>) -> Result<ExportedImage, ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::Empty);
    }
    Ok(ExportedImage {
        bytes,
        file_name: request.file_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExportRequest {
        ExportRequest {
            root_id: "poster-canvas".into(),
            scale: 2.0,
            use_cors: true,
            file_name: "poster.png".into(),
        }
    }

    #[test]
    fn empty_output_is_an_error() {
        assert!(matches!(accept_output(&request(), Vec::new()), Err(ExportError::Empty)));
    }

    #[test]
    fn closures_are_adapters() {
        let frame = DisplayList {
            width: 10.0,
            height: 10.0,
            ops: Vec::new(),
        };
        let mut calls = 0;
        let mut adapter = |req: &ExportRequest, _: &DisplayList| {
            calls += 1;
            assert_eq!(req.root_id, "poster-canvas");
            Ok::<_, ExportError>(vec![0x89, b'P', b'N', b'G'])
        };
        let bytes = adapter.render_flattened(&request(), &frame).unwrap();
        let image = accept_output(&request(), bytes).unwrap();
        assert_eq!(image.file_name, "poster.png");
        assert_eq!(calls, 1);
    }
}

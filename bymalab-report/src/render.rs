//! Rendering to image files. The backend follows the file extension:
//! `.svg` is written as SVG, anything else as a PNG bitmap.

use crate::error::{DrawError, ReportError};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// A chart model that can draw itself on any plotters backend.
pub trait Chart {
    /// Image size in pixels.
    fn size(&self) -> (u32, u32);

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawError>;
}

pub fn render<C: Chart>(chart: &C, path: &Path) -> Result<(), ReportError> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    let fail = |reason: String| ReportError::Render {
        path: path.display().to_string(),
        reason,
    };
    let drawn = |e: DrawError| match e {
        DrawError::Empty(what) => ReportError::Empty(what),
        DrawError::Backend(reason) => fail(reason),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
    }

    if is_svg {
        let root = SVGBackend::new(path, chart.size()).into_drawing_area();
        chart.draw(&root).map_err(drawn)?;
        root.present().map_err(|e| fail(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(path, chart.size()).into_drawing_area();
        chart.draw(&root).map_err(drawn)?;
        root.present().map_err(|e| fail(e.to_string()))?;
    }
    info!(path = %path.display(), "chart written");
    Ok(())
}

/// Wrap a plotters error.
pub(crate) fn err<E: std::fmt::Display>(e: E) -> DrawError {
    DrawError::Backend(e.to_string())
}

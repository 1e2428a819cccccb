//! Saving the current view as SVG markup or a PNG bitmap.

use crate::Result;
use crate::viewport::Viewport;
use pedigree_render::{RenderModel, SvgOptions, render_svg};
use std::path::Path;

/// SVG markup for exactly what the viewport shows.
pub fn export_svg(model: &RenderModel, viewport: &Viewport, options: &SvgOptions) -> String {
    render_svg(model, &viewport.view_box(), options)
}

pub fn write_svg(
    path: impl AsRef<Path>,
    model: &RenderModel,
    viewport: &Viewport,
    options: &SvgOptions,
) -> Result<()> {
    let svg = export_svg(model, viewport, options);
    std::fs::write(path.as_ref(), svg)?;
    tracing::debug!(path = %path.as_ref().display(), "wrote svg export");
    Ok(())
}

/// PNG of the viewport at `zoom * device_pixel_ratio` pixels per unit on a white background.
#[cfg(feature = "raster")]
pub fn export_png(
    model: &RenderModel,
    viewport: &Viewport,
    device_pixel_ratio: f64,
    options: &SvgOptions,
) -> Result<Vec<u8>> {
    use crate::raster::{RasterOptions, svg_to_png};

    let svg = export_svg(model, viewport, options);
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let raster = RasterOptions {
        scale: (viewport.zoom() * dpr) as f32,
        background: Some("white".to_string()),
    };
    Ok(svg_to_png(&svg, &raster)?)
}

#[cfg(feature = "raster")]
pub fn write_png(
    path: impl AsRef<Path>,
    model: &RenderModel,
    viewport: &Viewport,
    device_pixel_ratio: f64,
    options: &SvgOptions,
) -> Result<()> {
    let bytes = export_png(model, viewport, device_pixel_ratio, options)?;
    std::fs::write(path.as_ref(), &bytes)?;
    tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "wrote png export");
    Ok(())
}

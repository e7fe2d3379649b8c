use crate::ResourceError;
use gridpress_types::Size;
use std::path::Path;

/// Natural size of an image in points, one pixel per point.
pub fn image_size(path: &Path) -> Result<Size, ResourceError> {
    image_size_at_dpi(path, 72.0)
}

/// Natural size of an image in points for the given resolution.
pub fn image_size_at_dpi(path: &Path, dpi: f64) -> Result<Size, ResourceError> {
    let (width, height) = image::image_dimensions(path).map_err(|e| ResourceError::Image {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let scale = 72.0 / dpi;
    Ok(Size::new(f64::from(width) * scale, f64::from(height) * scale))
}

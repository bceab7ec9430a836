use crate::error::{Error, Result};
use crate::models::PixelRect;

/// Estimates the real-world height of the target selection, in centimeters,
/// from the ruler selection and the ruler's known physical height.
///
/// With `fov_degrees` or `image_width_px` left at zero the projection is
/// treated as orthographic: the ruler fixes a single cm-per-pixel scale and
/// the target height follows linearly. When both camera parameters are
/// given, each selection is converted to its subtended angle and the target
/// height is recovered through the camera-to-ruler distance instead.
pub fn estimate_height(
    ruler: &PixelRect,
    target: &PixelRect,
    ruler_height_cm: f64,
    fov_degrees: f64,
    image_width_px: f64,
) -> Result<f64> {
    if ruler.height <= 0.0 || ruler_height_cm <= 0.0 {
        return Err(Error::InvalidCalibration);
    }

    if fov_degrees == 0.0 || image_width_px == 0.0 {
        let ratio = ruler_height_cm / ruler.height;
        return Ok(target.height * ratio);
    }

    let fov_rad = fov_degrees.to_radians();
    let angle_per_pixel = fov_rad / image_width_px;
    let ruler_angle = ruler.height * angle_per_pixel;
    if ruler_angle == 0.0 {
        return Err(Error::IndeterminateGeometry);
    }

    // Camera-to-ruler distance in meters, from the ruler's subtended angle.
    let distance = (ruler_height_cm / 100.0 / 2.0) / (ruler_angle / 2.0).tan();
    let target_angle = target.height * angle_per_pixel;
    let target_height_m = 2.0 * distance * (target_angle / 2.0).tan();
    let target_height_cm = target_height_m * 100.0;

    if !target_height_cm.is_finite() {
        return Err(Error::IndeterminateGeometry);
    }

    Ok(target_height_cm)
}

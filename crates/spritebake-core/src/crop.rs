//! Crop-to-content for rendered sprites.
//!
//! Cropping is a strategy resolved once per run: [`AlphaCropper`] when the
//! `autocrop` feature is compiled in and enabled, [`NoopCropper`] otherwise.
//! The returned offset lets an importer put the cropped sprite back where it
//! sat on the full canvas.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Whether this build can crop images.
pub const AUTOCROP_AVAILABLE: bool = cfg!(feature = "autocrop");

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub w: u32,
    pub h: u32,
}

/// Top-left pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelOffset {
    pub x: u32,
    pub y: u32,
}

/// Result of cropping one sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInfo {
    /// Size before cropping.
    pub original_size: PixelSize,
    /// Top-left of the kept region within the original image.
    pub crop_offset: PixelOffset,
    /// Size after cropping.
    pub cropped_size: PixelSize,
}

/// Crops a rendered image in place.
pub trait Cropper {
    /// Crops `image_path` to its opaque content. Returns `None` when nothing
    /// was cropped; the image is then left untouched.
    fn crop(&self, image_path: &Path) -> Option<CropInfo>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Leaves every image as rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCropper;

impl Cropper for NoopCropper {
    fn crop(&self, _image_path: &Path) -> Option<CropInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Picks the cropper for a run.
pub fn cropper_for(auto_crop: bool) -> Box<dyn Cropper> {
    if auto_crop {
        alpha_cropper()
    } else {
        Box::new(NoopCropper)
    }
}

#[cfg(feature = "autocrop")]
fn alpha_cropper() -> Box<dyn Cropper> {
    Box::new(AlphaCropper)
}

#[cfg(not(feature = "autocrop"))]
fn alpha_cropper() -> Box<dyn Cropper> {
    warn!("Auto-crop requested but this build has no image support; sprites stay uncropped");
    Box::new(NoopCropper)
}

/// Crops to the bounding box of pixels with non-zero alpha.
#[cfg(feature = "autocrop")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaCropper;

#[cfg(feature = "autocrop")]
impl AlphaCropper {
    fn try_crop(&self, image_path: &Path) -> Result<Option<CropInfo>, image::ImageError> {
        let image = image::open(image_path)?.into_rgba8();
        let (width, height) = image.dimensions();

        let Some((x, y, w, h)) = opaque_bounds(&image) else {
            warn!("No visible pixels found in {}", image_path.display());
            return Ok(None);
        };

        let info = CropInfo {
            original_size: PixelSize {
                w: width,
                h: height,
            },
            crop_offset: PixelOffset { x, y },
            cropped_size: PixelSize { w, h },
        };

        if (w, h) != (width, height) {
            let cropped = image::imageops::crop_imm(&image, x, y, w, h).to_image();
            cropped.save(image_path)?;
        }

        tracing::debug!(
            "Auto-cropped: {}x{} -> {}x{} (offset: {}, {})",
            width,
            height,
            w,
            h,
            x,
            y
        );
        Ok(Some(info))
    }
}

#[cfg(feature = "autocrop")]
impl Cropper for AlphaCropper {
    fn crop(&self, image_path: &Path) -> Option<CropInfo> {
        match self.try_crop(image_path) {
            Ok(info) => info,
            Err(e) => {
                tracing::error!("Failed to auto-crop {}: {}", image_path.display(), e);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "alpha"
    }
}

/// Bounding box `(x, y, w, h)` of all pixels with non-zero alpha.
#[cfg(feature = "autocrop")]
pub fn opaque_bounds(image: &image::RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

#[cfg(all(test, feature = "autocrop"))]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_image(path: &Path, size: u32, opaque: Option<(u32, u32, u32, u32)>) {
        let mut image = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
        if let Some((x, y, w, h)) = opaque {
            for py in y..y + h {
                for px in x..x + w {
                    image.put_pixel(px, py, Rgba([200, 50, 50, 255]));
                }
            }
        }
        image.save(path).unwrap();
    }

    #[test]
    fn test_transparent_image_is_left_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.png");
        write_image(&path, 32, None);
        let before = std::fs::read(&path).unwrap();

        assert!(AlphaCropper.crop(&path).is_none());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_crop_to_opaque_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sprite.png");
        write_image(&path, 64, Some((10, 20, 30, 12)));

        let info = AlphaCropper.crop(&path).unwrap();
        assert_eq!(info.original_size, PixelSize { w: 64, h: 64 });
        assert_eq!(info.crop_offset, PixelOffset { x: 10, y: 20 });
        assert_eq!(info.cropped_size, PixelSize { w: 30, h: 12 });
        assert!(info.crop_offset.x + info.cropped_size.w <= info.original_size.w);
        assert!(info.crop_offset.y + info.cropped_size.h <= info.original_size.h);

        let cropped = image::open(&path).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (30, 12));
    }

    #[test]
    fn test_single_pixel_content() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        image.put_pixel(7, 0, Rgba([1, 1, 1, 1]));
        assert_eq!(opaque_bounds(&image), Some((7, 0, 1, 1)));
    }

    #[test]
    fn test_missing_file_yields_no_crop() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(AlphaCropper.crop(&tmp.path().join("missing.png")).is_none());
    }

    #[test]
    fn test_cropper_selection() {
        assert_eq!(cropper_for(false).name(), "disabled");
        assert_eq!(cropper_for(true).name(), "alpha");
    }
}

//! Bitmap decode and encode.

use std::{fs, path::Path};

use image::RgbaImage;
use tracing::{debug, warn};

use crate::error::{MinimiseError, Result};

/// Loads and stores RGBA bitmaps. Buffers are row-major, 4 bytes per pixel.
pub trait BitmapCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage>;
    fn encode(&self, path: &Path, image: &RgbaImage) -> Result<()>;
}

/// Codec backed by the `image` crate, with optional `oxipng` optimisation of
/// PNG output.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    pub optimise_png: bool,
}

impl ImageCodec {
    pub fn new(optimise_png: bool) -> Self {
        ImageCodec { optimise_png }
    }
}

impl BitmapCodec for ImageCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        let image = image::open(path)
            .map_err(|source| MinimiseError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "decoded image"
        );
        Ok(image)
    }

    fn encode(&self, path: &Path, image: &RgbaImage) -> Result<()> {
        let is_png = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));

        if is_png && self.optimise_png {
            return save_optimised_png(image, path);
        }

        image.save(path).map_err(|source| MinimiseError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Saves a PNG through a temporary file and lets `oxipng` reduce it.
fn save_optimised_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let temp_path = path.with_extension("temp.png");
    image
        .save(&temp_path)
        .map_err(|source| MinimiseError::Encode {
            path: temp_path.clone(),
            source,
        })?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;

    let result = oxipng::optimize(
        &oxipng::InFile::Path(temp_path.clone()),
        &oxipng::OutFile::Path(Some(path.to_path_buf())),
        &options,
    )
    .map_err(|e| MinimiseError::Optimise(e.to_string()));

    if let Err(e) = fs::remove_file(&temp_path) {
        warn!(path = %temp_path.display(), "failed to remove temporary file: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn bmp_round_trip_keeps_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiles.bmp");
        let image = RgbaImage::from_fn(16, 8, |x, y| Rgba([x as u8 * 9, y as u8 * 20, 3, 255]));

        let codec = ImageCodec::default();
        codec.encode(&path, &image).unwrap();
        let decoded = codec.decode(&path).unwrap();

        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.get_pixel(15, 7), image.get_pixel(15, 7));
    }

    #[test]
    fn optimised_png_is_written_without_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiles.png");
        let image = RgbaImage::from_fn(8, 8, |x, _| Rgba([x as u8, 0, 0, 255]));

        let codec = ImageCodec::new(true);
        codec.encode(&path, &image).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("temp.png").exists());
        assert_eq!(codec.decode(&path).unwrap().get_pixel(5, 2), &Rgba([5, 0, 0, 255]));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let err = ImageCodec::default()
            .decode(&dir.path().join("absent.png"))
            .unwrap_err();
        assert!(matches!(err, MinimiseError::Decode { .. }));
    }
}

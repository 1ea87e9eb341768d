//! Decode, flip and persist the converted image.
//!
//! The conversion service emits images upside down relative to the wanted
//! on-disk orientation. All decode/encode work happens in memory; the
//! destination is only touched by the final atomic rename.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageReader};

use crate::error::{StageError, StageResult};
use crate::fs::write_atomic;

/// Decode `bytes`, flip vertically and write a size-optimized PNG to `dest`.
///
/// Runs on a blocking thread; any existing file at `dest` is replaced.
pub async fn finalize_png(bytes: Vec<u8>, dest: PathBuf) -> StageResult<()> {
    tokio::task::spawn_blocking(move || finalize_png_sync(&bytes, &dest))
        .await
        .map_err(|e| StageError::Decode(format!("Task join error: {e}")))?
}

/// Synchronous finalize (runs in spawn_blocking).
pub fn finalize_png_sync(bytes: &[u8], dest: &Path) -> StageResult<()> {
    let image = decode(bytes)?;
    let flipped = flip_vertical(&image);
    drop(image);

    let encoded = encode_png(&flipped)?;
    write_atomic(dest, &encoded).map_err(|e| StageError::Io {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::trace!(
        "Wrote {:?} ({}x{}, {} bytes)",
        dest,
        flipped.width(),
        flipped.height(),
        encoded.len()
    );
    Ok(())
}

/// Top-to-bottom mirror. Applying it twice gives back the original.
pub fn flip_vertical(image: &DynamicImage) -> DynamicImage {
    image.flipv()
}

fn decode(bytes: &[u8]) -> StageResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StageError::Decode(format!("Cannot detect image format: {e}")))?;
    reader.decode().map_err(|e| StageError::Decode(e.to_string()))
}

/// Encode with maximum compression and adaptive filtering.
pub fn encode_png(image: &DynamicImage) -> StageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| StageError::Encode(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    /// 2x3 image whose rows are red, green, blue from top to bottom.
    fn striped() -> DynamicImage {
        let mut img = RgbaImage::new(2, 3);
        for x in 0..2 {
            img.put_pixel(x, 0, Rgba([255, 0, 0, 255]));
            img.put_pixel(x, 1, Rgba([0, 255, 0, 255]));
            img.put_pixel(x, 2, Rgba([0, 0, 255, 255]));
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_flip_moves_top_row_to_bottom() {
        let flipped = flip_vertical(&striped());
        assert_eq!(flipped.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(flipped.get_pixel(1, 2), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_flip_is_self_inverse() {
        let original = striped();
        let twice = flip_vertical(&flip_vertical(&original));
        assert_eq!(twice.to_rgba8(), original.to_rgba8());
    }

    #[test]
    fn test_finalize_writes_flipped_png() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("101.png");
        let payload = encode_png(&striped()).unwrap();

        finalize_png_sync(&payload, &dest).unwrap();

        let written = image::open(&dest).unwrap();
        assert_eq!(written.dimensions(), (2, 3));
        assert_eq!(written.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(written.get_pixel(0, 2), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_finalize_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("101.png");
        std::fs::write(&dest, b"stale").unwrap();

        finalize_png_sync(&encode_png(&striped()).unwrap(), &dest).unwrap();
        assert!(image::open(&dest).is_ok());
    }

    #[test]
    fn test_corrupt_bytes_leave_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("101.png");

        let err = finalize_png_sync(b"definitely not an image", &dest).unwrap_err();
        assert!(matches!(err, StageError::Decode(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_finalize_async_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("7.png");
        finalize_png(encode_png(&striped()).unwrap(), dest.clone())
            .await
            .unwrap();
        assert!(dest.exists());
    }
}

//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image` crate (pure Rust decoders) |
//! | Cover-resize + center crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy at the configured quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |

use super::backend::{BackendError, ImageBackend};
use super::params::{ThumbnailFormat, ThumbnailParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
///
/// AVIF is not listed: the `image` crate's `"avif"` feature only enables the
/// encoder, so AVIF sources can't be thumbnailed.
const DECODE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    DECODE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    if !path.is_file() {
        return Err(BackendError::SourceNotFound(path.to_path_buf()));
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` to `path` in the requested format.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ThumbnailFormat,
    quality: u32,
) -> Result<(), BackendError> {
    // Both encoders accept 8-bit RGBA; 16-bit and float sources are narrowed here.
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());

    match format {
        ThumbnailFormat::Webp => {
            let encoder = webp::Encoder::from_image(&rgba).map_err(|e| {
                BackendError::ProcessingFailed(format!("WebP encode failed: {}", e))
            })?;
            let encoded = encoder.encode(quality as f32);
            std::fs::write(path, &*encoded)?;
            Ok(())
        }
        ThumbnailFormat::Avif => {
            let writer = BufWriter::new(std::fs::File::create(path)?);
            let encoder =
                image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality as u8);
            rgba.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))
        }
    }
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let filled = img.resize_to_fill(params.edge, params.edge, FilterType::Lanczos3);
        save_image(
            &filled,
            &params.output,
            params.format,
            params.quality.value(),
        )
    }

    fn can_decode(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| supported_input_extensions().contains(&ext.as_str()))
    }
}

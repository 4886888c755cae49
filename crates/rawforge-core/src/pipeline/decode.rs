//! Image codec capability: decode, encode and metadata reading.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{DecodeConfig, STANDARD_EXTENSIONS};
use crate::error::CodecError;
use crate::types::CameraInfo;

use super::develop::develop;
use super::metadata::MetadataExtractor;

/// Decoding and encoding used by the converter.
///
/// Calls are blocking; the engine runs them on blocking worker threads.
pub trait ImageCodec: Send + Sync {
    /// Decode `path` into a pixel buffer using `options`.
    fn decode(&self, path: &Path, options: &DecodeConfig) -> Result<DynamicImage, CodecError>;

    /// Write `image` to `path` as a JPEG at `quality` (1-100).
    fn encode(&self, path: &Path, image: &DynamicImage, quality: u8) -> Result<(), CodecError>;

    /// Read the raw make/model embedded in `path`, if any.
    fn read_camera_metadata(&self, path: &Path) -> Option<CameraInfo>;
}

/// Production codec: rawloader for RAW containers, the `image` crate for
/// standard formats and JPEG output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl StandardCodec {
    pub fn new() -> Self {
        Self
    }

    fn is_standard_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                STANDARD_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    fn decode_standard(path: &Path, options: &DecodeConfig) -> Result<DynamicImage, CodecError> {
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;

        let image = if options.half_size {
            image.resize_exact(
                (image.width() / 2).max(1),
                (image.height() / 2).max(1),
                image::imageops::FilterType::Triangle,
            )
        } else {
            image
        };

        Ok(if options.output_bits == 16 {
            DynamicImage::ImageRgb16(image.into_rgb16())
        } else {
            DynamicImage::ImageRgb8(image.into_rgb8())
        })
    }

    fn decode_raw(path: &Path, options: &DecodeConfig) -> Result<DynamicImage, CodecError> {
        let raw = rawloader::decode_file(path).map_err(|e| CodecError::Raw(format!("{:?}", e)))?;
        tracing::trace!(
            "RAW {:?}: {}x{} cpp={} cfa={}",
            path,
            raw.width,
            raw.height,
            raw.cpp,
            raw.cfa.name
        );
        develop(&raw, options)
    }
}

impl ImageCodec for StandardCodec {
    fn decode(&self, path: &Path, options: &DecodeConfig) -> Result<DynamicImage, CodecError> {
        if Self::is_standard_image(path) {
            Self::decode_standard(path, options)
        } else {
            Self::decode_raw(path, options)
        }
    }

    fn encode(&self, path: &Path, image: &DynamicImage, quality: u8) -> Result<(), CodecError> {
        let part = part_path(path);
        let written = write_jpeg(&part, image, quality).and_then(|()| {
            std::fs::rename(&part, path)?;
            Ok(())
        });

        if written.is_err() {
            let _ = std::fs::remove_file(&part);
        }
        written
    }

    fn read_camera_metadata(&self, path: &Path) -> Option<CameraInfo> {
        if let Some(info) = MetadataExtractor::extract(path) {
            return Some(info);
        }
        if Self::is_standard_image(path) {
            return None;
        }

        // Containers without a readable EXIF block still carry make/model
        // in the decoder's camera tables
        let raw = rawloader::decode_file(path).ok()?;
        let info = CameraInfo::new(raw.make.trim(), raw.model.trim());
        (!info.is_empty()).then_some(info)
    }
}

/// Temporary path a JPEG is written to before it is renamed into place.
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn write_jpeg(path: &Path, image: &DynamicImage, quality: u8) -> Result<(), CodecError> {
    let rgb = image.to_rgb8();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
        encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
    }
    writer.flush()?;
    Ok(())
}

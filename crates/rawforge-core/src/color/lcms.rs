//! Little CMS backed color manager.

use image::{DynamicImage, ImageBuffer, Rgb};
use lcms2::{Intent, PixelFormat, Profile, Transform};
use std::path::Path;

use super::{ColorManager, ProfileHandle, StandardProfile};
use crate::error::ColorError;

/// Applies ICC profiles with lcms2 using the perceptual intent.
///
/// 16-bit buffers stay 16-bit through the transform; everything else is
/// converted to 8-bit RGB first.
#[derive(Debug, Default, Clone, Copy)]
pub struct LcmsColorManager;

impl LcmsColorManager {
    pub fn new() -> Self {
        Self
    }

    fn destination(profile: StandardProfile) -> Profile {
        match profile {
            StandardProfile::Srgb => Profile::new_srgb(),
        }
    }
}

impl ColorManager for LcmsColorManager {
    fn open_profile(&self, path: &Path) -> Result<ProfileHandle, ColorError> {
        let icc = std::fs::read(path)?;
        Profile::new_icc(&icc)
            .map_err(|e| ColorError::InvalidProfile(format!("{}: {}", path.display(), e)))?;
        Ok(ProfileHandle::new(path, icc))
    }

    fn transform(
        &self,
        image: &DynamicImage,
        source: &ProfileHandle,
        destination: StandardProfile,
    ) -> Result<DynamicImage, ColorError> {
        let src = Profile::new_icc(source.icc()).map_err(|e| {
            ColorError::InvalidProfile(format!("{}: {}", source.path().display(), e))
        })?;
        let dst = Self::destination(destination);
        let (width, height) = (image.width(), image.height());

        let sixteen_bit = matches!(
            image,
            DynamicImage::ImageRgb16(_)
                | DynamicImage::ImageRgba16(_)
                | DynamicImage::ImageLuma16(_)
                | DynamicImage::ImageLumaA16(_)
        );

        if sixteen_bit {
            let rgb = image.to_rgb16();
            let mut pixels: Vec<[u16; 3]> = rgb
                .as_raw()
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();

            let transform: Transform<[u16; 3], [u16; 3]> = Transform::new(
                &src,
                PixelFormat::RGB_16,
                &dst,
                PixelFormat::RGB_16,
                Intent::Perceptual,
            )
            .map_err(|e| ColorError::Transform(e.to_string()))?;
            transform.transform_in_place(&mut pixels);

            let raw: Vec<u16> = pixels.into_iter().flatten().collect();
            let buffer = ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, raw)
                .ok_or_else(|| ColorError::Transform("pixel buffer size mismatch".into()))?;
            Ok(DynamicImage::ImageRgb16(buffer))
        } else {
            let rgb = image.to_rgb8();
            let mut pixels: Vec<[u8; 3]> = rgb
                .as_raw()
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect();

            let transform: Transform<[u8; 3], [u8; 3]> = Transform::new(
                &src,
                PixelFormat::RGB_8,
                &dst,
                PixelFormat::RGB_8,
                Intent::Perceptual,
            )
            .map_err(|e| ColorError::Transform(e.to_string()))?;
            transform.transform_in_place(&mut pixels);

            let raw: Vec<u8> = pixels.into_iter().flatten().collect();
            let buffer = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, raw)
                .ok_or_else(|| ColorError::Transform("pixel buffer size mismatch".into()))?;
            Ok(DynamicImage::ImageRgb8(buffer))
        }
    }
}

//! RAW development: sensor data to an sRGB buffer.
//!
//! A simple developer: Bayer sensors are reduced to half
//! resolution by averaging each 2x2 block into one RGB pixel (no
//! interpolation), then white balance, exposure, highlight roll-off and the
//! sRGB transfer curve are applied. Full-size output is upscaled from the
//! half-size result.

use image::{imageops::FilterType, DynamicImage, ImageBuffer, Rgb};
use rawloader::{RawImage, RawImageData};

use crate::config::{DecodeConfig, WhiteBalance};
use crate::error::CodecError;

/// Highlights above this linear value are compressed when preserving.
const SHOULDER_START: f32 = 0.8;

/// Fraction of pixels allowed to clip under auto-brightness.
const AUTO_BRIGHT_PERCENTILE: f32 = 0.99;

/// Every Nth pixel is sampled for auto white balance and brightness.
const STATS_STRIDE: usize = 16;

/// Develop a decoded RAW image into an 8- or 16-bit RGB image.
pub fn develop(raw: &RawImage, options: &DecodeConfig) -> Result<DynamicImage, CodecError> {
    let (width, height, mut pixels) = linear_rgb(raw)?;

    let wb = white_balance(raw, &pixels, options.white_balance);
    for px in pixels.iter_mut() {
        for c in 0..3 {
            px[c] *= wb[c];
        }
    }

    let mut gain = 2f32.powf(options.exposure_shift) * options.brightness;
    if options.auto_brightness {
        gain *= auto_brightness_gain(&pixels);
    }

    let tone = |v: f32| -> f32 {
        let v = (v * gain).max(0.0);
        let v = if options.preserve_highlights {
            shoulder(v)
        } else {
            v.min(1.0)
        };
        srgb_encode(v)
    };

    let image = if options.output_bits == 16 {
        let raw_out: Vec<u16> = pixels
            .iter()
            .flat_map(|px| px.map(|v| (tone(v) * u16::MAX as f32).round() as u16))
            .collect();
        let buffer = ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, raw_out)
            .ok_or_else(|| CodecError::Raw("developed buffer size mismatch".into()))?;
        DynamicImage::ImageRgb16(buffer)
    } else {
        let raw_out: Vec<u8> = pixels
            .iter()
            .flat_map(|px| px.map(|v| (tone(v) * u8::MAX as f32).round() as u8))
            .collect();
        let buffer = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, raw_out)
            .ok_or_else(|| CodecError::Raw("developed buffer size mismatch".into()))?;
        DynamicImage::ImageRgb8(buffer)
    };

    if options.half_size || raw.cpp == 3 {
        Ok(image)
    } else {
        Ok(image.resize_exact(width * 2, height * 2, FilterType::Triangle))
    }
}

/// Normalized linear RGB with black/white levels applied and the crop
/// honored. Bayer data comes back at half resolution.
fn linear_rgb(raw: &RawImage) -> Result<(u32, u32, Vec<[f32; 3]>), CodecError> {
    let [top, right, bottom, left] = raw.crops;
    let x_end = raw.width.saturating_sub(right);
    let y_end = raw.height.saturating_sub(bottom);
    if x_end <= left || y_end <= top {
        return Err(CodecError::Raw("empty image after crop".into()));
    }

    let cpp = raw.cpp.max(1);
    let sample = |x: usize, y: usize, c: usize| -> f32 {
        let idx = (y * raw.width + x) * cpp + c;
        let channel = if cpp == 3 { c } else { raw.cfa.color_at(y, x) };
        let black = raw.blacklevels[channel.min(3)] as f32;
        let white = raw.whitelevels[channel.min(3)] as f32;
        let value = match &raw.data {
            RawImageData::Integer(data) => {
                let range = (white - black).max(1.0);
                (data.get(idx).copied().unwrap_or(0) as f32 - black) / range
            }
            RawImageData::Float(data) => data.get(idx).copied().unwrap_or(0.0),
        };
        value.max(0.0)
    };

    if cpp == 3 {
        let (w, h) = (x_end - left, y_end - top);
        let mut pixels = Vec::with_capacity(w * h);
        for y in top..y_end {
            for x in left..x_end {
                pixels.push([sample(x, y, 0), sample(x, y, 1), sample(x, y, 2)]);
            }
        }
        return Ok((w as u32, h as u32, pixels));
    }

    if cpp != 1 {
        return Err(CodecError::Unsupported(format!(
            "{} components per pixel",
            raw.cpp
        )));
    }

    let (w, h) = ((x_end - left) / 2, (y_end - top) / 2);
    if w == 0 || h == 0 {
        return Err(CodecError::Raw("image too small to develop".into()));
    }

    let mut pixels = Vec::with_capacity(w * h);
    for by in 0..h {
        for bx in 0..w {
            let mut sums = [0f32; 3];
            let mut counts = [0u32; 3];
            for dy in 0..2 {
                for dx in 0..2 {
                    let (x, y) = (left + bx * 2 + dx, top + by * 2 + dy);
                    // Second green (E) folds into green
                    let color = match raw.cfa.color_at(y, x) {
                        0 => 0,
                        2 => 2,
                        _ => 1,
                    };
                    sums[color] += sample(x, y, 0);
                    counts[color] += 1;
                }
            }
            pixels.push(std::array::from_fn(|c| {
                if counts[c] > 0 {
                    sums[c] / counts[c] as f32
                } else {
                    0.0
                }
            }));
        }
    }

    Ok((w as u32, h as u32, pixels))
}

/// Channel multipliers, normalized so green is 1.
fn white_balance(raw: &RawImage, pixels: &[[f32; 3]], mode: WhiteBalance) -> [f32; 3] {
    match mode {
        WhiteBalance::None => [1.0; 3],
        WhiteBalance::Camera => {
            let [r, g, b, _] = raw.wb_coeffs;
            if [r, g, b].iter().all(|v| v.is_finite() && *v > 0.0) {
                [r / g, 1.0, b / g]
            } else {
                tracing::debug!("No usable camera white balance, using unity");
                [1.0; 3]
            }
        }
        WhiteBalance::Auto => {
            let mut sums = [0f64; 3];
            for px in pixels.iter().step_by(STATS_STRIDE) {
                for c in 0..3 {
                    sums[c] += px[c] as f64;
                }
            }
            if sums.iter().all(|s| *s > 0.0) {
                [
                    (sums[1] / sums[0]) as f32,
                    1.0,
                    (sums[1] / sums[2]) as f32,
                ]
            } else {
                [1.0; 3]
            }
        }
    }
}

/// Gain that puts the given percentile of the brightest channel at 1.0.
fn auto_brightness_gain(pixels: &[[f32; 3]]) -> f32 {
    let mut peaks: Vec<f32> = pixels
        .iter()
        .step_by(STATS_STRIDE)
        .map(|px| px[0].max(px[1]).max(px[2]))
        .collect();
    if peaks.is_empty() {
        return 1.0;
    }

    let nth = ((peaks.len() - 1) as f32 * AUTO_BRIGHT_PERCENTILE) as usize;
    let (_, level, _) = peaks.select_nth_unstable_by(nth, f32::total_cmp);
    if *level > f32::EPSILON {
        (1.0 / *level).clamp(0.25, 16.0)
    } else {
        1.0
    }
}

/// Soft roll-off above [`SHOULDER_START`], approaching but never reaching
/// 1.0. Continuous with slope 1 at the knee.
fn shoulder(v: f32) -> f32 {
    if v <= SHOULDER_START {
        v
    } else {
        let range = 1.0 - SHOULDER_START;
        SHOULDER_START + range * (1.0 - (-(v - SHOULDER_START) / range).exp())
    }
}

fn srgb_encode(v: f32) -> f32 {
    let v = v.clamp(0.0, 1.0);
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shoulder_is_monotonic_and_bounded() {
        assert_eq!(shoulder(0.5), 0.5);
        assert_eq!(shoulder(SHOULDER_START), SHOULDER_START);
        let mut last = 0.0;
        for i in 0..30 {
            let v = shoulder(i as f32 * 0.1);
            assert!(v >= last);
            assert!(v <= 1.0);
            last = v;
        }
    }

    #[test]
    fn test_srgb_encode_endpoints() {
        assert_eq!(srgb_encode(0.0), 0.0);
        assert!((srgb_encode(1.0) - 1.0).abs() < 1e-5);
        assert!((srgb_encode(0.18) - 0.461).abs() < 0.01);
        assert_eq!(srgb_encode(2.0), srgb_encode(1.0));
    }

    #[test]
    fn test_auto_brightness_targets_percentile() {
        let pixels = vec![[0.5f32, 0.25, 0.1]; 1000];
        let gain = auto_brightness_gain(&pixels);
        assert!((gain - 2.0).abs() < 1e-4);

        let dark = vec![[0.0f32; 3]; 100];
        assert_eq!(auto_brightness_gain(&dark), 1.0);
    }
}
